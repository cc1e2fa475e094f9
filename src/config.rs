use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CAMERA_ID: &str = "camera-1";
const DEFAULT_CAMERA_NAME: &str = "Testing Zone";
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_MODEL_PATH: &str = "best.onnx";
const DEFAULT_INPUT_WIDTH: u32 = 640;
const DEFAULT_INPUT_HEIGHT: u32 = 640;
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
const DEFAULT_NOTIFICATION_DELAY_S: u64 = 10;
const DEFAULT_REMINDER_INTERVAL_S: u64 = 30;
const DEFAULT_TRANSPORT: &str = "log";
const DEFAULT_VIDEO_PATH: &str = "stub://camera";
const DEFAULT_VIDEO_FPS: u32 = 10;
const DEFAULT_RECORDS_PATH: &str = "alert_records.json";
const DEFAULT_SNAPSHOT_PATH: &str = "detected_frame.jpg";

fn default_class_names() -> Vec<String> {
    vec!["Debris".to_string(), "Garbage".to_string()]
}

#[derive(Debug, Deserialize, Default)]
struct SentinelConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    alerts: Option<AlertConfigFile>,
    notify: Option<NotifyConfigFile>,
    video: Option<VideoConfigFile>,
    records_path: Option<String>,
    snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    id: Option<String>,
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<String>,
    input_width: Option<u32>,
    input_height: Option<u32>,
    class_names: Option<Vec<String>>,
    target_classes: Option<Vec<String>>,
    confidence_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertConfigFile {
    notification_delay_s: Option<u64>,
    reminder_interval_s: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct NotifyConfigFile {
    transport: Option<String>,
    endpoint: Option<String>,
    recipients: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct VideoConfigFile {
    path: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SentinelConfig {
    pub camera: CameraSettings,
    pub detector: DetectorSettings,
    pub alerts: AlertSettings,
    pub notify: NotifySettings,
    pub video: VideoSettings,
    pub records_path: String,
    pub snapshot_path: String,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub id: String,
    pub name: String,
    /// Fixed GPS position, when the install site has one.
    pub gps: Option<GpsPosition>,
}

#[derive(Debug, Clone, Copy)]
pub struct GpsPosition {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// Backend name: "stub" or "tract" (requires the backend-tract feature).
    pub backend: String,
    pub model_path: String,
    pub input_width: u32,
    pub input_height: u32,
    /// Class names in model output order.
    pub class_names: Vec<String>,
    /// Classes that qualify a frame as a detection.
    pub target_classes: Vec<String>,
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    /// Sustained-detection duration before an alert fires.
    pub notification_delay: Duration,
    /// One-shot reminder delay after an alert fires.
    pub reminder_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    /// Transport name: "log" or "webhook".
    pub transport: String,
    pub endpoint: Option<String>,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub path: String,
    pub target_fps: u32,
}

impl SentinelConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SENTINEL_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SentinelConfigFile) -> Self {
        let camera = {
            let cam = file.camera.unwrap_or_default();
            let gps = match (cam.lat, cam.lon) {
                (Some(lat), Some(lon)) => Some(GpsPosition { lat, lon }),
                _ => None,
            };
            CameraSettings {
                id: cam.id.unwrap_or_else(|| DEFAULT_CAMERA_ID.to_string()),
                name: cam.name.unwrap_or_else(|| DEFAULT_CAMERA_NAME.to_string()),
                gps,
            }
        };
        let detector = {
            let det = file.detector.unwrap_or_default();
            let class_names = det.class_names.unwrap_or_else(default_class_names);
            DetectorSettings {
                backend: det.backend.unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
                model_path: det
                    .model_path
                    .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
                input_width: det.input_width.unwrap_or(DEFAULT_INPUT_WIDTH),
                input_height: det.input_height.unwrap_or(DEFAULT_INPUT_HEIGHT),
                target_classes: det.target_classes.unwrap_or_else(|| class_names.clone()),
                class_names,
                confidence_threshold: det
                    .confidence_threshold
                    .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            }
        };
        let alerts = {
            let alerts = file.alerts.unwrap_or_default();
            AlertSettings {
                notification_delay: Duration::from_secs(
                    alerts
                        .notification_delay_s
                        .unwrap_or(DEFAULT_NOTIFICATION_DELAY_S),
                ),
                reminder_interval: Duration::from_secs(
                    alerts
                        .reminder_interval_s
                        .unwrap_or(DEFAULT_REMINDER_INTERVAL_S),
                ),
            }
        };
        let notify = {
            let notify = file.notify.unwrap_or_default();
            NotifySettings {
                transport: notify
                    .transport
                    .unwrap_or_else(|| DEFAULT_TRANSPORT.to_string()),
                endpoint: notify.endpoint,
                recipients: notify.recipients.unwrap_or_default(),
            }
        };
        let video = {
            let video = file.video.unwrap_or_default();
            VideoSettings {
                path: video.path.unwrap_or_else(|| DEFAULT_VIDEO_PATH.to_string()),
                target_fps: video.target_fps.unwrap_or(DEFAULT_VIDEO_FPS),
            }
        };
        Self {
            camera,
            detector,
            alerts,
            notify,
            video,
            records_path: file
                .records_path
                .unwrap_or_else(|| DEFAULT_RECORDS_PATH.to_string()),
            snapshot_path: file
                .snapshot_path
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(id) = std::env::var("SENTINEL_CAMERA_ID") {
            if !id.trim().is_empty() {
                self.camera.id = id;
            }
        }
        if let Ok(path) = std::env::var("SENTINEL_VIDEO_PATH") {
            if !path.trim().is_empty() {
                self.video.path = path;
            }
        }
        if let Ok(path) = std::env::var("SENTINEL_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.detector.model_path = path;
            }
        }
        if let Ok(path) = std::env::var("SENTINEL_RECORDS_PATH") {
            if !path.trim().is_empty() {
                self.records_path = path;
            }
        }
        if let Ok(endpoint) = std::env::var("SENTINEL_NOTIFY_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.notify.endpoint = Some(endpoint);
                self.notify.transport = "webhook".to_string();
            }
        }
        if let Ok(threshold) = std::env::var("SENTINEL_CONFIDENCE_THRESHOLD") {
            let threshold: f32 = threshold.parse().map_err(|_| {
                anyhow!("SENTINEL_CONFIDENCE_THRESHOLD must be a number in (0, 1]")
            })?;
            self.detector.confidence_threshold = threshold;
        }
        if let Ok(delay) = std::env::var("SENTINEL_NOTIFICATION_DELAY_S") {
            let seconds: u64 = delay.parse().map_err(|_| {
                anyhow!("SENTINEL_NOTIFICATION_DELAY_S must be an integer number of seconds")
            })?;
            self.alerts.notification_delay = Duration::from_secs(seconds);
        }
        if let Ok(interval) = std::env::var("SENTINEL_REMINDER_INTERVAL_S") {
            let seconds: u64 = interval.parse().map_err(|_| {
                anyhow!("SENTINEL_REMINDER_INTERVAL_S must be an integer number of seconds")
            })?;
            self.alerts.reminder_interval = Duration::from_secs(seconds);
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        crate::validate_camera_id(&self.camera.id)?;
        self.camera.id = self.camera.id.to_lowercase();

        if !(self.detector.confidence_threshold > 0.0
            && self.detector.confidence_threshold <= 1.0)
        {
            return Err(anyhow!("confidence_threshold must be in (0, 1]"));
        }
        if self.detector.class_names.is_empty() {
            return Err(anyhow!("detector.class_names must not be empty"));
        }
        if self.detector.target_classes.is_empty() {
            return Err(anyhow!("detector.target_classes must not be empty"));
        }
        for target in &self.detector.target_classes {
            if !self.detector.class_names.contains(target) {
                return Err(anyhow!(
                    "target class '{}' is not one of the model's class names",
                    target
                ));
            }
        }
        if self.alerts.reminder_interval.as_secs() == 0 {
            return Err(anyhow!("reminder_interval_s must be greater than zero"));
        }
        match self.notify.transport.as_str() {
            "log" => {}
            "webhook" => {
                if self.notify.endpoint.is_none() {
                    return Err(anyhow!("webhook transport requires notify.endpoint"));
                }
            }
            other => return Err(anyhow!("unknown notify transport '{}'", other)),
        }
        if self.video.target_fps == 0 {
            return Err(anyhow!("video.target_fps must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<SentinelConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
