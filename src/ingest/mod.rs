//! Frame ingestion sources.
//!
//! Sources produce owned RGB `Frame`s one at a time: local video files
//! (decoded with ffmpeg when the `ingest-file-ffmpeg` feature is enabled,
//! or a synthetic `stub://` source for tests and dry runs) and still
//! images for the offline tools.

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
mod file_ffmpeg;
pub mod still;

pub use file::{FileConfig, FileSource, FileStats};
pub use still::load_rgb_frame;
