//! Sustained-detection debouncing.
//!
//! A Mealy machine driven once per frame. Qualifying frames must persist
//! for the notification delay before an alert fires; a single clean frame
//! clears it (the clearing side is deliberately not debounced). The
//! one-shot reminder is a deadline owned by the episode: armed when the
//! alert fires, polled by the same loop, and dropped when the episode
//! clears before it comes due.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    Idle,
    /// Qualifying detections seen continuously since `since` (epoch seconds).
    Accumulating { since: u64 },
    /// Alert sent; `reminder_due` is the pending one-shot reminder deadline.
    Notified { reminder_due: Option<u64> },
}

/// Side effect requested by a transition. At most one per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertAction {
    /// Sustained detection crossed the delay: snapshot, notify, open a record.
    Raise,
    /// The reminder deadline passed while the episode is still open.
    Remind,
    /// Detection ceased: complete the record, send the clearance.
    Clear,
}

pub struct AlertMachine {
    state: EpisodeState,
    notification_delay_s: u64,
    reminder_interval_s: u64,
}

impl AlertMachine {
    pub fn new(notification_delay: Duration, reminder_interval: Duration) -> Self {
        Self {
            state: EpisodeState::Idle,
            notification_delay_s: notification_delay.as_secs(),
            reminder_interval_s: reminder_interval.as_secs(),
        }
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Advance the machine by one frame sample.
    pub fn step(&mut self, now_s: u64, qualifying: bool) -> Option<AlertAction> {
        let (next, action) = transition(
            self.state,
            now_s,
            qualifying,
            self.notification_delay_s,
            self.reminder_interval_s,
        );
        self.state = next;
        action
    }
}

fn transition(
    state: EpisodeState,
    now_s: u64,
    qualifying: bool,
    delay_s: u64,
    reminder_s: u64,
) -> (EpisodeState, Option<AlertAction>) {
    match state {
        EpisodeState::Idle => {
            if qualifying {
                (EpisodeState::Accumulating { since: now_s }, None)
            } else {
                (EpisodeState::Idle, None)
            }
        }
        EpisodeState::Accumulating { since } => {
            if !qualifying {
                return (EpisodeState::Idle, None);
            }
            if now_s.saturating_sub(since) >= delay_s {
                (
                    EpisodeState::Notified {
                        reminder_due: Some(now_s + reminder_s),
                    },
                    Some(AlertAction::Raise),
                )
            } else {
                (EpisodeState::Accumulating { since }, None)
            }
        }
        EpisodeState::Notified { reminder_due } => {
            if !qualifying {
                // Cancels any armed reminder along with the episode.
                return (EpisodeState::Idle, Some(AlertAction::Clear));
            }
            match reminder_due {
                Some(due) if now_s >= due => (
                    EpisodeState::Notified { reminder_due: None },
                    Some(AlertAction::Remind),
                ),
                _ => (EpisodeState::Notified { reminder_due }, None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> AlertMachine {
        AlertMachine::new(Duration::from_secs(10), Duration::from_secs(30))
    }

    fn drive(machine: &mut AlertMachine, samples: &[(u64, bool)]) -> Vec<AlertAction> {
        samples
            .iter()
            .filter_map(|&(now, qualifying)| machine.step(now, qualifying))
            .collect()
    }

    #[test]
    fn sustained_detection_raises_then_clears_exactly_once() {
        let mut m = machine();
        let actions = drive(
            &mut m,
            &[
                (0, true),   // Idle -> Accumulating
                (5, true),   // still under the delay
                (10, true),  // delay reached -> Raise
                (11, true),  // notified, nothing new
                (12, false), // one clean frame -> Clear
            ],
        );
        assert_eq!(actions, vec![AlertAction::Raise, AlertAction::Clear]);
        assert_eq!(m.state(), EpisodeState::Idle);
    }

    #[test]
    fn short_run_never_notifies() {
        let mut m = machine();
        let actions = drive(&mut m, &[(0, true), (4, true), (9, false), (10, false)]);
        assert!(actions.is_empty());
        assert_eq!(m.state(), EpisodeState::Idle);
    }

    #[test]
    fn reminder_fires_once_while_episode_stays_open() {
        let mut m = machine();
        let actions = drive(
            &mut m,
            &[
                (0, true),
                (10, true), // Raise; reminder due at 40
                (39, true),
                (40, true), // Remind
                (60, true), // one-shot: no second reminder
            ],
        );
        assert_eq!(actions, vec![AlertAction::Raise, AlertAction::Remind]);
        assert_eq!(
            m.state(),
            EpisodeState::Notified { reminder_due: None }
        );
    }

    #[test]
    fn clearing_early_cancels_the_reminder() {
        let mut m = machine();
        let actions = drive(
            &mut m,
            &[
                (0, true),
                (10, true),  // Raise; reminder due at 40
                (15, false), // Clear before the reminder
                (45, false), // past the old deadline: nothing fires
            ],
        );
        assert_eq!(actions, vec![AlertAction::Raise, AlertAction::Clear]);
    }

    #[test]
    fn single_clean_frame_clears_immediately() {
        // The clearing side is not debounced by design.
        let mut m = machine();
        drive(&mut m, &[(0, true), (10, true)]);
        assert_eq!(m.step(11, false), Some(AlertAction::Clear));
        // A fresh qualifying frame starts a brand new episode.
        assert_eq!(m.step(12, true), None);
        assert_eq!(m.state(), EpisodeState::Accumulating { since: 12 });
    }
}
