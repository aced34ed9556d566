//! Player feedback (vibration, sound) for notable moments. Fire-and-forget.

use crate::model::ProcessId;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    ProcessCompleted { process_id: ProcessId, name: String },
    GameWon { level: u32, final_score: u32 },
}

/// Receives feedback events from the engine. Implementations must not block: they are
/// called from inside the game actor.
pub trait Feedback: Send + Sync {
    fn notify(&self, event: FeedbackEvent);
}

/// Feedback that only writes a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn notify(&self, event: FeedbackEvent) {
        match event {
            FeedbackEvent::ProcessCompleted { process_id, name } => {
                info!(%process_id, name = %name, "Feedback: process completed");
            }
            FeedbackEvent::GameWon { level, final_score } => {
                info!(level, final_score, "Feedback: level won");
            }
        }
    }
}
