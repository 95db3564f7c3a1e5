//! Run orchestration: pairing, composition, encoding and progress.

/// Immutable run input.
pub mod input;
/// The pipeline entry point.
pub mod orchestrator;
/// Monotonic progress forwarding.
pub mod progress;
/// Run output and its JSON manifest.
pub mod project;

pub use input::PipelineInput;
pub use orchestrator::Pipeline;
pub use progress::ProgressTracker;
pub use project::{SkippedItem, VideoProject};
