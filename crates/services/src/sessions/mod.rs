mod handle;
mod service;
mod summary;
mod view;

// Public API of the quiz session subsystem.
pub use handle::SessionHandle;
pub use service::QuizService;
pub use summary::QuizSummary;
pub use view::{QuizSnapshot, TimerStatus};
