pub mod popup;

pub use popup::{BoundaryPrompt, NotificationId, PopupManager, PromptId, PromptPhase};
