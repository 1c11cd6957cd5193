//! 业务服务模块

pub mod quiz;
pub mod session_store;
pub mod suggestion;
pub mod turn;
pub mod visitor_store;

pub use quiz::QuizService;
pub use session_store::SessionStore;
pub use suggestion::{SuggestionManager, SuggestionStage};
pub use visitor_store::VisitorStore;
