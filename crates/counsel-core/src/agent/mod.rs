pub mod error;
pub mod types;

pub use error::TurnError;
pub use types::{serialize_log, Message, MessageContent, Role, Session};
