pub mod error;
pub mod message;

pub use error::{CraftError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use message::{Message, MessageId, MessageKind};
