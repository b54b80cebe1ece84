// Core definitions shared by the configuration model and the codecs
pub mod constants;
pub mod messages;

pub use constants::*;
pub use messages::{Message, MessageLog, Severity};
