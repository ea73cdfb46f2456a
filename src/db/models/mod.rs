pub mod chat;
pub mod collaboration;
pub mod declined;
pub mod evaluation;
pub mod feedback;
pub mod notification;
pub mod requests;
pub mod stats;
pub mod user;

/// Error raised when a TEXT column holds a value outside the expected enum.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized value `{value}` for {what}")]
pub struct EnumParseError {
    pub what: &'static str,
    pub value: String,
}

impl EnumParseError {
    pub fn new(what: &'static str, value: impl Into<String>) -> Self {
        Self {
            what,
            value: value.into(),
        }
    }
}
