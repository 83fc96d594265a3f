//! Failures reported to a sink through [`Message::Error`](crate::Message::Error).

use thiserror::Error;

/// Protocol failures of a demand-driven source.
///
/// Both kinds are terminal: once delivered, the sink receives nothing else from that
/// subscription. Sinks get them type-erased and can recover the concrete value with
/// [`downcast_ref`](std::error::Error#method.downcast_ref).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sink requested zero or a negative number of items.
    #[error("invalid demand {requested}: request amount must be positive")]
    InvalidDemand {
        /// The amount passed to `request`.
        requested: i64,
    },

    /// The source sequence has no element at the current position.
    #[error("null element at index {index}")]
    NullElement {
        /// Position of the hole in the source sequence.
        index: usize,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidDemand { .. } => "invalid_demand",
            Error::NullElement { .. } => "null_element",
        }
    }
}
