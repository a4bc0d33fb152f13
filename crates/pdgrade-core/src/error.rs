//! Dictionary error types.
//!
//! The scorer itself never fails; these errors only arise when a caller asks
//! for strict topic lookup or extends the dictionary with bad tables.

use thiserror::Error;

/// Errors raised by strict dictionary operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictionaryError {
    /// The topic is not present in the dictionary.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// A topic was defined with no technical terms.
    #[error("topic '{0}' has an empty term table")]
    EmptyTermTable(String),

    /// A term was given a weight of zero.
    #[error("term '{term}' in topic '{topic}' has zero weight")]
    ZeroWeight { topic: String, term: String },

    /// A term was blank after trimming.
    #[error("topic '{topic}' has a blank term '{term}'")]
    EmptyTerm { topic: String, term: String },

    /// A concept listed a blank keyword.
    #[error("concept '{concept}' in topic '{topic}' has a blank keyword")]
    EmptyKeyword { topic: String, concept: String },

    /// A topic name was blank.
    #[error("topic name is empty")]
    EmptyTopicName,
}

impl DictionaryError {
    /// Returns `true` if the error is a lookup miss rather than bad table data.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, DictionaryError::UnknownTopic(_))
    }
}
