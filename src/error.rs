//! Error types for substitution recoding.

use thiserror::Error;

/// Result type alias for recoding operations
pub type Result<T> = std::result::Result<T, RecodeError>;

/// Error type for recoding operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecodeError {
    /// A record is too short to hold the orientation-determining base
    #[error(
        "Substitution at index {index} is too short for decision index {decision_index} \
         (length {len}): '{record}'"
    )]
    IndexOutOfBounds {
        /// Position of the offending record within its batch
        index: usize,
        /// Position inside the record that was inspected
        decision_index: usize,
        /// Length of the offending record in bytes
        len: usize,
        /// The offending record
        record: String,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },
}

impl RecodeError {
    /// Shifts the batch index of an `IndexOutOfBounds` error by `offset`.
    ///
    /// Used when a sub-slice of a larger batch was normalized on its own and the
    /// error has to point into the enclosing batch.
    #[must_use]
    pub fn offset_index(self, offset: usize) -> Self {
        match self {
            Self::IndexOutOfBounds { index, decision_index, len, record } => {
                Self::IndexOutOfBounds { index: index + offset, decision_index, len, record }
            }
            other => other,
        }
    }

    /// Batch index of the offending record, if this error names one.
    #[must_use]
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::IndexOutOfBounds { index, .. } => Some(*index),
            Self::InvalidParameter { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_bounds_message() {
        let error = RecodeError::IndexOutOfBounds {
            index: 7,
            decision_index: 1,
            len: 1,
            record: "G".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("index 7"));
        assert!(msg.contains("decision index 1"));
        assert!(msg.contains("'G'"));
    }

    #[test]
    fn test_invalid_parameter() {
        let error = RecodeError::InvalidParameter {
            parameter: "threads".to_string(),
            reason: "must be >= 1".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'threads'"));
        assert!(msg.contains("must be >= 1"));
    }

    #[test]
    fn test_offset_index() {
        let error = RecodeError::IndexOutOfBounds {
            index: 2,
            decision_index: 0,
            len: 0,
            record: String::new(),
        };
        assert_eq!(error.offset_index(100).record_index(), Some(102));

        let param = RecodeError::InvalidParameter {
            parameter: "batch-size".to_string(),
            reason: "must be >= 1".to_string(),
        };
        assert_eq!(param.clone().offset_index(5), param);
        assert_eq!(param.record_index(), None);
    }
}
