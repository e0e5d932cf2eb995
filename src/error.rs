use thiserror::Error;

/// Errors that abort a clustering or tessellation call.
///
/// Both kinds are deterministic: retrying with the same input reproduces the
/// same error. Per-site numerical trouble is not an error, it is reported as an
/// empty [`ClippedCell`](crate::ClippedCell).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The caller supplied parameters the algorithm cannot run with.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the offending parameter.
        message: String,
    },
    /// The input points produce an undefined diagram.
    #[error("Degenerate input: {message}")]
    DegenerateInput {
        /// Description of the degeneracy.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Error::DegenerateInput {
            message: message.into(),
        }
    }
}

/// Errors raised while reading or writing point files.
#[derive(Debug, Error)]
pub enum PointsIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A line did not contain two comma separated numbers.
    #[error("Malformed point on line {line}: {content:?}")]
    Parse {
        /// 1-based line number.
        line: usize,
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::invalid("k must be at least 1");
        assert_eq!(e.to_string(), "Invalid configuration: k must be at least 1");
        let e = Error::degenerate("sites 0 and 3 coincide");
        assert_eq!(e.to_string(), "Degenerate input: sites 0 and 3 coincide");
    }
}
