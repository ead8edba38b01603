use thiserror::Error;

use super::Outcome;

/// Ways an outbound request can fail to produce a usable reply
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Failed(String),

    #[error("request rejected with status {0}")]
    Rejected(u16),

    #[error("response of {len} bytes exceeds inbox capacity of {capacity}")]
    TooLarge { len: usize, capacity: usize },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid icon data: {0}")]
    Icon(String),
}

impl RequestError {
    /// Outcome shown to the user for this failure
    pub fn outcome(&self) -> Outcome {
        match self {
            RequestError::Rejected(_) => Outcome::Bad,
            _ => Outcome::Error,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        RequestError::Failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rejection_is_bad() {
        assert_eq!(RequestError::Rejected(403).outcome(), Outcome::Bad);
        assert_eq!(
            RequestError::TooLarge {
                len: 300,
                capacity: 256
            }
            .outcome(),
            Outcome::Error
        );
        assert_eq!(
            RequestError::Failed("connection refused".into()).outcome(),
            Outcome::Error
        );
    }
}
