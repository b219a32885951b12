use thiserror::Error;

pub const GENERIC_CONNECT_FAILURE: &str = "Failed to connect to server.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("no url to download")]
    EmptyUrl,

    /// Submit was rejected or never reached the backend. Carries the
    /// user-facing message.
    #[error("{0}")]
    SubmissionFailed(String),

    /// Any transport or decode failure while fetching a status report.
    #[error("status poll failed: {0}")]
    PollFailed(String),

    #[error("server at {0} is unreachable")]
    ProbeUnreachable(String),

    #[error("clipboard unavailable: {0}")]
    ClipboardDenied(String),

    #[error("no finished download to save")]
    NotReady,
}

impl ClientError {
    pub fn submission(message: Option<String>) -> Self {
        let message = message
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| GENERIC_CONNECT_FAILURE.to_string());
        Self::SubmissionFailed(message)
    }

    pub fn poll(err: impl ToString) -> Self {
        Self::PollFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_message_falls_back_to_generic() {
        assert_eq!(
            ClientError::submission(None),
            ClientError::SubmissionFailed(GENERIC_CONNECT_FAILURE.to_string())
        );
        assert_eq!(
            ClientError::submission(Some("  ".to_string())),
            ClientError::SubmissionFailed(GENERIC_CONNECT_FAILURE.to_string())
        );
        assert_eq!(
            ClientError::submission(Some("quota exceeded".to_string())).to_string(),
            "quota exceeded"
        );
    }
}
