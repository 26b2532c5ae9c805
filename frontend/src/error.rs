//! 客户端错误类型
//!
//! 所有网络、存储与校验错误统一为 [`ClientError`]，
//! 由 UI 层通过 [`ClientError::user_message`] 转换为展示文本。

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No response was received.
    #[error("network error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("session storage unavailable: {0}")]
    Storage(String),

    #[error("not signed in")]
    Unauthenticated,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Text shown to the user.
    ///
    /// Server and validation messages are shown verbatim; everything else
    /// collapses into the caller's generic notice.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected { message, .. } | ClientError::Validation(message) => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }

    /// True when nothing came back from the server.
    #[cfg(test)]
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}
