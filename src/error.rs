/// Failures an operator-triggered operation can end in. The `Display` text is
/// what gets shown in the transient notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid password")]
    InvalidCredential,
    #[error("Authentication failed. Please check your connection.")]
    AuthenticationUnavailable,
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to load documents")]
    FetchFailed,
    #[error("{0}")]
    CreateFailed(String),
    #[error("{0}")]
    UpdateFailed(String),
    #[error("Failed to delete document")]
    DeleteFailed(String),
    #[error("Authentication expired. Please login again.")]
    SessionExpired,
    #[error("No authentication token available")]
    NotAuthenticated,
    #[error("Another request is still in progress")]
    Busy,
}
