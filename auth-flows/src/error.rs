use thiserror::Error;

/// Domain error taxonomy for the auth workflows. The boundary layer is
/// responsible for mapping kinds to transport status codes; nothing in
/// this crate knows about HTTP.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Duplicate registration.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown user or identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad credentials or an invalid/expired token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unverified or non-active account.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid/expired one-time code, wrong old password, or a policy
    /// violation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A compound store operation exceeded its transaction timeout; all
    /// partial writes were rolled back and the whole flow may be retried.
    #[error("Operation timed out")]
    Timeout,

    /// Store or crypto backend failure.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
