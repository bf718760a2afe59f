use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    /// Missing or malformed SMTP settings.
    #[error("Invalid email configuration: {0}")]
    Config(String),

    /// Connection or delivery failure against the relay.
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

pub type EmailResult<T> = Result<T, EmailError>;
