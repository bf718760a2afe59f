//! SMTP delivery for Authline Engine transactional email.
//!
//! Implements the [`auth_flows::mailer::Mailer`] port over a plain SMTP
//! relay using the Stalwart Labs client libraries. Configuration comes
//! from the environment; the workflow crate never sees SMTP details.

pub mod error;
pub mod smtp;

pub use error::{EmailError, EmailResult};
pub use smtp::{SmtpConfig, SmtpMailer};
