use async_trait::async_trait;

/// Outbound mail port. The engine only ever fires messages best-effort
/// after a transaction commits; implementations live in the
/// `email-dispatch` crate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}
