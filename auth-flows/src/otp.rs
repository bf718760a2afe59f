use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// A freshly generated one-time code. Nothing here is persisted; the
/// caller stores it alongside the email and purpose type.
#[derive(Debug, Clone)]
pub struct GeneratedOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Produces a uniformly random numeric code of exactly `digits`
/// characters (leading zeros allowed) expiring `ttl_minutes` from now.
pub fn generate_code(digits: u32, ttl_minutes: i64) -> GeneratedOtp {
    let mut rng = rand::thread_rng();
    let code = (0..digits)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();

    GeneratedOtp {
        code,
        expires_at: Utc::now() + Duration::minutes(ttl_minutes),
    }
}
