//! Transactional email bodies. Kept as plain formatted HTML so the
//! engine can compose subject + body and hand them to the mail port.

pub fn verification_email(code: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>Verify Your Email</h2>
  <p>Use the code below to verify your email address. It expires in 10 minutes.</p>
  <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold;">{code}</p>
  <p>If you did not create an account, you can ignore this email.</p>
</div>"#
    )
}

pub fn password_reset_email(code: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>Reset Your Password</h2>
  <p>Use the code below to reset your password. It expires in 10 minutes.</p>
  <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold;">{code}</p>
  <p>If you did not request a password reset, you can ignore this email.</p>
</div>"#
    )
}
