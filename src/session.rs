//! Opaque credentials handed over by the sign-in layer.
//!
//! The store client receives these at construction and attaches them to
//! every request without inspecting them.

use reqwest::header::HeaderValue;

/// Bearer token for the signed-in session.
#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// `Authorization` header value. Fails only if the token holds characters
    /// that are not valid in an HTTP header.
    pub fn bearer_header(&self) -> Result<HeaderValue, reqwest::header::InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}
