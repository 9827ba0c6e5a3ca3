use crate::ApiError;
use reqwest::header::HeaderValue;
use std::fmt;

/// BookStack API token pair. The id acts like a username, the secret like a password.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    token_id: String,
    token_secret: String,
}

impl ApiCredentials {
    pub fn new(token_id: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            token_secret: token_secret.into(),
        }
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// The `Authorization` header value, marked sensitive so it never shows up in debug output.
    pub(crate) fn header_value(&self) -> Result<HeaderValue, ApiError> {
        if self.token_id.trim().is_empty() || self.token_secret.trim().is_empty() {
            return Err(ApiError::InvalidConfig("token id and token secret must not be empty".into()));
        }
        let mut value = HeaderValue::from_str(&format!("Token {}:{}", self.token_id, self.token_secret))
            .map_err(|err| ApiError::InvalidConfig(format!("token contains invalid characters: {err}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("token_id", &self.token_id)
            .field("token_secret", &"**REDACTED**")
            .finish()
    }
}
