/// Environment variable holding the backend root URL.
pub const BASE_URL_ENV: &str = "RESUME_API_BASE_URL";

/// Connection settings for [`crate::Client`].
///
/// The base address is taken as given: nothing is validated here, so an empty
/// or malformed value only shows up as a transport error on the first request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientConfig {
    base_address: String,
}

impl ClientConfig {
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
        }
    }

    /// Loads `.env` if present, then reads [`BASE_URL_ENV`]. A missing
    /// variable leaves the base address empty.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_env_value(std::env::var(BASE_URL_ENV).ok())
    }

    pub fn from_env_value(value: Option<String>) -> Self {
        if value.is_none() {
            tracing::warn!("{BASE_URL_ENV} is not set; requests will fail until it is configured");
        }
        Self::new(value.unwrap_or_default())
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_address_is_kept_verbatim() {
        let config = ClientConfig::new(" https://api.example.com/v2/ ");
        assert_eq!(config.base_address(), " https://api.example.com/v2/ ");
    }

    #[test]
    fn missing_env_value_yields_empty_base_address() {
        assert_eq!(ClientConfig::from_env_value(None).base_address(), "");
        assert_eq!(
            ClientConfig::from_env_value(Some("http://localhost:8080".into())),
            ClientConfig::new("http://localhost:8080")
        );
    }

    #[test]
    fn from_env_reads_base_url_variable_verbatim() {
        let previous = std::env::var(BASE_URL_ENV).ok();
        let raw = "  https://api.example.com/v1//?tenant=a b  ";

        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe { std::env::set_var(BASE_URL_ENV, raw) };
        let config = ClientConfig::from_env();
        match previous {
            Some(value) => unsafe { std::env::set_var(BASE_URL_ENV, value) },
            None => unsafe { std::env::remove_var(BASE_URL_ENV) },
        }

        assert_eq!(config.base_address().as_bytes(), raw.as_bytes());
    }
}
