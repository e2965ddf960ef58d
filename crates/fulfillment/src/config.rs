//! Provider configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use common::ServiceKind;

/// Static provider credential sent with every request.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    scheme: String,
    secret: String,
}

impl ProviderCredential {
    pub fn new(scheme: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            secret: secret.into(),
        }
    }

    /// Value for the `Authorization` header, e.g. `Token abc123`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.secret)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn is_empty(&self) -> bool {
        self.secret.trim().is_empty()
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("scheme", &self.scheme)
            .field("secret", &"***")
            .finish()
    }
}

/// Everything the gateway needs to reach the provider.
///
/// Built once at startup and handed to the gateway; nothing here is read
/// from ambient state.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub credential: ProviderCredential,
    pub timeout: Duration,
    endpoints: BTreeMap<ServiceKind, String>,
}

impl ProviderConfig {
    /// Creates a config with the default subscribe paths and `Token` auth.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let endpoints = ServiceKind::ALL
            .into_iter()
            .map(|kind| (kind, format!("/api/{}/subscribe/", kind.as_str())))
            .collect();

        Self {
            base_url: base_url.into(),
            credential: ProviderCredential::new("Token", api_key),
            timeout: Duration::from_secs(30),
            endpoints,
        }
    }

    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        let secret = std::mem::take(&mut self.credential.secret);
        self.credential = ProviderCredential::new(scheme, secret);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the path used for `kind`.
    pub fn with_endpoint(mut self, kind: ServiceKind, path: impl Into<String>) -> Self {
        self.endpoints.insert(kind, path.into());
        self
    }

    /// Removes the mapping for `kind`, making it unsupported.
    pub fn without_endpoint(mut self, kind: ServiceKind) -> Self {
        self.endpoints.remove(&kind);
        self
    }

    /// Returns the path mapped to `kind`.
    pub fn endpoint_for(&self, kind: ServiceKind) -> Option<&str> {
        self.endpoints.get(&kind).map(String::as_str)
    }

    /// Returns the absolute URL for `kind`.
    pub fn url_for(&self, kind: ServiceKind) -> Option<String> {
        self.endpoint_for(kind).map(|path| self.join(path))
    }

    pub(crate) fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ProviderConfig::new("https://provider.test", "key");
        assert_eq!(
            config.endpoint_for(ServiceKind::Airtime),
            Some("/api/airtime/subscribe/")
        );
        assert_eq!(
            config.endpoint_for(ServiceKind::Data),
            Some("/api/data/subscribe/")
        );
        assert_eq!(
            config.endpoint_for(ServiceKind::Cable),
            Some("/api/cable/subscribe/")
        );
        assert_eq!(
            config.endpoint_for(ServiceKind::Electricity),
            Some("/api/electricity/subscribe/")
        );
    }

    #[test]
    fn test_url_joining_tolerates_trailing_slash() {
        let config = ProviderConfig::new("https://provider.test/", "key");
        assert_eq!(
            config.url_for(ServiceKind::Data).unwrap(),
            "https://provider.test/api/data/subscribe/"
        );
    }

    #[test]
    fn test_without_endpoint() {
        let config =
            ProviderConfig::new("https://provider.test", "key").without_endpoint(ServiceKind::Cable);
        assert!(config.url_for(ServiceKind::Cable).is_none());
        assert!(config.url_for(ServiceKind::Airtime).is_some());
    }

    #[test]
    fn test_auth_header() {
        let config = ProviderConfig::new("https://provider.test", "abc123");
        assert_eq!(config.credential.header_value(), "Token abc123");

        let bearer = config.with_auth_scheme("Bearer");
        assert_eq!(bearer.credential.header_value(), "Bearer abc123");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ProviderConfig::new("https://provider.test", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_empty_credential() {
        assert!(ProviderCredential::new("Token", "  ").is_empty());
        assert!(!ProviderCredential::new("Token", "k").is_empty());
    }
}
