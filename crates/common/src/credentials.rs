//! Credential resolution for filesystem creation.
//!
//! Two string-map sources are consulted in order: the explicit configuration
//! handed to `create`, then the properties source the registry was built
//! with. A source counts only when it supplies both option names; partial
//! specification falls through. Anonymous access is the valid end state when
//! neither source qualifies — not an error.

use std::collections::BTreeMap;

/// Configuration option name for the access key.
pub const ACCESS_KEY_OPT: &str = "access-key";
/// Configuration option name for the secret key.
pub const SECRET_KEY_OPT: &str = "secret-key";

/// String-map configuration surface recognized at filesystem creation.
pub type ConfigMap = BTreeMap<String, String>;

/// A resolved access/secret key pair, or anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    access_key: Option<String>,
    secret_key: Option<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
        }
    }

    /// Anonymous access: no keys at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.access_key.is_none()
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }

    /// Resolve credentials from the explicit configuration, else the
    /// properties source, else anonymous.
    pub fn resolve(explicit: &ConfigMap, properties: &ConfigMap) -> Self {
        Self::from_map(explicit)
            .or_else(|| Self::from_map(properties))
            .unwrap_or_else(Self::anonymous)
    }

    /// A source qualifies only when both option names are present.
    fn from_map(map: &ConfigMap) -> Option<Self> {
        match (map.get(ACCESS_KEY_OPT), map.get(SECRET_KEY_OPT)) {
            (Some(access), Some(secret)) => Some(Self::new(access, secret)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_explicit_wins() {
        let explicit = map(&[(ACCESS_KEY_OPT, "a1"), (SECRET_KEY_OPT, "s1")]);
        let properties = map(&[(ACCESS_KEY_OPT, "a2"), (SECRET_KEY_OPT, "s2")]);

        let creds = Credentials::resolve(&explicit, &properties);
        assert_eq!(creds.access_key(), Some("a1"));
        assert_eq!(creds.secret_key(), Some("s1"));
    }

    #[test]
    fn test_properties_fallback() {
        let properties = map(&[(ACCESS_KEY_OPT, "a2"), (SECRET_KEY_OPT, "s2")]);

        let creds = Credentials::resolve(&ConfigMap::new(), &properties);
        assert_eq!(creds.access_key(), Some("a2"));
        assert!(!creds.is_anonymous());
    }

    #[test]
    fn test_partial_source_falls_through() {
        // access key without secret: the explicit source does not qualify
        let explicit = map(&[(ACCESS_KEY_OPT, "a1")]);
        let properties = map(&[(ACCESS_KEY_OPT, "a2"), (SECRET_KEY_OPT, "s2")]);

        let creds = Credentials::resolve(&explicit, &properties);
        assert_eq!(creds.access_key(), Some("a2"));

        let partial_props = map(&[(SECRET_KEY_OPT, "s2")]);
        let creds = Credentials::resolve(&explicit, &partial_props);
        assert!(creds.is_anonymous());
    }

    #[test]
    fn test_anonymous_is_not_an_error() {
        let creds = Credentials::resolve(&ConfigMap::new(), &ConfigMap::new());
        assert!(creds.is_anonymous());
        assert_eq!(creds.access_key(), None);
        assert_eq!(creds.secret_key(), None);
    }
}
