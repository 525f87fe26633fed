//! Credential reference type.
//!
//! Login credentials themselves live with the external auth provider; the
//! identity table only stores an opaque reference to them. Provisioning
//! mints a placeholder reference that the auth provider later replaces
//! when the merchant completes signup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a provisioning-time placeholder credential.
const PLACEHOLDER_PREFIX: &str = "placeholder:";

/// Opaque reference to an externally held login credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    /// Wrap an existing credential reference issued by the auth provider.
    #[must_use]
    pub const fn new(reference: String) -> Self {
        Self(reference)
    }

    /// Mint a fresh placeholder reference for a newly provisioned identity.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether this reference is still a provisioning placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CredentialRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CredentialRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<CredentialRef> for String {
    fn from(reference: CredentialRef) -> Self {
        reference.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_flagged() {
        let cred = CredentialRef::placeholder();
        assert!(cred.is_placeholder());
    }

    #[test]
    fn test_placeholders_are_unique() {
        assert_ne!(CredentialRef::placeholder(), CredentialRef::placeholder());
    }

    #[test]
    fn test_external_reference_is_not_placeholder() {
        let cred = CredentialRef::new("auth0|64ffab".to_string());
        assert!(!cred.is_placeholder());
        assert_eq!(cred.as_str(), "auth0|64ffab");
    }
}
