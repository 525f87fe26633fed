//! Login identity record.

use serde::{Deserialize, Serialize};

use pickupmart_core::{CredentialRef, Email, Role, SubjectId};

/// An authentication identity.
///
/// For merchants the id equals the merchant profile id and the store id;
/// consumer and admin identities exist on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: SubjectId,
    /// Globally unique across identities and merchant profiles.
    pub email: Email,
    pub name: String,
    pub role: Role,
    /// Opaque reference to the externally held credential. Provisioning
    /// mints a placeholder; only the auth provider replaces it.
    pub credential: CredentialRef,
}

impl Identity {
    /// A freshly provisioned merchant identity with a placeholder credential.
    #[must_use]
    pub fn provisioned_merchant(id: SubjectId, email: Email, name: String) -> Self {
        Self {
            id,
            email,
            name,
            role: Role::Merchant,
            credential: CredentialRef::placeholder(),
        }
    }
}
