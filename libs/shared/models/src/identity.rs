// libs/shared/models/src/identity.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage scope derived from the signed-in employee. Unauthenticated
/// sessions share a fixed guest scope so carts never bleed between users
/// on a shared device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OwnerKey(String);

impl OwnerKey {
    pub const GUEST: &'static str = "cart:guest";

    pub fn for_employee(employee_id: Option<i64>) -> Self {
        match employee_id {
            Some(id) if id > 0 => Self(format!("cart:{}", id)),
            _ => Self(Self::GUEST.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_guest(&self) -> bool {
        self.0 == Self::GUEST
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The slice of the session the cart core needs: who is signed in and
/// how to prefill gateway identity fields. Session bootstrap itself is a
/// collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserIdentity {
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl UserIdentity {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.employee_id, Some(id) if id > 0)
    }

    pub fn owner_key(&self) -> OwnerKey {
        OwnerKey::for_employee(self.employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_is_deterministic_per_employee() {
        assert_eq!(
            OwnerKey::for_employee(Some(1023)),
            OwnerKey::for_employee(Some(1023))
        );
        assert_ne!(
            OwnerKey::for_employee(Some(1023)),
            OwnerKey::for_employee(Some(7))
        );
    }

    #[test]
    fn missing_or_invalid_employee_falls_back_to_guest() {
        assert!(OwnerKey::for_employee(None).is_guest());
        assert!(OwnerKey::for_employee(Some(0)).is_guest());
        assert!(OwnerKey::for_employee(Some(-4)).is_guest());
        assert!(!UserIdentity::guest().is_authenticated());
    }
}
