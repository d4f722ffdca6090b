//! Identity for mutation interfaces and their owners.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique id assigned to every mutation interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MockId(String);

impl MockId {
    /// Generate a fresh id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("mock_{}", Uuid::new_v4().simple()))
    }

    /// String form of the id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner reference carried by a mutation interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    id: MockId,
    name: Option<String>,
}

impl OwnerRef {
    /// Anonymous owner for ad hoc test data
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: MockId::generate(),
            name: None,
        }
    }

    /// Named owner (e.g. a mock account or group)
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            id: MockId::generate(),
            name: Some(name.to_string()),
        }
    }

    /// Owner id
    #[must_use]
    pub fn id(&self) -> &MockId {
        &self.id
    }

    /// Owner name, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Default for OwnerRef {
    fn default() -> Self {
        Self::anonymous()
    }
}
