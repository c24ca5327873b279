pub mod facilities;
pub mod instruments;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Facility identifiers as ONCat spells them ("SNS", "HFIR")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(String);

impl FacilityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FacilityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for FacilityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
