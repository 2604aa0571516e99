//! The two independent consumers of an index cache

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a mapping an index is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Query,
    Target,
}

impl Role {
    /// The sibling role whose generation is consulted for reuse
    pub fn opposite(self) -> Self {
        match self {
            Self::Query => Self::Target,
            Self::Target => Self::Query,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Target => write!(f, "target"),
        }
    }
}
