//! Acting identity attached to every mutating operation
//!
//! Authentication lives outside this crate; the caller hands in an
//! already-verified identity and the services treat it as an opaque string.

use serde::{Deserialize, Serialize};

/// Who performed an operation, for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub performed_by: String,
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(performed_by: impl Into<String>) -> Self {
        Self {
            performed_by: performed_by.into(),
            ip_address: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Identity used when the caller supplies none.
    pub fn system() -> Self {
        Self::new("System")
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}
