//! Single-writer admin gate.

use crate::errors::*;
use crate::types::Identity;
use serde::{Deserialize, Serialize};

/// Holds the one identity allowed to mutate the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessController {
    admin: Identity,
}

impl AccessController {
    /// Create a controller owned by `admin`, which must be non-zero.
    pub fn new(admin: Identity) -> Result<Self> {
        if admin.is_zero() {
            return Err(RegistryError::InvalidAdmin);
        }
        Ok(Self { admin })
    }

    /// Current admin identity
    pub fn admin(&self) -> Identity {
        self.admin
    }

    /// Fail with `Unauthorized` unless `caller` is the current admin.
    pub fn require_admin(&self, caller: &Identity) -> Result<()> {
        if *caller != self.admin {
            return Err(RegistryError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Hand authority to `new_admin`, returning the previous admin.
    pub fn transfer(&mut self, caller: &Identity, new_admin: Identity) -> Result<Identity> {
        self.require_admin(caller)?;
        if new_admin.is_zero() {
            return Err(RegistryError::InvalidAdmin);
        }
        Ok(std::mem::replace(&mut self.admin, new_admin))
    }
}
