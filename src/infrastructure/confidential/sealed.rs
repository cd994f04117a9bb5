// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::confidential::ConfidentialOps;
use crate::domain::types::CtHandle;
use alloy::primitives::Address;

/// A freshly produced ciphertext together with the ACL policy that must
/// travel with it.
///
/// Engine code never issues bare grants for values it produces; it builds
/// a `Sealed`, accumulates the principals the value is disclosed to, and
/// commits once. The policy is thereby an explicit part of the value
/// rather than a trail of imperative side effects.
#[must_use = "a Sealed ciphertext does nothing until committed"]
pub struct Sealed {
    handle: CtHandle,
    grants: Vec<Address>,
}

impl Sealed {
    pub fn new(handle: CtHandle) -> Self {
        Self {
            handle,
            grants: Vec::new(),
        }
    }

    /// Disclose the value to one more principal (owner, compliance
    /// reporter). Duplicates are harmless; grants are idempotent.
    pub fn also_for(mut self, principal: Address) -> Self {
        self.grants.push(principal);
        self
    }

    pub fn also_for_opt(self, principal: Option<Address>) -> Self {
        match principal {
            Some(p) => self.also_for(p),
            None => self,
        }
    }

    /// Apply the policy: engine compute rights plus every accumulated
    /// principal grant. Returns the now-sealed handle for storage.
    pub fn commit(self, ops: &dyn ConfidentialOps) -> CtHandle {
        ops.grant_self(self.handle);
        for principal in &self.grants {
            ops.grant(self.handle, *principal);
        }
        self.handle
    }
}
