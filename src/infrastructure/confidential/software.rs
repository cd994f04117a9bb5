// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::confidential::ConfidentialOps;
use crate::domain::types::CtHandle;
use alloy::primitives::{Address, B256, U256};
use dashmap::{DashMap, DashSet};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process simulation backend for the encrypted-arithmetic service.
///
/// Plaintexts live in a side-store keyed by handle and are reachable only
/// through `reveal`, which enforces the per-handle ACL the engine attaches
/// via grants. Arithmetic saturates; booleans are encoded as 0/1 and
/// `select` masks between branches, matching the branch-free circuits a
/// real coprocessor evaluates.
pub struct SoftwareCoprocessor {
    next_handle: AtomicU64,
    values: DashMap<CtHandle, i128>,
    acl: DashMap<CtHandle, HashSet<Address>>,
    engine_access: DashSet<CtHandle>,
}

impl SoftwareCoprocessor {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            values: DashMap::new(),
            acl: DashMap::new(),
            engine_access: DashSet::new(),
        }
    }

    fn mint(&self, value: i128) -> CtHandle {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let handle = CtHandle(B256::from(U256::from(id)));
        self.values.insert(handle, value);
        handle
    }

    fn value_of(&self, handle: CtHandle) -> i128 {
        match self.values.get(&handle) {
            Some(v) => *v,
            None => {
                tracing::warn!(target: "coprocessor", %handle, "Unknown handle treated as zero");
                0
            }
        }
    }

    /// Client-side encryption boundary: principals encrypt their own
    /// inputs (targets, thresholds, positions) before handing them to the
    /// engine, retaining decryption rights over what they submitted.
    pub fn encrypt_input(&self, value: i128, principal: Address) -> CtHandle {
        let handle = self.mint(value);
        self.acl.entry(handle).or_default().insert(principal);
        handle
    }

    /// Out-of-band decryption request. `None` unless `principal` holds a
    /// grant for `handle`.
    pub fn reveal(&self, handle: CtHandle, principal: Address) -> Option<i128> {
        let allowed = self
            .acl
            .get(&handle)
            .map(|set| set.contains(&principal))
            .unwrap_or(false);
        if !allowed {
            return None;
        }
        self.values.get(&handle).map(|v| *v)
    }

    /// Whether the engine holds compute rights over `handle`.
    pub fn engine_can_compute(&self, handle: CtHandle) -> bool {
        self.engine_access.contains(&handle)
    }
}

impl Default for SoftwareCoprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidentialOps for SoftwareCoprocessor {
    fn encrypt_const(&self, value: i128) -> CtHandle {
        self.mint(value)
    }

    fn add(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint(self.value_of(a).saturating_add(self.value_of(b)))
    }

    fn sub(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint(self.value_of(a).saturating_sub(self.value_of(b)))
    }

    fn mul(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint(self.value_of(a).saturating_mul(self.value_of(b)))
    }

    fn div(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        let divisor = self.value_of(b);
        let out = if divisor == 0 {
            0
        } else {
            self.value_of(a) / divisor
        };
        self.mint(out)
    }

    fn gt(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint((self.value_of(a) > self.value_of(b)) as i128)
    }

    fn lt(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint((self.value_of(a) < self.value_of(b)) as i128)
    }

    fn ne(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint((self.value_of(a) != self.value_of(b)) as i128)
    }

    fn and(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint((self.value_of(a) != 0 && self.value_of(b) != 0) as i128)
    }

    fn or(&self, a: CtHandle, b: CtHandle) -> CtHandle {
        self.mint((self.value_of(a) != 0 || self.value_of(b) != 0) as i128)
    }

    fn select(&self, cond: CtHandle, then_value: CtHandle, else_value: CtHandle) -> CtHandle {
        let out = if self.value_of(cond) != 0 {
            self.value_of(then_value)
        } else {
            self.value_of(else_value)
        };
        self.mint(out)
    }

    fn grant(&self, handle: CtHandle, principal: Address) {
        self.acl.entry(handle).or_default().insert(principal);
    }

    fn grant_self(&self, handle: CtHandle) {
        self.engine_access.insert(handle);
    }
}
