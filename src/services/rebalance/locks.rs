// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::error::EngineError;
use crate::domain::types::StrategyId;
use alloy::primitives::Address;
use dashmap::DashSet;

/// Per-strategy execution locks: at most one in-flight hook or explicit
/// execution per strategy. The guard releases on drop, so every exit path
/// (including early returns) unlocks.
pub(crate) struct ExecutionLocks {
    in_flight: DashSet<StrategyId>,
}

impl ExecutionLocks {
    pub(crate) fn new() -> Self {
        Self {
            in_flight: DashSet::new(),
        }
    }

    pub(crate) fn acquire(&self, id: StrategyId) -> Result<ExecutionGuard<'_>, EngineError> {
        if !self.in_flight.insert(id) {
            return Err(EngineError::ExecutionInProgress(id));
        }
        Ok(ExecutionGuard { locks: self, id })
    }
}

pub(crate) struct ExecutionGuard<'a> {
    locks: &'a ExecutionLocks,
    id: StrategyId,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.locks.in_flight.remove(&self.id);
    }
}

impl RebalanceEngine {
    /// Same-block execution rule plus inter-execution cooldown, both keyed
    /// by the calling principal. An explicit execution must be the
    /// caller's first (recorded block 0) or land in the same block as its
    /// previous one, and the cooldown window must have passed.
    pub(crate) fn check_caller_discipline(
        &self,
        caller: Address,
        now: u64,
    ) -> Result<(), EngineError> {
        let last = self
            .caller_execution_blocks
            .get(&caller)
            .map(|b| *b)
            .unwrap_or(0);
        if last != 0 && last != now {
            return Err(EngineError::MevProtectionViolation(caller));
        }
        if now <= last.saturating_add(self.cooldown_blocks) {
            return Err(EngineError::CooldownNotMet(caller));
        }
        Ok(())
    }

    pub(crate) fn note_caller_execution(&self, caller: Address, block: u64) {
        self.caller_execution_blocks.insert(caller, block);
    }
}
