// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::common::clock::BlockClock;
use crate::confidential::{ConfidentialOps, Sealed};
use crate::core::locks::ExecutionLocks;
use crate::core::stats::EngineStats;
use crate::domain::error::EngineError;
use crate::domain::types::{
    CtHandle, ExecutionParams, StrategyId, StrategyRecord, TargetAllocation,
};
use crate::store::StrategyStore;
use alloy::primitives::Address;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::sync::atomic::Ordering;

pub struct EngineConfig {
    /// Principal allowed to create governance strategies and manage the
    /// authorized-executor registry.
    pub governance: Address,
    /// Inter-execution cooldown applied per calling principal, in blocks.
    pub cooldown_blocks: u64,
}

/// The confidential rebalancing decision engine.
///
/// Holds no chain connection and no plaintext secrets: state lives in the
/// injected store, confidential values live behind coprocessor handles,
/// and block height comes from the injected clock. Every public operation
/// checks authorization at entry and either fully commits or aborts.
pub struct RebalanceEngine {
    pub(crate) store: Arc<StrategyStore>,
    pub(crate) ops: Arc<dyn ConfidentialOps>,
    pub(crate) clock: Arc<dyn BlockClock>,
    pub(crate) locks: ExecutionLocks,
    pub(crate) stats: Arc<EngineStats>,
    pub(crate) governance: Address,
    pub(crate) cooldown_blocks: u64,
    pub(crate) executors: DashSet<Address>,
    pub(crate) caller_execution_blocks: DashMap<Address, u64>,
}

impl RebalanceEngine {
    pub fn new(
        store: Arc<StrategyStore>,
        ops: Arc<dyn ConfidentialOps>,
        clock: Arc<dyn BlockClock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            ops,
            clock,
            locks: ExecutionLocks::new(),
            stats: Arc::new(EngineStats::default()),
            governance: config.governance,
            cooldown_blocks: config.cooldown_blocks,
            executors: DashSet::new(),
            caller_execution_blocks: DashMap::new(),
        }
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        self.stats.clone()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_strategy(
        &self,
        id: StrategyId,
        rebalance_frequency: u64,
        enc_execution_window: CtHandle,
        enc_spread_blocks: CtHandle,
        enc_priority_fee: CtHandle,
        enc_max_slippage: CtHandle,
        owner: Address,
    ) -> Result<(), EngineError> {
        let params = ExecutionParams {
            execution_window: enc_execution_window,
            spread_blocks: enc_spread_blocks,
            priority_fee: enc_priority_fee,
            max_slippage: enc_max_slippage,
        };
        self.insert_strategy(id, owner, rebalance_frequency, params, false)
    }

    pub(crate) fn insert_strategy(
        &self,
        id: StrategyId,
        owner: Address,
        rebalance_frequency: u64,
        params: ExecutionParams,
        is_governance: bool,
    ) -> Result<(), EngineError> {
        if rebalance_frequency == 0 {
            return Err(EngineError::Validation {
                field: "rebalance_frequency".to_string(),
                message: "must be at least one block".to_string(),
            });
        }

        let record = StrategyRecord {
            id,
            owner,
            active: true,
            last_execution_block: 0,
            rebalance_frequency,
            execution_params: params,
            is_governance,
        };
        if !self.store.try_insert_strategy(record) {
            return Err(EngineError::StrategyAlreadyExists(id));
        }

        // The engine needs perpetual compute rights over the owner-supplied
        // parameter ciphertexts; the owner keeps decryption rights.
        for handle in [
            params.execution_window,
            params.spread_blocks,
            params.priority_fee,
            params.max_slippage,
        ] {
            Sealed::new(handle).also_for(owner).commit(self.ops.as_ref());
        }

        self.stats.strategies_created.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            target: "engine",
            strategy = %id,
            owner = %owner,
            frequency = rebalance_frequency,
            governance = is_governance,
            "Strategy created"
        );
        Ok(())
    }

    pub fn set_target_allocation(
        &self,
        id: StrategyId,
        asset: Address,
        enc_target_percentage: CtHandle,
        enc_min_threshold: CtHandle,
        enc_max_threshold: CtHandle,
        caller: Address,
    ) -> Result<(), EngineError> {
        let strategy = self.require_owner(id, caller)?;

        for handle in [enc_target_percentage, enc_min_threshold, enc_max_threshold] {
            Sealed::new(handle)
                .also_for(strategy.owner)
                .commit(self.ops.as_ref());
        }
        self.store.upsert_allocation(
            id,
            TargetAllocation {
                asset,
                target_percentage: enc_target_percentage,
                min_threshold: enc_min_threshold,
                max_threshold: enc_max_threshold,
                active: true,
            },
        );
        tracing::debug!(target: "engine", strategy = %id, asset = %asset, "Target allocation set");
        Ok(())
    }

    pub fn set_encrypted_position(
        &self,
        id: StrategyId,
        asset: Address,
        enc_position: CtHandle,
        caller: Address,
    ) -> Result<(), EngineError> {
        let strategy = self.require_owner(id, caller)?;
        let sealed = self.seal_for_strategy(enc_position, &strategy);
        self.store.set_position(id, asset, sealed);
        tracing::debug!(target: "engine", strategy = %id, asset = %asset, "Position set");
        Ok(())
    }

    /// Owner-triggered recomputation of the strategy's trade deltas.
    /// Idempotent: with no intervening state change the stored deltas
    /// decrypt to the same values.
    pub fn calculate_rebalancing(&self, id: StrategyId, caller: Address) -> Result<(), EngineError> {
        self.require_owner(id, caller)?;
        self.compute_trade_deltas(id)
    }

    /// Explicit execution by an authorized executor, subject to the
    /// per-strategy lock, the same-block rule, the cooldown, and the
    /// plaintext readiness window.
    pub fn execute_rebalancing(&self, id: StrategyId, caller: Address) -> Result<(), EngineError> {
        if !self.is_authorized_executor(caller) {
            return Err(EngineError::NotAuthorizedExecutor(caller));
        }
        let _guard = self.locks.acquire(id)?;
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;

        let now = self.clock.current_block();
        self.check_caller_discipline(caller, now)?;
        if !self.ready_at(&strategy, now) {
            return Err(EngineError::NotReadyForExecution(id));
        }

        self.compute_trade_deltas(id)?;
        self.store.mark_executed(id, now);
        self.note_caller_execution(caller, now);
        self.stats.executions.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            target: "engine",
            strategy = %id,
            caller = %caller,
            block = now,
            "Rebalancing executed"
        );
        Ok(())
    }

    /// Deactivate or reactivate a strategy. Strategies are never removed.
    pub fn set_strategy_active(
        &self,
        id: StrategyId,
        active: bool,
        caller: Address,
    ) -> Result<(), EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        if caller != strategy.owner && caller != self.governance {
            return Err(EngineError::NotOwner {
                strategy: id,
                caller,
            });
        }
        self.store.set_active(id, active);
        tracing::info!(target: "engine", strategy = %id, active, "Strategy activity changed");
        Ok(())
    }

    pub fn add_authorized_executor(
        &self,
        principal: Address,
        caller: Address,
    ) -> Result<(), EngineError> {
        if caller != self.governance {
            return Err(EngineError::NotGovernance(caller));
        }
        self.executors.insert(principal);
        Ok(())
    }

    pub fn remove_authorized_executor(
        &self,
        principal: Address,
        caller: Address,
    ) -> Result<(), EngineError> {
        if caller != self.governance {
            return Err(EngineError::NotGovernance(caller));
        }
        self.executors.remove(&principal);
        Ok(())
    }

    pub fn is_authorized_executor(&self, principal: Address) -> bool {
        principal == self.governance || self.executors.contains(&principal)
    }

    pub fn get_strategy(&self, id: StrategyId) -> Option<StrategyRecord> {
        self.store.strategy(id)
    }

    pub fn get_target_allocations(&self, id: StrategyId) -> Vec<TargetAllocation> {
        self.store.allocations(id)
    }

    pub fn get_encrypted_position(&self, id: StrategyId, asset: Address) -> Option<CtHandle> {
        self.store.position(id, asset)
    }

    pub fn get_trade_delta(&self, id: StrategyId, asset: Address) -> Option<CtHandle> {
        self.store.trade_delta(id, asset)
    }

    pub(crate) fn require_owner(
        &self,
        id: StrategyId,
        caller: Address,
    ) -> Result<StrategyRecord, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        if strategy.owner != caller {
            return Err(EngineError::NotOwner {
                strategy: id,
                caller,
            });
        }
        Ok(strategy)
    }

    /// Standard disclosure policy for values the engine produces on behalf
    /// of a strategy: engine compute rights, owner decryption rights, and
    /// reporter decryption rights once compliance reporting is enabled.
    pub(crate) fn seal_for_strategy(
        &self,
        handle: CtHandle,
        strategy: &StrategyRecord,
    ) -> CtHandle {
        Sealed::new(handle)
            .also_for(strategy.owner)
            .also_for_opt(self.store.compliance_reporter(strategy.id))
            .commit(self.ops.as_ref())
    }
}
