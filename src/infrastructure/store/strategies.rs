// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::domain::types::{
    CtHandle, GovernanceState, PoolId, StrategyId, StrategyRecord, TargetAllocation,
};
use alloy::primitives::Address;
use dashmap::DashMap;

/// The confidential state store: every per-strategy map the engine reads
/// and writes. Reads never fail — absence comes back as `None` or an
/// empty collection and the engine substitutes the zero-equivalent.
///
/// All writes funnel through the engine, which performs the owner and
/// executor checks before touching the store.
pub struct StrategyStore {
    strategies: DashMap<StrategyId, StrategyRecord>,
    allocations: DashMap<StrategyId, Vec<TargetAllocation>>,
    positions: DashMap<(StrategyId, Address), CtHandle>,
    trade_deltas: DashMap<(StrategyId, Address), CtHandle>,
    timing_signals: DashMap<StrategyId, CtHandle>,
    coordination: DashMap<StrategyId, Vec<PoolId>>,
    pool_index: DashMap<PoolId, Vec<StrategyId>>,
    compliance_reporters: DashMap<StrategyId, Address>,
    governance: DashMap<StrategyId, GovernanceState>,
}

impl StrategyStore {
    pub fn new() -> Self {
        Self {
            strategies: DashMap::new(),
            allocations: DashMap::new(),
            positions: DashMap::new(),
            trade_deltas: DashMap::new(),
            timing_signals: DashMap::new(),
            coordination: DashMap::new(),
            pool_index: DashMap::new(),
            compliance_reporters: DashMap::new(),
            governance: DashMap::new(),
        }
    }

    /// Insert a new strategy record. Returns `false` without touching the
    /// store when the id is already taken.
    pub fn try_insert_strategy(&self, record: StrategyRecord) -> bool {
        match self.strategies.entry(record.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn strategy(&self, id: StrategyId) -> Option<StrategyRecord> {
        self.strategies.get(&id).map(|r| r.clone())
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    pub fn mark_executed(&self, id: StrategyId, block: u64) {
        if let Some(mut record) = self.strategies.get_mut(&id) {
            record.last_execution_block = block;
        }
    }

    pub fn set_active(&self, id: StrategyId, active: bool) {
        if let Some(mut record) = self.strategies.get_mut(&id) {
            record.active = active;
        }
    }

    /// Upsert the allocation entry for `(id, allocation.asset)`; at most
    /// one entry per asset survives any call sequence.
    pub fn upsert_allocation(&self, id: StrategyId, allocation: TargetAllocation) {
        let mut entries = self.allocations.entry(id).or_default();
        match entries.iter_mut().find(|a| a.asset == allocation.asset) {
            Some(existing) => *existing = allocation,
            None => entries.push(allocation),
        }
    }

    pub fn allocations(&self, id: StrategyId) -> Vec<TargetAllocation> {
        self.allocations
            .get(&id)
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn set_position(&self, id: StrategyId, asset: Address, handle: CtHandle) {
        self.positions.insert((id, asset), handle);
    }

    pub fn position(&self, id: StrategyId, asset: Address) -> Option<CtHandle> {
        self.positions.get(&(id, asset)).map(|h| *h)
    }

    pub fn set_trade_delta(&self, id: StrategyId, asset: Address, handle: CtHandle) {
        self.trade_deltas.insert((id, asset), handle);
    }

    pub fn trade_delta(&self, id: StrategyId, asset: Address) -> Option<CtHandle> {
        self.trade_deltas.get(&(id, asset)).map(|h| *h)
    }

    pub fn set_timing_signal(&self, id: StrategyId, handle: CtHandle) {
        self.timing_signals.insert(id, handle);
    }

    pub fn timing_signal(&self, id: StrategyId) -> Option<CtHandle> {
        self.timing_signals.get(&id).map(|h| *h)
    }

    /// Replace the strategy's coordination set and append it to each
    /// pool's reverse index. Re-registration may leave duplicates in the
    /// index; consumers iterate and membership-check rather than assume
    /// uniqueness.
    pub fn set_coordination(&self, id: StrategyId, pools: Vec<PoolId>) {
        for pool in &pools {
            self.pool_index.entry(*pool).or_default().push(id);
        }
        self.coordination.insert(id, pools);
    }

    pub fn coordination_set(&self, id: StrategyId) -> Vec<PoolId> {
        self.coordination
            .get(&id)
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn is_pool_enrolled(&self, id: StrategyId, pool: PoolId) -> bool {
        self.coordination
            .get(&id)
            .map(|pools| pools.contains(&pool))
            .unwrap_or(false)
    }

    pub fn strategies_for_pool(&self, pool: PoolId) -> Vec<StrategyId> {
        self.pool_index
            .get(&pool)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    pub fn set_compliance_reporter(&self, id: StrategyId, reporter: Address) {
        self.compliance_reporters.insert(id, reporter);
    }

    pub fn compliance_reporter(&self, id: StrategyId) -> Option<Address> {
        self.compliance_reporters.get(&id).map(|r| *r)
    }

    pub fn init_governance(&self, id: StrategyId) {
        self.governance.insert(id, GovernanceState::default());
    }

    pub fn governance_state(&self, id: StrategyId) -> Option<GovernanceState> {
        self.governance.get(&id).map(|g| g.clone())
    }

    pub fn with_governance_mut<R>(
        &self,
        id: StrategyId,
        f: impl FnOnce(&mut GovernanceState) -> R,
    ) -> Option<R> {
        self.governance.get_mut(&id).map(|mut g| f(&mut g))
    }
}

impl Default for StrategyStore {
    fn default() -> Self {
        Self::new()
    }
}
