// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::error::EngineError;
use crate::domain::types::{PoolId, StrategyId};
use alloy::primitives::Address;

impl RebalanceEngine {
    /// Replace the strategy's coordination set and enroll it against each
    /// pool's reverse index. Owner-only. Re-registration is tolerated:
    /// the reverse index may accumulate duplicates, which every consumer
    /// handles by membership-checking instead of assuming uniqueness.
    pub fn enable_cross_pool_coordination(
        &self,
        id: StrategyId,
        pools: Vec<PoolId>,
        caller: Address,
    ) -> Result<(), EngineError> {
        self.require_owner(id, caller)?;
        let pool_count = pools.len();
        self.store.set_coordination(id, pools);
        tracing::info!(
            target: "engine",
            strategy = %id,
            pools = pool_count,
            "Cross-pool coordination enabled"
        );
        Ok(())
    }

    pub fn coordination_set(&self, id: StrategyId) -> Vec<PoolId> {
        self.store.coordination_set(id)
    }

    pub fn is_pool_enrolled(&self, id: StrategyId, pool: PoolId) -> bool {
        self.store.is_pool_enrolled(id, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::*;

    #[test]
    fn coordination_is_owner_only() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 10);
        let intruder = Address::from([0x55; 20]);

        assert!(matches!(
            rig.engine
                .enable_cross_pool_coordination(id, vec![strategy_id(0x50)], intruder),
            Err(EngineError::NotOwner { .. })
        ));
    }

    #[test]
    fn enrollment_replaces_the_set_and_feeds_the_reverse_index() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 10);
        let p1 = strategy_id(0x50);
        let p2 = strategy_id(0x51);

        rig.engine
            .enable_cross_pool_coordination(id, vec![p1], owner())
            .expect("first enrollment");
        assert!(rig.engine.is_pool_enrolled(id, p1));

        rig.engine
            .enable_cross_pool_coordination(id, vec![p2], owner())
            .expect("replacement");
        assert!(!rig.engine.is_pool_enrolled(id, p1));
        assert!(rig.engine.is_pool_enrolled(id, p2));
        assert_eq!(rig.engine.coordination_set(id), vec![p2]);
    }
}
