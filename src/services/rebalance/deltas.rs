// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::constants::BPS_DENOMINATOR;
use crate::domain::error::EngineError;
use crate::domain::types::{CtHandle, StrategyId};
use alloy::primitives::Address;
use std::sync::atomic::Ordering;

impl RebalanceEngine {
    /// Current encrypted position, or the zero-equivalent ciphertext when
    /// the asset was never set. Absence is not an error.
    pub(crate) fn position_or_zero(&self, id: StrategyId, asset: Address) -> CtHandle {
        match self.store.position(id, asset) {
            Some(handle) => handle,
            None => {
                let zero = self.ops.encrypt_const(0);
                self.ops.grant_self(zero);
                zero
            }
        }
    }

    /// Recompute the strategy's trade deltas, entirely over ciphertext
    /// handles.
    ///
    /// For each active allocation: the target position is the encrypted
    /// total portfolio value times the basis-point target, rescaled by the
    /// basis-point denominator; the signed deviation against the current
    /// position is compared against the allocation's min/max bounds; the
    /// delta is masked to encrypted zero through `select` unless both
    /// bounds pass. Conditions stay encrypted end-to-end — nothing here
    /// branches on a decrypted value.
    pub fn compute_trade_deltas(&self, id: StrategyId) -> Result<(), EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;

        let allocations: Vec<_> = self
            .store
            .allocations(id)
            .into_iter()
            .filter(|a| a.active)
            .collect();

        self.stats.delta_rounds.fetch_add(1, Ordering::Relaxed);
        if allocations.is_empty() {
            // Total value is defined as encrypted zero; with no entries to
            // iterate this round is a no-op.
            return Ok(());
        }

        let zero = self.ops.encrypt_const(0);
        self.ops.grant_self(zero);

        let mut total_value = zero;
        for allocation in &allocations {
            let position = self.position_or_zero(id, allocation.asset);
            total_value = self.ops.add(total_value, position);
        }
        self.ops.grant_self(total_value);

        let denominator = self.ops.encrypt_const(BPS_DENOMINATOR);
        for allocation in &allocations {
            let current = self.position_or_zero(id, allocation.asset);

            let scaled = self.ops.mul(total_value, allocation.target_percentage);
            let target = self.ops.div(scaled, denominator);

            let deviation = self.ops.sub(target, current);
            let exceeds_min = self.ops.gt(deviation, allocation.min_threshold);
            let within_max = self.ops.lt(deviation, allocation.max_threshold);
            let needs_rebalancing = self.ops.and(exceeds_min, within_max);

            let trade_delta = self.ops.sub(target, current);
            let conditional_delta = self.ops.select(needs_rebalancing, trade_delta, zero);

            let sealed = self.seal_for_strategy(conditional_delta, &strategy);
            self.store.set_trade_delta(id, allocation.asset, sealed);
        }

        tracing::debug!(
            target: "engine",
            strategy = %id,
            assets = allocations.len(),
            "Trade deltas recomputed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::*;

    /// 50% target over an implied total of 1_000_000 with the asset at
    /// 400_000: target position 500_000, delta 100_000.
    fn seed_two_asset_portfolio(rig: &TestRig, id: crate::domain::types::StrategyId) {
        create_strategy(rig, id, 1);

        let target = rig.ops.encrypt_input(5_000, owner());
        let min = rig.ops.encrypt_input(10_000, owner());
        let max = rig.ops.encrypt_input(200_000, owner());
        rig.engine
            .set_target_allocation(id, asset(3), target, min, max, owner())
            .expect("allocation for asset A");

        let target_b = rig.ops.encrypt_input(5_000, owner());
        let min_b = rig.ops.encrypt_input(10_000, owner());
        let max_b = rig.ops.encrypt_input(200_000, owner());
        rig.engine
            .set_target_allocation(id, asset(4), target_b, min_b, max_b, owner())
            .expect("allocation for asset B");

        let position_a = rig.ops.encrypt_input(400_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(3), position_a, owner())
            .expect("position A");
        let position_b = rig.ops.encrypt_input(600_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(4), position_b, owner())
            .expect("position B");
    }

    fn revealed_delta(rig: &TestRig, id: crate::domain::types::StrategyId, a: Address) -> i128 {
        let handle = rig.engine.get_trade_delta(id, a).expect("delta stored");
        rig.ops.reveal(handle, owner()).expect("owner can decrypt")
    }

    #[test]
    fn underweight_asset_yields_target_minus_current() {
        let rig = rig();
        let id = strategy_id(1);
        seed_two_asset_portfolio(&rig, id);

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        assert_eq!(revealed_delta(&rig, id, asset(3)), 100_000);
    }

    #[test]
    fn overweight_asset_never_triggers_under_signed_convention() {
        let rig = rig();
        let id = strategy_id(1);
        seed_two_asset_portfolio(&rig, id);

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        // Asset B sits at 600_000 against a 500_000 target: the deviation
        // is negative and cannot exceed the positive min bound, so the
        // delta is masked to zero.
        assert_eq!(revealed_delta(&rig, id, asset(4)), 0);
    }

    #[test]
    fn deviation_below_min_threshold_masks_to_zero() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 1);

        let target = rig.ops.encrypt_input(5_000, owner());
        let min = rig.ops.encrypt_input(150_000, owner());
        let max = rig.ops.encrypt_input(500_000, owner());
        rig.engine
            .set_target_allocation(id, asset(3), target, min, max, owner())
            .expect("allocation");
        let position = rig.ops.encrypt_input(400_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(3), position, owner())
            .expect("position");
        let other = rig.ops.encrypt_input(600_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(4), other, owner())
            .expect("position B");
        let target_b = rig.ops.encrypt_input(5_000, owner());
        let min_b = rig.ops.encrypt_input(150_000, owner());
        let max_b = rig.ops.encrypt_input(500_000, owner());
        rig.engine
            .set_target_allocation(id, asset(4), target_b, min_b, max_b, owner())
            .expect("allocation B");

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        // Deviation 100_000 does not exceed the 150_000 min bound.
        assert_eq!(revealed_delta(&rig, id, asset(3)), 0);
    }

    #[test]
    fn deviation_at_max_threshold_is_an_outlier() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 1);

        let target = rig.ops.encrypt_input(5_000, owner());
        let min = rig.ops.encrypt_input(10_000, owner());
        // Upper bound exactly at the deviation: strict comparison keeps it
        // out.
        let max = rig.ops.encrypt_input(100_000, owner());
        rig.engine
            .set_target_allocation(id, asset(3), target, min, max, owner())
            .expect("allocation");
        let position = rig.ops.encrypt_input(400_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(3), position, owner())
            .expect("position");
        let target_b = rig.ops.encrypt_input(5_000, owner());
        let min_b = rig.ops.encrypt_input(10_000, owner());
        let max_b = rig.ops.encrypt_input(100_000, owner());
        rig.engine
            .set_target_allocation(id, asset(4), target_b, min_b, max_b, owner())
            .expect("allocation B");
        let other = rig.ops.encrypt_input(600_000, owner());
        rig.engine
            .set_encrypted_position(id, asset(4), other, owner())
            .expect("position B");

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        assert_eq!(revealed_delta(&rig, id, asset(3)), 0);
    }

    #[test]
    fn calculation_is_idempotent() {
        let rig = rig();
        let id = strategy_id(1);
        seed_two_asset_portfolio(&rig, id);

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("first round");
        let first = revealed_delta(&rig, id, asset(3));

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("second round");
        let second = revealed_delta(&rig, id, asset(3));

        assert_eq!(first, 100_000);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_allocations_are_a_noop() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 1);

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("no allocations");
        assert!(rig.engine.get_trade_delta(id, asset(3)).is_none());
    }

    #[test]
    fn uninitialized_positions_are_zero_equivalent() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 1);

        let target = rig.ops.encrypt_input(5_000, owner());
        let min = rig.ops.encrypt_input(10, owner());
        let max = rig.ops.encrypt_input(1_000_000, owner());
        rig.engine
            .set_target_allocation(id, asset(3), target, min, max, owner())
            .expect("allocation");

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        // No positions at all: total value is zero, target is zero, the
        // deviation is zero and stays below the min bound.
        assert_eq!(revealed_delta(&rig, id, asset(3)), 0);
    }

    #[test]
    fn inactive_allocations_are_excluded() {
        let rig = rig();
        let id = strategy_id(1);
        seed_two_asset_portfolio(&rig, id);

        // Deactivate asset B's entry through an upsert.
        let entries = rig.engine.get_target_allocations(id);
        let b = entries.iter().find(|a| a.asset == asset(4)).expect("entry");
        rig.store.upsert_allocation(
            id,
            crate::domain::types::TargetAllocation {
                active: false,
                ..b.clone()
            },
        );

        rig.engine
            .calculate_rebalancing(id, owner())
            .expect("calculate");

        // Total now only covers asset A: target 200_000 against 400_000
        // current is a negative deviation, masked to zero.
        assert_eq!(revealed_delta(&rig, id, asset(3)), 0);
    }
}
