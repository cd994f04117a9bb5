// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::error::EngineError;
use crate::domain::types::{PoolId, StrategyId};
use alloy::primitives::Address;
use std::sync::atomic::Ordering;

impl RebalanceEngine {
    /// Reverse-index lookup with duplicate suppression; the index may hold
    /// a strategy several times after re-registration.
    fn enrolled_strategies(&self, pool: PoolId) -> Vec<StrategyId> {
        let mut out: Vec<StrategyId> = Vec::new();
        for id in self.store.strategies_for_pool(pool) {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// Pre-settlement hook from the swap pipeline.
    ///
    /// For every active strategy enrolled against `pool`: a ready strategy
    /// starts an execution cycle (trade deltas recomputed, execution block
    /// stamped); a strategy still inside its spread window runs one more
    /// partial delta round without re-stamping. Each strategy is processed
    /// under its execution lock, so a recursive invocation from within the
    /// same top-level call aborts.
    pub fn on_pre_swap(
        &self,
        pool: PoolId,
        asset0: Address,
        asset1: Address,
    ) -> Result<(), EngineError> {
        let now = self.clock.current_block();
        for id in self.enrolled_strategies(pool) {
            let _guard = self.locks.acquire(id)?;
            let Some(strategy) = self.store.strategy(id) else {
                continue;
            };
            if !strategy.active {
                self.stats.hook_skips.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if self.ready_at(&strategy, now) {
                self.compute_trade_deltas(id)?;
                self.store.mark_executed(id, now);
                tracing::debug!(
                    target: "engine",
                    strategy = %id,
                    pool = %pool,
                    asset0 = %asset0,
                    asset1 = %asset1,
                    block = now,
                    "Pre-swap execution cycle started"
                );
            } else if strategy.last_execution_block > 0 && self.spread_at(&strategy, now) {
                // Partial round: spread the cycle over several blocks.
                self.compute_trade_deltas(id)?;
            } else {
                self.stats.hook_skips.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.stats.pre_swap_events.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Post-settlement hook from the swap pipeline.
    ///
    /// Applies the realized signed deltas to each enrolled strategy's
    /// encrypted positions for the two swapped assets, recomputes trade
    /// deltas, and forwards the realized-amount ciphertexts to the
    /// compliance reporter when reporting is enabled.
    pub fn on_post_swap(
        &self,
        pool: PoolId,
        asset0: Address,
        asset1: Address,
        realized_delta0: i128,
        realized_delta1: i128,
    ) -> Result<(), EngineError> {
        for id in self.enrolled_strategies(pool) {
            let _guard = self.locks.acquire(id)?;
            let Some(strategy) = self.store.strategy(id) else {
                continue;
            };
            if !strategy.active {
                self.stats.hook_skips.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            for (swapped_asset, realized) in
                [(asset0, realized_delta0), (asset1, realized_delta1)]
            {
                let enc_realized = self.ops.encrypt_const(realized);
                self.ops.grant_self(enc_realized);

                let current = self.position_or_zero(id, swapped_asset);
                let updated = self.ops.add(current, enc_realized);
                let sealed = self.seal_for_strategy(updated, &strategy);
                self.store.set_position(id, swapped_asset, sealed);

                if let Some(reporter) = self.store.compliance_reporter(id) {
                    self.ops.grant(enc_realized, reporter);
                }
            }

            self.compute_trade_deltas(id)?;
            tracing::debug!(
                target: "engine",
                strategy = %id,
                pool = %pool,
                "Post-swap positions updated"
            );
        }
        self.stats.post_swap_events.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
