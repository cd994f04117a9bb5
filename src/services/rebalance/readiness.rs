// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::constants::{
    SPREAD_WINDOW_DIVISOR, STALE_WINDOW_MULTIPLIER, TIMING_JITTER_SPAN_BLOCKS,
};
use crate::domain::error::EngineError;
use crate::domain::types::{CtHandle, PoolId, StrategyId, StrategyRecord};
use alloy::primitives::keccak256;

/// Deterministic per-block jitter derived from the block number. Keeps the
/// precise execution instant unpredictable to outside observers while the
/// coarse eligibility window stays plaintext.
fn block_jitter(block: u64) -> i128 {
    let digest = keccak256(block.to_be_bytes());
    (u64::from(digest[31]) % TIMING_JITTER_SPAN_BLOCKS) as i128
}

impl RebalanceEngine {
    pub(crate) fn ready_at(&self, strategy: &StrategyRecord, now: u64) -> bool {
        let elapsed = now.saturating_sub(strategy.last_execution_block);
        elapsed >= strategy.rebalance_frequency
            && elapsed <= STALE_WINDOW_MULTIPLIER.saturating_mul(strategy.rebalance_frequency)
    }

    pub(crate) fn spread_at(&self, strategy: &StrategyRecord, now: u64) -> bool {
        let elapsed = now.saturating_sub(strategy.last_execution_block);
        elapsed < strategy.rebalance_frequency / SPREAD_WINDOW_DIVISOR
    }

    /// Plaintext readiness heuristic: at least one full frequency interval
    /// elapsed, and not past the stale window.
    pub fn is_execution_ready(&self, id: StrategyId) -> Result<bool, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        Ok(self.ready_at(&strategy, self.clock.current_block()))
    }

    /// Whether execution should still be treated as partial: the strategy
    /// is inside the spread window at the start of its cycle.
    pub fn should_spread_execution(&self, id: StrategyId) -> Result<bool, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        Ok(self.spread_at(&strategy, self.clock.current_block()))
    }

    /// Encrypted timing signal: the coarse plaintext window combined, in
    /// the encrypted domain, with the strategy's confidential execution
    /// window widened by the per-block jitter. Stored as confidential
    /// telemetry; the plaintext heuristic remains the only execution gate.
    pub fn check_encrypted_timing(&self, id: StrategyId) -> Result<CtHandle, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        let now = self.clock.current_block();
        let elapsed = now.saturating_sub(strategy.last_execution_block);

        let enc_elapsed = self.ops.encrypt_const(elapsed as i128);
        let enc_jitter = self.ops.encrypt_const(block_jitter(now));
        let adjusted_window = self
            .ops
            .add(strategy.execution_params.execution_window, enc_jitter);
        let within_window = self.ops.lt(enc_elapsed, adjusted_window);

        let enc_coarse = self
            .ops
            .encrypt_const(self.ready_at(&strategy, now) as i128);
        let signal = self.ops.and(enc_coarse, within_window);

        let sealed = self.seal_for_strategy(signal, &strategy);
        self.store.set_timing_signal(id, sealed);
        Ok(sealed)
    }

    /// Encrypted check of an observed slippage figure against the
    /// strategy's confidential maximum tolerance.
    pub fn check_slippage_protection(
        &self,
        id: StrategyId,
        observed_slippage_bps: u64,
    ) -> Result<CtHandle, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        let enc_observed = self.ops.encrypt_const(observed_slippage_bps as i128);
        let within = self
            .ops
            .lt(enc_observed, strategy.execution_params.max_slippage);
        Ok(self.seal_for_strategy(within, &strategy))
    }

    /// Cross-pool coordination check: encrypted-false when the pool is not
    /// in the strategy's coordination set, otherwise the encrypted timing
    /// signal.
    pub fn check_cross_pool_coordination(
        &self,
        id: StrategyId,
        pool: PoolId,
    ) -> Result<CtHandle, EngineError> {
        if !self.store.is_pool_enrolled(id, pool) {
            let strategy = self
                .store
                .strategy(id)
                .ok_or(EngineError::StrategyNotFound(id))?;
            let enc_false = self.ops.encrypt_const(0);
            return Ok(self.seal_for_strategy(enc_false, &strategy));
        }
        self.check_encrypted_timing(id)
    }

    pub fn get_timing_signal(&self, id: StrategyId) -> Option<CtHandle> {
        self.store.timing_signal(id)
    }
}
