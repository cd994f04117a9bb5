// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use alloy::primitives::{Address, B256};
use serde::Serialize;

/// Unique identifier of a rebalancing strategy.
pub type StrategyId = B256;

/// Identifier of an external pool a strategy can enroll against.
pub type PoolId = B256;

/// Opaque reference to an encrypted value held by the coprocessor.
///
/// The engine computes over handles exclusively; plaintext never crosses
/// this boundary. Handles are only meaningful to the coprocessor that
/// issued them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct CtHandle(pub B256);

impl std::fmt::Display for CtHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encrypted execution parameters attached to every strategy.
#[derive(Copy, Clone, Debug)]
pub struct ExecutionParams {
    pub execution_window: CtHandle,
    pub spread_blocks: CtHandle,
    pub priority_fee: CtHandle,
    pub max_slippage: CtHandle,
}

/// Plaintext strategy metadata plus its encrypted execution parameters.
///
/// Strategies are created active and may be deactivated, never removed.
#[derive(Clone, Debug)]
pub struct StrategyRecord {
    pub id: StrategyId,
    pub owner: Address,
    pub active: bool,
    pub last_execution_block: u64,
    pub rebalance_frequency: u64,
    pub execution_params: ExecutionParams,
    pub is_governance: bool,
}

/// One target-allocation entry; at most one per (strategy, asset).
#[derive(Clone, Debug)]
pub struct TargetAllocation {
    pub asset: Address,
    /// Encrypted target percentage in basis points (0..=10_000).
    pub target_percentage: CtHandle,
    /// Encrypted lower deviation bound; deviations at or below it do not
    /// trigger rebalancing.
    pub min_threshold: CtHandle,
    /// Encrypted upper deviation bound; deviations at or above it are
    /// treated as outliers and do not trigger either.
    pub max_threshold: CtHandle,
    pub active: bool,
}

/// Voting state of a governance strategy. Execution is one-shot: once
/// `executed` flips, further votes are counted but never trigger again.
#[derive(Clone, Debug, Default)]
pub struct GovernanceState {
    pub votes: u32,
    pub voters: Vec<Address>,
    pub executed: bool,
}

impl GovernanceState {
    pub fn has_voted(&self, voter: Address) -> bool {
        self.voters.contains(&voter)
    }
}
