// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

/// Basis-point denominator used for target percentages (10_000 = 100%).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// A strategy becomes stale once more than this multiple of its rebalance
/// frequency has elapsed without execution.
pub const STALE_WINDOW_MULTIPLIER: u64 = 10;

/// The spread window covers the first `frequency / SPREAD_WINDOW_DIVISOR`
/// blocks of each execution cycle.
pub const SPREAD_WINDOW_DIVISOR: u64 = 5;

/// Affirmative votes required before a governance strategy auto-executes.
pub const GOVERNANCE_VOTE_THRESHOLD: u32 = 3;

/// Upper bound on the keccak-derived per-block timing jitter, in blocks.
pub const TIMING_JITTER_SPAN_BLOCKS: u64 = 32;

/// Default inter-execution cooldown applied to explicit execution callers.
pub const DEFAULT_EXECUTION_COOLDOWN_BLOCKS: u64 = 0;
