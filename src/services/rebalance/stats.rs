// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-wide counters surfaced by the metrics endpoint.
#[derive(Default)]
pub struct EngineStats {
    pub strategies_created: AtomicU64,
    pub delta_rounds: AtomicU64,
    pub executions: AtomicU64,
    pub pre_swap_events: AtomicU64,
    pub post_swap_events: AtomicU64,
    pub hook_skips: AtomicU64,
    pub votes_cast: AtomicU64,
    pub reports_generated: AtomicU64,
}

pub struct StatsSnapshot {
    pub strategies_created: u64,
    pub delta_rounds: u64,
    pub executions: u64,
    pub pre_swap_events: u64,
    pub post_swap_events: u64,
    pub hook_skips: u64,
    pub votes_cast: u64,
    pub reports_generated: u64,
}

impl EngineStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            strategies_created: self.strategies_created.load(Ordering::Relaxed),
            delta_rounds: self.delta_rounds.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
            pre_swap_events: self.pre_swap_events.load(Ordering::Relaxed),
            post_swap_events: self.post_swap_events.load(Ordering::Relaxed),
            hook_skips: self.hook_skips.load(Ordering::Relaxed),
            votes_cast: self.votes_cast.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
        }
    }
}
