// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

pub mod compliance;
pub mod coordination;
pub mod deltas;
pub mod engine;
pub mod governance;
pub mod hooks;
pub mod locks;
pub mod readiness;
pub mod stats;

pub use compliance::ComplianceReport;
pub use engine::{EngineConfig, RebalanceEngine};
pub use stats::EngineStats;

#[cfg(test)]
pub(crate) mod testutil {
    use super::engine::{EngineConfig, RebalanceEngine};
    use crate::common::clock::ManualClock;
    use crate::confidential::SoftwareCoprocessor;
    use crate::store::StrategyStore;
    use alloy::primitives::{Address, B256};
    use std::sync::Arc;

    pub(crate) struct TestRig {
        pub engine: RebalanceEngine,
        pub ops: Arc<SoftwareCoprocessor>,
        pub clock: Arc<ManualClock>,
        pub store: Arc<StrategyStore>,
    }

    pub(crate) fn governance() -> Address {
        Address::from([0xAA; 20])
    }

    pub(crate) fn owner() -> Address {
        Address::from([0x01; 20])
    }

    pub(crate) fn executor() -> Address {
        Address::from([0x02; 20])
    }

    pub(crate) fn strategy_id(n: u8) -> B256 {
        B256::from([n; 32])
    }

    pub(crate) fn asset(n: u8) -> Address {
        Address::from([n; 20])
    }

    pub(crate) fn rig() -> TestRig {
        rig_with_cooldown(0)
    }

    pub(crate) fn rig_with_cooldown(cooldown_blocks: u64) -> TestRig {
        let ops = Arc::new(SoftwareCoprocessor::new());
        let clock = Arc::new(ManualClock::new(1));
        let store = Arc::new(StrategyStore::new());
        let engine = RebalanceEngine::new(
            store.clone(),
            ops.clone(),
            clock.clone(),
            EngineConfig {
                governance: governance(),
                cooldown_blocks,
            },
        );
        engine
            .add_authorized_executor(executor(), governance())
            .expect("register executor");
        TestRig {
            engine,
            ops,
            clock,
            store,
        }
    }

    /// Create a plain strategy owned by `owner()` with encrypted
    /// execution params supplied through the client-side boundary.
    pub(crate) fn create_strategy(rig: &TestRig, id: B256, frequency: u64) {
        let window = rig.ops.encrypt_input(64, owner());
        let spread = rig.ops.encrypt_input(4, owner());
        let priority = rig.ops.encrypt_input(2, owner());
        let slippage = rig.ops.encrypt_input(50, owner());
        rig.engine
            .create_strategy(id, frequency, window, spread, priority, slippage, owner())
            .expect("create strategy");
    }
}
