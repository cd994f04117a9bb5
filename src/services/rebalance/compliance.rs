// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::error::EngineError;
use crate::domain::types::{CtHandle, StrategyId};
use alloy::primitives::Address;
use serde::Serialize;
use std::sync::atomic::Ordering;

/// One confidential value referenced by a compliance report. The report
/// carries handles only; the reporter requests decryption out-of-band
/// against the grants attached here.
#[derive(Serialize, Clone, Debug)]
pub struct ReportedValue {
    pub asset: Address,
    pub handle: CtHandle,
}

#[derive(Serialize, Debug)]
pub struct ComplianceReport {
    pub strategy: StrategyId,
    pub generated_at_block: u64,
    pub positions: Vec<ReportedValue>,
    pub trade_deltas: Vec<ReportedValue>,
}

impl RebalanceEngine {
    /// Enroll a compliance reporter for the strategy. Owner-only. The
    /// reporter gains decryption rights over the strategy's existing
    /// confidential state and over everything the engine produces for it
    /// from here on.
    pub fn enable_compliance_reporting(
        &self,
        id: StrategyId,
        reporter: Address,
        caller: Address,
    ) -> Result<(), EngineError> {
        self.require_owner(id, caller)?;
        self.store.set_compliance_reporter(id, reporter);

        for allocation in self.store.allocations(id) {
            if let Some(position) = self.store.position(id, allocation.asset) {
                self.ops.grant(position, reporter);
            }
            if let Some(delta) = self.store.trade_delta(id, allocation.asset) {
                self.ops.grant(delta, reporter);
            }
        }

        tracing::info!(
            target: "engine",
            strategy = %id,
            reporter = %reporter,
            "Compliance reporting enabled"
        );
        Ok(())
    }

    /// Assemble the current confidential state for the enrolled reporter.
    /// Rejected for anyone else, including the owner.
    pub fn generate_compliance_report(
        &self,
        id: StrategyId,
        caller: Address,
    ) -> Result<ComplianceReport, EngineError> {
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        if self.store.compliance_reporter(id) != Some(caller) {
            return Err(EngineError::Unauthorized {
                strategy: id,
                caller,
            });
        }

        let mut positions = Vec::new();
        let mut trade_deltas = Vec::new();
        for allocation in self.store.allocations(id) {
            if let Some(handle) = self.store.position(id, allocation.asset) {
                self.ops.grant(handle, caller);
                positions.push(ReportedValue {
                    asset: allocation.asset,
                    handle,
                });
            }
            if let Some(handle) = self.store.trade_delta(id, allocation.asset) {
                self.ops.grant(handle, caller);
                trade_deltas.push(ReportedValue {
                    asset: allocation.asset,
                    handle,
                });
            }
        }

        self.stats.reports_generated.fetch_add(1, Ordering::Relaxed);
        tracing::info!(target: "engine", strategy = %strategy.id, reporter = %caller, "Compliance report generated");
        Ok(ComplianceReport {
            strategy: id,
            generated_at_block: self.clock.current_block(),
            positions,
            trade_deltas,
        })
    }

    pub fn compliance_reporter(&self, id: StrategyId) -> Option<Address> {
        self.store.compliance_reporter(id)
    }
}
