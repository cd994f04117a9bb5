// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::core::engine::RebalanceEngine;
use crate::domain::constants::GOVERNANCE_VOTE_THRESHOLD;
use crate::domain::error::EngineError;
use crate::domain::types::{CtHandle, ExecutionParams, GovernanceState, StrategyId};
use alloy::primitives::Address;
use std::sync::atomic::Ordering;

enum VoteOutcome {
    AlreadyVoted,
    Counted,
    ThresholdReached,
}

impl RebalanceEngine {
    /// Create a strategy owned by the governance principal. Only the
    /// governance principal may call this; voting state is initialized
    /// alongside.
    #[allow(clippy::too_many_arguments)]
    pub fn create_governance_strategy(
        &self,
        id: StrategyId,
        rebalance_frequency: u64,
        enc_execution_window: CtHandle,
        enc_spread_blocks: CtHandle,
        enc_priority_fee: CtHandle,
        enc_max_slippage: CtHandle,
        caller: Address,
    ) -> Result<(), EngineError> {
        if caller != self.governance {
            return Err(EngineError::NotGovernance(caller));
        }
        let params = ExecutionParams {
            execution_window: enc_execution_window,
            spread_blocks: enc_spread_blocks,
            priority_fee: enc_priority_fee,
            max_slippage: enc_max_slippage,
        };
        self.insert_strategy(id, self.governance, rebalance_frequency, params, true)?;
        self.store.init_governance(id);
        Ok(())
    }

    /// Cast one affirmative vote. Voters are authorized executors or the
    /// governance principal, one vote each. Reaching the threshold
    /// auto-executes the strategy exactly once.
    pub fn vote_on_strategy(&self, id: StrategyId, voter: Address) -> Result<(), EngineError> {
        if !self.is_authorized_executor(voter) {
            return Err(EngineError::NotAuthorizedExecutor(voter));
        }
        let strategy = self
            .store
            .strategy(id)
            .ok_or(EngineError::StrategyNotFound(id))?;
        if !strategy.is_governance {
            return Err(EngineError::Validation {
                field: "strategy".to_string(),
                message: "not a governance strategy".to_string(),
            });
        }

        let outcome = self
            .store
            .with_governance_mut(id, |state| record_vote(state, voter))
            .ok_or(EngineError::StrategyNotFound(id))?;

        match outcome {
            VoteOutcome::AlreadyVoted => Err(EngineError::AlreadyVoted {
                strategy: id,
                voter,
            }),
            VoteOutcome::Counted => {
                self.stats.votes_cast.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            VoteOutcome::ThresholdReached => {
                self.stats.votes_cast.fetch_add(1, Ordering::Relaxed);
                let now = self.clock.current_block();
                self.compute_trade_deltas(id)?;
                self.store.mark_executed(id, now);
                self.stats.executions.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    target: "engine",
                    strategy = %id,
                    votes = GOVERNANCE_VOTE_THRESHOLD,
                    block = now,
                    "Governance threshold reached, strategy executed"
                );
                Ok(())
            }
        }
    }

    pub fn governance_status(&self, id: StrategyId) -> Option<GovernanceState> {
        self.store.governance_state(id)
    }
}

fn record_vote(state: &mut GovernanceState, voter: Address) -> VoteOutcome {
    if state.has_voted(voter) {
        return VoteOutcome::AlreadyVoted;
    }
    state.voters.push(voter);
    state.votes += 1;
    if !state.executed && state.votes >= GOVERNANCE_VOTE_THRESHOLD {
        state.executed = true;
        return VoteOutcome::ThresholdReached;
    }
    VoteOutcome::Counted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::*;

    fn create_governance(rig: &TestRig, id: StrategyId) {
        let window = rig.ops.encrypt_input(64, governance());
        let spread = rig.ops.encrypt_input(4, governance());
        let priority = rig.ops.encrypt_input(2, governance());
        let slippage = rig.ops.encrypt_input(50, governance());
        rig.engine
            .create_governance_strategy(id, 10, window, spread, priority, slippage, governance())
            .expect("create governance strategy");
    }

    fn voters(rig: &TestRig, count: u8) -> Vec<Address> {
        (0..count)
            .map(|n| {
                let voter = Address::from([0xB0 + n; 20]);
                rig.engine
                    .add_authorized_executor(voter, governance())
                    .expect("register voter");
                voter
            })
            .collect()
    }

    #[test]
    fn only_governance_creates_governance_strategies() {
        let rig = rig();
        let window = rig.ops.encrypt_input(64, owner());
        let spread = rig.ops.encrypt_input(4, owner());
        let priority = rig.ops.encrypt_input(2, owner());
        let slippage = rig.ops.encrypt_input(50, owner());
        assert!(matches!(
            rig.engine.create_governance_strategy(
                strategy_id(1),
                10,
                window,
                spread,
                priority,
                slippage,
                owner()
            ),
            Err(EngineError::NotGovernance(_))
        ));
    }

    #[test]
    fn threshold_auto_executes_once() {
        let rig = rig();
        let id = strategy_id(1);
        create_governance(&rig, id);
        let voters = voters(&rig, 4);
        rig.clock.set(20);

        rig.engine.vote_on_strategy(id, voters[0]).expect("vote 1");
        rig.engine.vote_on_strategy(id, voters[1]).expect("vote 2");
        assert_eq!(
            rig.engine
                .get_strategy(id)
                .expect("strategy")
                .last_execution_block,
            0
        );

        rig.engine.vote_on_strategy(id, voters[2]).expect("vote 3");
        let record = rig.engine.get_strategy(id).expect("strategy");
        assert_eq!(record.last_execution_block, 20);
        let status = rig.engine.governance_status(id).expect("status");
        assert!(status.executed);
        assert_eq!(status.votes, 3);

        // A further vote is counted but never re-triggers execution.
        rig.clock.set(25);
        rig.engine.vote_on_strategy(id, voters[3]).expect("vote 4");
        let record = rig.engine.get_strategy(id).expect("strategy");
        assert_eq!(record.last_execution_block, 20);
    }

    #[test]
    fn double_votes_are_rejected() {
        let rig = rig();
        let id = strategy_id(1);
        create_governance(&rig, id);
        let voters = voters(&rig, 1);

        rig.engine.vote_on_strategy(id, voters[0]).expect("vote");
        assert!(matches!(
            rig.engine.vote_on_strategy(id, voters[0]),
            Err(EngineError::AlreadyVoted { .. })
        ));
    }

    #[test]
    fn unauthorized_voters_are_rejected() {
        let rig = rig();
        let id = strategy_id(1);
        create_governance(&rig, id);
        let stranger = Address::from([0x77; 20]);

        assert!(matches!(
            rig.engine.vote_on_strategy(id, stranger),
            Err(EngineError::NotAuthorizedExecutor(_))
        ));
    }

    #[test]
    fn votes_on_non_governance_strategies_are_rejected() {
        let rig = rig();
        let id = strategy_id(1);
        create_strategy(&rig, id, 10);

        assert!(matches!(
            rig.engine.vote_on_strategy(id, executor()),
            Err(EngineError::Validation { .. })
        ));
    }
}
