// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::domain::types::StrategyId;
use alloy::primitives::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed for field {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Strategy {0} already exists")]
    StrategyAlreadyExists(StrategyId),

    #[error("Strategy {0} not found")]
    StrategyNotFound(StrategyId),

    #[error("Caller {caller} is not the owner of strategy {strategy}")]
    NotOwner {
        strategy: StrategyId,
        caller: Address,
    },

    #[error("Caller {0} is not an authorized executor")]
    NotAuthorizedExecutor(Address),

    #[error("Caller {0} is not the governance principal")]
    NotGovernance(Address),

    #[error("Voter {voter} already voted on strategy {strategy}")]
    AlreadyVoted {
        strategy: StrategyId,
        voter: Address,
    },

    #[error("Strategy {0} is not ready for execution")]
    NotReadyForExecution(StrategyId),

    #[error("Cooldown not met for caller {0}")]
    CooldownNotMet(Address),

    #[error("Same-block execution rule violated for caller {0}")]
    MevProtectionViolation(Address),

    #[error("Execution already in progress for strategy {0}")]
    ExecutionInProgress(StrategyId),

    #[error("Caller {caller} is not authorized to report on strategy {strategy}")]
    Unauthorized {
        strategy: StrategyId,
        caller: Address,
    },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
