// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

pub mod strategies;

pub use strategies::StrategyStore;
