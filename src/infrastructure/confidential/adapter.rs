// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Veiled Labs <dev@veiled.sh>

use crate::domain::types::CtHandle;
use alloy::primitives::Address;

/// Arithmetic, comparison, and access-control surface of the external
/// encrypted-arithmetic coprocessor.
///
/// Every operation is synchronous and infallible: the coprocessor is a
/// host collaborator that is assumed available, and there is no plaintext
/// failure mode inside confidential arithmetic. Comparison and logic ops
/// return encrypted booleans, which are only ever consumed by `select` —
/// never decrypted to branch.
///
/// Decryption is not part of this surface. Principals holding an ACL
/// grant request it out-of-band, against the coprocessor directly.
pub trait ConfidentialOps: Send + Sync {
    /// Trivial encryption of a plaintext constant produced by the engine
    /// itself (zeros, basis-point denominators, block-derived offsets).
    fn encrypt_const(&self, value: i128) -> CtHandle;

    fn add(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    fn sub(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    fn mul(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    fn div(&self, a: CtHandle, b: CtHandle) -> CtHandle;

    /// Encrypted `a > b`.
    fn gt(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    /// Encrypted `a < b`.
    fn lt(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    /// Encrypted `a != b`.
    fn ne(&self, a: CtHandle, b: CtHandle) -> CtHandle;

    fn and(&self, a: CtHandle, b: CtHandle) -> CtHandle;
    fn or(&self, a: CtHandle, b: CtHandle) -> CtHandle;

    /// Encrypted conditional: `cond ? then_value : else_value`.
    fn select(&self, cond: CtHandle, then_value: CtHandle, else_value: CtHandle) -> CtHandle;

    /// Allow `principal` to request decryption of `handle` out-of-band.
    fn grant(&self, handle: CtHandle, principal: Address);

    /// Grant the engine perpetual compute rights over `handle`.
    fn grant_self(&self, handle: CtHandle);
}
