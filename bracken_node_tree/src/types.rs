// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the node tree: node identifiers and operation errors.

use thiserror::Error;

/// Identifier for a node in the tree (generational).
///
/// A `NodeId` stays valid while its node is alive and becomes stale once the
/// node is destroyed; a stale id is detected by every operation and never
/// dereferences freed storage, even if the slot has been reused since.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Why a structural operation was rejected.
///
/// Every rejection leaves the tree exactly as it was; these are recoverable
/// statuses, not panics. The same conditions are also emitted on the [`log`]
/// facade so hosts without result plumbing still see them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum TreeError {
    /// The handle refers to a node that was destroyed (or never created).
    #[error("stale node handle")]
    Stale,
    /// A node cannot be attached to itself.
    #[error("cannot attach a node to itself")]
    SelfAttach,
    /// The attachment would make a node its own ancestor.
    #[error("attachment would create a cycle")]
    WouldCycle,
    /// The node is already a child of this parent.
    #[error("node is already attached to this parent")]
    AlreadyAttached,
    /// The node is not a direct child of this parent.
    #[error("node is not a child of this parent")]
    NotAChild,
}
