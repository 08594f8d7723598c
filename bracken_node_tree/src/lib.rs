// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=bracken_node_tree --heading-base-level=0

//! Bracken Node Tree: a cycle-defended ordered node hierarchy.
//!
//! Bracken Node Tree is a reusable structure layer for UIs, scene editors, and
//! anything else that keeps an ordered parent/child hierarchy mutated by
//! external callers.
//!
//! - Represents a forest of named nodes with ordered children, sibling links,
//!   and first/last-child caches, addressed by generational handles.
//! - Provides safe structural mutation: attach, detach, clear, destroy, each
//!   returning an explicit status and leaving the structure untouched on
//!   rejection.
//! - Defends every walk against cycles and duplicate links caused by misuse,
//!   degrading into truncated results and log diagnostics instead of hangs.
//!
//! ## Where this fits
//!
//! This crate is the structure tree of a UI stack: it records *what is under
//! what, in which order* and nothing else. Geometry, hit testing, rendering,
//! and widget state belong to sibling layers that consume this crate's query
//! surface (children, counts, traversal) and drive its mutation surface.
//!
//! The child list is the single ownership edge; parent and sibling links are
//! non-owning back-references kept in sync for O(1) navigation. Detaching or
//! destroying a node never touches its own children, which become roots of
//! their own trees. Node lifetime is entirely host-driven via
//! [`Tree::create`] and [`Tree::destroy`].
//!
//! ## Not a layout or render tree
//!
//! No coordinates, no z-order, no spatial index, no persistence, and no
//! thread-safety: the structure is single-writer and callers serialize access
//! externally. Unbounded work is capped only by the bounded searches
//! ([`Tree::find_by_name`], [`Tree::collect_nodes`]), not by time.
//!
//! ## API overview
//!
//! - [`Tree`]: the arena container and every operation.
//! - [`NodeId`]: generational handle of a node.
//! - [`TreeError`]: why a mutation was rejected.
//! - [`Ancestors`] / [`Descendants`]: guarded upward and pre-order iterators.
//!
//! Key operations:
//! - [`Tree::create`] → [`NodeId`]; [`Tree::destroy`] frees it.
//! - [`Tree::attach`] / [`Tree::detach`] / [`Tree::clear_children`] mutate
//!   structure with explicit statuses.
//! - [`Tree::parent_of`], [`Tree::prev_sibling_of`], [`Tree::next_sibling_of`],
//!   [`Tree::first_child_of`], [`Tree::last_child_of`], [`Tree::child_count`],
//!   [`Tree::children_of`], [`Tree::children_snapshot`] navigate.
//! - [`Tree::root_of`], [`Tree::depth_of`], [`Tree::is_descendant_of`],
//!   [`Tree::is_ancestor_of`] answer ancestry queries.
//! - [`Tree::for_each`], [`Tree::descendants`], [`Tree::ancestors`] enumerate;
//!   [`Tree::find_by_name`] and [`Tree::collect_nodes`] are the bounded
//!   searches.
//!
//! ## Example
//!
//! ```rust
//! use bracken_node_tree::{Tree, TreeError};
//!
//! let mut tree = Tree::new();
//! let root = tree.create("root");
//! let a = tree.create("a");
//! let b = tree.create("b");
//! tree.attach(root, a)?;
//! tree.attach(a, b)?;
//!
//! assert_eq!(tree.child_count(root), 1);
//! assert_eq!(tree.root_of(b), Some(root));
//!
//! // Attaching an ancestor under its descendant is rejected, not fatal.
//! assert_eq!(tree.attach(b, root), Err(TreeError::WouldCycle));
//! assert_eq!(tree.parent_of(root), None);
//! # Ok::<(), TreeError>(())
//! ```
//!
//! ## Diagnostics
//!
//! Rejections and guard trips are also emitted on the [`log`] facade, so
//! hosts that do not inspect statuses still see them; install any logger
//! (the demos use `env_logger`).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;
mod walk;

pub use tree::Tree;
pub use types::{NodeId, TreeError};
pub use walk::{Ancestors, Descendants};
