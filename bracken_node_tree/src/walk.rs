// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Guarded tree walks: upward over parents, downward in pre-order.
//!
//! Every traversal in this crate funnels through the walkers here so the
//! cycle defenses live in one place instead of being restated per query:
//!
//! - [`Ancestors`] walks parent links with a visited set and aborts (with a
//!   diagnostic) if the chain ever revisits a node.
//! - [`Descendants`] yields a pre-order subtree view, tracking the active
//!   path so a corrupted child link cannot trap it; the offending subtree is
//!   skipped, not fatal.
//! - [`bounded_preorder`] is the capped engine behind name search and node
//!   collection: a persistent visited set plus optional depth and count
//!   caps, reporting what was pruned in a [`WalkSummary`].
//!
//! In a structurally sound forest the guards never trigger; they are there
//! so that misuse (or a bug upstream of an invariant) degrades into a
//! truncated walk and a log line instead of an infinite loop.

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::tree::Tree;
use crate::types::NodeId;

/// Iterator over a node's ancestors, nearest first.
///
/// Yields the starting node's parent, then its parent, and so on up to the
/// root. The walk keeps a visited set; if a parent chain loops back on
/// itself the iterator stops early and [`Ancestors::cycle_detected`]
/// reports it.
#[derive(Debug)]
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
    seen: HashSet<NodeId>,
    cycle: bool,
}

impl<'t> Ancestors<'t> {
    pub(crate) fn new(tree: &'t Tree, from: NodeId) -> Self {
        Self {
            tree,
            next: tree.parent_of(from),
            seen: HashSet::new(),
            cycle: false,
        }
    }

    /// Whether the walk was cut short because the parent chain revisited a
    /// node it had already seen.
    #[inline]
    pub fn cycle_detected(&self) -> bool {
        self.cycle
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        if !self.seen.insert(current) {
            log::error!("cycle detected in parent chain; aborting upward walk");
            self.cycle = true;
            self.next = None;
            return None;
        }
        self.next = self.tree.parent_of(current);
        Some(current)
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    id: NodeId,
    child: usize,
}

/// Pre-order iterator over a subtree, starting at the subtree root itself.
///
/// Children are visited in list order. The iterator marks nodes on the
/// active path and unmarks them when their subtree completes, so a node may
/// appear again under a different branch (only possible once invariants are
/// already broken) but can never re-enter its own ancestor chain: such a
/// re-entry is skipped and reported instead of recursing forever.
#[derive(Debug)]
pub struct Descendants<'t> {
    tree: &'t Tree,
    start: Option<NodeId>,
    frames: SmallVec<[Frame; 16]>,
    on_path: HashSet<NodeId>,
    cycles: usize,
}

impl<'t> Descendants<'t> {
    pub(crate) fn new(tree: &'t Tree, from: NodeId) -> Self {
        let mut frames: SmallVec<[Frame; 16]> = SmallVec::new();
        let mut on_path = HashSet::new();
        let start = if tree.is_alive(from) {
            frames.push(Frame { id: from, child: 0 });
            on_path.insert(from);
            Some(from)
        } else {
            None
        };
        Self {
            tree,
            start,
            frames,
            on_path,
            cycles: 0,
        }
    }

    /// How many subtrees were skipped because their root re-entered the
    /// active path.
    #[inline]
    pub fn cycles_skipped(&self) -> usize {
        self.cycles
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(start) = self.start.take() {
            return Some(start);
        }
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return None;
            };
            let id = frame.id;
            let cursor = frame.child;
            frame.child += 1;

            match self.tree.children_of(id).get(cursor) {
                Some(&child) => {
                    if self.on_path.contains(&child) {
                        log::error!("cycle detected in subtree traversal; skipping subtree");
                        self.cycles += 1;
                        continue;
                    }
                    if !self.tree.is_alive(child) {
                        continue;
                    }
                    self.on_path.insert(child);
                    self.frames.push(Frame { id: child, child: 0 });
                    return Some(child);
                }
                None => {
                    // Subtree complete: leave the active path.
                    self.on_path.remove(&id);
                    self.frames.pop();
                }
            }
        }
    }
}

/// What a bounded pre-order walk actually covered.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WalkSummary {
    /// Nodes handed to the visit closure.
    pub(crate) visited: usize,
    /// A depth cap cut off at least one node's children.
    pub(crate) depth_pruned: bool,
    /// The count cap stopped the walk before it was exhausted.
    pub(crate) count_capped: bool,
    /// Nodes skipped because the persistent visited set had already seen
    /// them (a duplicate link or cycle).
    pub(crate) revisits: usize,
}

/// Run a capped pre-order walk from `from`, calling `visit` for each node.
///
/// `visit` returns `false` to stop the walk early (e.g. a search hit).
/// Depth is relative to `from` (which is at depth 0); a node at the depth
/// cap is still visited, its children are not. Unlike [`Descendants`] the
/// visited set is never unwound, so any node is visited at most once per
/// call no matter how the links are tangled.
pub(crate) fn bounded_preorder(
    tree: &Tree,
    from: NodeId,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
    mut visit: impl FnMut(NodeId) -> bool,
) -> WalkSummary {
    let mut summary = WalkSummary::default();
    if !tree.is_alive(from) {
        return summary;
    }

    let mut stack: SmallVec<[(NodeId, usize); 16]> = SmallVec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    stack.push((from, 0));

    while let Some((id, depth)) = stack.pop() {
        if max_nodes.is_some_and(|cap| summary.visited >= cap) {
            summary.count_capped = true;
            break;
        }
        if !seen.insert(id) {
            summary.revisits += 1;
            continue;
        }
        if !tree.is_alive(id) {
            continue;
        }
        summary.visited += 1;
        if !visit(id) {
            break;
        }

        let children = tree.children_of(id);
        if max_depth.is_some_and(|cap| depth >= cap) {
            if !children.is_empty() {
                summary.depth_pruned = true;
            }
            continue;
        }
        // Reverse so the stack pops children in list order.
        for &child in children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    summary
}
