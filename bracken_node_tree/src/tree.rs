// Copyright 2025 the Bracken Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: arena storage, structural mutation, queries.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::types::{NodeId, TreeError};
use crate::walk::{Ancestors, Descendants, bounded_preorder};

/// An arena of named nodes forming a forest of ordered trees.
///
/// Nodes are addressed by generational [`NodeId`] handles. The arena owns all
/// node storage; a node record owns its ordered child list, while parent and
/// sibling links are non-owning back-references kept in sync with that list.
///
/// Structural mutations ([`Tree::attach`], [`Tree::detach`],
/// [`Tree::clear_children`], [`Tree::destroy`]) return an explicit status:
/// a rejected call leaves the whole structure exactly as it was. Queries are
/// best-effort and value-shaped; a stale handle reads as absent rather than
/// failing. Every traversal is cycle-guarded, so misuse degrades into a
/// truncated result and a log line, never an infinite loop.
///
/// ## Example
///
/// ```rust
/// use bracken_node_tree::Tree;
///
/// let mut tree = Tree::new();
/// let root = tree.create("root");
/// let a = tree.create("a");
/// let b = tree.create("b");
/// tree.attach(root, a).unwrap();
/// tree.attach(root, b).unwrap();
///
/// assert_eq!(tree.child_count(root), 2);
/// assert_eq!(tree.first_child_of(root), Some(a));
/// assert_eq!(tree.next_sibling_of(a), Some(b));
/// assert_eq!(tree.root_of(b), Some(root));
/// ```
pub struct Tree {
    /// slots
    slots: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    name: String,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    /// The ordered child list is the single source of truth for tree shape;
    /// the sibling and first/last fields above are derived from it.
    children: Vec<NodeId>,
}

impl Node {
    fn new(generation: u32, name: &str) -> Self {
        Self {
            generation,
            name: name.to_string(),
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            children: Vec::new(),
        }
    }
}

impl Tree {
    /// Conventional depth cap for [`Tree::find_by_name`].
    pub const DEFAULT_FIND_DEPTH: usize = 10;
    /// Conventional node cap for [`Tree::collect_nodes`].
    pub const DEFAULT_COLLECT_CAP: usize = 1000;

    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Create a new empty tree with room for `capacity` nodes before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live parentless nodes, in slot order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect()
    }

    // --- lifetime ---

    /// Allocate a new detached node with the given label.
    ///
    /// The node has no parent, no children, and no siblings until it is
    /// [`Tree::attach`]ed somewhere. Slots of destroyed nodes are reused with
    /// a generation bump, so handles to the previous occupant stay stale.
    pub fn create(&mut self, name: &str) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Node::new(generation, name));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Node::new(generation, name)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.slots.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Destroy a node, freeing its slot.
    ///
    /// The node is first detached from its parent (if any). Its children are
    /// not destroyed or reattached: each becomes the root of its own tree.
    /// The handle is stale afterwards.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(id) {
            log::warn!("destroy rejected: stale node handle");
            return Err(TreeError::Stale);
        }
        if let Some(parent) = self.node(id).parent {
            self.splice_from_parent(parent, id);
        }
        let children = core::mem::take(&mut self.node_mut(id).children);
        for &child in &children {
            if let Some(c) = self.node_opt_mut(child) {
                c.parent = None;
                c.prev_sibling = None;
                c.next_sibling = None;
            }
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
        Ok(())
    }

    // --- structural mutation ---

    /// Attach `child` as the last child of `parent`.
    ///
    /// If `child` currently has a different parent it is detached from that
    /// parent first, exactly as [`Tree::detach`] would. Rejections leave the
    /// structure untouched:
    ///
    /// - [`TreeError::Stale`] if either handle is dead.
    /// - [`TreeError::SelfAttach`] if `parent == child`.
    /// - [`TreeError::WouldCycle`] if `child` is an ancestor of `parent`, or
    ///   if the ancestor walk itself detects a corrupted (cyclic) parent
    ///   chain and so cannot prove the attach safe.
    /// - [`TreeError::AlreadyAttached`] if `child` is already a child of
    ///   `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            log::warn!("attach rejected: stale node handle");
            return Err(TreeError::Stale);
        }
        if parent == child {
            log::error!("attach rejected: a node cannot be its own child");
            return Err(TreeError::SelfAttach);
        }
        let mut walk = self.ancestors(parent);
        let child_is_ancestor = walk.by_ref().any(|n| n == child);
        if child_is_ancestor || walk.cycle_detected() {
            log::error!("attach rejected: would make a node its own ancestor");
            return Err(TreeError::WouldCycle);
        }
        if self.node(child).parent == Some(parent) {
            log::warn!("attach rejected: node is already a child of this parent");
            return Err(TreeError::AlreadyAttached);
        }

        if let Some(old_parent) = self.node(child).parent {
            self.splice_from_parent(old_parent, child);
        }
        self.node_mut(parent).children.push(child);
        self.relink_children(parent);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`'s child list.
    ///
    /// `child` keeps its own children and becomes the root of its own tree.
    /// Returns [`TreeError::Stale`] if either handle is dead, or
    /// [`TreeError::NotAChild`] if `child` is not currently a child of
    /// `parent`; either way the structure is untouched.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            log::warn!("detach rejected: stale node handle");
            return Err(TreeError::Stale);
        }
        if !self.node(parent).children.contains(&child) {
            log::warn!("detach rejected: node is not a child of this parent");
            return Err(TreeError::NotAChild);
        }
        self.splice_from_parent(parent, child);
        let c = self.node_mut(child);
        c.parent = None;
        c.prev_sibling = None;
        c.next_sibling = None;
        Ok(())
    }

    /// Detach all direct children of `parent` in one step.
    ///
    /// Each child's parent and sibling links are cleared and it becomes a
    /// root; grandchildren are untouched. Returns how many children were
    /// detached.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<usize, TreeError> {
        if !self.is_alive(parent) {
            log::warn!("clear_children rejected: stale node handle");
            return Err(TreeError::Stale);
        }
        let children = core::mem::take(&mut self.node_mut(parent).children);
        for &child in &children {
            if let Some(c) = self.node_opt_mut(child) {
                c.parent = None;
                c.prev_sibling = None;
                c.next_sibling = None;
            }
        }
        let p = self.node_mut(parent);
        p.first_child = None;
        p.last_child = None;
        Ok(children.len())
    }

    // --- queries ---

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the generation stored in that slot. See [`NodeId`] for the
    /// generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// The label of a live node.
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.name.as_str())
    }

    /// The parent of a node, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// The previous sibling under the same parent, or `None` at the front.
    pub fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.prev_sibling)
    }

    /// The next sibling under the same parent, or `None` at the back.
    pub fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.next_sibling)
    }

    /// The first child of a node, or `None` if childless or stale.
    pub fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.first_child)
    }

    /// The last child of a node, or `None` if childless or stale.
    pub fn last_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.last_child)
    }

    /// Number of direct children (not total descendants); 0 for stale ids.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.node_opt(id).map_or(0, |n| n.children.len())
    }

    /// The children of a node, or an empty slice if the id is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// An owned copy of the direct-children list.
    ///
    /// Useful for hosts that mutate the tree while iterating over what the
    /// child list was before the mutation started.
    pub fn children_snapshot(&self, id: NodeId) -> Vec<NodeId> {
        self.children_of(id).to_vec()
    }

    /// The root of the tree containing `id`.
    ///
    /// Walks the parent chain upward until a parentless node;
    /// `root_of(root) == Some(root)`. Returns `None` for stale ids, and also
    /// when the parent chain is cyclic (logged): a corrupted chain has no
    /// root to report.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        let mut walk = self.ancestors(id);
        let mut last = id;
        for node in &mut walk {
            last = node;
        }
        if walk.cycle_detected() {
            return None;
        }
        Some(last)
    }

    /// Number of parent-chain hops from `id` to its root (a root is at depth
    /// 0), or `None` for stale ids.
    ///
    /// If the parent chain is cyclic the walk aborts (logged) and the hops
    /// made so far are returned; depth is best-effort diagnostic data.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.ancestors(id).count())
    }

    /// Whether `ancestor` appears on `id`'s parent chain.
    ///
    /// A node is not its own descendant. Returns false for stale handles and
    /// (with a logged diagnostic) if the chain is cyclic.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        if !self.is_alive(id) || !self.is_alive(ancestor) {
            return false;
        }
        self.ancestors(id).any(|n| n == ancestor)
    }

    /// Whether `descendant` is in the subtree below `id`.
    pub fn is_ancestor_of(&self, id: NodeId, descendant: NodeId) -> bool {
        self.is_descendant_of(descendant, id)
    }

    // --- enumeration ---

    /// Iterator over `from`'s ancestors, nearest first.
    pub fn ancestors(&self, from: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, from)
    }

    /// Pre-order iterator over the subtree rooted at `from`, starting with
    /// `from` itself. Empty for stale ids.
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        Descendants::new(self, from)
    }

    /// Visit the subtree rooted at `from` in depth-first pre-order.
    ///
    /// `from` is visited first, then each child's subtree in list order. The
    /// walk runs to completion; there is no early-exit protocol. Cyclic
    /// child links are skipped and logged, so the callback sees the
    /// reachable cycle-free subtree. No-op for stale ids.
    pub fn for_each(&self, from: NodeId, mut visit: impl FnMut(NodeId)) {
        for id in self.descendants(from) {
            visit(id);
        }
    }

    /// Find the first node labeled `name` in the subtree rooted at `from`,
    /// in pre-order, descending at most `max_depth` levels below `from`.
    ///
    /// `from` itself is examined (at relative depth 0). Nodes at the depth
    /// cap are examined but their children are not. A search that came up
    /// empty after being depth-pruned or cycle-pruned logs a warning, since
    /// the miss may be an artifact of the cap. [`Tree::DEFAULT_FIND_DEPTH`]
    /// is the conventional cap.
    pub fn find_by_name(&self, from: NodeId, name: &str, max_depth: usize) -> Option<NodeId> {
        let mut found = None;
        let summary = bounded_preorder(self, from, Some(max_depth), None, |id| {
            if self.name_of(id) == Some(name) {
                found = Some(id);
                false
            } else {
                true
            }
        });
        if found.is_none() && (summary.depth_pruned || summary.revisits > 0) {
            log::warn!(
                "find_by_name missed {name:?}: search was incomplete \
                 (depth-pruned: {}, revisits skipped: {})",
                summary.depth_pruned,
                summary.revisits,
            );
        }
        found
    }

    /// Collect up to `max_nodes` nodes from the subtree rooted at `from`, in
    /// pre-order, starting with `from` itself.
    ///
    /// The walk stops as soon as the cap is reached (logged, since the
    /// result is then a truncated view). Duplicate links are visited once
    /// and counted as skips. [`Tree::DEFAULT_COLLECT_CAP`] is the
    /// conventional cap; a cap of 0 yields an empty vector.
    pub fn collect_nodes(&self, from: NodeId, max_nodes: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        let summary = bounded_preorder(self, from, None, Some(max_nodes), |id| {
            out.push(id);
            true
        });
        if summary.count_capped {
            log::warn!("collect_nodes stopped at the {max_nodes}-node cap");
        }
        if summary.revisits > 0 {
            log::warn!(
                "collect_nodes skipped {} already-visited nodes",
                summary.revisits
            );
        }
        out
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.slots[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.slots.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.slots.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Splice `child` out of `parent`'s list with local repair: only the two
    /// neighboring sibling links and the list endpoints change. `child`'s own
    /// links are left for the caller to clear or rewrite.
    fn splice_from_parent(&mut self, parent: NodeId, child: NodeId) {
        let (prev, next) = {
            let c = self.node(child);
            (c.prev_sibling, c.next_sibling)
        };
        self.node_mut(parent).children.retain(|&c| c != child);
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        }
        let p = self.node_mut(parent);
        p.first_child = p.children.first().copied();
        p.last_child = p.children.last().copied();
    }

    /// Rebuild every child's sibling links and the first/last endpoints from
    /// the list order.
    fn relink_children(&mut self, parent: NodeId) {
        let children = self.node(parent).children.clone();
        for (i, &child) in children.iter().enumerate() {
            let prev = if i > 0 { Some(children[i - 1]) } else { None };
            let next = children.get(i + 1).copied();
            let c = self.node_mut(child);
            c.prev_sibling = prev;
            c.next_sibling = next;
        }
        let p = self.node_mut(parent);
        p.first_child = children.first().copied();
        p.last_child = children.last().copied();
    }

    /// Overwrite a node's parent link without any list maintenance; used by
    /// tests to simulate corruption from outside the mutation API.
    #[cfg(test)]
    pub(crate) fn force_parent_link(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.node_mut(id).parent = parent;
    }

    /// Append a raw child-list entry without any link maintenance; used by
    /// tests to simulate corruption from outside the mutation API.
    #[cfg(test)]
    pub(crate) fn force_child_link(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    /// Assert every structural invariant over every live slot: duplicate-free
    /// child lists, sibling links matching list neighbors, first/last matching
    /// list endpoints, parent back-pointers, acyclic parent chains, count
    /// agreement, and generation/free-list bookkeeping.
    fn audit(tree: &Tree) {
        for (i, slot) in tree.slots.iter().enumerate() {
            let Some(node) = slot else {
                assert!(
                    tree.free_list.contains(&i),
                    "empty slot {i} missing from the free list"
                );
                continue;
            };
            assert_eq!(
                node.generation, tree.generations[i],
                "slot {i} generation out of sync"
            );
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(i as u32, node.generation);

            for (j, &child) in node.children.iter().enumerate() {
                assert!(
                    !node.children[..j].contains(&child),
                    "slot {i} has a duplicate child"
                );
                assert!(tree.is_alive(child), "slot {i} lists a stale child");
                assert_eq!(tree.parent_of(child), Some(id), "child parent back-link");
                let expected_prev = if j > 0 { Some(node.children[j - 1]) } else { None };
                assert_eq!(tree.prev_sibling_of(child), expected_prev, "prev link");
                assert_eq!(
                    tree.next_sibling_of(child),
                    node.children.get(j + 1).copied(),
                    "next link"
                );
            }
            assert_eq!(node.first_child, node.children.first().copied());
            assert_eq!(node.last_child, node.children.last().copied());
            assert_eq!(tree.child_count(id), node.children.len());

            let mut walk = tree.ancestors(id);
            walk.by_ref().for_each(drop);
            assert!(!walk.cycle_detected(), "cycle through slot {i}");
        }
        for &i in &tree.free_list {
            assert!(tree.slots[i].is_none(), "free list entry {i} is occupied");
        }
    }

    #[test]
    fn create_is_detached() {
        let mut tree = Tree::new();
        let n = tree.create("n");
        assert!(tree.is_alive(n));
        assert_eq!(tree.name_of(n), Some("n"));
        assert_eq!(tree.parent_of(n), None);
        assert_eq!(tree.prev_sibling_of(n), None);
        assert_eq!(tree.next_sibling_of(n), None);
        assert_eq!(tree.first_child_of(n), None);
        assert_eq!(tree.last_child_of(n), None);
        assert_eq!(tree.child_count(n), 0);
        audit(&tree);
    }

    #[test]
    fn attach_then_detach_scenario() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        audit(&tree);

        assert_eq!(tree.child_count(r), 2);
        assert_eq!(tree.first_child_of(r), Some(a));
        assert_eq!(tree.last_child_of(r), Some(b));
        assert_eq!(tree.next_sibling_of(a), Some(b));
        assert_eq!(tree.prev_sibling_of(b), Some(a));

        tree.detach(r, a).unwrap();
        audit(&tree);
        assert_eq!(tree.child_count(r), 1);
        assert_eq!(tree.first_child_of(r), Some(b));
        assert_eq!(tree.last_child_of(r), Some(b));
        assert_eq!(tree.prev_sibling_of(b), None);
        assert_eq!(tree.parent_of(a), None);
        assert!(tree.is_alive(a), "detach never destroys");
    }

    #[test]
    fn self_attach_rejected() {
        let mut tree = Tree::new();
        let n = tree.create("n");
        assert_eq!(tree.attach(n, n), Err(TreeError::SelfAttach));
        assert_eq!(tree.child_count(n), 0);
        audit(&tree);
    }

    #[test]
    fn cycle_attach_rejected() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        tree.attach(r, a).unwrap();
        tree.attach(a, b).unwrap();

        // r is b's ancestor; making r a child of b would close a cycle.
        assert_eq!(tree.attach(b, r), Err(TreeError::WouldCycle));
        assert_eq!(tree.child_count(b), 0);
        assert_eq!(tree.parent_of(r), None);
        audit(&tree);
    }

    #[test]
    fn already_attached_rejected() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        assert_eq!(tree.attach(r, a), Err(TreeError::AlreadyAttached));
        // Rejection must not reorder: a rejected re-attach is not a move-to-end.
        assert_eq!(tree.children_of(r), [a, b]);
        audit(&tree);
    }

    #[test]
    fn stale_handles_rejected() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        tree.destroy(a).unwrap();

        assert_eq!(tree.attach(r, a), Err(TreeError::Stale));
        assert_eq!(tree.attach(a, r), Err(TreeError::Stale));
        assert_eq!(tree.detach(r, a), Err(TreeError::Stale));
        assert_eq!(tree.clear_children(a), Err(TreeError::Stale));
        assert_eq!(tree.destroy(a), Err(TreeError::Stale));
        assert_eq!(tree.name_of(a), None);
        assert_eq!(tree.depth_of(a), None);
        assert_eq!(tree.root_of(a), None);
        assert!(tree.children_of(a).is_empty());
        audit(&tree);
    }

    #[test]
    fn detach_requires_membership() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let x = tree.create("x");
        tree.attach(r, a).unwrap();
        assert_eq!(tree.detach(r, x), Err(TreeError::NotAChild));
        assert_eq!(tree.detach(a, r), Err(TreeError::NotAChild));
        assert_eq!(tree.children_of(r), [a]);
        audit(&tree);
    }

    #[test]
    fn reparent_moves_and_relinks() {
        let mut tree = Tree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        let x = tree.create("x");
        let y = tree.create("y");
        let z = tree.create("z");
        tree.attach(a, x).unwrap();
        tree.attach(a, y).unwrap();
        tree.attach(a, z).unwrap();

        // Move the middle child to a new parent.
        tree.attach(b, y).unwrap();
        audit(&tree);

        assert_eq!(tree.children_of(a), [x, z]);
        assert_eq!(tree.children_of(b), [y]);
        assert_eq!(tree.parent_of(y), Some(b));
        assert_eq!(tree.next_sibling_of(x), Some(z));
        assert_eq!(tree.prev_sibling_of(z), Some(x));
        assert_eq!(tree.prev_sibling_of(y), None);
        assert_eq!(tree.next_sibling_of(y), None);
    }

    #[test]
    fn detach_keeps_subtree() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let c = tree.create("c");
        tree.attach(r, a).unwrap();
        tree.attach(a, c).unwrap();

        tree.detach(r, a).unwrap();
        audit(&tree);
        // a now roots its own tree, its subtree intact.
        assert_eq!(tree.parent_of(a), None);
        assert_eq!(tree.children_of(a), [c]);
        assert_eq!(tree.parent_of(c), Some(a));
        assert_eq!(tree.root_of(c), Some(a));
        assert_eq!(tree.roots(), [r, a]);
    }

    #[test]
    fn clear_children_detaches_all() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");
        let gc = tree.create("gc");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        tree.attach(r, c).unwrap();
        tree.attach(b, gc).unwrap();

        assert_eq!(tree.clear_children(r), Ok(3));
        audit(&tree);
        assert_eq!(tree.child_count(r), 0);
        assert_eq!(tree.first_child_of(r), None);
        assert_eq!(tree.last_child_of(r), None);
        for n in [a, b, c] {
            assert_eq!(tree.parent_of(n), None);
            assert_eq!(tree.prev_sibling_of(n), None);
            assert_eq!(tree.next_sibling_of(n), None);
        }
        // Grandchildren are untouched.
        assert_eq!(tree.children_of(b), [gc]);
        assert_eq!(tree.clear_children(r), Ok(0), "clearing an empty list");
    }

    #[test]
    fn destroy_orphans_children_as_roots() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let mid = tree.create("mid");
        let x = tree.create("x");
        let y = tree.create("y");
        tree.attach(r, mid).unwrap();
        tree.attach(mid, x).unwrap();
        tree.attach(mid, y).unwrap();

        tree.destroy(mid).unwrap();
        audit(&tree);
        assert!(!tree.is_alive(mid));
        assert_eq!(tree.child_count(r), 0);
        assert_eq!(tree.parent_of(x), None);
        assert_eq!(tree.parent_of(y), None);
        assert_eq!(tree.prev_sibling_of(y), None, "sibling links cleared");
        assert_eq!(tree.roots(), [r, x, y]);
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        tree.attach(r, a).unwrap();
        tree.destroy(a).unwrap();

        let b = tree.create("b");
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a), "old handle stays stale after reuse");
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        assert_eq!(tree.name_of(a), None);
        assert_eq!(tree.name_of(b), Some("b"));
        audit(&tree);
    }

    #[test]
    fn for_each_is_preorder_and_complete() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");
        let d = tree.create("d");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        tree.attach(a, c).unwrap();
        tree.attach(a, d).unwrap();

        let mut order = Vec::new();
        tree.for_each(r, |id| order.push(id));
        assert_eq!(order, [r, a, c, d, b]);
    }

    #[test]
    fn depth_and_ancestry() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let lone = tree.create("lone");
        tree.attach(r, a).unwrap();
        tree.attach(a, b).unwrap();

        assert_eq!(tree.depth_of(r), Some(0));
        assert_eq!(tree.depth_of(a), Some(1));
        assert_eq!(tree.depth_of(b), Some(2));
        assert_eq!(tree.root_of(b), Some(r));
        assert_eq!(tree.root_of(r), Some(r));

        assert!(tree.is_descendant_of(b, r));
        assert!(tree.is_descendant_of(b, a));
        assert!(!tree.is_descendant_of(r, b));
        assert!(!tree.is_descendant_of(b, b), "not its own descendant");
        assert!(!tree.is_descendant_of(b, lone));
        assert!(tree.is_ancestor_of(r, b));
        assert!(!tree.is_ancestor_of(b, r));
    }

    #[test]
    fn root_and_depth_under_forced_cycle() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let other = tree.create("other");
        tree.attach(r, a).unwrap();
        tree.attach(a, b).unwrap();
        // Corrupt the chain: r's parent points back down to b.
        tree.force_parent_link(r, Some(b));

        assert_eq!(tree.root_of(b), None, "a cyclic chain has no root");
        // Best-effort depth: hops made before the walk aborted (a, r, b).
        assert_eq!(tree.depth_of(b), Some(3));
        assert!(!tree.is_descendant_of(b, other));
    }

    #[test]
    fn attach_rejects_on_corrupted_chain() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let lone = tree.create("lone");
        tree.attach(r, a).unwrap();
        tree.attach(a, b).unwrap();
        tree.force_parent_link(r, Some(b));

        // The ancestor walk from b cannot prove the attach safe.
        assert_eq!(tree.attach(b, lone), Err(TreeError::WouldCycle));
        assert_eq!(tree.parent_of(lone), None);
    }

    #[test]
    fn find_by_name_preorder_first_match() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("dup");
        let b = tree.create("b");
        let c = tree.create("dup");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        tree.attach(b, c).unwrap();

        assert_eq!(tree.find_by_name(r, "dup", Tree::DEFAULT_FIND_DEPTH), Some(a));
        assert_eq!(tree.find_by_name(r, "r", Tree::DEFAULT_FIND_DEPTH), Some(r));
        assert_eq!(tree.find_by_name(r, "missing", Tree::DEFAULT_FIND_DEPTH), None);
        // The subtree root itself is matched even with a zero cap.
        assert_eq!(tree.find_by_name(b, "b", 0), Some(b));
        assert_eq!(tree.find_by_name(b, "dup", 0), None, "children are below the cap");
    }

    #[test]
    fn find_by_name_respects_depth_cap() {
        let mut tree = Tree::new();
        // A 21-node chain: n0 at depth 0 down to n20 at depth 20.
        let mut ids = Vec::new();
        for i in 0..=20 {
            let id = tree.create(&format!("n{i}"));
            if let Some(&parent) = ids.last() {
                tree.attach(parent, id).unwrap();
            }
            ids.push(id);
        }
        let top = ids[0];
        assert_eq!(tree.find_by_name(top, "n10", 10), Some(ids[10]));
        assert_eq!(tree.find_by_name(top, "n11", 10), None, "below the cutoff");
        assert_eq!(tree.find_by_name(top, "n20", Tree::DEFAULT_FIND_DEPTH), None);
        assert_eq!(tree.find_by_name(top, "n20", 20), Some(ids[20]));
    }

    #[test]
    fn collect_nodes_caps_and_orders() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();
        tree.attach(a, c).unwrap();

        assert_eq!(tree.collect_nodes(r, Tree::DEFAULT_COLLECT_CAP), [r, a, c, b]);
        assert_eq!(tree.collect_nodes(r, 2), [r, a]);
        assert!(tree.collect_nodes(r, 0).is_empty());
        assert!(tree.collect_nodes(c, 0).is_empty());
        assert_eq!(tree.collect_nodes(c, 5), [c], "a leaf collects itself");
    }

    #[test]
    fn children_snapshot_is_a_copy() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let a = tree.create("a");
        let b = tree.create("b");
        tree.attach(r, a).unwrap();
        tree.attach(r, b).unwrap();

        let snapshot = tree.children_snapshot(r);
        tree.detach(r, a).unwrap();
        assert_eq!(snapshot, [a, b], "snapshot is unaffected by later mutation");
        assert_eq!(tree.children_of(r), [b]);
    }

    #[test]
    fn len_roots_and_debug_summary() {
        let mut tree = Tree::with_capacity(8);
        assert!(tree.is_empty());
        let r = tree.create("r");
        let a = tree.create("a");
        tree.attach(r, a).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots(), [r]);

        tree.destroy(a).unwrap();
        assert_eq!(tree.len(), 1);
        let dbg = format!("{tree:?}");
        assert!(dbg.contains("nodes_alive: 1"), "summary Debug: {dbg}");
        assert!(dbg.contains("free_list: 1"), "summary Debug: {dbg}");
    }

    #[test]
    fn invariants_hold_over_mixed_sequence() {
        let mut tree = Tree::new();
        let r = tree.create("r");
        let mut pool: Vec<NodeId> = (0..12).map(|i| tree.create(&format!("n{i}"))).collect();

        // Attach everything under r in two tiers.
        for &n in &pool[..6] {
            tree.attach(r, n).unwrap();
            audit(&tree);
        }
        for (i, &n) in pool[6..].iter().enumerate() {
            tree.attach(pool[i % 6], n).unwrap();
            audit(&tree);
        }
        // Reparent a few, detach a few, destroy one, clear one.
        tree.attach(pool[0], pool[5]).unwrap();
        audit(&tree);
        tree.detach(r, pool[1]).unwrap();
        audit(&tree);
        tree.destroy(pool[2]).unwrap();
        audit(&tree);
        tree.clear_children(pool[0]).unwrap();
        audit(&tree);
        // Reuse the freed slot.
        pool.push(tree.create("reused"));
        tree.attach(r, pool[12]).unwrap();
        audit(&tree);
    }
}
