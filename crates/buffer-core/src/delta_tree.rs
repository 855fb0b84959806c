//! Delta-encoded red-black tree.
//!
//! [`DeltaTree`] is a sorted map from numeric keys to values where keys are never stored.
//! Every node carries a *delta* instead: with the left delta side, the key of a node is the
//! left boundary delta plus the deltas of all nodes before it. Each node also caches the
//! sum of the deltas in its subtree, which gives:
//!
//! - O(log n) lookup, attach and detach;
//! - O(log n) "shift every key after this node", by changing a single node's delta.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A node can be allocated
//! detached, attached and detached any number of times, and is freed explicitly.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Numeric type usable as a key and delta in a [`DeltaTree`].
pub trait Delta:
    Copy + Ord + Default + Debug + Add<Output = Self> + Sub<Output = Self> + AddAssign + SubAssign
{
}

impl<T> Delta for T where
    T: Copy
        + Ord
        + Default
        + Debug
        + Add<Output = T>
        + Sub<Output = T>
        + AddAssign
        + SubAssign
{
}

/// One of the two directions in the tree's key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Towards the start of the key order (smaller keys with the left delta side).
    Left,
    /// Towards the end of the key order.
    Right,
}

impl Side {
    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Red-black node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeColor {
    /// Black node.
    Black,
    /// Red node.
    Red,
}

/// Per-call lookup/insertion semantics.
///
/// Always passed explicitly so every call site states how keys are interpreted, whether
/// duplicate keys are allowed, and what a lookup miss should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Which side's accumulated deltas are taken as the key of a node.
    ///
    /// Nodes on this side of a node have smaller keys.
    pub delta_side: Side,
    /// `None` forbids duplicate keys. `Some(side)` allows them and selects the end of a
    /// same-key run that lookups return and that insertions join.
    pub repeats: Option<Side>,
    /// Lookup only: on a miss, return the existing node adjacent to the missing key on
    /// this side instead of nothing.
    pub nearest: Option<Side>,
}

impl Options {
    /// Left delta side, unique keys, exact lookups.
    pub const fn exact() -> Self {
        Self {
            delta_side: Side::Left,
            repeats: None,
            nearest: None,
        }
    }

    /// Allow repeated keys, operating on the given end of a same-key run.
    pub const fn with_repeats(mut self, side: Side) -> Self {
        self.repeats = Some(side);
        self
    }

    /// On lookup misses, fall back to the adjacent node on the given side.
    pub const fn with_nearest(mut self, side: Side) -> Self {
        self.nearest = Some(side);
        self
    }

    /// Measure keys from the given side.
    pub const fn with_delta_side(mut self, side: Side) -> Self {
        self.delta_side = side;
        self
    }
}

/// Handle to a node in a [`DeltaTree`] arena.
///
/// A handle outlives its node: once the node is freed the handle is stale, also after
/// the arena slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// A node together with its computed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<K> {
    /// Key of the node.
    pub key: K,
    /// The node.
    pub node: NodeId,
}

#[derive(Debug)]
struct Slot<K, V> {
    /// Bumped each time the slot's node is freed.
    generation: u32,
    node: Option<Node<K, V>>,
}

#[derive(Debug)]
struct Node<K, V> {
    value: V,
    delta: K,
    subtree_delta: K,
    color: NodeColor,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 2],
    attached: bool,
}

/// Sorted map from delta-encoded keys to values.
///
/// # Example
///
/// ```rust
/// use buffer_core::delta_tree::{DeltaTree, Options};
///
/// let mut tree: DeltaTree<i64, &str> = DeltaTree::new();
/// let b = tree.insert_node("b");
/// let a = tree.insert_node("a");
/// tree.attach(b, 20, Options::exact());
/// tree.attach(a, 10, Options::exact());
///
/// assert_eq!(tree.get(20, Options::exact()).map(|e| e.node), Some(b));
///
/// // Growing `a`'s delta shifts every key after it.
/// tree.set_delta(a, 15);
/// assert_eq!(tree.key(b, buffer_core::delta_tree::Side::Left), 25);
/// ```
#[derive(Debug)]
pub struct DeltaTree<K, V> {
    nodes: Vec<Slot<K, V>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    /// Boundary deltas: from the logical left end to the leftmost node, and from the
    /// rightmost node to the logical right end.
    extremes: [K; 2],
    len: usize,
}

impl<K: Delta, V> Default for DeltaTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Delta, V> DeltaTree<K, V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            extremes: [K::default(); 2],
            len: 0,
        }
    }

    /// Returns true iff no node is attached.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of live nodes, attached or not.
    pub fn allocated(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Sum of both boundary deltas and every attached node's delta.
    pub fn total_delta(&self) -> K {
        match self.root {
            None => K::default(),
            Some(root) => self.extremes[0] + self.node(root).subtree_delta + self.extremes[1],
        }
    }

    /// Boundary delta on the given side.
    pub fn extreme_delta(&self, side: Side) -> K {
        self.extremes[side.index()]
    }

    /// Overwrite the boundary delta on the given side.
    pub fn set_extreme_delta(&mut self, side: Side, delta: K) {
        self.extremes[side.index()] = delta;
    }

    /// Allocate a detached node holding `value`.
    pub fn insert_node(&mut self, value: V) -> NodeId {
        let node = Node {
            value,
            delta: K::default(),
            subtree_delta: K::default(),
            color: NodeColor::Red,
            parent: None,
            children: [None, None],
            attached: false,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.nodes.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.nodes.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Free a node, detaching it first if needed, and return its value.
    pub fn remove_node(&mut self, id: NodeId) -> V {
        if self.node(id).attached {
            self.detach(id);
        }
        let slot = &mut self.nodes[id.index];
        let node = slot.node.take().expect("checked by node()");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        node.value
    }

    /// Whether `id` refers to a live (not freed) node.
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.index),
            Some(Slot { generation, node: Some(_) }) if *generation == id.generation
        )
    }

    /// Whether the node is currently attached to the tree.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).attached
    }

    /// The node's value.
    pub fn value(&self, id: NodeId) -> &V {
        &self.node(id).value
    }

    /// The node's value, mutably.
    pub fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.node_mut(id).value
    }

    /// The node's delta.
    pub fn delta(&self, id: NodeId) -> K {
        self.node(id).delta
    }

    /// Set the node's delta; every key after the node shifts by the difference.
    pub fn set_delta(&mut self, id: NodeId, delta: K) {
        self.node_mut(id).delta = delta;
        self.propagate_subtree_delta(id);
    }

    /// Key of an attached node, measured from `side`.
    pub fn key(&self, id: NodeId, side: Side) -> K {
        assert!(self.node(id).attached, "key of a detached node {id:?}");
        let mut key = self.extremes[side.index()] + self.subtree_delta(self.child(id, side));
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if self.side_in_parent(current) != side {
                key += self.node(parent).delta + self.subtree_delta(self.child(parent, side));
            }
            current = parent;
        }
        key
    }

    /// In-order neighbor of an attached node on the given side.
    pub fn adjacent(&self, id: NodeId, side: Side) -> Option<NodeId> {
        if let Some(child) = self.child(id, side) {
            return Some(self.descendant_at_end(child, side.other()));
        }
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if self.side_in_parent(current) != side {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// The node at the given end of the key order.
    pub fn extreme(&self, side: Side, options: Options) -> Option<Entry<K>> {
        let node = self.descendant_at_end(self.root?, side);
        Some(Entry {
            key: self.key(node, options.delta_side),
            node,
        })
    }

    /// Look up a node by key.
    ///
    /// Returns the node with `key` (the `repeats` end of a same-key run), or with
    /// `nearest` set, the adjacent node on that side when the key is missing.
    pub fn get(&self, key: K, options: Options) -> Option<Entry<K>> {
        let near = options.delta_side;
        let far = near.other();
        let mut current = self.root;
        // Key of the first element (on the near side) of the subtree rooted at `current`.
        let mut subtree_key = self.extremes[near.index()];
        let mut found = None;
        let mut below = None;
        let mut above = None;

        while let Some(node) = current {
            let key_at = subtree_key + self.subtree_delta(self.child(node, near));
            let entry = Entry { key: key_at, node };
            let dir = if key == key_at {
                found = Some(entry);
                match options.repeats {
                    Some(side) => side,
                    None => break,
                }
            } else if key < key_at {
                above = Some(entry);
                near
            } else {
                below = Some(entry);
                far
            };
            if dir == far {
                subtree_key = key_at + self.node(node).delta;
            }
            current = self.child(node, dir);
        }

        if found.is_some() {
            return found;
        }
        match options.nearest {
            Some(side) if side == near => below,
            Some(_) => above,
            None => None,
        }
    }

    /// Attach a detached node at `key`.
    ///
    /// The node's predecessor gives up part of its delta so the keys of all following
    /// nodes are unchanged.
    ///
    /// # Panics
    ///
    /// If the node is already attached, or `key` is taken and `options.repeats` is `None`.
    pub fn attach(&mut self, id: NodeId, key: K, options: Options) -> Entry<K> {
        assert!(!self.node(id).attached, "node {id:?} is already attached");
        let near = options.delta_side;
        let far = near.other();
        {
            let node = self.node_mut(id);
            node.color = NodeColor::Red;
            node.parent = None;
            node.children = [None, None];
            node.attached = true;
        }
        self.len += 1;

        let Some(root) = self.root else {
            let node = self.node_mut(id);
            node.color = NodeColor::Black;
            node.delta = K::default();
            node.subtree_delta = K::default();
            self.root = Some(id);
            self.extremes[near.index()] = key;
            return Entry { key, node: id };
        };

        let mut parent = root;
        let mut dir = near;
        let mut current = Some(root);
        let mut subtree_key = self.extremes[near.index()];
        let mut predecessor = None;
        while let Some(node) = current {
            let key_at = subtree_key + self.subtree_delta(self.child(node, near));
            dir = if key < key_at {
                near
            } else if key > key_at {
                far
            } else {
                match options.repeats {
                    Some(side) => side,
                    None => panic!("attaching a node with repeated key {key:?}"),
                }
            };
            if dir == far {
                predecessor = Some(node);
                subtree_key = key_at + self.node(node).delta;
            }
            parent = node;
            current = self.child(node, dir);
        }

        self.set_child(parent, dir, Some(id));
        self.node_mut(id).parent = Some(parent);

        match predecessor {
            Some(pred) => {
                // `subtree_key` is where the predecessor's delta ends: the successor's key, or
                // the logical end when the new node becomes the last one.
                let pred_key = subtree_key - self.node(pred).delta;
                let delta = if key > subtree_key {
                    K::default()
                } else {
                    subtree_key - key
                };
                self.init_leaf_delta(id, delta);
                self.set_delta(pred, key - pred_key);
            }
            None => {
                let first_key = self.extremes[near.index()];
                self.init_leaf_delta(id, first_key - key);
                self.extremes[near.index()] = key;
            }
        }

        self.insert_fixup(id);
        Entry { key, node: id }
    }

    /// Detach an attached node, keeping it allocated.
    ///
    /// The node's delta is folded into its in-order predecessor (or the left boundary
    /// delta), so the keys of the remaining nodes do not change. Returns the node that
    /// absorbed the delta.
    ///
    /// # Panics
    ///
    /// If the node is not attached.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        assert!(self.node(id).attached, "node {id:?} is not attached");
        let absorbed = self.adjacent(id, Side::Left);
        let delta = self.node(id).delta;
        match absorbed {
            Some(pred) => {
                let merged = self.node(pred).delta + delta;
                self.set_delta(pred, merged);
            }
            None => self.extremes[Side::Left.index()] += delta,
        }

        let left = self.child(id, Side::Left);
        let right = self.child(id, Side::Right);
        let (x, x_parent, removed_color) = match (left, right) {
            (None, _) | (_, None) => {
                let only = left.or(right);
                let parent = self.node(id).parent;
                let color = self.node(id).color;
                self.transplant(id, only);
                (only, parent, color)
            }
            (Some(left), Some(right)) => {
                let successor = self.descendant_at_end(right, Side::Left);
                let color = self.node(successor).color;
                let x = self.child(successor, Side::Right);
                let x_parent = if self.node(successor).parent == Some(id) {
                    Some(successor)
                } else {
                    let parent = self.node(successor).parent;
                    self.transplant(successor, x);
                    self.set_child(successor, Side::Right, Some(right));
                    self.node_mut(right).parent = Some(successor);
                    parent
                };
                self.transplant(id, Some(successor));
                self.set_child(successor, Side::Left, Some(left));
                self.node_mut(left).parent = Some(successor);
                self.node_mut(successor).color = self.node(id).color;
                (x, x_parent, color)
            }
        };

        self.recompute_to_root(x_parent);
        if removed_color == NodeColor::Black {
            self.delete_fixup(x, x_parent);
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.children = [None, None];
        node.attached = false;
        node.subtree_delta = node.delta;
        self.len -= 1;
        if self.root.is_none() {
            self.extremes = [K::default(); 2];
        }
        absorbed
    }

    /// Iterate forward over every attached node, with keys from the left side.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            next: self.extreme(Side::Left, Options::exact()),
            direction: Side::Right,
        }
    }

    /// Iterate from `start` towards `direction`, with keys from the left side.
    pub fn iter_from(&self, start: Entry<K>, direction: Side) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            next: Some(start),
            direction,
        }
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        match self.nodes.get(id.index) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("stale delta tree node {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.nodes.get_mut(id.index) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("stale delta tree node {id:?}"),
        }
    }

    fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.node(id).children[side.index()]
    }

    fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        self.node_mut(id).children[side.index()] = child;
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).color == NodeColor::Red)
    }

    fn set_color(&mut self, id: Option<NodeId>, color: NodeColor) {
        if let Some(id) = id {
            self.node_mut(id).color = color;
        }
    }

    fn subtree_delta(&self, id: Option<NodeId>) -> K {
        id.map_or(K::default(), |id| self.node(id).subtree_delta)
    }

    fn side_in_parent(&self, id: NodeId) -> Side {
        let parent = self.node(id).parent.expect("side_in_parent on a root node");
        if self.child(parent, Side::Left) == Some(id) {
            Side::Left
        } else if self.child(parent, Side::Right) == Some(id) {
            Side::Right
        } else {
            panic!("node {id:?} is not a child of its parent {parent:?}");
        }
    }

    fn descendant_at_end(&self, id: NodeId, side: Side) -> NodeId {
        let mut node = id;
        while let Some(child) = self.child(node, side) {
            node = child;
        }
        node
    }

    fn recompute(&mut self, id: NodeId) {
        let node = self.node(id);
        let sum = node.delta
            + self.subtree_delta(node.children[0])
            + self.subtree_delta(node.children[1]);
        self.node_mut(id).subtree_delta = sum;
    }

    /// Recompute subtree deltas from `id` upwards until one is unchanged.
    fn propagate_subtree_delta(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current {
            let before = self.node(node).subtree_delta;
            self.recompute(node);
            if self.node(node).subtree_delta == before {
                break;
            }
            current = self.node(node).parent;
        }
    }

    /// Recompute subtree deltas of `from` and every ancestor.
    fn recompute_to_root(&mut self, from: Option<NodeId>) {
        let mut current = from;
        while let Some(node) = current {
            self.recompute(node);
            current = self.node(node).parent;
        }
    }

    fn init_leaf_delta(&mut self, id: NodeId, delta: K) {
        let node = self.node_mut(id);
        node.delta = delta;
        node.subtree_delta = delta;
        let parent = node.parent;
        self.recompute_to_root(parent);
    }

    /// Rotate `id` down towards `dir`; its child on the other side takes its place.
    fn rotate(&mut self, id: NodeId, dir: Side) {
        let rising = self
            .child(id, dir.other())
            .expect("rotation requires a child on the rising side");
        let moved = self.child(rising, dir);
        self.set_child(id, dir.other(), moved);
        if let Some(moved) = moved {
            self.node_mut(moved).parent = Some(id);
        }

        let top = self.node(id).parent;
        match top {
            None => self.root = Some(rising),
            Some(top) => {
                let side = self.side_in_parent(id);
                self.set_child(top, side, Some(rising));
            }
        }
        self.node_mut(rising).parent = top;
        self.set_child(rising, dir, Some(id));
        self.node_mut(id).parent = Some(rising);

        // The pair's combined subtree delta is unchanged, so ancestors stay valid.
        self.recompute(id);
        self.recompute(rising);
    }

    fn transplant(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.node(old).parent;
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_in_parent(old);
                self.set_child(parent, side, new);
            }
        }
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
    }

    fn insert_fixup(&mut self, id: NodeId) {
        let mut node = id;
        while let Some(parent) = self.node(node).parent
            && self.is_red(Some(parent))
        {
            let grandparent = self
                .node(parent)
                .parent
                .expect("a red node is never the root");
            let parent_side = self.side_in_parent(parent);
            let uncle = self.child(grandparent, parent_side.other());
            if self.is_red(uncle) {
                self.set_color(Some(parent), NodeColor::Black);
                self.set_color(uncle, NodeColor::Black);
                self.set_color(Some(grandparent), NodeColor::Red);
                node = grandparent;
                continue;
            }
            if self.side_in_parent(node) != parent_side {
                node = parent;
                self.rotate(node, parent_side);
            }
            let parent = self.node(node).parent.expect("rotated node has a parent");
            let grandparent = self
                .node(parent)
                .parent
                .expect("a red node is never the root");
            self.set_color(Some(parent), NodeColor::Black);
            self.set_color(Some(grandparent), NodeColor::Red);
            self.rotate(grandparent, parent_side.other());
        }
        self.set_color(self.root, NodeColor::Black);
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut x_parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(parent) = x_parent else { break };
            let side = if self.child(parent, Side::Left) == x {
                Side::Left
            } else {
                Side::Right
            };
            let other = side.other();
            let mut sibling = self
                .child(parent, other)
                .expect("black height guarantees a sibling");
            if self.is_red(Some(sibling)) {
                self.set_color(Some(sibling), NodeColor::Black);
                self.set_color(Some(parent), NodeColor::Red);
                self.rotate(parent, side);
                sibling = self
                    .child(parent, other)
                    .expect("black height guarantees a sibling");
            }
            if !self.is_red(self.child(sibling, Side::Left))
                && !self.is_red(self.child(sibling, Side::Right))
            {
                self.set_color(Some(sibling), NodeColor::Red);
                x = Some(parent);
                x_parent = self.node(parent).parent;
            } else {
                if !self.is_red(self.child(sibling, other)) {
                    self.set_color(self.child(sibling, side), NodeColor::Black);
                    self.set_color(Some(sibling), NodeColor::Red);
                    self.rotate(sibling, other);
                    sibling = self
                        .child(parent, other)
                        .expect("black height guarantees a sibling");
                }
                self.node_mut(sibling).color = self.node(parent).color;
                self.set_color(Some(parent), NodeColor::Black);
                self.set_color(self.child(sibling, other), NodeColor::Black);
                self.rotate(parent, side);
                x = self.root;
                x_parent = None;
            }
        }
        self.set_color(x, NodeColor::Black);
    }

    /// Assert every red-black and subtree-delta invariant.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            return;
        };
        assert_eq!(self.node(root).color, NodeColor::Black, "root must be black");
        assert_eq!(self.node(root).parent, None);
        let mut count = 0;
        self.check_subtree(root, &mut count);
        assert_eq!(count, self.len);
    }

    /// Returns the black height of the subtree.
    #[cfg(test)]
    fn check_subtree(&self, id: NodeId, count: &mut usize) -> usize {
        let node = self.node(id);
        assert!(node.attached);
        *count += 1;
        let mut heights = [0; 2];
        for side in [Side::Left, Side::Right] {
            if let Some(child) = self.child(id, side) {
                assert_eq!(self.node(child).parent, Some(id), "broken parent link");
                if node.color == NodeColor::Red {
                    assert_eq!(
                        self.node(child).color,
                        NodeColor::Black,
                        "red node with red child"
                    );
                }
                heights[side.index()] = self.check_subtree(child, count);
            }
        }
        assert_eq!(heights[0], heights[1], "unequal black height under {id:?}");
        assert_eq!(
            node.subtree_delta,
            node.delta
                + self.subtree_delta(node.children[0])
                + self.subtree_delta(node.children[1]),
            "stale subtree delta at {id:?}"
        );
        heights[0] + usize::from(node.color == NodeColor::Black)
    }
}

/// Lazy, forward-only walk over attached nodes in one direction.
pub struct Iter<'a, K, V> {
    tree: &'a DeltaTree<K, V>,
    next: Option<Entry<K>>,
    direction: Side,
}

impl<'a, K: Delta, V> Iterator for Iter<'a, K, V> {
    type Item = (Entry<K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        let tree = self.tree;
        self.next = match self.direction {
            Side::Right => tree.adjacent(entry.node, Side::Right).map(|node| Entry {
                key: entry.key + tree.delta(entry.node),
                node,
            }),
            Side::Left => tree.adjacent(entry.node, Side::Left).map(|node| Entry {
                key: entry.key - tree.delta(node),
                node,
            }),
        };
        Some((entry, tree.value(entry.node)))
    }
}
