use std::cmp::{self, Ordering};
use std::collections::VecDeque;
use std::fmt;
use std::mem;

use log::{debug, trace};

/// Identifies a node independently of the value it currently holds.
///
/// Identities are handed out sequentially when nodes are created and survive
/// rotations. When a node with two children is removed, the node that stays
/// in its position takes over the identity of its in-order successor along
/// with the successor's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Returns the raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A set of ordered values stored in an AVL tree.
///
/// ```
/// use avl_engine::Tree;
/// let mut tree = Tree::new();
/// tree.insert(10);
/// tree.insert(20);
/// tree.insert(30);
/// assert_eq!(tree.root().map(|root| *root.value()), Some(20));
/// assert!(tree.remove(&20));
/// assert!(tree.search(&20).is_none());
/// ```
pub struct Tree<K: Ord> {
    root: Link<K>,
    num_nodes: usize,
    next_id: u64,
}

/// A read-only view of one node, handed out to renderers and other observers.
pub struct NodeRef<'a, K> {
    node: &'a Node<K>,
}

type Link<K> = Option<Box<Node<K>>>;

struct Node<K> {
    key: K,
    id: NodeId,
    left: Link<K>,
    right: Link<K>,
    height: usize,
}

impl<K: Ord> Tree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            next_id: 0,
        }
    }

    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, counting a single leaf as 1.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Removes all values and restarts identity assignment, leaving the
    /// tree in the same state as a freshly constructed one.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
        self.next_id = 0;
    }

    /// Returns the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.root.as_deref().map(NodeRef::new)
    }

    /// Looks up the node holding the given value.
    pub fn search(&self, key: &K) -> Option<NodeRef<'_, K>> {
        self.find(key).map(NodeRef::new)
    }

    /// Returns a reference to the stored value equal to the given one.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.find(key).map(|node| &node.key)
    }

    /// Returns true if the tree contains the given value.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a value into the tree.
    /// Returns false, leaving the tree untouched, if the value is already present.
    pub fn insert(&mut self, key: K) -> bool {
        let inserted = Self::insert_into(&mut self.root, key, &mut self.next_id).is_some();
        if inserted {
            self.num_nodes += 1;
            debug!(
                "inserted node {}, tree now holds {} values",
                NodeId(self.next_id - 1),
                self.num_nodes
            );
        }
        inserted
    }

    /// Inserts every value of the sequence in order, skipping values that are
    /// already present. Returns how many nodes were created.
    pub fn insert_batch<I: IntoIterator<Item = K>>(&mut self, keys: I) -> usize {
        keys.into_iter().fold(0, |count, key| {
            if self.insert(key) {
                count + 1
            } else {
                count
            }
        })
    }

    /// Removes a value from the tree.
    /// Returns whether the value was previously in the tree.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = Self::remove_from(&mut self.root, key);
        if removed {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
            debug!("removed a node, tree now holds {} values", self.num_nodes);
            debug_assert!(self.find(key).is_none());
        }
        removed
    }

    /// Visits all nodes level by level, left to right within a level.
    pub fn traverse_level_order<F: FnMut(NodeRef<'_, K>)>(&self, mut f: F) {
        let mut queue: VecDeque<&Node<K>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = queue.pop_front() {
            f(NodeRef::new(node));
            queue.extend(node.left.as_deref());
            queue.extend(node.right.as_deref());
        }
    }

    /// Asserts search order, balance, cached heights, value and identity
    /// uniqueness, and the node count.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        use std::collections::HashSet;

        fn check<K: Ord>(
            link: &Link<K>,
            lower: Option<&K>,
            upper: Option<&K>,
            ids: &mut HashSet<NodeId>,
            next_id: u64,
        ) -> (usize, usize) {
            let node = match link {
                None => return (0, 0),
                Some(node) => node,
            };

            // Check search order against all ancestors, not just the parent
            if let Some(lower) = lower {
                assert!(*lower < node.key);
            }
            if let Some(upper) = upper {
                assert!(node.key < *upper);
            }

            // Check identity
            assert!(node.id.get() < next_id);
            assert!(ids.insert(node.id));

            let (left_height, left_count) = check(&node.left, lower, Some(&node.key), ids, next_id);
            let (right_height, right_count) =
                check(&node.right, Some(&node.key), upper, ids, next_id);

            // Check height
            assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            (node.height, left_count + right_count + 1)
        }

        let mut ids = HashSet::new();
        let (_, num_nodes) = check(&self.root, None, None, &mut ids, self.next_id);

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
    }

    fn find(&self, key: &K) -> Option<&Node<K>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        current
    }

    // Returns None for a duplicate. Otherwise returns how the new value
    // compared against the value at the root of this subtree before any
    // rotation here, Equal meaning the subtree root is the new node.
    fn insert_into(link: &mut Link<K>, key: K, next_id: &mut u64) -> Option<Ordering> {
        let node = match link {
            None => {
                *link = Some(Node::create(key, NodeId(*next_id)));
                *next_id += 1;
                return Some(Ordering::Equal);
            }
            Some(node) => node,
        };

        let direction = key.cmp(&node.key);
        let child_direction = match direction {
            Ordering::Equal => return None,
            Ordering::Less => Self::insert_into(&mut node.left, key, next_id)?,
            Ordering::Greater => Self::insert_into(&mut node.right, key, next_id)?,
        };
        Self::rebalance_after_insert(node, child_direction);
        Some(direction)
    }

    fn remove_from(link: &mut Link<K>, key: &K) -> bool {
        let node = match link {
            None => return false,
            Some(node) => node,
        };

        match key.cmp(&node.key) {
            Ordering::Less => {
                if !Self::remove_from(&mut node.left, key) {
                    return false;
                }
            }
            Ordering::Greater => {
                if !Self::remove_from(&mut node.right, key) {
                    return false;
                }
            }
            Ordering::Equal => {
                if node.left.is_none() || node.right.is_none() {
                    // Stem or leaf, replace by its only child (if any)
                    trace!("unlinking node {}", node.id);
                    let child = node.left.take().or_else(|| node.right.take());
                    *link = child;
                    return true;
                }

                // Take over value and identity of the in-order successor,
                // which leaves the right subtree as the smallest value there.
                if let Some(successor) = Self::remove_min(&mut node.right) {
                    let Node { key, id, .. } = *successor;
                    trace!("node {} takes over successor {}", node.id, id);
                    node.key = key;
                    node.id = id;
                }
            }
        }

        Self::rebalance_after_remove(node);
        true
    }

    // Detaches the leftmost node of a subtree, rebalancing on the way back up.
    fn remove_min(link: &mut Link<K>) -> Option<Box<Node<K>>> {
        let node = link.as_mut()?;
        if node.left.is_some() {
            let min = Self::remove_min(&mut node.left);
            Self::rebalance_after_remove(node);
            return min;
        }

        let mut min = link.take()?;
        *link = min.right.take();
        Some(min)
    }

    // Exactly one value was added below this node, on the side given by the
    // comparison with the heavy child, so that comparison selects the case.
    fn rebalance_after_insert(node: &mut Box<Node<K>>, child_direction: Ordering) {
        node.adjust_height();
        let balance = node.balance_factor();
        if balance > 1 {
            match child_direction {
                // Left-Left
                Ordering::Less => Self::rotate_right(node),
                // Left-Right
                Ordering::Greater => {
                    if let Some(left) = node.left.as_mut() {
                        Self::rotate_left(left);
                    }
                    Self::rotate_right(node);
                }
                Ordering::Equal => {}
            }
        } else if balance < -1 {
            match child_direction {
                // Right-Right
                Ordering::Greater => Self::rotate_left(node),
                // Right-Left
                Ordering::Less => {
                    if let Some(right) = node.right.as_mut() {
                        Self::rotate_right(right);
                    }
                    Self::rotate_left(node);
                }
                Ordering::Equal => {}
            }
        }
    }

    // The removed value is no longer known here, so the balance of the heavy
    // child selects the case.
    fn rebalance_after_remove(node: &mut Box<Node<K>>) {
        node.adjust_height();
        let balance = node.balance_factor();
        if balance > 1 {
            // Rebalance right
            if let Some(left) = node.left.as_mut() {
                if left.balance_factor() < 0 {
                    Self::rotate_left(left);
                }
            }
            Self::rotate_right(node);
        } else if balance < -1 {
            // Rebalance left
            if let Some(right) = node.right.as_mut() {
                if right.balance_factor() > 0 {
                    Self::rotate_right(right);
                }
            }
            Self::rotate_left(node);
        }
    }

    fn rotate_left(node: &mut Box<Node<K>>) {
        if let Some(mut right) = node.right.take() {
            trace!("rotating left around node {}", node.id);
            node.right = right.left.take();
            node.adjust_height();
            mem::swap(node, &mut right);
            // `node` is now the former right child, `right` the former subtree root
            node.left = Some(right);
            node.adjust_height();
        }
    }

    fn rotate_right(node: &mut Box<Node<K>>) {
        if let Some(mut left) = node.left.take() {
            trace!("rotating right around node {}", node.id);
            node.left = left.right.take();
            node.adjust_height();
            mem::swap(node, &mut left);
            // `node` is now the former left child, `left` the former subtree root
            node.right = Some(left);
            node.adjust_height();
        }
    }
}

impl<K: Ord> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for Tree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.insert_batch(iter);
    }
}

impl<K: Ord> FromIterator<K> for Tree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.insert_batch(iter);
        tree
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for Tree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.num_nodes)
            .field("root", &self.root())
            .finish()
    }
}

impl<'a, K> NodeRef<'a, K> {
    fn new(node: &'a Node<K>) -> Self {
        Self { node }
    }

    /// Returns the value held by this node.
    pub fn value(&self) -> &'a K {
        &self.node.key
    }

    /// Returns the identity of this node.
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Returns the height of the subtree rooted at this node, 1 for a leaf.
    pub fn height(&self) -> usize {
        self.node.height
    }

    /// Returns the height of the left subtree minus the height of the right subtree.
    pub fn balance_factor(&self) -> isize {
        self.node.balance_factor()
    }

    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.node.left.as_deref().map(NodeRef::new)
    }

    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.node.right.as_deref().map(NodeRef::new)
    }

    pub fn is_leaf(&self) -> bool {
        self.node.left.is_none() && self.node.right.is_none()
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", self.value())
            .field("id", &self.id())
            .field("height", &self.height())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K> Node<K> {
    fn create(key: K, id: NodeId) -> Box<Self> {
        Box::new(Node {
            key,
            id,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn left_height(&self) -> usize {
        height(&self.left)
    }

    fn right_height(&self) -> usize {
        height(&self.right)
    }

    fn balance_factor(&self) -> isize {
        self.left_height() as isize - self.right_height() as isize
    }

    fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(self.left_height(), self.right_height());
    }
}
