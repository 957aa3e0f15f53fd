//! An unbalanced binary search tree that flattens all its nodes onto a Vec
//! for storage. Nodes address each other by their position in the Vec, which
//! lets a second tree hold on to a node's handle as a cross-link without any
//! shared ownership.

use std::{borrow::Borrow, cmp::Ordering, mem};

use crate::error::{InvariantViolation, TreeSide};

/// Alias for the index of a node in the tree's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

impl NodeHandle {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A node that lives in a tree.
pub(crate) struct Node<T> {
    /// The key (or value) being stored.
    item: T,

    /// The node that owns this one, or None at the root.
    parent: Option<NodeHandle>,

    left: Option<NodeHandle>,
    right: Option<NodeHandle>,

    /// The paired node in the other tree.
    link: NodeHandle,
}

/// What is left over after a node is taken out of the tree.
pub(crate) struct Removed<T> {
    /// The item that was removed.
    pub(crate) item: T,

    /// The handle the removed item was linked to in the other tree.
    pub(crate) link: NodeHandle,

    /// Set when a two-child node was removed by copying its in-order
    /// predecessor up into its slot: `(slot, link)` says the predecessor's
    /// payload now lives at `slot`, so the node at `link` in the other tree
    /// has to be pointed back at it.
    pub(crate) relinked: Option<(NodeHandle, NodeHandle)>,
}

/// A binary search tree with no rebalancing. Nodes go in as leaves, and
/// removal splices them out or replaces them with their in-order
/// predecessor. Removed slots are freelisted and reused by later inserts, so
/// handles are only stable for as long as the node behind them is alive.
pub(crate) struct Tree<T> {
    /// The nodes in the tree. Vacant slots are None.
    store: Vec<Option<Node<T>>>,

    /// Slots which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    root: Option<NodeHandle>,
}

impl<T> Tree<T> {
    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
        }
    }

    /// The number of live nodes in this tree.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// The handle the next call to insert will hand out.
    pub(crate) fn next_handle(&self) -> NodeHandle {
        self.free
            .last()
            .copied()
            .unwrap_or_else(|| NodeHandle(self.store.len()))
    }

    fn get(&self, handle: NodeHandle) -> Option<&Node<T>> {
        self.store.get(handle.0).and_then(Option::as_ref)
    }

    fn node(&self, handle: NodeHandle) -> &Node<T> {
        match self.get(handle) {
            Some(node) => node,
            None => panic!("node handle {} is vacant", handle.0),
        }
    }

    fn node_mut(&mut self, handle: NodeHandle) -> &mut Node<T> {
        match self.store.get_mut(handle.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node handle {} is vacant", handle.0),
        }
    }

    pub(crate) fn item(&self, handle: NodeHandle) -> &T {
        &self.node(handle).item
    }

    pub(crate) fn link(&self, handle: NodeHandle) -> NodeHandle {
        self.node(handle).link
    }

    /// Like link, but None for a vacant slot instead of panicking.
    pub(crate) fn try_link(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.get(handle).map(|node| node.link)
    }

    pub(crate) fn set_link(&mut self, handle: NodeHandle, link: NodeHandle) {
        self.node_mut(handle).link = link;
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    /// Slots in the storage vec, vacant ones included.
    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.store.len()
    }

    /// Takes a node out of its slot and freelists the slot. The node must
    /// already be detached from the tree.
    fn release(&mut self, handle: NodeHandle) -> Node<T> {
        match self.store[handle.0].take() {
            Some(node) => {
                self.free.push(handle);
                node
            }
            None => panic!("node handle {} released twice", handle.0),
        }
    }

    /// Puts `new` wherever `old` hangs in the tree: in its parent's child
    /// slot, or at the root.
    fn replace_child(&mut self, old: NodeHandle, new: Option<NodeHandle>) {
        let parent = self.node(old).parent;

        match parent {
            None => self.root = new,
            Some(p) => {
                let p_node = self.node_mut(p);
                if p_node.left == Some(old) {
                    p_node.left = new;
                } else {
                    debug_assert_eq!(Some(old), p_node.right);
                    p_node.right = new;
                }
            }
        }

        if let Some(child) = new {
            self.node_mut(child).parent = parent;
        }
    }

    /// The rightmost node of the subtree rooted at `handle`.
    fn rightmost(&self, mut handle: NodeHandle) -> NodeHandle {
        while let Some(right) = self.node(handle).right {
            handle = right;
        }
        handle
    }

    /// Removes the node at `handle` from the tree.
    ///
    /// Nodes with at most one child are spliced out. A node with two children
    /// keeps its slot: its in-order predecessor is excised instead, and the
    /// predecessor's item and link are moved up into the slot together.
    pub(crate) fn remove(&mut self, handle: NodeHandle) -> Removed<T> {
        let (left, right) = {
            let node = self.node(handle);
            (node.left, node.right)
        };

        match (left, right) {
            (Some(left), Some(_)) => {
                let pred = self.rightmost(left);
                debug_assert!(self.node(pred).right.is_none());

                // the predecessor's left subtree takes its place, which is
                // the target's own left slot when pred is its left child
                let pred_left = self.node(pred).left;
                self.replace_child(pred, pred_left);
                let pred_node = self.release(pred);

                let target = self.node_mut(handle);
                let item = mem::replace(&mut target.item, pred_node.item);
                let link = mem::replace(&mut target.link, pred_node.link);

                Removed {
                    item,
                    link,
                    relinked: Some((handle, pred_node.link)),
                }
            }
            (child, None) | (None, child) => {
                self.replace_child(handle, child);
                let node = self.release(handle);

                Removed {
                    item: node.item,
                    link: node.link,
                    relinked: None,
                }
            }
        }
    }

    /// Drops every node. Does not free the underlying buffer.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.root = None;
    }

    /// Walks the tree in order, yielding each item with its link.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Inserts a leaf holding `item`, linked to `link` in the other tree.
    /// Equal items go left; callers are expected to have rejected duplicates.
    pub(crate) fn insert(&mut self, item: T, link: NodeHandle) -> NodeHandle {
        let mut parent = None;
        let mut go_right = false;
        let mut cursor = self.root;

        while let Some(h) = cursor {
            let node = self.node(h);
            parent = Some(h);
            go_right = item > node.item;
            cursor = if go_right { node.right } else { node.left };
        }

        let handle = self.next_handle();
        let node = Node {
            item,
            parent,
            left: None,
            right: None,
            link,
        };

        if let Some(free) = self.free.pop() {
            self.store[free.0] = Some(node);
        } else {
            self.store.push(Some(node));
        }

        match parent {
            None => self.root = Some(handle),
            Some(p) if go_right => self.node_mut(p).right = Some(handle),
            Some(p) => self.node_mut(p).left = Some(handle),
        }

        handle
    }

    /// Finds the node holding an item equal to `q`.
    pub(crate) fn find<Q>(&self, q: &Q) -> Option<NodeHandle>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;

        while let Some(h) = cursor {
            let node = self.node(h);
            cursor = match q.cmp(node.item.borrow()) {
                Ordering::Equal => return Some(h),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }

        None
    }

    /// Checks that the tree is ordered, that every parent handle agrees with
    /// the edge that owns it, and that every live slot hangs off the root.
    pub(crate) fn validate(&self, side: TreeSide) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        let mut stack: Vec<(NodeHandle, Option<NodeHandle>)> =
            self.root.into_iter().map(|root| (root, None)).collect();

        while let Some((h, owner)) = stack.pop() {
            let node = self.get(h).ok_or(InvariantViolation::Dangling {
                side,
                slot: h.0,
            })?;

            if node.parent != owner {
                return Err(InvariantViolation::ParentMismatch {
                    side,
                    slot: h.0,
                    recorded: node.parent.map(NodeHandle::index),
                    actual: owner.map(NodeHandle::index),
                });
            }

            reachable += 1;
            if reachable > self.len() {
                // more nodes than live slots means something is shared or
                // cyclic; stop before walking forever
                break;
            }

            stack.extend(node.left.map(|l| (l, Some(h))));
            stack.extend(node.right.map(|r| (r, Some(h))));
        }

        if reachable != self.len() {
            return Err(InvariantViolation::Unreachable {
                side,
                live: self.len(),
                reachable,
            });
        }

        let mut prev: Option<&T> = None;
        for (h, item, _) in self.iter() {
            if prev.map_or(false, |p| p >= item) {
                return Err(InvariantViolation::Unordered { side, slot: h.0 });
            }
            prev = Some(item);
        }

        Ok(())
    }
}

/// An in-order walk over a tree.
pub(crate) struct Iter<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeHandle>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut cursor: Option<NodeHandle>) {
        while let Some(h) = cursor {
            self.stack.push(h);
            cursor = self.tree.node(h).left;
        }
    }

    fn next_handle(&mut self) -> Option<NodeHandle> {
        let h = self.stack.pop()?;
        self.push_left_spine(self.tree.node(h).right);
        Some(h)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeHandle, &'a T, NodeHandle);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.next_handle().map(|h| {
            let node = tree.node(h);
            (h, &node.item, node.link)
        })
    }
}
