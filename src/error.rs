use std::fmt;

use thiserror::Error;

/// Which of the two trees a violation was found in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeSide {
    Keys,
    Values,
}

impl fmt::Display for TreeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeSide::Keys => f.write_str("key"),
            TreeSide::Values => f.write_str("value"),
        }
    }
}

/// A structural problem found by [`BidirectionalMap::validate`]. Seeing one of
/// these means the map itself is broken, not that it was handed bad input.
///
/// Slots are positions in a tree's node storage.
///
/// [`BidirectionalMap::validate`]: crate::BidirectionalMap::validate
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{side} tree holds {nodes} nodes but the map counts {len} entries")]
    LengthMismatch {
        side: TreeSide,
        nodes: usize,
        len: usize,
    },

    #[error("{side} tree is out of order at slot {slot}")]
    Unordered { side: TreeSide, slot: usize },

    #[error(
        "{side} tree slot {slot} names {recorded:?} as its parent but hangs off {actual:?}"
    )]
    ParentMismatch {
        side: TreeSide,
        slot: usize,
        recorded: Option<usize>,
        actual: Option<usize>,
    },

    #[error("{side} tree slot {slot} links to slot {link}, which does not link back")]
    BrokenLink {
        side: TreeSide,
        slot: usize,
        link: usize,
    },

    #[error("{side} tree slot {slot} is vacant but still referenced")]
    Dangling { side: TreeSide, slot: usize },

    #[error("{side} tree has {live} live nodes but only {reachable} hang off the root")]
    Unreachable {
        side: TreeSide,
        live: usize,
        reachable: usize,
    },
}
