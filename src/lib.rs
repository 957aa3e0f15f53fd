//! A one-to-one map you can read from either end.
//!
//! ```
//! use bidimap::BidirectionalMap;
//!
//! let mut map = BidirectionalMap::new();
//! assert!(map.put("apple", 3));
//! assert!(map.put("banana", 5));
//!
//! // neither side takes duplicates
//! assert!(!map.put("apple", 4));
//! assert!(!map.put("cherry", 5));
//!
//! assert_eq!(Some(&5), map.get_value("banana"));
//! assert_eq!(Some(&"apple"), map.get_key(&3));
//! assert_eq!("(apple, 3), (banana, 5)", map.in_order_traverse_by_keys());
//! ```

mod bidirectional_map;
mod error;
#[cfg(feature = "shared_map")]
mod shared_map;
mod tracing_helpers;
mod tree;

pub use bidirectional_map::BidirectionalMap;
pub use error::{InvariantViolation, TreeSide};
#[cfg(feature = "shared_map")]
pub use shared_map::SharedBidirectionalMap;
