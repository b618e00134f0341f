//! Cache-friendly doubly-linked list.
//!
//! All nodes live in one contiguous array and refer to each other by
//! index. Slot 0 is a sentinel whose links hold the head and tail of
//! the sequence, unused slots are threaded into an intrusive free
//! chain, and every mutation re-validates the structure before it
//! returns.
//!
//! ```
//! use cachelist::{Faults, List};
//!
//! let mut list: List<i32> = List::with_capacity(4).unwrap();
//! let a = list.push_back(1).unwrap();
//! list.push_back(3).unwrap();
//! list.insert_after(a, 2).unwrap();
//!
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! assert_eq!(list.pop_front().unwrap(), 1);
//! assert_eq!(list.validate(), Faults::empty());
//! ```

mod config;
mod cursor;
mod error;
mod fault;
mod integrity;
mod list;
mod resize;
mod slot;
mod storage;
mod validate;

pub use crate::config::Config;
pub use crate::cursor::{Cursor, CursorMut, Indexed, Iter, RawCursor};
pub use crate::error::ListError;
pub use crate::fault::{FaultKind, Faults};
pub use crate::integrity::{Canary, LEFT_CANARY, RIGHT_CANARY};
pub use crate::list::List;
pub use crate::slot::{Element, Slot};

/// Position of a slot in the backing array.
pub type ListIndex = isize;

/// "No link". Also names the sentinel slot.
pub const NULL_INDEX: ListIndex = 0;

/// Stored in `prev` of every free or never-used slot.
pub const POISON_LINK: ListIndex = -1;
