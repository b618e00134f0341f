use crate::{Faults, ListIndex};
use std::fmt;

/// Operation-local failure.
///
/// The list is left exactly as it was before the failing call, except
/// for [`ListError::Corrupted`], which means the structure must not be
/// mutated again until it is re-initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The list was destroyed and not re-initialised.
    TornDown,
    /// The sentinel was passed where a data slot is required.
    NullAnchor,
    /// Anchor is outside `[0, capacity)`.
    AnchorOutOfRange { index: ListIndex, capacity: usize },
    /// Anchor names a free or never-used slot.
    AnchorNotLive { index: ListIndex },
    /// Removal from an empty list.
    Empty,
    /// The backing array could not be allocated.
    AllocFailed { slots: usize },
    /// Requested capacity cannot hold the live elements plus the sentinel.
    ShrinkBelowLive { requested: usize, live: usize },
    /// Shrinking would cut off the live slot at `index`.
    ShrinkWouldTruncate { requested: usize, index: ListIndex },
    /// Cursor is already on the first or last element.
    EndOfSequence,
    /// Validation failed; see [`List::validate`](crate::List::validate).
    Corrupted(Faults),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::TornDown => write!(f, "list has been destroyed"),
            ListError::NullAnchor => write!(f, "anchor is the sentinel slot"),
            ListError::AnchorOutOfRange { index, capacity } => {
                write!(f, "anchor {} is outside capacity {}", index, capacity)
            }
            ListError::AnchorNotLive { index } => {
                write!(f, "anchor {} does not name a live slot", index)
            }
            ListError::Empty => write!(f, "list is empty"),
            ListError::AllocFailed { slots } => {
                write!(f, "failed to allocate {} slots", slots)
            }
            ListError::ShrinkBelowLive { requested, live } => write!(
                f,
                "capacity {} cannot hold {} elements and the sentinel",
                requested, live
            ),
            ListError::ShrinkWouldTruncate { requested, index } => write!(
                f,
                "capacity {} would cut off live slot {}",
                requested, index
            ),
            ListError::EndOfSequence => write!(f, "cursor reached the end of the sequence"),
            ListError::Corrupted(faults) => {
                write!(f, "list is corrupted (faults {:#06x})", faults.bits())
            }
        }
    }
}

impl std::error::Error for ListError {}
