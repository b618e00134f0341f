/* Structural faults reported by `List::validate`.
 *
 * Each bit is one broken invariant. The bit order is also the display
 * order: dump tooling walks `FaultKind::ALL` and prints whatever is set.
 * */
use bitflags::bitflags;

bitflags! {
    /// Set of structural faults. Empty means the list is sound.
    pub struct Faults: u32 {
        /// Backing array length disagrees with `capacity`.
        const STORAGE_MISMATCH     = 1 << 0;
        /// `len >= capacity`.
        const CAPACITY_BELOW_SIZE  = 1 << 1;
        /// Head link disagrees with the live count.
        const BAD_HEAD             = 1 << 2;
        /// Tail link disagrees with the live count.
        const BAD_TAIL             = 1 << 3;
        /// Free chain is empty while unused slots remain.
        const NO_FREE              = 1 << 4;
        const LEFT_CANARY          = 1 << 5;
        const RIGHT_CANARY         = 1 << 6;
        const LEFT_DATA_CANARY     = 1 << 7;
        const RIGHT_DATA_CANARY    = 1 << 8;
        /// Metadata does not match its stored hash.
        const BROKEN_HASH          = 1 << 9;
        /// Slot array does not match its stored hash.
        const BROKEN_DATA_HASH     = 1 << 10;
        /// Walking `next` from the head does not visit exactly `len`
        /// slots and land back on the sentinel.
        const BROKEN_SEQUENCE      = 1 << 11;
        /// The free chain is cyclic, leaves the array, or has the wrong
        /// length.
        const BROKEN_FREE_SEQUENCE = 1 << 12;
        /// A live slot carries the poison link, or a free one lacks it.
        const POISON_MISMATCH      = 1 << 13;
    }
}

/// One kind of structural fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    StorageMismatch,
    CapacityBelowSize,
    BadHead,
    BadTail,
    NoFree,
    LeftCanary,
    RightCanary,
    LeftDataCanary,
    RightDataCanary,
    BrokenHash,
    BrokenDataHash,
    BrokenSequence,
    BrokenFreeSequence,
    PoisonMismatch,
}

impl FaultKind {
    /// Every kind, in display order.
    pub const ALL: [FaultKind; 14] = [
        FaultKind::StorageMismatch,
        FaultKind::CapacityBelowSize,
        FaultKind::BadHead,
        FaultKind::BadTail,
        FaultKind::NoFree,
        FaultKind::LeftCanary,
        FaultKind::RightCanary,
        FaultKind::LeftDataCanary,
        FaultKind::RightDataCanary,
        FaultKind::BrokenHash,
        FaultKind::BrokenDataHash,
        FaultKind::BrokenSequence,
        FaultKind::BrokenFreeSequence,
        FaultKind::PoisonMismatch,
    ];

    pub fn flag(self) -> Faults {
        match self {
            FaultKind::StorageMismatch => Faults::STORAGE_MISMATCH,
            FaultKind::CapacityBelowSize => Faults::CAPACITY_BELOW_SIZE,
            FaultKind::BadHead => Faults::BAD_HEAD,
            FaultKind::BadTail => Faults::BAD_TAIL,
            FaultKind::NoFree => Faults::NO_FREE,
            FaultKind::LeftCanary => Faults::LEFT_CANARY,
            FaultKind::RightCanary => Faults::RIGHT_CANARY,
            FaultKind::LeftDataCanary => Faults::LEFT_DATA_CANARY,
            FaultKind::RightDataCanary => Faults::RIGHT_DATA_CANARY,
            FaultKind::BrokenHash => Faults::BROKEN_HASH,
            FaultKind::BrokenDataHash => Faults::BROKEN_DATA_HASH,
            FaultKind::BrokenSequence => Faults::BROKEN_SEQUENCE,
            FaultKind::BrokenFreeSequence => Faults::BROKEN_FREE_SEQUENCE,
            FaultKind::PoisonMismatch => Faults::POISON_MISMATCH,
        }
    }

    /// Fixed human-readable label, for report renderers.
    pub fn description(self) -> &'static str {
        match self {
            FaultKind::StorageMismatch => "slot array length differs from capacity",
            FaultKind::CapacityBelowSize => "capacity is not greater than size",
            FaultKind::BadHead => "head is not correct",
            FaultKind::BadTail => "tail is not correct",
            FaultKind::NoFree => "free index is null while free slots remain",
            FaultKind::LeftCanary => "left canary died",
            FaultKind::RightCanary => "right canary died",
            FaultKind::LeftDataCanary => "left data canary died",
            FaultKind::RightDataCanary => "right data canary died",
            FaultKind::BrokenHash => "hash of list is not correct",
            FaultKind::BrokenDataHash => "hash of data is not correct",
            FaultKind::BrokenSequence => "main sequence is broken",
            FaultKind::BrokenFreeSequence => "free sequence is broken",
            FaultKind::PoisonMismatch => "poison marker on wrong slot",
        }
    }
}

impl Faults {
    /// The set kinds, in display order.
    pub fn kinds(self) -> impl Iterator<Item = FaultKind> {
        FaultKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.flag()))
    }
}
