/* Canaries and hashes.
 *
 * The header canaries are plain words stored at both ends of `List`.
 * The data canaries are guard cells at both ends of the backing array
 * (see `storage.rs`), so an off-by-one write past the sentinel or past
 * the last slot lands on a guard instead of on live data.
 *
 * Hashes are crc32: one over every slot, one over the header.
 * */
use crate::slot::{Element, Slot};
use crate::ListIndex;
use crc32fast::Hasher;
use std::hash::Hash;
use std::panic::Location;

pub type Canary = u32;

pub const LEFT_CANARY: Canary = 0xABAD_BABE;
pub const RIGHT_CANARY: Canary = 0xDED0_0DED;

pub(crate) type Checksum = u32;

pub(crate) const NULL_HASH: Checksum = 0;

/// Guard cell value for one end of the slot array.
pub(crate) fn guard_cell<T: Element>(canary: Canary) -> Slot<T> {
    let word = canary as ListIndex;
    Slot {
        value: T::poison(),
        next: word,
        prev: word,
    }
}

pub(crate) fn guard_intact<T: Element>(cell: &Slot<T>, canary: Canary) -> bool {
    let word = canary as ListIndex;
    cell.next == word && cell.prev == word && cell.value == T::poison()
}

pub(crate) fn data_hash<T: Element>(slots: &[Slot<T>]) -> Checksum {
    let mut hasher = Hasher::new();
    slots.hash(&mut hasher);
    hasher.finalize()
}

/// Everything in the list header except the header hash itself.
#[derive(Hash)]
pub(crate) struct HeaderImage {
    pub left_canary: Canary,
    pub capacity: usize,
    pub len: usize,
    pub free: ListIndex,
    pub data_hash: Checksum,
    pub right_canary: Canary,
}

pub(crate) fn header_hash(image: &HeaderImage) -> Checksum {
    let mut hasher = Hasher::new();
    image.hash(&mut hasher);
    hasher.finalize()
}

/// Where a list was created. Diagnostics only.
pub(crate) type Provenance = &'static Location<'static>;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn guard_detects_overwrite() {
        let mut cell: Slot<u64> = guard_cell(LEFT_CANARY);
        assert!(guard_intact(&cell, LEFT_CANARY));
        assert!(!guard_intact(&cell, RIGHT_CANARY));
        cell.next = 3;
        assert!(!guard_intact(&cell, LEFT_CANARY));
    }

    #[test]
    fn data_hash_sees_single_link_change() {
        let mut slots = vec![Slot::<i32>::sentinel(1, 1), Slot::live(9, 0, 0)];
        let before = data_hash(&slots);
        assert_eq!(before, data_hash(&slots));
        slots[1].next = 2;
        assert_ne!(before, data_hash(&slots));
    }
}
