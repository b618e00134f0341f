/**
 * Array-backed doubly-linked list with an intrusive free chain.
 *
 * -- SLOT ARRAY
 * +----------+--------+--------+--------+-----
 * | SENTINEL | SLOT 1 | SLOT 2 | SLOT 3 | ...
 * | next=hd  | live   | free   | live   |  ..
 * | prev=tl  |        | prev=P |        |   .
 * +----------+--------+--------+--------+-
 *
 * The active sequence is circular through the sentinel: the head's
 * `prev` and the tail's `next` are both 0. The free chain starts at
 * `free`, runs through `next` and ends in 0; every slot on it carries
 * `POISON_LINK` in `prev`.
 *
 * Every mutating call validates on entry, re-stamps the hashes and
 * validates again before it returns.
 * */
use crate::config::Config;
use crate::error::ListError;
use crate::integrity::{
    data_hash, header_hash, Canary, Checksum, HeaderImage, Provenance, LEFT_CANARY, NULL_HASH,
    RIGHT_CANARY,
};
use crate::slot::{Element, Slot};
use crate::storage::SlotArray;
use crate::{ListIndex, NULL_INDEX};
use log::{debug, error, trace, warn};
use std::fmt;
use std::panic::Location;

/* @item: `slots`: the backing array; slot 0 is the sentinel.
 * @item: `capacity`: number of slots, sentinel included.
 * @item: `len`: number of live slots.
 * @item: `free`: first slot of the free chain, 0 when exhausted.
 * @item: `data_hash`, `hash`: crc32 of the slots and of the header.
 * */
pub struct List<T: Element> {
    pub(crate) left_canary: Canary,
    pub(crate) slots: SlotArray<T>,
    pub(crate) capacity: usize,
    pub(crate) len: usize,
    pub(crate) free: ListIndex,
    pub(crate) data_hash: Checksum,
    pub(crate) hash: Checksum,
    pub(crate) right_canary: Canary,
    pub(crate) config: Config,
    pub(crate) created_at: Option<Provenance>,
}

/* A fresh array of `len` slots: sentinel pointing at itself, every
 * other slot on one ascending free chain.
 * */
pub(crate) fn fresh_slots<T: Element>(
    len: usize,
    config: &Config,
) -> Result<(SlotArray<T>, ListIndex), ListError> {
    let slots = SlotArray::allocate(len, config, |i| {
        if i == 0 {
            Slot::sentinel(NULL_INDEX, NULL_INDEX)
        } else if i + 1 < len {
            Slot::free((i + 1) as ListIndex)
        } else {
            Slot::free(NULL_INDEX)
        }
    })?;
    let free = if len > 1 { 1 } else { NULL_INDEX };
    Ok((slots, free))
}

/// Slot count for `capacity` elements plus the sentinel.
fn with_sentinel(capacity: usize) -> Result<usize, ListError> {
    capacity
        .checked_add(1)
        .ok_or(ListError::AllocFailed { slots: capacity })
}

impl<T: Element> List<T> {
    /// Room for `capacity` elements, with [`Config::default`].
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Result<List<T>, ListError> {
        List::with_config(capacity, Config::default())
    }

    /// Room for `capacity` elements. The backing array gets one more
    /// slot for the sentinel.
    #[track_caller]
    pub fn with_config(capacity: usize, config: Config) -> Result<List<T>, ListError> {
        let caller = Location::caller();
        let total = with_sentinel(capacity)?;
        let (slots, free) = fresh_slots(total, &config)?;
        let canaries = config.canaries;
        let mut list = List {
            left_canary: if canaries { LEFT_CANARY } else { 0 },
            slots,
            capacity: total,
            len: 0,
            free,
            data_hash: NULL_HASH,
            hash: NULL_HASH,
            right_canary: if canaries { RIGHT_CANARY } else { 0 },
            config,
            created_at: if config.any_integrity() { Some(caller) } else { None },
        };
        list.finish()?;

        debug!("created list with {} slots", list.capacity);
        Ok(list)
    }

    /// Release the backing array. Until [`List::reinit`] every
    /// operation fails with [`ListError::TornDown`].
    pub fn destroy(&mut self) -> Result<(), ListError> {
        self.enter()?;

        self.slots = SlotArray::empty();
        self.capacity = 0;
        self.len = 0;
        self.free = NULL_INDEX;
        self.stamp();

        debug!("destroyed list");
        Ok(())
    }

    /// Start over with room for `capacity` elements. Any previous
    /// contents are dropped.
    #[track_caller]
    pub fn reinit(&mut self, capacity: usize) -> Result<(), ListError> {
        let total = with_sentinel(capacity)?;
        let (slots, free) = fresh_slots(total, &self.config)?;
        self.slots = slots;
        self.capacity = total;
        self.len = 0;
        self.free = free;
        if self.config.any_integrity() {
            self.created_at = Some(Location::caller());
        }
        self.finish()?;

        debug!("reinitialised list with {} slots", self.capacity);
        Ok(())
    }

    // ---------------------------------------------------------------
    // read access

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, sentinel included. 0 after teardown.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn head(&self) -> ListIndex {
        if self.capacity == 0 {
            NULL_INDEX
        } else {
            self.slots[NULL_INDEX].next
        }
    }

    pub fn tail(&self) -> ListIndex {
        if self.capacity == 0 {
            NULL_INDEX
        } else {
            self.slots[NULL_INDEX].prev
        }
    }

    /// First slot of the free chain.
    pub fn free_head(&self) -> ListIndex {
        self.free
    }

    /// Every slot, sentinel and free slots included.
    pub fn slots(&self) -> &[Slot<T>] {
        self.slots.as_slice()
    }

    pub fn slot(&self, index: ListIndex) -> Option<&Slot<T>> {
        usize::try_from(index).ok().and_then(|i| self.slots().get(i))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Call site that created (or last re-initialised) the list, if any
    /// integrity layer is enabled.
    pub fn created_at(&self) -> Option<&'static Location<'static>> {
        self.created_at
    }

    /// Value of the live slot `anchor`.
    pub fn get(&self, anchor: ListIndex) -> Result<&T, ListError> {
        self.enter()?;
        self.check_live(anchor)?;
        Ok(&self.slots[anchor].value)
    }

    // ---------------------------------------------------------------
    // mutation

    /// Replace the value of the live slot `anchor`, returning the old one.
    pub fn set(&mut self, anchor: ListIndex, value: T) -> Result<T, ListError> {
        self.enter()?;
        self.check_live(anchor)?;

        let old = std::mem::replace(&mut self.slots[anchor].value, value);
        self.finish()?;

        trace!("set slot {}", anchor);
        Ok(old)
    }

    /* Link `value` in right after `anchor` and return its slot.
     * `anchor` may be the sentinel, which makes the new slot the head.
     * Doubles the capacity first if the free chain is exhausted.
     * */
    pub fn insert_after(&mut self, anchor: ListIndex, value: T) -> Result<ListIndex, ListError> {
        self.enter()?;
        self.check_range(anchor)?;
        if self.slots[anchor].is_free() {
            warn!("insert after non-live slot {}", anchor);
            return Err(ListError::AnchorNotLive { index: anchor });
        }

        if self.free == NULL_INDEX {
            debug_assert_eq!(self.len, self.capacity - 1);
            let doubled = self.capacity.checked_mul(2).ok_or(ListError::AllocFailed {
                slots: usize::MAX,
            })?;
            self.extend_free(doubled)?;
        }

        let slot = self.take_free();
        let next = self.slots[anchor].next;

        self.slots[slot] = Slot::live(value, next, anchor);
        self.slots[next].prev = slot;
        self.slots[anchor].next = slot;
        self.len += 1;

        self.finish()?;

        trace!(
            "inserted slot {} after {} (len {}, capacity {})",
            slot,
            anchor,
            self.len,
            self.capacity
        );
        Ok(slot)
    }

    pub fn push_back(&mut self, value: T) -> Result<ListIndex, ListError> {
        self.insert_after(self.tail(), value)
    }

    pub fn push_front(&mut self, value: T) -> Result<ListIndex, ListError> {
        self.insert_after(NULL_INDEX, value)
    }

    /// Unlink the live slot `anchor`, return its value and put the slot
    /// back on the free chain.
    pub fn remove(&mut self, anchor: ListIndex) -> Result<T, ListError> {
        self.enter()?;
        if self.len == 0 {
            warn!("remove from empty list");
            return Err(ListError::Empty);
        }
        self.check_live(anchor)?;

        let Slot { value, next, prev } = self.slots[anchor];
        self.slots[next].prev = prev;
        self.slots[prev].next = next;
        self.release(anchor);
        self.len -= 1;

        self.finish()?;

        trace!("removed slot {} (len {})", anchor, self.len);
        Ok(value)
    }

    pub fn pop_back(&mut self) -> Result<T, ListError> {
        self.remove(self.tail())
    }

    pub fn pop_front(&mut self) -> Result<T, ListError> {
        self.remove(self.head())
    }

    // ---------------------------------------------------------------
    // free chain

    /* Pop the first free slot.
     * @requires: `self.free != NULL_INDEX`.
     * NOTE the caller must overwrite the slot right away, it still
     * carries the poison link.
     * */
    fn take_free(&mut self) -> ListIndex {
        debug_assert_ne!(self.free, NULL_INDEX);
        let slot = self.free;
        self.free = self.slots[slot].next;
        slot
    }

    fn release(&mut self, slot: ListIndex) {
        self.slots[slot] = Slot::free(self.free);
        self.free = slot;
    }

    // ---------------------------------------------------------------
    // checks and bookkeeping

    pub(crate) fn check_range(&self, anchor: ListIndex) -> Result<(), ListError> {
        if anchor < 0 || anchor as usize >= self.capacity {
            warn!("anchor {} outside capacity {}", anchor, self.capacity);
            return Err(ListError::AnchorOutOfRange {
                index: anchor,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// `anchor` must name a data slot that is on the active sequence.
    pub(crate) fn check_live(&self, anchor: ListIndex) -> Result<(), ListError> {
        self.check_range(anchor)?;
        if anchor == NULL_INDEX {
            warn!("sentinel used as a data slot");
            return Err(ListError::NullAnchor);
        }
        if self.slots[anchor].is_free() {
            warn!("slot {} is not live", anchor);
            return Err(ListError::AnchorNotLive { index: anchor });
        }
        Ok(())
    }

    /// Entry check shared by every operation.
    pub(crate) fn enter(&self) -> Result<(), ListError> {
        if self.capacity == 0 {
            warn!("operation on destroyed list");
            return Err(ListError::TornDown);
        }
        self.check()
    }

    pub(crate) fn check(&self) -> Result<(), ListError> {
        let faults = self.validate();
        if faults.is_empty() {
            Ok(())
        } else {
            error!(
                "list created at {:?} is corrupted: {:?}",
                self.created_at, faults
            );
            Err(ListError::Corrupted(faults))
        }
    }

    pub(crate) fn header_image(&self) -> HeaderImage {
        HeaderImage {
            left_canary: self.left_canary,
            capacity: self.capacity,
            len: self.len,
            free: self.free,
            data_hash: self.data_hash,
            right_canary: self.right_canary,
        }
    }

    /// Recompute both hashes. No-op when hashing is off.
    pub(crate) fn stamp(&mut self) {
        if self.config.hashing {
            self.data_hash = data_hash(self.slots.as_slice());
            self.hash = header_hash(&self.header_image());
        }
    }

    /// Exit step shared by every mutation.
    pub(crate) fn finish(&mut self) -> Result<(), ListError> {
        self.stamp();
        self.check()
    }
}

impl<T: Element> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
