/* Validation engine.
 *
 * Cheap checks (cardinality, sentinel links, free head) always run.
 * Canaries, hashes and the two chain walks run when enabled in the
 * list's `Config`. Nothing here ever repairs state.
 *
 * - live count is below capacity
 * - head/tail agree with the live count and terminate at the sentinel
 * - the free head is null only when every data slot is live
 * - canary words and guard cells are untouched
 * - header and slot array match their hashes
 * - `next` from the head visits `len` slots with matching back links and
 *   lands on the sentinel
 * - the free chain is acyclic, in range and `capacity - 1 - len` long
 * - exactly the free slots carry the poison link
 * */
use crate::fault::Faults;
use crate::integrity::{data_hash, header_hash, LEFT_CANARY, RIGHT_CANARY};
use crate::list::List;
use crate::slot::Element;
use crate::{ListIndex, NULL_INDEX};
use std::collections::HashSet;
use unfold::Unfold;

impl<T: Element> List<T> {
    /// Check every invariant and report the broken ones. Empty means the
    /// list is sound.
    pub fn validate(&self) -> Faults {
        let mut faults = Faults::empty();

        if self.slots.len() != self.capacity {
            faults |= Faults::STORAGE_MISMATCH;
        }
        if self.len >= self.capacity {
            faults |= Faults::CAPACITY_BELOW_SIZE;
        }

        if self.config.canaries {
            faults |= self.check_canaries();
        }
        if self.config.hashing {
            faults |= self.check_hashes();
        }

        // Past this point slots get indexed.
        if self.capacity == 0 || faults.contains(Faults::STORAGE_MISMATCH) {
            return faults;
        }

        faults |= self.check_sentinel();

        if self.free == NULL_INDEX && self.len < self.capacity - 1 {
            faults |= Faults::NO_FREE;
        }
        if !self.in_range(self.free) {
            faults |= Faults::BROKEN_FREE_SEQUENCE;
        }

        // The walks are bounded by `len`, which is only trusted below capacity.
        if self.config.deep_checks && !faults.contains(Faults::CAPACITY_BELOW_SIZE) {
            faults |= self.check_sequence();
            faults |= self.check_free_chain();
        }

        faults
    }

    fn in_range(&self, ix: ListIndex) -> bool {
        ix >= 0 && (ix as usize) < self.capacity
    }

    fn check_canaries(&self) -> Faults {
        let mut faults = Faults::empty();

        if self.left_canary != LEFT_CANARY {
            faults |= Faults::LEFT_CANARY;
        }
        if self.right_canary != RIGHT_CANARY {
            faults |= Faults::RIGHT_CANARY;
        }
        if self.capacity > 0 {
            if !self.slots.is_guarded() || !self.slots.left_guard_intact() {
                faults |= Faults::LEFT_DATA_CANARY;
            }
            if !self.slots.is_guarded() || !self.slots.right_guard_intact() {
                faults |= Faults::RIGHT_DATA_CANARY;
            }
        }

        faults
    }

    fn check_hashes(&self) -> Faults {
        let mut faults = Faults::empty();

        if header_hash(&self.header_image()) != self.hash {
            faults |= Faults::BROKEN_HASH;
        }
        if data_hash(self.slots.as_slice()) != self.data_hash {
            faults |= Faults::BROKEN_DATA_HASH;
        }

        faults
    }

    fn check_sentinel(&self) -> Faults {
        let mut faults = Faults::empty();
        let sentinel = &self.slots[NULL_INDEX];
        let (head, tail) = (sentinel.next, sentinel.prev);

        let head_ok = if self.len == 0 {
            head == NULL_INDEX
        } else {
            head != NULL_INDEX && self.in_range(head) && self.slots[head].prev == NULL_INDEX
        };
        if !head_ok {
            faults |= Faults::BAD_HEAD;
        }

        let tail_ok = if self.len == 0 {
            tail == NULL_INDEX
        } else {
            tail != NULL_INDEX && self.in_range(tail) && self.slots[tail].next == NULL_INDEX
        };
        if !tail_ok {
            faults |= Faults::BAD_TAIL;
        }

        faults
    }

    /* Indices reached by following `next` from `start`, `start` included.
     * Stops right after the first index that leaves the array.
     * */
    fn chain(&self, start: ListIndex) -> impl Iterator<Item = ListIndex> + '_ {
        Unfold::new(
            move |ix| ix.and_then(|ixo| self.link_after(ixo)),
            Some(start),
        )
        .take_while(Option::is_some)
        .flatten()
    }

    fn link_after(&self, ix: ListIndex) -> Option<ListIndex> {
        if self.in_range(ix) {
            Some(self.slots[ix].next)
        } else {
            None
        }
    }

    fn check_sequence(&self) -> Faults {
        let mut faults = Faults::empty();
        let len = self.len;

        // Sentinel, `len` data slots, sentinel again.
        let walk: Vec<ListIndex> = self.chain(NULL_INDEX).take(len + 2).collect();

        if walk.len() != len + 2 || walk[len + 1] != NULL_INDEX {
            faults |= Faults::BROKEN_SEQUENCE;
        }

        for pair in walk.windows(2).take(len) {
            let (prev, ix) = (pair[0], pair[1]);
            if ix == NULL_INDEX || !self.in_range(ix) {
                faults |= Faults::BROKEN_SEQUENCE;
                break;
            }
            let slot = &self.slots[ix];
            if slot.is_free() {
                faults |= Faults::POISON_MISMATCH;
            } else if slot.prev != prev {
                faults |= Faults::BROKEN_SEQUENCE;
            }
        }

        let last = walk.get(len).copied().unwrap_or(NULL_INDEX);
        if self.slots[NULL_INDEX].prev != last {
            faults |= Faults::BAD_TAIL;
        }

        faults
    }

    fn check_free_chain(&self) -> Faults {
        let mut faults = Faults::empty();
        let expected = (self.capacity - 1).saturating_sub(self.len);

        let mut seen: HashSet<ListIndex> = HashSet::new();
        let mut count = 0;
        for ix in self
            .chain(self.free)
            .take_while(|&ix| ix != NULL_INDEX)
            .take(expected + 1)
        {
            count += 1;
            if !self.in_range(ix) || !seen.insert(ix) {
                faults |= Faults::BROKEN_FREE_SEQUENCE;
                break;
            }
            if !self.slots[ix].is_free() {
                faults |= Faults::POISON_MISMATCH;
            }
        }
        if count != expected {
            faults |= Faults::BROKEN_FREE_SEQUENCE;
        }

        let poisoned = self.slots().iter().filter(|s| s.is_free()).count();
        if poisoned != expected {
            faults |= Faults::POISON_MISMATCH;
        }

        faults
    }
}
