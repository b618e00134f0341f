/* Capacity changes and compaction.
 *
 * `resize` keeps every live slot where it is, so indices handed out
 * earlier stay valid. `restore_linearity` rebuilds the array in logical
 * order and invalidates every index held outside the list.
 * */
use crate::error::ListError;
use crate::list::List;
use crate::slot::{Element, Slot};
use crate::storage::SlotArray;
use crate::{ListIndex, NULL_INDEX};
use log::{debug, warn};

impl<T: Element> List<T> {
    /// Change the number of slots (sentinel included) without moving any
    /// live slot.
    ///
    /// Growing links the new slots in front of the free chain. Shrinking
    /// is refused if it cannot hold the live elements or would cut off a
    /// live slot; call [`List::restore_linearity`] first in that case.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), ListError> {
        self.enter()?;

        let old_capacity = self.capacity;
        if new_capacity > old_capacity {
            self.extend_free(new_capacity)?;
        } else if new_capacity < old_capacity {
            self.shrink(new_capacity)?;
        }
        self.finish()?;

        debug!("resized list from {} to {} slots", old_capacity, self.capacity);
        Ok(())
    }

    /// [`List::resize`] and [`List::restore_linearity`] in one pass.
    /// `new_capacity == 0` keeps the current capacity.
    pub fn resize_linear(&mut self, new_capacity: usize) -> Result<(), ListError> {
        self.restore_linearity(new_capacity)
    }

    /* Rebuild the array so that slot `i` holds the `i`-th element.
     * `new_capacity == 0` keeps the current capacity.
     *
     * WARNING every `ListIndex` obtained before this call is stale
     * afterwards.
     * */
    pub fn restore_linearity(&mut self, new_capacity: usize) -> Result<(), ListError> {
        self.enter()?;

        let target = if new_capacity == 0 {
            self.capacity
        } else {
            new_capacity
        };
        let len = self.len;
        if target < len + 1 {
            warn!("cannot compact {} elements into {} slots", len, target);
            return Err(ListError::ShrinkBelowLive {
                requested: target,
                live: len,
            });
        }

        let old = &self.slots;
        let mut cursor = old[NULL_INDEX].next;
        let slots = SlotArray::allocate(target, &self.config, |i| {
            let ix = i as ListIndex;
            if i == 0 {
                if len == 0 {
                    Slot::sentinel(NULL_INDEX, NULL_INDEX)
                } else {
                    Slot::sentinel(1, len as ListIndex)
                }
            } else if i <= len {
                let value = old[cursor].value;
                cursor = old[cursor].next;
                let next = if i == len { NULL_INDEX } else { ix + 1 };
                Slot::live(value, next, ix - 1)
            } else if i + 1 < target {
                Slot::free(ix + 1)
            } else {
                Slot::free(NULL_INDEX)
            }
        })
        .map_err(|err| {
            warn!("failed to compact list into {} slots", target);
            err
        })?;

        self.slots = slots;
        self.capacity = target;
        self.free = if len + 1 < target {
            (len + 1) as ListIndex
        } else {
            NULL_INDEX
        };
        self.finish()?;

        debug!("restored linearity: {} elements in {} slots", len, target);
        Ok(())
    }

    /// True if a forward walk visits slots `1, 2, ..., len` in order.
    pub fn is_linear(&self) -> bool {
        self.indexed()
            .map(|(ix, _)| ix)
            .eq(1..=self.len as ListIndex)
    }

    /* Grow to `new_capacity` slots. The new slots form an ascending run
     * that ends in the old free chain.
     * @requires: `new_capacity > self.capacity`.
     * @ensures: on error nothing changed.
     * NOTE does not re-stamp or validate; the caller finishes.
     * */
    pub(crate) fn extend_free(&mut self, new_capacity: usize) -> Result<(), ListError> {
        let old_capacity = self.capacity;
        let old_free = self.free;
        debug_assert!(new_capacity > old_capacity);

        self.slots
            .grow(new_capacity, &self.config, |i| {
                if i + 1 < new_capacity {
                    Slot::free((i + 1) as ListIndex)
                } else {
                    Slot::free(old_free)
                }
            })
            .map_err(|err| {
                warn!("failed to grow list to {} slots", new_capacity);
                err
            })?;

        self.free = old_capacity as ListIndex;
        self.capacity = new_capacity;

        debug!("grew list from {} to {} slots", old_capacity, new_capacity);
        Ok(())
    }

    fn shrink(&mut self, new_capacity: usize) -> Result<(), ListError> {
        if new_capacity < self.len + 1 {
            warn!("cannot shrink {} elements into {} slots", self.len, new_capacity);
            return Err(ListError::ShrinkBelowLive {
                requested: new_capacity,
                live: self.len,
            });
        }

        let cut = (new_capacity..self.capacity)
            .map(|i| i as ListIndex)
            .find(|&ix| !self.slots[ix].is_free());
        if let Some(index) = cut {
            warn!("shrinking to {} slots would cut off slot {}", new_capacity, index);
            return Err(ListError::ShrinkWouldTruncate {
                requested: new_capacity,
                index,
            });
        }

        self.slots.truncate(new_capacity);
        self.capacity = new_capacity;

        // Re-thread what is left of the free chain, lowest slot first.
        let mut free = NULL_INDEX;
        for ix in (1..new_capacity as ListIndex).rev() {
            if self.slots[ix].is_free() {
                self.slots[ix] = Slot::free(free);
                free = ix;
            }
        }
        self.free = free;

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{Config, Faults, POISON_LINK};

    fn create_list(values: &[char], capacity: usize) -> List<char> {
        let mut list = List::with_config(capacity, Config::paranoid()).unwrap();
        for &v in values {
            list.push_back(v).unwrap();
        }
        list
    }

    fn contents(list: &List<char>) -> Vec<char> {
        list.iter().copied().collect()
    }

    fn free_chain(list: &List<char>) -> Vec<ListIndex> {
        let mut chain = Vec::new();
        let mut ix = list.free_head();
        while ix != NULL_INDEX {
            chain.push(ix);
            ix = list.slots()[ix as usize].next;
        }
        chain
    }

    #[test]
    fn grow_keeps_links_and_values() {
        let mut list = create_list(&['a', 'b', 'c'], 4);
        let b = list.slots()[list.head() as usize].next;
        let before: Vec<_> = list.slots().to_vec();

        list.resize(8).unwrap();
        assert_eq!(list.capacity(), 8);
        assert_eq!(&list.slots()[..4], &before[..4]);
        assert_eq!(contents(&list), vec!['a', 'b', 'c']);
        assert_eq!(list.get(b), Ok(&'b'));
        assert_eq!(free_chain(&list), vec![5, 6, 7, 4]);
        assert_eq!(list.validate(), Faults::empty());
    }

    #[test]
    fn grow_from_full() {
        let mut list = create_list(&['a', 'b'], 2);
        assert_eq!(list.free_head(), NULL_INDEX);
        list.resize(5).unwrap();
        assert_eq!(free_chain(&list), vec![3, 4]);
    }

    #[test]
    fn shrink_drops_free_tail() {
        let mut list = create_list(&['a', 'b'], 6);
        list.resize(4).unwrap();
        assert_eq!(list.capacity(), 4);
        assert_eq!(free_chain(&list), vec![3]);
        assert_eq!(contents(&list), vec!['a', 'b']);
        assert_eq!(list.validate(), Faults::empty());
    }

    #[test]
    fn shrink_refusals() {
        let mut list = create_list(&['a', 'b', 'c'], 6);
        assert_eq!(
            list.resize(3),
            Err(ListError::ShrinkBelowLive {
                requested: 3,
                live: 3
            })
        );

        let a = list.head();
        list.remove(a).unwrap();
        list.push_back('d').unwrap(); // reuses slot 1
        list.push_back('e').unwrap(); // slot 4
        list.remove(1).unwrap();
        assert_eq!(
            list.resize(4),
            Err(ListError::ShrinkWouldTruncate {
                requested: 4,
                index: 4
            })
        );
        assert_eq!(list.capacity(), 7);
        assert_eq!(contents(&list), vec!['b', 'c', 'e']);
        assert_eq!(list.validate(), Faults::empty());
    }

    #[test]
    fn linearity_scenario() {
        let mut list = create_list(&['x', 'a'], 4);
        let x = list.head();
        list.push_front('c').unwrap();
        list.remove(x).unwrap();
        list.insert_after(list.head(), 'b').unwrap();
        // logical c b a, physical order scrambled
        assert_eq!(contents(&list), vec!['c', 'b', 'a']);
        assert!(!list.is_linear());

        list.restore_linearity(10).unwrap();
        assert!(list.is_linear());
        assert_eq!(list.capacity(), 10);

        let slots = list.slots();
        assert_eq!((slots[0].next, slots[0].prev), (1, 3));
        let linked: Vec<(char, ListIndex, ListIndex)> =
            slots[1..4].iter().map(|s| (s.value, s.next, s.prev)).collect();
        assert_eq!(linked, vec![('c', 2, 0), ('b', 3, 1), ('a', 0, 2)]);
        assert_eq!(free_chain(&list), (4..10).collect::<Vec<_>>());
        assert!(slots[4..].iter().all(|s| s.prev == POISON_LINK));
        assert_eq!(list.validate(), Faults::empty());
    }

    #[test]
    fn linearity_keeps_capacity_by_default() {
        let mut list = create_list(&['a', 'b', 'c'], 3);
        list.restore_linearity(0).unwrap();
        assert_eq!(list.capacity(), 4);
        assert_eq!(list.free_head(), NULL_INDEX);
        assert!(list.is_linear());
    }

    #[test]
    fn linearity_on_empty_list() {
        let mut list = create_list(&[], 3);
        list.restore_linearity(2).unwrap();
        assert_eq!(list.capacity(), 2);
        assert_eq!(list.head(), NULL_INDEX);
        assert_eq!(free_chain(&list), vec![1]);
        assert_eq!(list.validate(), Faults::empty());
    }

    #[test]
    fn linearity_refuses_too_small_target() {
        let mut list = create_list(&['a', 'b', 'c'], 5);
        assert_eq!(
            list.restore_linearity(3),
            Err(ListError::ShrinkBelowLive {
                requested: 3,
                live: 3
            })
        );
        list.resize_linear(4).unwrap();
        assert_eq!(list.capacity(), 4);
        assert!(list.is_linear());
    }

    #[test]
    fn allocation_failure_leaves_list_untouched() {
        let config = Config::paranoid().with_max_slots(6);
        let mut list: List<char> = List::with_config(4, config).unwrap();
        for v in ['b', 'c', 'a'] {
            list.push_back(v).unwrap();
        }
        let a = list.tail();
        list.remove(list.head()).unwrap();
        list.push_front('z').unwrap();

        let slots: Vec<_> = list.slots().to_vec();
        let (capacity, free) = (list.capacity(), list.free_head());
        let unchanged = |list: &List<char>| {
            assert_eq!(list.slots(), &slots[..]);
            assert_eq!(list.capacity(), capacity);
            assert_eq!(list.free_head(), free);
            assert_eq!(list.validate(), Faults::empty());
        };

        assert_eq!(
            list.restore_linearity(10),
            Err(ListError::AllocFailed { slots: 10 })
        );
        unchanged(&list);

        assert_eq!(list.resize(10), Err(ListError::AllocFailed { slots: 10 }));
        unchanged(&list);

        assert_eq!(
            list.resize_linear(7),
            Err(ListError::AllocFailed { slots: 7 })
        );
        unchanged(&list);

        assert_eq!(list.get(a), Ok(&'a'));
        list.resize_linear(6).unwrap();
        assert!(list.is_linear());
        assert_eq!(contents(&list), vec!['z', 'c', 'a']);
    }

    #[test]
    fn resize_linear_zero_keeps_capacity() {
        let mut list = create_list(&['a', 'b'], 5);
        list.remove(list.head()).unwrap();
        list.push_back('c').unwrap();
        assert!(!list.is_linear());

        list.resize_linear(0).unwrap();
        assert_eq!(list.capacity(), 6);
        assert!(list.is_linear());
        assert_eq!(contents(&list), vec!['b', 'c']);
        assert_eq!(list.validate(), Faults::empty());
    }
}
