/**
 * Backing array for a list.
 *
 * Logical slot `i` lives at `content[i + offset]`, where `offset` is 1
 * when guard cells are enabled and 0 otherwise.
 *
 * -- GUARDED LAYOUT
 * +-------+----------+--------+-----+--------------+-------+
 * | GUARD | SENTINEL | SLOT 1 | ... | SLOT cap - 1 | GUARD |
 * | left  | slot 0   |        |     |              | right |
 * +-------+----------+--------+-----+--------------+-------+
 *
 * Every allocation goes through `try_reserve_exact`, so running out of
 * memory is reported as `ListError::AllocFailed` and the old contents
 * stay untouched.
 * */
use crate::config::Config;
use crate::error::ListError;
use crate::integrity::{guard_cell, guard_intact, LEFT_CANARY, RIGHT_CANARY};
use crate::slot::{Element, Slot};
use crate::ListIndex;
use std::ops::{Index, IndexMut};

pub(crate) struct SlotArray<T> {
    content: Vec<Slot<T>>,
    guarded: bool,
}

impl<T: Element> SlotArray<T> {
    /// No storage at all. Used after teardown.
    pub fn empty() -> SlotArray<T> {
        SlotArray {
            content: Vec::new(),
            guarded: false,
        }
    }

    /* Allocate `len` logical slots, initialising slot `i` with `fill(i)`.
     * @ensures: on error nothing was allocated.
     * */
    pub fn allocate<F>(len: usize, config: &Config, mut fill: F) -> Result<SlotArray<T>, ListError>
    where
        F: FnMut(usize) -> Slot<T>,
    {
        if !config.allows(len) {
            return Err(ListError::AllocFailed { slots: len });
        }

        let guarded = config.canaries;
        let total = len
            .checked_add(if guarded { 2 } else { 0 })
            .ok_or(ListError::AllocFailed { slots: len })?;
        let mut content = Vec::new();
        content
            .try_reserve_exact(total)
            .map_err(|_| ListError::AllocFailed { slots: len })?;

        if guarded {
            content.push(guard_cell(LEFT_CANARY));
        }
        content.extend((0..len).map(&mut fill));
        if guarded {
            content.push(guard_cell(RIGHT_CANARY));
        }

        Ok(SlotArray { content, guarded })
    }

    fn offset(&self) -> usize {
        if self.guarded {
            1
        } else {
            0
        }
    }

    /// Number of logical slots, sentinel included.
    pub fn len(&self) -> usize {
        self.content.len().saturating_sub(2 * self.offset())
    }

    pub fn as_slice(&self) -> &[Slot<T>] {
        let off = self.offset();
        &self.content[off..off + self.len()]
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    pub fn left_guard_intact(&self) -> bool {
        !self.guarded || self.content.first().map_or(false, |c| guard_intact(c, LEFT_CANARY))
    }

    pub fn right_guard_intact(&self) -> bool {
        !self.guarded || self.content.last().map_or(false, |c| guard_intact(c, RIGHT_CANARY))
    }

    /* Extend to `new_len` logical slots, initialising slot `i` with `fill(i)`.
     * @requires: `new_len >= self.len()`.
     * @ensures: on error the array is unchanged.
     * */
    pub fn grow<F>(&mut self, new_len: usize, config: &Config, mut fill: F) -> Result<(), ListError>
    where
        F: FnMut(usize) -> Slot<T>,
    {
        let old_len = self.len();
        debug_assert!(new_len >= old_len);

        if !config.allows(new_len) {
            return Err(ListError::AllocFailed { slots: new_len });
        }
        if new_len.checked_add(2 * self.offset()).is_none() {
            return Err(ListError::AllocFailed { slots: new_len });
        }
        self.content
            .try_reserve_exact(new_len - old_len)
            .map_err(|_| ListError::AllocFailed { slots: new_len })?;

        let right = if self.guarded { self.content.pop() } else { None };
        self.content.extend((old_len..new_len).map(&mut fill));
        self.content.extend(right);

        Ok(())
    }

    /* Drop every slot at or beyond `new_len`.
     * @requires: `new_len <= self.len()`.
     * */
    pub fn truncate(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.len());

        let right = if self.guarded { self.content.pop() } else { None };
        self.content.truncate(new_len + self.offset());
        self.content.extend(right);
        self.content.shrink_to_fit();
    }

    #[cfg(test)]
    pub fn guard_mut(&mut self, right: bool) -> &mut Slot<T> {
        assert!(self.guarded);
        let ix = if right { self.content.len() - 1 } else { 0 };
        &mut self.content[ix]
    }
}

// NOTE a negative index wraps to a huge `usize` and panics on the
// bounds check; callers range-check anything that came from outside.
impl<T> Index<ListIndex> for SlotArray<T> {
    type Output = Slot<T>;
    fn index(&self, i: ListIndex) -> &Self::Output {
        &self.content[i as usize + usize::from(self.guarded)]
    }
}

impl<T> IndexMut<ListIndex> for SlotArray<T> {
    fn index_mut(&mut self, i: ListIndex) -> &mut Self::Output {
        &mut self.content[i as usize + usize::from(self.guarded)]
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::NULL_INDEX;

    fn create_array(len: usize, config: Config) -> SlotArray<i32> {
        SlotArray::allocate(len, &config, |i| Slot::live(i as i32, NULL_INDEX, NULL_INDEX))
            .unwrap()
    }

    #[test]
    fn guarded_layout() {
        let arr = create_array(4, Config::paranoid());
        assert_eq!(arr.len(), 4);
        assert_eq!(arr.content.len(), 6);
        assert_eq!(arr[0].value, 0);
        assert_eq!(arr[3].value, 3);
        assert!(arr.left_guard_intact());
        assert!(arr.right_guard_intact());
    }

    #[test]
    fn unguarded_layout() {
        let arr = create_array(4, Config::fast());
        assert_eq!(arr.content.len(), 4);
        assert_eq!(arr.as_slice().len(), 4);
        assert!(arr.left_guard_intact());
    }

    #[test]
    fn grow_keeps_guard_at_end() {
        let mut arr = create_array(2, Config::paranoid());
        arr.grow(5, &Config::paranoid(), |i| Slot::live(10 * i as i32, 0, 0))
            .unwrap();
        assert_eq!(arr.len(), 5);
        assert_eq!(arr[1].value, 1);
        assert_eq!(arr[4].value, 40);
        assert!(arr.right_guard_intact());

        arr.truncate(3);
        assert_eq!(arr.len(), 3);
        assert!(arr.right_guard_intact());
    }

    #[test]
    fn slot_limit_is_an_allocation_failure() {
        let config = Config::fast().with_max_slots(4);
        let res = SlotArray::<i32>::allocate(5, &config, |_| Slot::default());
        assert!(matches!(res, Err(ListError::AllocFailed { slots: 5 })));

        let mut arr = create_array(4, config);
        let res = arr.grow(8, &config, |_| Slot::default());
        assert_eq!(res, Err(ListError::AllocFailed { slots: 8 }));
        assert_eq!(arr.len(), 4);
    }

    #[test]
    fn guarded_length_overflow_is_an_allocation_failure() {
        let len = usize::MAX - 1;
        let res = SlotArray::<i32>::allocate(len, &Config::paranoid(), |_| Slot::default());
        assert!(matches!(res, Err(ListError::AllocFailed { slots }) if slots == len));
    }

    #[test]
    fn broken_guard_is_seen() {
        let mut arr = create_array(3, Config::paranoid());
        arr.guard_mut(true).prev = 1;
        assert!(arr.left_guard_intact());
        assert!(!arr.right_guard_intact());
        arr.guard_mut(true).prev = RIGHT_CANARY as ListIndex;
        assert!(arr.right_guard_intact());

        // the payload of a guard cell is part of the canary
        arr.guard_mut(false).value = 9;
        assert!(!arr.left_guard_intact());
    }
}
