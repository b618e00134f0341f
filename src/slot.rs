use crate::{ListIndex, NULL_INDEX, POISON_LINK};
use std::fmt;
use std::hash::Hash;

/// Payload type stored in a [`List`](crate::List).
///
/// `poison()` is the filler written into every slot that is not part of
/// the active sequence, so a stale read is easy to recognise in a dump.
pub trait Element: Copy + PartialEq + Hash + fmt::Debug {
    fn poison() -> Self;
}

macro_rules! element_impl {
    ($($t:ty => $poison:expr),* $(,)?) => {
        $(
            impl Element for $t {
                #[inline]
                fn poison() -> Self {
                    $poison
                }
            }
        )*
    };
}

element_impl! {
    u8 => 0xDE,
    u16 => 0xDEAD,
    u32 => 0xDEAD_BEEF,
    u64 => 0xDEAD_BEEF_DEAD_BEEF,
    u128 => u128::MAX,
    usize => usize::MAX,
    i8 => i8::MIN,
    i16 => i16::MIN,
    i32 => i32::MIN,
    i64 => i64::MIN,
    i128 => i128::MIN,
    isize => isize::MIN,
    char => char::REPLACEMENT_CHARACTER,
    bool => false,
}

/// One record of the backing array.
///
/// For the sentinel (slot 0) `next` is the head and `prev` the tail of
/// the active sequence. For a free slot `next` is the next free slot and
/// `prev` is [`POISON_LINK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot<T> {
    pub value: T,
    pub next: ListIndex,
    pub prev: ListIndex,
}

impl<T: Element> Slot<T> {
    pub(crate) fn sentinel(head: ListIndex, tail: ListIndex) -> Self {
        Slot {
            value: T::poison(),
            next: head,
            prev: tail,
        }
    }

    pub(crate) fn free(next_free: ListIndex) -> Self {
        Slot {
            value: T::poison(),
            next: next_free,
            prev: POISON_LINK,
        }
    }

    pub(crate) fn live(value: T, next: ListIndex, prev: ListIndex) -> Self {
        Slot { value, next, prev }
    }

    /// True for slots sitting in the free chain (or never used).
    #[inline]
    pub fn is_free(&self) -> bool {
        self.prev == POISON_LINK
    }
}

impl<T: Element> Default for Slot<T> {
    fn default() -> Self {
        Slot::free(NULL_INDEX)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn free_slot_is_poisoned() {
        let slot: Slot<u32> = Slot::free(7);
        assert!(slot.is_free());
        assert_eq!(slot.next, 7);
        assert_eq!(slot.value, 0xDEAD_BEEF);
    }

    #[test]
    fn live_and_sentinel_are_not_free() {
        assert!(!Slot::live(5i32, 0, 0).is_free());
        assert!(!Slot::<i32>::sentinel(NULL_INDEX, NULL_INDEX).is_free());
    }
}
