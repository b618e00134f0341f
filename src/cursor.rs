//! Traversal.
//!
//! [`Cursor`] and [`CursorMut`] are the same [`RawCursor`] over a shared
//! or a unique borrow of the list; only the unique one can write.
//! [`Iter`] and [`Indexed`] are plain std iterators for the common case.

use crate::error::ListError;
use crate::list::List;
use crate::slot::Element;
use crate::{ListIndex, NULL_INDEX};
use std::iter::FusedIterator;
use std::ops::Deref;

/// A position in a list: the owning list plus the current slot index.
///
/// Starts at the head. Never stops on the sentinel unless the list is
/// empty, in which case every read fails.
pub struct RawCursor<L> {
    list: L,
    current: ListIndex,
}

pub type Cursor<'a, T> = RawCursor<&'a List<T>>;

pub type CursorMut<'a, T> = RawCursor<&'a mut List<T>>;

impl<T: Element, L: Deref<Target = List<T>>> RawCursor<L> {
    fn new(list: L) -> Self {
        let current = list.head();
        RawCursor { list, current }
    }

    /// Slot index of the current element.
    pub fn index(&self) -> ListIndex {
        self.current
    }

    pub fn value(&self) -> Result<&T, ListError> {
        self.list.get(self.current)
    }

    /// False on a corrupted list.
    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }

    /// False on a corrupted list.
    pub fn has_prev(&self) -> bool {
        self.list.validate().is_empty()
            && self.current != NULL_INDEX
            && self.current != self.list.head()
    }

    pub fn move_next(&mut self) -> Result<(), ListError> {
        self.list.enter()?;
        self.list.check_range(self.current)?;
        self.current = self.next_index().ok_or(ListError::EndOfSequence)?;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<(), ListError> {
        self.list.enter()?;
        self.list.check_range(self.current)?;
        if !self.has_prev() {
            return Err(ListError::EndOfSequence);
        }
        self.current = self.list.slots()[self.current as usize].prev;
        Ok(())
    }

    /// Back to the head.
    pub fn reset(&mut self) {
        self.current = self.list.head();
    }

    fn next_index(&self) -> Option<ListIndex> {
        if !self.list.validate().is_empty() {
            return None;
        }
        let next = self.list.slot(self.current)?.next;
        // The tail links back to the sentinel, which is not an element.
        if next == NULL_INDEX || next == self.list.head() {
            None
        } else {
            Some(next)
        }
    }
}

impl<'a, T: Element> RawCursor<&'a mut List<T>> {
    /// Overwrite the current element, returning the old value.
    pub fn set(&mut self, value: T) -> Result<T, ListError> {
        self.list.set(self.current, value)
    }
}

/// `(slot index, value)` pairs in logical order.
pub struct Indexed<'a, T: Element> {
    list: &'a List<T>,
    front: ListIndex,
    back: ListIndex,
    remaining: usize,
}

impl<'a, T: Element> Iterator for Indexed<'a, T> {
    type Item = (ListIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let ix = self.front;
        let slot = self.list.slot(ix)?;
        self.front = slot.next;
        self.remaining -= 1;
        Some((ix, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Element> DoubleEndedIterator for Indexed<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let ix = self.back;
        let slot = self.list.slot(ix)?;
        self.back = slot.prev;
        self.remaining -= 1;
        Some((ix, &slot.value))
    }
}

impl<'a, T: Element> ExactSizeIterator for Indexed<'a, T> {}

impl<'a, T: Element> FusedIterator for Indexed<'a, T> {}

/// Values in logical order.
pub struct Iter<'a, T: Element> {
    inner: Indexed<'a, T>,
}

impl<'a, T: Element> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Element> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, T: Element> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: Element> FusedIterator for Iter<'a, T> {}

impl<T: Element> List<T> {
    pub fn cursor(&self) -> Cursor<'_, T> {
        RawCursor::new(self)
    }

    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        RawCursor::new(self)
    }

    /// Walks the links; does not validate.
    pub fn indexed(&self) -> Indexed<'_, T> {
        Indexed {
            list: self,
            front: self.head(),
            back: self.tail(),
            remaining: self.len,
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.indexed(),
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::Config;

    fn create_list(values: &[i64]) -> List<i64> {
        let mut list = List::with_config(2, Config::paranoid()).unwrap();
        for &v in values {
            list.push_front(v).unwrap();
        }
        list
    }

    #[test]
    fn cursor_walks_both_ways() {
        let list = create_list(&[3, 2, 1]);
        let mut cursor = list.cursor();
        assert!(!cursor.has_prev());

        let mut seen = vec![*cursor.value().unwrap()];
        while cursor.has_next() {
            cursor.move_next().unwrap();
            seen.push(*cursor.value().unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(cursor.index(), list.tail());
        assert_eq!(cursor.move_next(), Err(ListError::EndOfSequence));
        assert_eq!(cursor.index(), list.tail());

        let mut back = vec![*cursor.value().unwrap()];
        while cursor.has_prev() {
            cursor.move_prev().unwrap();
            back.push(*cursor.value().unwrap());
        }
        assert_eq!(back, vec![3, 2, 1]);
        assert_eq!(cursor.move_prev(), Err(ListError::EndOfSequence));
    }

    #[test]
    fn cursor_on_empty_list() {
        let list = create_list(&[]);
        let mut cursor = list.cursor();
        assert_eq!(cursor.index(), NULL_INDEX);
        assert_eq!(cursor.value(), Err(ListError::NullAnchor));
        assert!(!cursor.has_next());
        assert!(!cursor.has_prev());
        assert_eq!(cursor.move_next(), Err(ListError::EndOfSequence));
    }

    #[test]
    fn cursor_refuses_corrupted_list() {
        let mut list = create_list(&[1, 2]);
        let head = list.head();
        list.slots[head].value = 5;

        let mut cursor = list.cursor();
        assert!(matches!(cursor.value(), Err(ListError::Corrupted(_))));
        assert!(!cursor.has_next());
        assert!(matches!(cursor.move_next(), Err(ListError::Corrupted(_))));
    }

    #[test]
    fn cursor_mut_sets_values() {
        let mut list = create_list(&[3, 2, 1]);
        let mut cursor = list.cursor_mut();
        loop {
            let doubled = *cursor.value().unwrap() * 2;
            cursor.set(doubled).unwrap();
            if cursor.move_next().is_err() {
                break;
            }
        }
        cursor.reset();
        assert_eq!(cursor.value(), Ok(&2));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![2, 4, 6]);
        assert!(list.validate().is_empty());
    }

    #[test]
    fn iterators_agree_both_directions() {
        let list = create_list(&[4, 3, 2, 1]);
        let forward: Vec<i64> = list.iter().copied().collect();
        let mut backward: Vec<i64> = list.iter().rev().copied().collect();
        backward.reverse();
        assert_eq!(forward, vec![1, 2, 3, 4]);
        assert_eq!(forward, backward);
        assert_eq!(list.iter().len(), 4);

        let indices: Vec<ListIndex> = list.indexed().map(|(ix, _)| ix).collect();
        assert_eq!(indices.first(), Some(&list.head()));
        assert_eq!(indices.last(), Some(&list.tail()));

        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.len(), 2);
        assert_eq!((&list).into_iter().count(), 4);
    }
}
