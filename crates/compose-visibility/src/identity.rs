//! Element identity side-table.
//!
//! The notifier never annotates host elements. Instead it keeps a non-owning
//! mapping from element to [`ElementId`], so watching an element never extends
//! its lifetime.

use std::fmt;
use std::num::NonZeroU64;
use std::rc::{Rc, Weak};

use crate::collections::map::HashMap;

/// Identifier assigned to an element the first time it is watched.
///
/// Identifiers are never zero and are handed out in increasing order by a
/// single notifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(NonZeroU64);

impl ElementId {
    /// Returns `None` for zero.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of [`ElementId`]s, starting at 1.
#[derive(Debug)]
pub(crate) struct ElementIdAllocator {
    next: u64,
}

impl ElementIdAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn allocate(&mut self) -> ElementId {
        let raw = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        ElementId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }
}

/// Weak association between host elements and their identifiers.
///
/// Implementations must not keep elements alive. An element maps to at most
/// one identifier at a time.
pub trait IdentityTable<E>: Default {
    /// Identifier currently associated with `element`.
    fn get(&self, element: &E) -> Option<ElementId>;

    /// Associates `element` with `id`, replacing any previous association.
    fn assign(&mut self, element: &E, id: ElementId);

    /// Removes and returns the association for `element`.
    fn take(&mut self, element: &E) -> Option<ElementId>;

    /// Drops associations whose element has been released and returns their
    /// identifiers. Tables backed by a host-managed weak map can't enumerate
    /// and return nothing.
    fn reclaim(&mut self) -> Vec<ElementId> {
        Vec::new()
    }
}

/// Identity table for elements shared through [`Rc`].
///
/// Elements are keyed by pointer address. The stored [`Weak`] keeps the
/// allocation reserved, so an address is never handed to another element
/// while its entry exists.
pub struct WeakIdentityTable<T: ?Sized> {
    entries: HashMap<usize, (Weak<T>, ElementId)>,
}

impl<T: ?Sized> fmt::Debug for WeakIdentityTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakIdentityTable")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

impl<T: ?Sized> Default for WeakIdentityTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::default(),
        }
    }
}

impl<T: ?Sized> WeakIdentityTable<T> {
    fn address(element: &Rc<T>) -> usize {
        Rc::as_ptr(element) as *const () as usize
    }

    fn live_entry(&self, element: &Rc<T>) -> Option<ElementId> {
        let (weak, id) = self.entries.get(&Self::address(element))?;
        (weak.strong_count() > 0).then_some(*id)
    }

    /// Number of stored associations, including released elements not yet
    /// reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> IdentityTable<Rc<T>> for WeakIdentityTable<T> {
    fn get(&self, element: &Rc<T>) -> Option<ElementId> {
        self.live_entry(element)
    }

    fn assign(&mut self, element: &Rc<T>, id: ElementId) {
        self.entries
            .insert(Self::address(element), (Rc::downgrade(element), id));
    }

    fn take(&mut self, element: &Rc<T>) -> Option<ElementId> {
        let id = self.live_entry(element)?;
        self.entries.remove(&Self::address(element));
        Some(id)
    }

    fn reclaim(&mut self) -> Vec<ElementId> {
        let mut released = Vec::new();
        self.entries.retain(|_, (weak, id)| {
            if weak.strong_count() > 0 {
                true
            } else {
                released.push(*id);
                false
            }
        });
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_starts_above_zero_and_increments() {
        let mut ids = ElementIdAllocator::new();
        assert_eq!(ids.allocate().get(), 1);
        assert_eq!(ids.allocate().get(), 2);
        assert_eq!(ids.allocate().get(), 3);
    }

    #[test]
    fn zero_is_not_an_element_id() {
        assert!(ElementId::from_raw(0).is_none());
        assert_eq!(ElementId::from_raw(7).map(ElementId::get), Some(7));
    }

    #[test]
    fn table_matches_by_pointer_identity() {
        let mut table = WeakIdentityTable::<String>::default();
        let first = Rc::new("a".to_string());
        let equal_but_distinct = Rc::new("a".to_string());
        let id = ElementId::from_raw(1).unwrap();

        table.assign(&first, id);
        assert_eq!(table.get(&first), Some(id));
        assert_eq!(table.get(&Rc::clone(&first)), Some(id));
        assert_eq!(table.get(&equal_but_distinct), None);
    }

    #[test]
    fn assign_replaces_existing_association() {
        let mut table = WeakIdentityTable::<u32>::default();
        let element = Rc::new(5);
        table.assign(&element, ElementId::from_raw(1).unwrap());
        table.assign(&element, ElementId::from_raw(2).unwrap());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&element), ElementId::from_raw(2));
    }

    #[test]
    fn take_removes_association() {
        let mut table = WeakIdentityTable::<u32>::default();
        let element = Rc::new(5);
        let id = ElementId::from_raw(9).unwrap();
        table.assign(&element, id);
        assert_eq!(table.take(&element), Some(id));
        assert_eq!(table.take(&element), None);
        assert!(table.is_empty());
    }

    #[test]
    fn table_does_not_keep_elements_alive() {
        let mut table = WeakIdentityTable::<u32>::default();
        let kept = Rc::new(1);
        let dropped = Rc::new(2);
        let weak = Rc::downgrade(&dropped);
        table.assign(&kept, ElementId::from_raw(1).unwrap());
        table.assign(&dropped, ElementId::from_raw(2).unwrap());
        drop(dropped);

        assert!(weak.upgrade().is_none());
        assert_eq!(table.reclaim(), vec![ElementId::from_raw(2).unwrap()]);
        assert_eq!(table.len(), 1);
        assert!(table.reclaim().is_empty());
    }

    #[test]
    fn released_element_is_not_confused_with_later_ones() {
        let mut table = WeakIdentityTable::<u32>::default();
        let released = Rc::new(1);
        table.assign(&released, ElementId::from_raw(1).unwrap());
        drop(released);

        let fresh = Rc::new(2);
        assert_eq!(table.get(&fresh), None);
        assert_eq!(table.take(&fresh), None);
        table.assign(&fresh, ElementId::from_raw(2).unwrap());

        assert_eq!(table.reclaim(), vec![ElementId::from_raw(1).unwrap()]);
        assert_eq!(table.get(&fresh), ElementId::from_raw(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookups_stay_exact_across_many_elements() {
        let mut table = WeakIdentityTable::<usize>::default();
        let elements: Vec<_> = (0..2048).map(Rc::new).collect();
        for (index, element) in elements.iter().enumerate() {
            table.assign(element, ElementId::from_raw(index as u64 + 1).unwrap());
        }

        assert_eq!(table.len(), elements.len());
        for (index, element) in elements.iter().enumerate().rev() {
            assert_eq!(table.take(element), ElementId::from_raw(index as u64 + 1));
        }
        assert!(table.is_empty());
    }
}
