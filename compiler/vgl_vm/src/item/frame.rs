//! Shared slot arrays: activation and record frames, and language arrays.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Item;

/// Fixed-size slot array for one activation or record instance.
///
/// Slot 0 holds the enclosing frame: the closure for an activation, the
/// declaring context for a record. Cloning the handle shares the slots.
#[derive(Clone)]
pub struct Frame(Rc<RefCell<Vec<Item>>>);

impl Frame {
    /// A frame of `size` void slots.
    pub fn new(size: usize) -> Self {
        Frame(Rc::new(RefCell::new(vec![Item::Void; size])))
    }

    /// A frame of `size` slots (at least one) with `link` in slot 0.
    pub fn with_link(size: usize, link: Option<Frame>) -> Self {
        let mut slots = vec![Item::Void; size.max(1)];
        slots[0] = Item::Frame(link);
        Frame(Rc::new(RefCell::new(slots)))
    }

    /// A frame over prepared slots; slot 0 should hold the link.
    pub fn from_slots(slots: Vec<Item>) -> Self {
        Frame(Rc::new(RefCell::new(slots)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The item in `slot`, or `None` if the slot does not exist.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<Item> {
        self.0.borrow().get(slot).cloned()
    }

    /// Overwrite `slot`. Returns `false` if the slot does not exist.
    #[inline]
    #[must_use]
    pub fn set(&self, slot: usize, item: Item) -> bool {
        match self.0.borrow_mut().get_mut(slot) {
            Some(cell) => {
                *cell = item;
                true
            }
            None => false,
        }
    }

    /// The frame linked from slot 0.
    pub fn link(&self) -> Option<Frame> {
        match self.0.borrow().first() {
            Some(Item::Frame(link)) => link.clone(),
            _ => None,
        }
    }

    /// Copy of every slot.
    pub fn snapshot(&self) -> Vec<Item> {
        self.0.borrow().clone()
    }

    /// Replace every slot with `slots`.
    pub fn restore(&self, slots: Vec<Item>) {
        *self.0.borrow_mut() = slots;
    }

    /// Kind of each slot, for debug dumps.
    pub(crate) fn kinds(&self) -> Vec<super::ItemKind> {
        self.0.borrow().iter().map(Item::kind).collect()
    }

    #[inline]
    pub fn ptr_eq(a: &Frame, b: &Frame) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Identity comparison of nullable handles; two nulls are the same.
    pub fn same(a: Option<&Frame>, b: Option<&Frame>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => Frame::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Slot 0 can point back up the chain; print the shape only.
        write!(f, "Frame(len={})", self.len())
    }
}

/// Growable array of items with reference semantics.
#[derive(Clone)]
pub struct Array(Rc<RefCell<Vec<Item>>>);

impl Array {
    pub fn new(items: Vec<Item>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Item> {
        self.0.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn set(&self, index: usize, item: Item) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(cell) => {
                *cell = item;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, item: Item) {
        self.0.borrow_mut().push(item);
    }

    pub fn to_vec(&self) -> Vec<Item> {
        self.0.borrow().clone()
    }

    #[inline]
    pub fn ptr_eq(a: &Array, b: &Array) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn same(a: Option<&Array>, b: Option<&Array>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => Array::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array(len={})", self.len())
    }
}
