use std::{cell::RefCell, rc::Rc};

use super::RawBuffer;
use crate::DType;

/// Reference-counted handle to a buffer shared by every view derived from it.
///
/// Each access borrows the buffer only for the duration of one read or
/// write, so interleaving reads and writes through different views never
/// conflicts at runtime. The handle is neither `Send` nor `Sync`; copy the
/// data out to move it across threads.
#[derive(Clone, Debug)]
pub struct Storage(Rc<RefCell<RawBuffer>>);

impl From<RawBuffer> for Storage {
    fn from(buf: RawBuffer) -> Self {
        Self(Rc::new(RefCell::new(buf)))
    }
}

impl Storage {
    pub fn dtype(&self) -> DType {
        self.0.borrow().dtype()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn read(&self, pos: usize) -> f64 {
        self.0.borrow().get(pos)
    }

    #[inline]
    pub fn write(&self, pos: usize, value: f64) {
        self.0.borrow_mut().set(pos, value);
    }

    /// Whether both handles refer to the same buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles, including this one.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}
