//! Buffer collaborator seam
//!
//! Accessors never own or allocate storage. They read and write through a
//! [`Buffer`], an indexable, mutable sequence of cells handed out by the
//! caller. Cells of composite elements can be sliced into sub-buffers
//! (segments) that address the same storage.
//!
//! [`MemoryBuffer`] is a `Value`-backed implementation for callers that do
//! not bring their own array library.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::{Scalar, Value};
use crate::view::{ViewError, ViewResult};

/// An indexable, mutable sequence of cells.
///
/// Implementations use interior mutability: accessors only ever hold shared
/// handles.
pub trait Buffer: fmt::Debug {
    /// Number of cells.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a cell.
    fn get(&self, index: usize) -> ViewResult<Value>;

    /// Writes a cell.
    fn set(&self, index: usize, value: Value) -> ViewResult<()>;

    /// Slices the sub-buffer of a composite cell. The segment shares storage
    /// with `self`.
    fn segment(&self, index: usize) -> ViewResult<Data>;

    /// Reads every cell, in order.
    fn values(&self) -> ViewResult<Vec<Value>> {
        (0..self.len()).map(|index| self.get(index)).collect()
    }
}

/// Shared handle to a buffer.
pub type Data = Rc<dyn Buffer>;

/// Returns whether both handles refer to the same buffer object.
pub fn same_buffer(a: &Data, b: &Data) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// In-memory buffer of `Value` cells.
///
/// Segments share the root storage and address their cells by path, so a
/// write through any segment is visible through every other handle.
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    root: Rc<RefCell<Vec<Value>>>,
    /// Cell indices leading from the root to this segment
    path: Vec<usize>,
}

impl MemoryBuffer {
    /// Creates a buffer holding the given cells.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            root: Rc::new(RefCell::new(values)),
            path: Vec::new(),
        }
    }

    /// Creates a buffer of `count` cells, each a deep copy of `default`.
    pub fn filled(count: usize, default: &Value) -> Self {
        Self::from_values((0..count).map(|_| default.deep_copy()).collect())
    }

    /// Snapshot of the cells of this buffer or segment.
    pub fn to_values(&self) -> Vec<Value> {
        self.with_cells(|cells| cells.to_vec()).unwrap_or_default()
    }

    /// Wraps the buffer into a shared handle.
    pub fn into_data(self) -> Data {
        Rc::new(self)
    }

    fn with_cells<R>(&self, f: impl FnOnce(&[Value]) -> R) -> ViewResult<R> {
        let root = self.root.borrow();
        let mut cells: &[Value] = &root;
        for &index in &self.path {
            let cell = cells.get(index).ok_or(ViewError::IndexOutOfRange {
                index,
                len: cells.len(),
            })?;
            cells = cell.items().ok_or_else(|| ViewError::NotSegment {
                index,
                found: cell.type_name().to_string(),
            })?;
        }
        Ok(f(cells))
    }

    fn with_cells_mut<R>(&self, f: impl FnOnce(&mut [Value]) -> R) -> ViewResult<R> {
        let mut root = self.root.borrow_mut();
        let mut cells: &mut [Value] = root.as_mut_slice();
        for &index in &self.path {
            let len = cells.len();
            let cell = std::mem::take(&mut cells)
                .get_mut(index)
                .ok_or(ViewError::IndexOutOfRange { index, len })?;
            let found = cell.type_name().to_string();
            cells = cell
                .items_mut()
                .ok_or(ViewError::NotSegment { index, found })?;
        }
        Ok(f(cells))
    }
}

impl Buffer for MemoryBuffer {
    fn len(&self) -> usize {
        self.with_cells(|cells| cells.len()).unwrap_or(0)
    }

    fn get(&self, index: usize) -> ViewResult<Value> {
        self.with_cells(|cells| {
            cells.get(index).cloned().ok_or(ViewError::IndexOutOfRange {
                index,
                len: cells.len(),
            })
        })?
    }

    /// Numbers written into a fixed-width cell keep the cell's kind.
    fn set(&self, index: usize, value: Value) -> ViewResult<()> {
        self.with_cells_mut(|cells| {
            let len = cells.len();
            let cell = cells
                .get_mut(index)
                .ok_or(ViewError::IndexOutOfRange { index, len })?;
            let kind = match cell {
                Value::Number(current) => Some(current.kind()),
                _ => None,
            };
            *cell = match kind {
                Some(kind) => Scalar::coerce(kind, &value)
                    .map(Value::Number)
                    .unwrap_or(value),
                None => value,
            };
            Ok(())
        })?
    }

    fn segment(&self, index: usize) -> ViewResult<Data> {
        self.with_cells(|cells| match cells.get(index) {
            None => Err(ViewError::IndexOutOfRange {
                index,
                len: cells.len(),
            }),
            Some(cell) if cell.items().is_none() => Err(ViewError::NotSegment {
                index,
                found: cell.type_name().to_string(),
            }),
            Some(_) => Ok(()),
        })??;

        let mut path = self.path.clone();
        path.push(index);
        Ok(Rc::new(MemoryBuffer {
            root: Rc::clone(&self.root),
            path,
        }))
    }
}
