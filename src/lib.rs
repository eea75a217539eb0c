//! strata - Declarative schemas for fixed-layout binary records
//!
//! A schema describes one record as a tree of nodes (booleans, objects,
//! numbers, fixed-length strings, arrays and structures). Resolving it yields:
//! - a layout descriptor for allocating a contiguous buffer of records
//! - a default value for filling that buffer
//! - an accessor type for reading and writing records through the buffer
//!   without copying
//!
//! Everything is single-threaded and synchronous.

pub mod buffer;
pub mod resolve;
pub mod schema;
pub mod value;
pub mod view;

pub use buffer::{Buffer, Data, MemoryBuffer};
pub use resolve::{
    get_data, get_element_view, resolve, resolve_default, resolve_layout, resolve_view, update,
    Layout, ResolveOptions, Resolved,
};
pub use schema::{consolidate, validate, validate_slot, Schema, SchemaError, SchemaResult};
pub use value::Value;
pub use view::{ArrayView, Element, StructureView, ViewError, ViewResult, ViewType};
