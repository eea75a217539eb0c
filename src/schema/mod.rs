//! Schema subsystem
//!
//! Schemas are trees of immutable nodes describing one fixed-layout record.
//!
//! # Design Principles
//!
//! - Closed set of variants, one enum case each
//! - Nodes are never mutated; updates produce new nodes
//! - Validation is strict, path-qualified and short-circuits on the first error
//! - Consolidation is pure and idempotent

mod consolidate;
mod errors;
mod loader;
mod types;
mod validator;

pub use consolidate::consolidate;
pub use errors::{ErrorKind, SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{
    ArrayType, Attr, BoolType, BytesType, ElementKind, Field, FieldDecl, NumberType, ObjectType,
    Schema, SchemaKind, Shape, Slot, StructureType, TextType, READ_ONLY,
};
pub use validator::{validate, validate_slot};
