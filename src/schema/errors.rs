//! Schema error types
//!
//! Error codes:
//! - STRATA_SCHEMA_CONTRACT (contract violation)
//! - STRATA_SCHEMA_DUPLICATE_FIELD (integrity violation)
//! - STRATA_SCHEMA_UNKNOWN_ATTRIBUTE (contract violation)
//! - STRATA_SCHEMA_MALFORMED (contract violation, declarative documents only)
//!
//! Every message is path-qualified with the dotted name chain leading to the
//! offending node or attribute, and names both the expected and the actual
//! types.

use std::fmt;

use thiserror::Error;

use super::types::SchemaKind;

/// The two families of schema failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong instance/class kind, missing attribute, malformed field tuple.
    Contract,
    /// The schema is well-typed but inconsistent (duplicate field names).
    Integrity,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Contract => write!(f, "CONTRACT"),
            ErrorKind::Integrity => write!(f, "INTEGRITY"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A node or one of its attributes breaks its attribute contract
    StrataSchemaContract,
    /// A structure declares the same field name more than once
    StrataSchemaDuplicateField,
    /// An attribute name does not exist on the node's variant
    StrataSchemaUnknownAttribute,
    /// A declarative schema document cannot be turned into nodes
    StrataSchemaMalformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::StrataSchemaContract => "STRATA_SCHEMA_CONTRACT",
            SchemaErrorCode::StrataSchemaDuplicateField => "STRATA_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::StrataSchemaUnknownAttribute => "STRATA_SCHEMA_UNKNOWN_ATTRIBUTE",
            SchemaErrorCode::StrataSchemaMalformed => "STRATA_SCHEMA_MALFORMED",
        }
    }

    /// Returns the error family for this code
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaErrorCode::StrataSchemaDuplicateField => ErrorKind::Integrity,
            _ => ErrorKind::Contract,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{code}] {message}")]
pub struct SchemaError {
    code: SchemaErrorCode,
    /// Dotted path of the offending node or attribute, if known
    path: Option<String>,
    message: String,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, path: Option<String>, message: String) -> Self {
        Self {
            code,
            path,
            message,
        }
    }

    fn contract(path: impl Into<String>, message: String) -> Self {
        Self::new(SchemaErrorCode::StrataSchemaContract, Some(path.into()), message)
    }

    /// A variant kind was given where a node instance was expected.
    ///
    /// `parent_path` is empty when the mistake happens at the root.
    pub fn type_not_instance(parent_path: &str, kind: SchemaKind) -> Self {
        let message = if parent_path.is_empty() {
            format!(
                "The data type is expected to be an instance object but got the type {} instead.",
                quote(kind.name())
            )
        } else {
            format!(
                "The data type for '{}' is expected to be an instance object but got the type {} instead.",
                parent_path,
                quote(kind.name())
            )
        };
        Self::contract(parent_path, message)
    }

    /// Something that is not a schema node was given as a data type.
    pub fn unsupported_type(path: &str, actual: &str) -> Self {
        let supported: Vec<&str> = SchemaKind::ALL.iter().map(|kind| kind.name()).collect();
        Self::contract(
            path,
            format!(
                "Objects of type {} aren't supported as data types. Use any type from {} instead.",
                quote(actual),
                join_sequence(&supported, "or ")
            ),
        )
    }

    /// A required attribute is absent.
    pub fn missing_attribute(path: &str, attribute: &str) -> Self {
        Self::contract(
            format!("{}.{}", path, attribute),
            format!("The attribute '{}.{}' cannot be 'None'.", path, attribute),
        )
    }

    /// A type-valued attribute holds something that is not class-like.
    pub fn not_a_class(path: &str, attribute: &str, allow_none: bool) -> Self {
        Self::contract(
            format!("{}.{}", path, attribute),
            format!(
                "The attribute '{}.{}' is expected to be a class object{}.",
                path,
                attribute,
                if allow_none { " or 'None'" } else { "" }
            ),
        )
    }

    /// An attribute holds an instance of the wrong type.
    pub fn wrong_instance(path: &str, attribute: &str, expected: &[&str], actual: &str) -> Self {
        Self::contract(
            format!("{}.{}", path, attribute),
            format!(
                "The attribute '{}.{}' is expected to be an instance object of type {}, not {}.",
                path,
                attribute,
                join_sequence(expected, "or "),
                quote(actual)
            ),
        )
    }

    /// A type-valued attribute is class-like but of the wrong family.
    pub fn not_a_subclass(path: &str, attribute: &str, expected: &[&str], actual: &str) -> Self {
        Self::contract(
            format!("{}.{}", path, attribute),
            format!(
                "The attribute '{}.{}' is expected to be a subclass of {}, not {}.",
                path,
                attribute,
                join_sequence(expected, "or "),
                quote(actual)
            ),
        )
    }

    /// A length or shape dimension is negative.
    pub fn negative_dimension(path: &str, attribute: &str, actual: &str) -> Self {
        Self::contract(
            format!("{}.{}", path, attribute),
            format!(
                "The attribute '{}.{}' is expected to hold non-negative integers, not {}.",
                path, attribute, actual
            ),
        )
    }

    /// A raw field tuple has the wrong number of elements.
    pub fn malformed_field(path: &str, field: &str) -> Self {
        Self::contract(
            format!("{}.fields", path),
            format!(
                "Each field from the attribute '{}.fields' is expected to be a tuple compatible with 'Field' but got '{}' instead.",
                path, field
            ),
        )
    }

    /// The first element of a raw field tuple is not a string.
    pub fn field_name_type(path: &str, actual: &str) -> Self {
        Self::contract(
            format!("{}.fields", path),
            format!(
                "The first element of each field from the attribute '{}.fields', that is the field name, is expected to be an instance object of type 'str', not {}.",
                path,
                quote(actual)
            ),
        )
    }

    /// The second element of a raw field tuple is not a schema node.
    pub fn field_type_type(path: &str, actual: &str) -> Self {
        let supported: Vec<&str> = SchemaKind::ALL.iter().map(|kind| kind.name()).collect();
        Self::contract(
            format!("{}.fields", path),
            format!(
                "The second element of each field from the attribute '{}.fields', that is the field type, is expected to be an instance object of type {}, not {}.",
                path,
                join_sequence(&supported, "or "),
                quote(actual)
            ),
        )
    }

    /// The third element of a raw field tuple is not a boolean.
    pub fn field_read_only_type(path: &str, actual: &str) -> Self {
        Self::contract(
            format!("{}.fields", path),
            format!(
                "The third element of each field from the attribute '{}.fields', that is the 'read_only' attribute, is expected to be an instance object of type 'bool', not {}.",
                path,
                quote(actual)
            ),
        )
    }

    /// One or more field names occur more than once in a structure.
    pub fn duplicate_fields(path: &str, duplicates: &[&str]) -> Self {
        let message = if duplicates.len() > 1 {
            format!(
                "The structure fields {}, were provided multiple times in '{}.fields'.",
                join_sequence(duplicates, "and "),
                path
            )
        } else {
            format!(
                "The structure field {} was provided multiple times in '{}.fields'.",
                join_sequence(duplicates, ""),
                path
            )
        };
        Self::new(
            SchemaErrorCode::StrataSchemaDuplicateField,
            Some(format!("{}.fields", path)),
            message,
        )
    }

    /// A default value cannot be converted into its element kind.
    pub fn uncoercible_default(path: &str, kind: &str, actual: &str) -> Self {
        Self::contract(
            format!("{}.default", path),
            format!(
                "The attribute '{}.default' cannot be converted into {}, got {}.",
                path,
                quote(kind),
                quote(actual)
            ),
        )
    }

    /// Attribute names that do not exist on the node's variant.
    pub fn unknown_attributes(kind: SchemaKind, names: &[&str]) -> Self {
        Self::new(
            SchemaErrorCode::StrataSchemaUnknownAttribute,
            Some(kind.name().to_string()),
            format!(
                "Got unexpected field names for {}: {}.",
                quote(kind.name()),
                join_sequence(names, "and ")
            ),
        )
    }

    /// A declarative document cannot be read or mapped onto nodes.
    pub fn malformed_document(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "<root>" } else { path };
        Self::new(
            SchemaErrorCode::StrataSchemaMalformed,
            Some(path.to_string()),
            format!("Malformed schema document at '{}': {}", path, reason.into()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error family
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns the dotted path of the offending node or attribute
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a data-integrity violation
    pub fn is_integrity(&self) -> bool {
        self.kind() == ErrorKind::Integrity
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

fn quote(item: &str) -> String {
    format!("'{}'", item)
}

/// Joins items as quoted strings, prefixing the last one with
/// `last_separator` when there is more than one item.
pub(crate) fn join_sequence(items: &[&str], last_separator: &str) -> String {
    let count = items.len();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if count > 1 && i == count - 1 {
                format!("{}'{}'", last_separator, item)
            } else {
                quote(item)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
