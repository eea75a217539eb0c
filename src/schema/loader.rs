//! Schema loader for declarative JSON schema documents
//!
//! A document is a JSON object per node:
//!
//! ```json
//! {
//!   "type": "structure",
//!   "name": "Particle",
//!   "fields": [
//!     ["id", {"type": "number", "kind": "uint32", "default": -1}, true],
//!     {"name": "mass", "type": {"type": "number", "kind": "float32", "default": 1.0}}
//!   ]
//! }
//! ```
//!
//! - Node `type` names a variant (case-insensitive)
//! - Every other key must be an attribute of that variant
//! - Fields are `[name, type, read_only?]` arrays or `{name, type, read_only}` objects
//! - Accessors are referenced by name and resolved against registered views
//!
//! Loaded documents are validated before they are returned or registered.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as Json};
use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    ArrayType, Attr, BytesType, ElementKind, Field, FieldDecl, NumberType, Schema, SchemaKind,
    Shape, Slot, StructureType, TextType,
};
use super::validator::{validate, validate_slot};
use crate::value::{Complex, Record, Scalar, Value};
use crate::view::ViewType;

/// Loads schema documents and keeps a registry of named schemas.
pub struct SchemaLoader {
    /// Directory containing schema documents
    schema_dir: PathBuf,
    /// Loaded schemas indexed by name
    schemas: HashMap<String, Schema>,
    /// Views that documents can reference by name
    accessors: HashMap<String, ViewType>,
}

impl SchemaLoader {
    /// Creates a new loader for the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
            accessors: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Makes a view available to documents under its own name.
    pub fn register_accessor(&mut self, accessor: impl Into<ViewType>) {
        let accessor = accessor.into();
        self.accessors.insert(accessor.name().to_string(), accessor);
    }

    /// Loads every `*.json` document of the schema directory, registering
    /// each one under its file stem.
    ///
    /// A missing directory holds no schemas.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_document(
                &self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_document(
                    &self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let schema = self.load_file(&path)?;
            self.register(name, schema)?;
        }

        Ok(())
    }

    /// Loads a single schema document from disk.
    pub fn load_file(&self, path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_document(
                &path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        debug!(path = %path.display(), "loading schema document");
        self.load_str(&content)
    }

    /// Loads a schema document from a JSON string.
    pub fn load_str(&self, content: &str) -> SchemaResult<Schema> {
        let document: Json = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed_document("", format!("Invalid JSON: {}", e)))?;
        self.load_value(&document)
    }

    /// Loads a schema from a parsed JSON document and validates it.
    pub fn load_value(&self, document: &Json) -> SchemaResult<Schema> {
        let slot = self.parse_slot(document, "")?;
        validate_slot(&slot)?;
        match slot {
            Slot::Node(node) => Ok(node),
            _ => Err(SchemaError::malformed_document("", "expected a schema node")),
        }
    }

    /// Registers a schema under a name.
    ///
    /// Registered schemas are immutable: a name can only be used once.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> SchemaResult<()> {
        let name = name.into();
        validate(&schema)?;

        if self.schemas.contains_key(&name) {
            return Err(SchemaError::malformed_document(
                &name,
                "a schema with this name is already registered",
            ));
        }

        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Checks if a schema exists.
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Parses something in data-type position: a node object, a bare variant
    /// name, or any other value.
    fn parse_slot(&self, json: &Json, path: &str) -> SchemaResult<Slot> {
        match json {
            Json::String(name) => match SchemaKind::from_name(name) {
                Some(kind) => Ok(Slot::Kind(kind)),
                None => Ok(Slot::Value(to_value(json))),
            },
            Json::Object(object) if object.contains_key("type") => {
                Ok(Slot::Node(self.parse_node(object, path)?))
            }
            other => Ok(Slot::Value(to_value(other))),
        }
    }

    fn parse_node(&self, object: &Map<String, Json>, parent_path: &str) -> SchemaResult<Schema> {
        let kind = match object.get("type") {
            Some(Json::String(name)) => SchemaKind::from_name(name).ok_or_else(|| {
                SchemaError::malformed_document(parent_path, format!("unknown schema type '{}'", name))
            })?,
            _ => {
                return Err(SchemaError::malformed_document(
                    parent_path,
                    "'type' must name a schema variant",
                ))
            }
        };

        let unknown: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|key| *key != "type" && !kind.attributes().iter().any(|attr| attr == key))
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaError::unknown_attributes(kind, &unknown));
        }

        let segment = match object.get("name") {
            Some(Json::String(name)) if !name.is_empty() => name.as_str(),
            _ => kind.name(),
        };
        let path = if parent_path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", parent_path, segment)
        };

        let require = |name: &str| -> SchemaResult<()> {
            if object.contains_key(name) {
                Ok(())
            } else {
                Err(SchemaError::missing_attribute(&path, name))
            }
        };

        let mut node = match kind {
            SchemaKind::Bool => Schema::bool(),
            SchemaKind::Object => Schema::object(),
            SchemaKind::Number => Schema::Number(NumberType::default()),
            SchemaKind::Bytes => {
                require("length")?;
                Schema::Bytes(BytesType::new(0))
            }
            SchemaKind::Text => {
                require("length")?;
                Schema::Text(TextType::new(0))
            }
            SchemaKind::Array => {
                require("element_type")?;
                require("shape")?;
                Schema::Array(ArrayType::new(Schema::object(), 0))
            }
            SchemaKind::Structure => {
                require("fields")?;
                Schema::Structure(StructureType::new(Vec::<FieldDecl>::new()))
            }
        };

        for attribute in kind.attributes() {
            if let Some(json) = object.get(*attribute) {
                let value = self.parse_attribute(kind, attribute, json, &path)?;
                node = node.replace(attribute, value)?;
            }
        }

        Ok(node)
    }

    fn parse_attribute(
        &self,
        kind: SchemaKind,
        attribute: &str,
        json: &Json,
        path: &str,
    ) -> SchemaResult<Attr> {
        let attr = match (attribute, json) {
            (_, Json::Null) => Attr::None,
            ("default", json) => Attr::Value(default_value(kind, json)),
            ("kind", Json::String(name)) => {
                Attr::Kind(ElementKind::from_name(name).ok_or_else(|| {
                    SchemaError::malformed_document(
                        &format!("{}.kind", path),
                        format!("unknown element kind '{}'", name),
                    )
                })?)
            }
            ("length", json) => json.as_i64().map_or_else(|| Attr::Value(to_value(json)), Attr::Int),
            ("element_type", json) => match self.parse_slot(json, path)? {
                Slot::Node(node) => Attr::Node(node),
                Slot::Kind(kind) => return Err(SchemaError::type_not_instance(path, kind)),
                Slot::Value(value) => Attr::Value(value),
            },
            ("shape", Json::Array(items)) => {
                let dims: Option<Vec<i64>> = items.iter().map(Json::as_i64).collect();
                dims.map_or_else(|| Attr::Value(to_value(json)), |dims| Attr::Shape(Shape::Dims(dims)))
            }
            ("shape", json) => json
                .as_i64()
                .map_or_else(|| Attr::Value(to_value(json)), |dim| Attr::Shape(Shape::Dim(dim))),
            ("name", Json::String(name)) => Attr::Name(name.clone()),
            ("fields", Json::Array(items)) => {
                let fields = items
                    .iter()
                    .map(|item| self.parse_field(item, path))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Attr::Fields(fields)
            }
            ("accessor", Json::String(name)) => {
                let accessor = self.accessors.get(name).ok_or_else(|| {
                    SchemaError::malformed_document(
                        &format!("{}.accessor", path),
                        format!("no accessor registered under '{}'", name),
                    )
                })?;
                Attr::Accessor(accessor.clone())
            }
            (_, json) => Attr::Value(to_value(json)),
        };
        Ok(attr)
    }

    fn parse_field(&self, json: &Json, path: &str) -> SchemaResult<FieldDecl> {
        match json {
            Json::Array(items) => {
                let mut slots = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let slot = if i == 1 {
                        self.parse_slot(item, path)?
                    } else {
                        Slot::Value(to_value(item))
                    };
                    slots.push(slot);
                }
                Ok(FieldDecl::Tuple(slots))
            }
            Json::Object(object) => {
                let fields_path = format!("{}.fields", path);
                let name = object.get("name").and_then(Json::as_str).ok_or_else(|| {
                    SchemaError::malformed_document(&fields_path, "field 'name' must be a string")
                })?;
                let field_path = format!("{}.{}", path, name);
                let schema = match object.get("type") {
                    Some(Json::Object(node)) => self.parse_node(node, &field_path)?,
                    _ => {
                        return Err(SchemaError::malformed_document(
                            &field_path,
                            "field 'type' must be a schema node",
                        ))
                    }
                };
                let read_only = match object.get("read_only") {
                    None => false,
                    Some(Json::Bool(read_only)) => *read_only,
                    Some(_) => {
                        return Err(SchemaError::malformed_document(
                            &field_path,
                            "field 'read_only' must be a boolean",
                        ))
                    }
                };
                Ok(FieldDecl::Field(Field {
                    name: name.to_string(),
                    schema,
                    read_only,
                }))
            }
            _ => Err(SchemaError::malformed_document(
                &format!("{}.fields", path),
                "each field must be an array or an object",
            )),
        }
    }
}

/// Converts a `default` document value for a node of the given variant.
fn default_value(kind: SchemaKind, json: &Json) -> Value {
    match (kind, json) {
        (SchemaKind::Bytes, Json::String(s)) => Value::Bytes(s.clone().into_bytes()),
        (SchemaKind::Object, json) => Value::shared(to_value(json)),
        (_, json) => to_value(json),
    }
}

/// Plain JSON to value conversion.
fn to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::None,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Number(Scalar::UInt64(u))
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(to_value).collect()),
        Json::Object(object) => {
            if object.len() == 2 {
                if let (Some(re), Some(im)) = (
                    object.get("re").and_then(Json::as_f64),
                    object.get("im").and_then(Json::as_f64),
                ) {
                    return Value::Complex(Complex::new(re, im));
                }
            }
            let entries = object
                .iter()
                .map(|(key, value)| (key.clone(), to_value(value)))
                .collect();
            Value::Record(Record::new("dict", entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;
    use tempfile::TempDir;

    const PARTICLE: &str = r#"{
        "type": "structure",
        "name": "Particle",
        "fields": [
            ["id", {"type": "number", "kind": "uint32", "default": -1}, true],
            ["position", {"type": "array", "element_type": {"type": "number", "kind": "float32"}, "shape": [2]}],
            {"name": "mass", "type": {"type": "number", "kind": "float32", "default": 1.0}},
            ["neighbours", {"type": "object", "default": []}]
        ]
    }"#;

    #[test]
    fn test_load_structure() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let schema = loader.load_str(PARTICLE).unwrap();
        let Schema::Structure(structure) = &schema else {
            panic!("expected a structure");
        };
        assert_eq!(structure.name.as_deref(), Some("Particle"));
        assert_eq!(structure.fields.len(), 4);
        assert_eq!(structure.fields[0].name(), Some("id"));
        assert!(matches!(structure.fields[2], FieldDecl::Field(_)));
    }

    #[test]
    fn test_root_kind_name_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader.load_str(r#""number""#).unwrap_err();
        assert_eq!(
            err.message(),
            "The data type is expected to be an instance object but got the type 'Number' instead."
        );
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader.load_str(r#"{"type": "bool", "shape": 3}"#).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::StrataSchemaUnknownAttribute);
    }

    #[test]
    fn test_missing_length() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader.load_str(r#"{"type": "text"}"#).unwrap_err();
        assert_eq!(err.message(), "The attribute 'Text.length' cannot be 'None'.");
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader.load_str("{not json").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::StrataSchemaMalformed);
    }

    #[test]
    fn test_unregistered_accessor() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let err = loader
            .load_str(r#"{"type": "bool", "accessor": "Flag"}"#)
            .unwrap_err();
        assert_eq!(err.path(), Some("Bool.accessor"));
    }

    #[test]
    fn test_load_all_registers_by_file_stem() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("particle.json"), PARTICLE).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        assert_eq!(loader.schema_count(), 1);
        assert!(loader.exists("particle"));
    }

    #[test]
    fn test_register_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("flag", Schema::bool()).unwrap();
        assert!(loader.register("flag", Schema::bool()).is_err());
        assert_eq!(loader.get("flag"), Some(&Schema::bool()));
    }

    #[test]
    fn test_load_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("missing"));

        assert!(loader.load_all().is_ok());
        assert_eq!(loader.schema_count(), 0);
    }
}
