//! Dynamic values
//!
//! `Value` is what schema defaults are written in, what the default resolver
//! produces and what buffer cells hold. Everything is a plain value except
//! `Value::Object`, which is a shared, interior-mutable reference: cloning it
//! aliases, `Value::deep_copy` does not.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::schema::ElementKind;

/// A complex number made of two real parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

macro_rules! impl_complex_display {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for Complex<$t> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let sign = if self.im.is_sign_negative() { "" } else { "+" };
                    write!(f, "({:?}{}{:?}j)", self.re, sign, self.im)
                }
            }
        )*
    };
}

impl_complex_display!(f32, f64);

/// A number stored at the fixed width of one of the numeric element kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
}

/// Host-side number a coercion starts from.
#[derive(Clone, Copy)]
enum Source {
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex<f64>),
}

impl Source {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Source::Int(i64::from(*b))),
            Value::Int(i) => Some(Source::Int(*i)),
            Value::Float(x) => Some(Source::Float(*x)),
            Value::Complex(c) => Some(Source::Complex(*c)),
            Value::Number(scalar) => Some(match *scalar {
                Scalar::Int8(v) => Source::Int(v.into()),
                Scalar::Int16(v) => Source::Int(v.into()),
                Scalar::Int32(v) => Source::Int(v.into()),
                Scalar::Int64(v) => Source::Int(v),
                Scalar::UInt8(v) => Source::UInt(v.into()),
                Scalar::UInt16(v) => Source::UInt(v.into()),
                Scalar::UInt32(v) => Source::UInt(v.into()),
                Scalar::UInt64(v) => Source::UInt(v),
                Scalar::Float32(v) => Source::Float(v.into()),
                Scalar::Float64(v) => Source::Float(v),
                Scalar::Complex64(c) => Source::Complex(Complex::new(c.re.into(), c.im.into())),
                Scalar::Complex128(c) => Source::Complex(c),
            }),
            _ => None,
        }
    }

    fn imag(self) -> f64 {
        match self {
            Source::Complex(c) => c.im,
            _ => 0.0,
        }
    }
}

// Primitive `as` conversion: integers wrap, floats saturate, complex keeps
// its real part.
macro_rules! cast {
    ($source:expr, $t:ty) => {
        match $source {
            Source::Int(v) => v as $t,
            Source::UInt(v) => v as $t,
            Source::Float(v) => v as $t,
            Source::Complex(c) => c.re as $t,
        }
    };
}

impl Scalar {
    /// Converts a host number into the representation of `kind`.
    ///
    /// Returns `None` when `kind` is not numeric or `value` is not a number.
    pub fn coerce(kind: ElementKind, value: &Value) -> Option<Scalar> {
        let source = Source::of(value)?;
        let scalar = match kind {
            ElementKind::Int8 => Scalar::Int8(cast!(source, i8)),
            ElementKind::Int16 => Scalar::Int16(cast!(source, i16)),
            ElementKind::Int32 => Scalar::Int32(cast!(source, i32)),
            ElementKind::Int64 => Scalar::Int64(cast!(source, i64)),
            ElementKind::UInt8 => Scalar::UInt8(cast!(source, u8)),
            ElementKind::UInt16 => Scalar::UInt16(cast!(source, u16)),
            ElementKind::UInt32 => Scalar::UInt32(cast!(source, u32)),
            ElementKind::UInt64 => Scalar::UInt64(cast!(source, u64)),
            ElementKind::Float32 => Scalar::Float32(cast!(source, f32)),
            ElementKind::Float64 => Scalar::Float64(cast!(source, f64)),
            ElementKind::Complex64 => {
                Scalar::Complex64(Complex::new(cast!(source, f32), source.imag() as f32))
            }
            ElementKind::Complex128 => {
                Scalar::Complex128(Complex::new(cast!(source, f64), source.imag()))
            }
            ElementKind::Bool | ElementKind::Object | ElementKind::Bytes | ElementKind::Text => {
                return None
            }
        };
        Some(scalar)
    }

    /// Returns the element kind this scalar is stored as.
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Int8(_) => ElementKind::Int8,
            Scalar::Int16(_) => ElementKind::Int16,
            Scalar::Int32(_) => ElementKind::Int32,
            Scalar::Int64(_) => ElementKind::Int64,
            Scalar::UInt8(_) => ElementKind::UInt8,
            Scalar::UInt16(_) => ElementKind::UInt16,
            Scalar::UInt32(_) => ElementKind::UInt32,
            Scalar::UInt64(_) => ElementKind::UInt64,
            Scalar::Float32(_) => ElementKind::Float32,
            Scalar::Float64(_) => ElementKind::Float64,
            Scalar::Complex64(_) => ElementKind::Complex64,
            Scalar::Complex128(_) => ElementKind::Complex128,
        }
    }

    /// Real part as `f64`.
    pub fn as_f64(&self) -> f64 {
        match Source::of(&Value::Number(*self)) {
            Some(source) => cast!(source, f64),
            None => 0.0,
        }
    }

    /// Real part as `i64`, with `as` semantics.
    pub fn as_i64(&self) -> i64 {
        match Source::of(&Value::Number(*self)) {
            Some(source) => cast!(source, i64),
            None => 0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int8(v) => write!(f, "{}", v),
            Scalar::Int16(v) => write!(f, "{}", v),
            Scalar::Int32(v) => write!(f, "{}", v),
            Scalar::Int64(v) => write!(f, "{}", v),
            Scalar::UInt8(v) => write!(f, "{}", v),
            Scalar::UInt16(v) => write!(f, "{}", v),
            Scalar::UInt32(v) => write!(f, "{}", v),
            Scalar::UInt64(v) => write!(f, "{}", v),
            Scalar::Float32(v) => write!(f, "{:?}", v),
            Scalar::Float64(v) => write!(f, "{:?}", v),
            Scalar::Complex64(c) => write!(f, "{}", c),
            Scalar::Complex128(c) => write!(f, "{}", c),
        }
    }
}

/// Ordered named tuple, the default of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    names: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from `(field name, value)` pairs in field order.
    pub fn new(name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        let (names, values) = fields.into_iter().unzip();
        Self {
            name: name.into(),
            names,
            values,
        }
    }

    /// Type name of the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Field values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Looks a field value up by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
    }
}

/// A shared, mutable object reference.
#[derive(Clone)]
pub struct Shared(Rc<RefCell<Value>>);

impl Shared {
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Value> {
        self.0.borrow_mut()
    }

    /// Returns whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Shared) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

/// Walk through an object that may reach itself again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Display(usize),
    Debug(usize),
    Compare(usize, usize),
}

thread_local! {
    static VISITING: RefCell<Vec<Visit>> = RefCell::new(Vec::new());
}

/// Marks a walk as in progress on this thread until dropped.
struct Visiting(Visit);

impl Visiting {
    /// Returns `None` when the same walk is already in progress further up
    /// the stack.
    fn enter(visit: Visit) -> Option<Visiting> {
        VISITING.with(|visiting| {
            let mut visiting = visiting.borrow_mut();
            if visiting.contains(&visit) {
                return None;
            }
            visiting.push(visit);
            Some(Visiting(visit))
        })
    }
}

impl Drop for Visiting {
    fn drop(&mut self) {
        VISITING.with(|visiting| {
            let mut visiting = visiting.borrow_mut();
            if let Some(i) = visiting.iter().rposition(|v| *v == self.0) {
                visiting.remove(i);
            }
        });
    }
}

impl PartialEq for Shared {
    /// Objects that reach themselves compare equal at the point where a
    /// comparison of the same pair repeats.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match Visiting::enter(Visit::Compare(self.addr(), other.addr())) {
            Some(_visit) => *self.borrow() == *other.borrow(),
            None => true,
        }
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Visiting::enter(Visit::Debug(self.addr())) {
            Some(_visit) => f.debug_tuple("Shared").field(&*self.borrow()).finish(),
            None => write!(f, "Shared(..)"),
        }
    }
}

impl fmt::Display for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_visit) = Visiting::enter(Visit::Display(self.addr())) else {
            return match &*self.borrow() {
                Value::List(_) => write!(f, "[...]"),
                Value::Tuple(_) => write!(f, "(...)"),
                _ => write!(f, "..."),
            };
        };
        self.borrow().fmt_repr(f)
    }
}

/// A dynamically-typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex<f64>),
    /// A number at the fixed width of an element kind
    Number(Scalar),
    Bytes(Vec<u8>),
    Text(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Record(Record),
    /// A reference to an arbitrary mutable object
    Object(Shared),
}

impl Value {
    /// Wraps a value into a new shared object reference.
    pub fn shared(value: Value) -> Self {
        Value::Object(Shared::new(value))
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Number(scalar) => scalar.kind().name(),
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Record(record) => record.name(),
            Value::Object(_) => "object",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Host or fixed-width number. Booleans do not count.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Float(_) | Value::Complex(_) | Value::Number(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of any number, with `as` semantics.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(x) => Some(*x as i64),
            Value::Complex(c) => Some(c.re as i64),
            Value::Number(scalar) => Some(scalar.as_i64()),
            _ => None,
        }
    }

    /// Real view of any number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            Value::Complex(c) => Some(c.re),
            Value::Number(scalar) => Some(scalar.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Shared> {
        match self {
            Value::Object(shared) => Some(shared),
            _ => None,
        }
    }

    /// Items of a tuple, list or record.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            Value::Record(record) => Some(&record.values),
            _ => None,
        }
    }

    /// Mutable items of a tuple, list or record.
    pub fn items_mut(&mut self) -> Option<&mut [Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            Value::Record(record) => Some(&mut record.values),
            _ => None,
        }
    }

    /// Truthiness, used when coercing into a boolean cell.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Value::Number(scalar) => {
                let source = Source::of(&Value::Number(*scalar));
                source.map_or(false, |s| cast!(s, f64) != 0.0 || s.imag() != 0.0)
            }
            Value::Bytes(b) => !b.is_empty(),
            Value::Text(s) => !s.is_empty(),
            Value::Tuple(items) | Value::List(items) => !items.is_empty(),
            Value::Record(record) => !record.values.is_empty(),
            Value::Object(shared) => shared.borrow().truthy(),
        }
    }

    /// Copies the value so that no `Object` reference is shared with `self`.
    ///
    /// References to one object inside `self` become references to one new
    /// object, so objects that reach themselves are copied with the same
    /// shape.
    pub fn deep_copy(&self) -> Value {
        self.deep_copy_with(&mut HashMap::new())
    }

    fn deep_copy_with(&self, copies: &mut HashMap<usize, Shared>) -> Value {
        match self {
            Value::Tuple(items) => Value::Tuple(copy_items(items, copies)),
            Value::List(items) => Value::List(copy_items(items, copies)),
            Value::Record(record) => Value::Record(Record {
                name: record.name.clone(),
                names: record.names.clone(),
                values: copy_items(&record.values, copies),
            }),
            Value::Object(shared) => {
                if let Some(copy) = copies.get(&shared.addr()) {
                    return Value::Object(copy.clone());
                }
                let copy = Shared::new(Value::None);
                copies.insert(shared.addr(), copy.clone());
                let inner = shared.borrow().deep_copy_with(copies);
                *copy.borrow_mut() = inner;
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    /// Equality that compares numbers by value whatever their width, at any
    /// depth of tuples, lists and records.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
                items_loose_eq(a, b)
            }
            (Value::Record(a), Value::Record(b)) => {
                a.name == b.name && a.names == b.names && items_loose_eq(&a.values, &b.values)
            }
            _ => match (Source::of(self), Source::of(other)) {
                (Some(a), Some(b)) => cast!(a, f64) == cast!(b, f64) && a.imag() == b.imag(),
                _ => false,
            },
        }
    }

    /// Returns whether `item` equals this value or, recursively, any of its
    /// items.
    pub fn contains(&self, item: &Value) -> bool {
        if self.loose_eq(item) {
            return true;
        }
        match self.items() {
            Some(items) => items.iter().any(|v| v.contains(item)),
            None => false,
        }
    }

    fn fmt_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "'{}'", s),
            other => fmt::Display::fmt(other, f),
        }
    }
}

fn copy_items(items: &[Value], copies: &mut HashMap<usize, Shared>) -> Vec<Value> {
    items.iter().map(|item| item.deep_copy_with(copies)).collect()
}

/// Element-wise [`Value::loose_eq`].
pub(crate) fn items_loose_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.loose_eq(b))
}

fn fmt_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        item.fmt_repr(f)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Complex(c) => write!(f, "{}", c),
            Value::Number(scalar) => write!(f, "{}", scalar),
            Value::Bytes(bytes) => {
                write!(f, "b'")?;
                for &b in bytes {
                    if b.is_ascii_graphic() || b == b' ' {
                        write!(f, "{}", b as char)?;
                    } else {
                        write!(f, "\\x{:02x}", b)?;
                    }
                }
                write!(f, "'")
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                fmt_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                fmt_items(f, items)?;
                write!(f, "]")
            }
            Value::Record(record) => {
                write!(f, "{}(", record.name)?;
                for (i, (name, value)) in record.names.iter().zip(&record.values).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}=", name)?;
                    value.fmt_repr(f)?;
                }
                write!(f, ")")
            }
            Value::Object(shared) => write!(f, "{}", shared),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Complex<f64>> for Value {
    fn from(c: Complex<f64>) -> Self {
        Value::Complex(c)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Number(scalar)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Shared> for Value {
    fn from(shared: Shared) -> Self {
        Value::Object(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion_wraps() {
        assert_eq!(
            Scalar::coerce(ElementKind::UInt32, &Value::Int(-1)),
            Some(Scalar::UInt32(u32::MAX))
        );
        assert_eq!(
            Scalar::coerce(ElementKind::Int8, &Value::Int(300)),
            Some(Scalar::Int8(44))
        );
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(
            Scalar::coerce(ElementKind::Float32, &Value::Int(1)),
            Some(Scalar::Float32(1.0))
        );
        assert_eq!(
            Scalar::coerce(ElementKind::Int32, &Value::Float(2.75)),
            Some(Scalar::Int32(2))
        );
    }

    #[test]
    fn test_complex_coercion() {
        assert_eq!(
            Scalar::coerce(ElementKind::Complex128, &Value::Float(1.5)),
            Some(Scalar::Complex128(Complex::new(1.5, 0.0)))
        );
        assert_eq!(
            Scalar::coerce(ElementKind::Float64, &Value::Complex(Complex::new(2.0, 3.0))),
            Some(Scalar::Float64(2.0))
        );
    }

    #[test]
    fn test_coercion_rejects_non_numbers() {
        assert_eq!(Scalar::coerce(ElementKind::Int32, &Value::from("abc")), None);
        assert_eq!(Scalar::coerce(ElementKind::Bool, &Value::Int(1)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Number(Scalar::Float32(2.5)).to_string(), "2.5");
        assert_eq!(Value::Complex(Complex::new(1.0, -2.0)).to_string(), "(1.0-2.0j)");
        assert_eq!(Value::Bytes(b"ab\x00".to_vec()).to_string(), "b'ab\\x00'");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).to_string(), "(1,)");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, 'a']"
        );
        let record = Record::new(
            "Point",
            vec![("x".into(), Value::Int(1)), ("y".into(), Value::Int(2))],
        );
        assert_eq!(Value::Record(record).to_string(), "Point(x=1, y=2)");
    }

    #[test]
    fn test_clone_aliases_objects_but_deep_copy_does_not() {
        let original = Value::shared(Value::List(vec![]));
        let alias = original.clone();
        let copy = original.deep_copy();

        if let Some(shared) = original.as_object() {
            if let Value::List(items) = &mut *shared.borrow_mut() {
                items.push(Value::from("local"));
            }
        }

        assert_eq!(alias.to_string(), "['local']");
        assert_eq!(copy.to_string(), "[]");
    }

    #[test]
    fn test_contains_is_recursive() {
        let nested = Value::Tuple(vec![
            Value::Tuple(vec![Value::Int(1), Value::Int(2)]),
            Value::Tuple(vec![Value::Int(3)]),
        ]);
        assert!(nested.contains(&Value::Int(3)));
        assert!(!nested.contains(&Value::Int(4)));
    }

    #[test]
    fn test_loose_eq_ignores_width() {
        assert!(Value::Number(Scalar::UInt8(3)).loose_eq(&Value::Int(3)));
        assert!(Value::Number(Scalar::Float32(0.5)).loose_eq(&Value::Float(0.5)));
        assert!(!Value::Number(Scalar::Int32(3)).loose_eq(&Value::Int(4)));
        assert!(!Value::from("3").loose_eq(&Value::Int(3)));

        let cells = Value::Tuple(vec![Value::Number(Scalar::Int16(7))]);
        assert!(cells.contains(&Value::Int(7)));
    }

    #[test]
    fn test_loose_eq_recurses_into_composites() {
        let narrow = Value::Tuple(vec![
            Value::Number(Scalar::Float32(1.0)),
            Value::List(vec![Value::Number(Scalar::Int8(2))]),
        ]);
        let wide = Value::Tuple(vec![Value::Float(1.0), Value::List(vec![Value::Int(2)])]);
        assert!(narrow.loose_eq(&wide));
        assert!(!narrow.loose_eq(&Value::List(vec![Value::Float(1.0), Value::Int(2)])));

        let point = |x: Value| Record::new("Point", vec![("x".into(), x)]);
        assert!(Value::from(point(Value::Number(Scalar::UInt16(4))))
            .loose_eq(&Value::from(point(Value::Int(4)))));
        assert!(!Value::from(point(Value::Int(4))).loose_eq(&Value::from(Record::new(
            "Other",
            vec![("x".into(), Value::Int(4))]
        ))));
    }

    fn self_referencing() -> Value {
        let object = Value::shared(Value::List(vec![Value::Int(1)]));
        let Value::Object(shared) = &object else {
            unreachable!()
        };
        if let Value::List(items) = &mut *shared.borrow_mut() {
            items.push(object.clone());
        }
        object
    }

    #[test]
    fn test_self_referencing_object() {
        let object = self_referencing();
        assert_eq!(object.to_string(), "[1, [...]]");
        assert!(format!("{:?}", object).contains("Shared(..)"));

        let copy = object.deep_copy();
        let copied = copy.as_object().unwrap();
        assert!(!copied.ptr_eq(object.as_object().unwrap()));
        assert_eq!(copy.to_string(), "[1, [...]]");
        assert_eq!(copy, object);

        let Value::List(items) = &*copied.borrow() else {
            panic!("expected a list");
        };
        assert!(items[1].as_object().unwrap().ptr_eq(copied));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Number(Scalar::UInt32(1)).type_name(), "uint32");
        assert_eq!(Value::from("x").type_name(), "str");
        assert_eq!(Value::None.type_name(), "NoneType");
    }
}
