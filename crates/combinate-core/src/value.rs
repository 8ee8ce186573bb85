use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Reference-counted interior storage used for nested arrays and objects.
///
/// Cloning a [`Value`] clones the `Rc`, never the contents, so nested data is
/// aliased between every value that was cloned from the same source.
pub type Shared<T> = Rc<RefCell<T>>;

/// Field name to value mapping. Keys keep the order they were inserted in.
pub type Record = IndexMap<String, Value>;

/// Opaque function value. It can be stored and called but never copied.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[Value]) -> Value>);

impl Callback {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// True when both handles point at the same function.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Dynamic field value held by templates and result records.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Shared<Vec<Value>>),
    Object(Shared<Record>),
    Callback(Callback),
}

impl Value {
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(shared(items.into_iter().map(Into::into).collect()))
    }

    pub fn object(record: Record) -> Self {
        Value::Object(shared(record))
    }

    pub fn callback(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Value::Callback(Callback::new(f))
    }

    /// Short name of the variant, used in diagnostics and shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callback(_) => "callback",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Shared<Record>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// True when both values are nested containers backed by the same storage.
    pub fn shares_storage(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Copy the value and every nested container it reaches.
    ///
    /// Fails with [`Error::NotCloneable`] when a callback is found anywhere
    /// inside the value, or when a container holds itself (kind `"cycle"`).
    /// Containers reached twice without a cycle are copied twice.
    pub fn deep_clone(&self) -> Result<Value> {
        self.deep_clone_at("$", &mut Vec::new())
    }

    fn deep_clone_at(&self, path: &str, ancestors: &mut Vec<*const ()>) -> Result<Value> {
        let Some(ptr) = self.container_ptr() else {
            return match self {
                Value::Callback(_) => Err(Error::NotCloneable {
                    path: path.to_string(),
                    kind: self.kind(),
                }),
                scalar => Ok(scalar.clone()),
            };
        };
        if ancestors.contains(&ptr) {
            return Err(Error::NotCloneable {
                path: path.to_string(),
                kind: "cycle",
            });
        }

        ancestors.push(ptr);
        let copied = match self {
            Value::Array(items) => items
                .borrow()
                .iter()
                .enumerate()
                .map(|(index, item)| item.deep_clone_at(&format!("{path}[{index}]"), ancestors))
                .collect::<Result<Vec<_>>>()
                .map(|items| Value::Array(shared(items))),
            Value::Object(fields) => deep_clone_fields(&fields.borrow(), path, ancestors)
                .map(|fields| Value::Object(shared(fields))),
            _ => Ok(self.clone()),
        };
        ancestors.pop();
        copied
    }

    /// Address of the nested storage, for arrays and objects.
    fn container_ptr(&self) -> Option<*const ()> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items).cast()),
            Value::Object(fields) => Some(Rc::as_ptr(fields).cast()),
            _ => None,
        }
    }

    /// Convert into a `serde_json::Value`; callbacks and cycles are rejected.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|err| Error::Unsupported(err.to_string()))
    }
}

/// Deep-clone every field of a record.
pub fn deep_clone_record(record: &Record) -> Result<Record> {
    deep_clone_fields(record, "$", &mut Vec::new())
}

fn deep_clone_fields(
    record: &Record,
    path: &str,
    ancestors: &mut Vec<*const ()>,
) -> Result<Record> {
    let mut copied = Record::with_capacity(record.len());
    for (key, value) in record {
        copied.insert(
            key.clone(),
            value.deep_clone_at(&format!("{path}.{key}"), ancestors)?,
        );
    }
    Ok(copied)
}

pub(crate) fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Walks nested containers while remembering the chain of containers it is
/// inside of, so self-referential values render as `<cycle>` instead of
/// recursing forever.
struct Guarded<'v, 'a> {
    value: &'v Value,
    ancestors: &'a RefCell<Vec<*const ()>>,
}

/// Pops the container pushed by [`Guarded::enter`].
struct Visit<'a>(&'a RefCell<Vec<*const ()>>);

impl Drop for Visit<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().pop();
    }
}

impl<'v, 'a> Guarded<'v, 'a> {
    fn enter(&self) -> Option<Visit<'a>> {
        let ptr = self.value.container_ptr()?;
        let mut ancestors = self.ancestors.borrow_mut();
        if ancestors.contains(&ptr) {
            return None;
        }
        ancestors.push(ptr);
        Some(Visit(self.ancestors))
    }

    fn is_cycle(&self) -> bool {
        self.value
            .container_ptr()
            .is_some_and(|ptr| self.ancestors.borrow().contains(&ptr))
    }

    fn child<'c>(&self, value: &'c Value) -> Guarded<'c, 'a> {
        Guarded {
            value,
            ancestors: self.ancestors,
        }
    }
}

impl fmt::Debug for Guarded<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cycle() {
            return f.write_str("<cycle>");
        }
        let _visit = self.enter();
        match self.value {
            Value::Null => f.write_str("Null"),
            Value::Bool(value) => write!(f, "Bool({value})"),
            Value::Int(value) => write!(f, "Int({value})"),
            Value::Float(value) => write!(f, "Float({value})"),
            Value::Text(value) => write!(f, "Text({value:?})"),
            Value::Array(items) => f
                .debug_list()
                .entries(items.borrow().iter().map(|item| self.child(item)))
                .finish(),
            Value::Object(fields) => f
                .debug_map()
                .entries(
                    fields
                        .borrow()
                        .iter()
                        .map(|(key, value)| (key, self.child(value))),
                )
                .finish(),
            Value::Callback(callback) => fmt::Debug::fmt(callback, f),
        }
    }
}

impl fmt::Display for Guarded<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cycle() {
            return f.write_str("<cycle>");
        }
        let _visit = self.enter();
        match self.value {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value:?}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", self.child(item))?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => write_record(f, &fields.borrow(), self.ancestors),
            Value::Callback(_) => f.write_str("<callback>"),
        }
    }
}

impl Serialize for Guarded<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_cycle() {
            return Err(S::Error::custom("cyclic values cannot be serialized"));
        }
        let _visit = self.enter();
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Text(value) => serializer.serialize_str(value),
            Value::Array(items) => {
                let items = items.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let fields = fields.borrow();
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields.iter() {
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            }
            Value::Callback(_) => Err(S::Error::custom("callback values cannot be serialized")),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ancestors = RefCell::new(Vec::new());
        fmt::Debug::fmt(
            &Guarded {
                value: self,
                ancestors: &ancestors,
            },
            f,
        )
    }
}

/// JSON-like rendering used by diagnostics.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ancestors = RefCell::new(Vec::new());
        fmt::Display::fmt(
            &Guarded {
                value: self,
                ancestors: &ancestors,
            },
            f,
        )
    }
}

/// Render a record the same way [`Value`]'s `Display` renders objects.
pub fn display_record(record: &Record) -> String {
    struct Rendered<'a>(&'a Record);

    impl fmt::Display for Rendered<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_record(f, self.0, &RefCell::new(Vec::new()))
        }
    }

    Rendered(record).to_string()
}

fn write_record(
    f: &mut fmt::Formatter<'_>,
    record: &Record,
    ancestors: &RefCell<Vec<*const ()>>,
) -> fmt::Result {
    f.write_str("{")?;
    for (index, (key, value)) in record.iter().enumerate() {
        if index > 0 {
            f.write_str(",")?;
        }
        write!(f, "{key:?}:{}", Guarded { value, ancestors })?;
    }
    f.write_str("}")
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ancestors = RefCell::new(Vec::new());
        Guarded {
            value: self,
            ancestors: &ancestors,
        }
        .serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(int) => Value::Int(int),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::Text(text),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(fields) => Value::object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::object(record)
    }
}

impl From<Callback> for Value {
    fn from(callback: Callback) -> Self {
        Value::Callback(callback)
    }
}
