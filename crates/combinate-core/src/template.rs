use crate::combination::Combination;
use crate::value::{Callback, Record, Value};

/// Template entry: a fixed value or a set of candidates.
#[derive(Debug, Clone)]
pub enum Field {
    Literal(Value),
    Combination(Combination),
}

macro_rules! literal_field_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(value: $ty) -> Self {
                    Field::Literal(value.into())
                }
            }
        )*
    };
}

literal_field_from!(Value, bool, i32, i64, u32, f64, &str, String, Record, Callback);

impl<T: Into<Value>> From<Vec<T>> for Field {
    fn from(items: Vec<T>) -> Self {
        Field::Literal(Value::array(items))
    }
}

impl From<Combination> for Field {
    fn from(combination: Combination) -> Self {
        Field::Combination(combination)
    }
}

/// Declarative description of a family of objects.
///
/// Fields keep their declaration order, which decides the nesting order of
/// the expansion.
#[derive(Debug, Clone, Default)]
pub struct Template {
    fields: Vec<(String, Field)>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Template::set`].
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.set(name, field);
        self
    }

    /// Declare a field. Redeclaring a name replaces it in its original position.
    pub fn set(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name, field)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Combination fields in declaration order.
    pub fn combinations(&self) -> impl Iterator<Item = (&str, &Combination)> {
        self.fields().filter_map(|(name, field)| match field {
            Field::Combination(combination) => Some((name, combination)),
            Field::Literal(_) => None,
        })
    }

    /// The literal fields, shallow-copied into a fresh record.
    pub fn base_object(&self) -> Record {
        self.fields()
            .filter_map(|(name, field)| match field {
                Field::Literal(value) => Some((name.to_string(), value.clone())),
                Field::Combination(_) => None,
            })
            .collect()
    }
}
