use std::collections::BTreeMap;

use crate::combination::Candidate;
use crate::error::{Error, Result};
use crate::template::{Field, Template};
use crate::value::{Record, Value};

/// Declared type of a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Any,
    Null,
    Bool,
    Int,
    /// Floats and integers.
    Float,
    Text,
    Array(Box<FieldType>),
    Object(Shape),
    OneOf(Vec<FieldType>),
    Callback,
}

impl FieldType {
    pub fn array(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    /// `ty` or an explicit null.
    pub fn nullable(ty: FieldType) -> Self {
        FieldType::OneOf(vec![ty, FieldType::Null])
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Null, Value::Null) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Int, Value::Int(_)) => true,
            (FieldType::Float, Value::Float(_) | Value::Int(_)) => true,
            (FieldType::Text, Value::Text(_)) => true,
            (FieldType::Array(item), Value::Array(items)) => {
                items.borrow().iter().all(|value| item.accepts(value))
            }
            (FieldType::Object(shape), Value::Object(fields)) => {
                shape.check_record(&fields.borrow()).is_ok()
            }
            (FieldType::OneOf(options), value) => options.iter().any(|ty| ty.accepts(value)),
            (FieldType::Callback, Value::Callback(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    ty: FieldType,
    optional: bool,
}

/// Declared shape of the objects a template must produce.
///
/// Optional fields may be absent from a result; required ones may not. A
/// field that may hold null must say so in its type, absence and null are
/// checked separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    fields: BTreeMap<String, FieldSpec>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields
            .insert(name.into(), FieldSpec { ty, optional: false });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields
            .insert(name.into(), FieldSpec { ty, optional: true });
        self
    }

    /// Check a template against this shape.
    ///
    /// This evaluates every checked combination once. Combinations marked
    /// with [`Combination::unchecked`](crate::Combination::unchecked) are only
    /// checked for omission.
    pub fn validate(&self, template: &Template) -> Result<()> {
        for (name, field) in template.fields() {
            let spec = self
                .fields
                .get(name)
                .ok_or_else(|| Error::shape(name, "field is not declared"))?;

            match field {
                Field::Literal(value) => check_value(name, spec, value)?,
                Field::Combination(combination) => {
                    for candidate in combination.candidates() {
                        match candidate {
                            Candidate::Omit if !spec.optional => {
                                return Err(Error::shape(
                                    name,
                                    "omission offered for a required field",
                                ));
                            }
                            Candidate::Omit => {}
                            Candidate::Set(value) if combination.is_checked() => {
                                check_value(name, spec, &value)?
                            }
                            Candidate::Set(_) => {}
                        }
                    }
                }
            }
        }

        for (name, spec) in &self.fields {
            if !spec.optional && template.get(name).is_none() {
                return Err(Error::shape(name, "required field is missing"));
            }
        }

        Ok(())
    }

    fn check_record(&self, record: &Record) -> Result<()> {
        for (name, value) in record {
            let spec = self
                .fields
                .get(name)
                .ok_or_else(|| Error::shape(name, "field is not declared"))?;
            check_value(name, spec, value)?;
        }
        for (name, spec) in &self.fields {
            if !spec.optional && !record.contains_key(name) {
                return Err(Error::shape(name, "required field is missing"));
            }
        }
        Ok(())
    }
}

fn check_value(name: &str, spec: &FieldSpec, value: &Value) -> Result<()> {
    if spec.ty.accepts(value) {
        Ok(())
    } else {
        Err(Error::shape(
            name,
            format!("{} value does not match {:?}", value.kind(), spec.ty),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::{Combination, one, optional, some};

    fn user_shape() -> Shape {
        Shape::new()
            .required("name", FieldType::Text)
            .required("roles", FieldType::array(FieldType::Text))
            .optional("nickname", FieldType::Text)
            .required("manager", FieldType::nullable(FieldType::Text))
    }

    #[test]
    fn accepts_matching_template() {
        let template = Template::new()
            .field("name", one(["ana", "bo"]))
            .field("roles", some(["admin", "dev"]))
            .field("nickname", optional("b"))
            .field("manager", one([Value::Null, Value::from("carla")]));

        user_shape().validate(&template).expect("template fits shape");
    }

    #[test]
    fn rejects_literal_of_wrong_type() {
        let template = Template::new()
            .field("name", 42)
            .field("roles", Vec::<Value>::new())
            .field("manager", Value::Null);

        let err = user_shape().validate(&template).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref field, .. } if field == "name"));
    }

    #[test]
    fn rejects_optional_on_required_field() {
        let template = Template::new()
            .field("name", optional("ana"))
            .field("roles", Vec::<Value>::new())
            .field("manager", Value::Null);

        let err = user_shape().validate(&template).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                field: "name".to_string(),
                message: "omission offered for a required field".to_string(),
            }
        );
    }

    #[test]
    fn null_does_not_stand_in_for_absence() {
        let shape = Shape::new().optional("nickname", FieldType::Text);
        let template = Template::new().field("nickname", Value::Null);
        assert!(shape.validate(&template).is_err());
    }

    #[test]
    fn rejects_missing_and_undeclared_fields() {
        let missing = Template::new().field("name", "ana");
        assert!(user_shape().validate(&missing).is_err());

        let undeclared = Template::new().field("age", 3);
        let err = Shape::new().validate(&undeclared).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref field, .. } if field == "age"));
    }

    #[test]
    fn unchecked_combination_skips_value_checks() {
        let shape = Shape::new().required("count", FieldType::Int);
        let invalid = Template::new().field("count", one(["many"]));
        assert!(shape.validate(&invalid).is_err());

        let relabeled = Template::new().field("count", one(["many"]).unchecked());
        shape.validate(&relabeled).expect("unchecked values are trusted");

        let omitting =
            Template::new().field("count", Combination::from_fn(|| vec![Candidate::Omit]).unchecked());
        assert!(shape.validate(&omitting).is_err());
    }

    #[test]
    fn nested_object_shapes_are_checked() {
        let address = Shape::new().required("city", FieldType::Text);
        let shape = Shape::new().required("address", FieldType::Object(address));

        let mut good = crate::Record::new();
        good.insert("city".to_string(), Value::from("Porto"));
        let mut bad = crate::Record::new();
        bad.insert("zip".to_string(), Value::from("4000"));

        let template = Template::new().field("address", one([Value::object(good)]));
        shape.validate(&template).expect("nested object fits");

        let template = Template::new().field("address", one([Value::object(bad)]));
        assert!(shape.validate(&template).is_err());
    }
}
