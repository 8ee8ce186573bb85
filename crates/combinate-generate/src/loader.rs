//! JSON template documents.
//!
//! A template document is a JSON object. Members are literals unless they are
//! an object with a single directive key:
//!
//! | Directive | Meaning |
//! |---|---|
//! | `{"$one": [..]}` | choose exactly one element |
//! | `{"$some": [..]}` | choose any subset |
//! | `{"$optional": v}` | `v` or absent |
//! | `{"$nest": {..}}` | one fully expanded nested template |
//! | `{"$literal": v}` | `v` as-is, for objects that look like directives |

use serde_json::{Map, Value as JsonValue};

use combinate_core::{Field, MAX_SUBSET_ITEMS, Template, Value, one, optional, some};

use crate::engine::GenerationEngine;
use crate::errors::GenerationError;

const DIRECTIVE_PREFIX: char = '$';

/// Parse a JSON template document with the default engine for `$nest`.
pub fn template_from_json(json: &JsonValue) -> Result<Template, GenerationError> {
    template_from_json_with(json, &GenerationEngine::default())
}

/// Parse a JSON template document from text.
pub fn template_from_str(text: &str) -> Result<Template, GenerationError> {
    let json: JsonValue = serde_json::from_str(text)?;
    template_from_json(&json)
}

/// Parse a JSON template document; `$nest` members are expanded by `engine`.
pub fn template_from_json_with(
    json: &JsonValue,
    engine: &GenerationEngine,
) -> Result<Template, GenerationError> {
    let members = json.as_object().ok_or_else(|| {
        GenerationError::InvalidTemplate("template root must be an object".to_string())
    })?;

    let mut template = Template::new();
    for (name, member) in members {
        template.set(name.as_str(), parse_field(name, member, engine)?);
    }
    Ok(template)
}

fn parse_field(
    name: &str,
    member: &JsonValue,
    engine: &GenerationEngine,
) -> Result<Field, GenerationError> {
    let Some((directive, argument)) = split_directive(member) else {
        return Ok(Field::Literal(Value::from(member.clone())));
    };

    let field: Field = match directive {
        "$one" => one(array_argument(name, directive, argument)?).into(),
        "$some" => {
            let items = array_argument(name, directive, argument)?;
            if items.len() > MAX_SUBSET_ITEMS {
                return Err(GenerationError::InvalidTemplate(format!(
                    "field '{name}': $some accepts at most {MAX_SUBSET_ITEMS} items, got {}",
                    items.len()
                )));
            }
            some(items).into()
        }
        "$optional" => optional(Value::from(argument.clone())).into(),
        "$nest" => {
            if !argument.is_object() {
                return Err(GenerationError::InvalidTemplate(format!(
                    "field '{name}': $nest expects an object"
                )));
            }
            let nested = template_from_json_with(argument, engine)?;
            engine.nest(&nested).into()
        }
        "$literal" => Field::Literal(Value::from(argument.clone())),
        other => {
            return Err(GenerationError::InvalidTemplate(format!(
                "field '{name}': unknown directive '{other}'"
            )));
        }
    };
    Ok(field)
}

fn split_directive(member: &JsonValue) -> Option<(&str, &JsonValue)> {
    let object: &Map<String, JsonValue> = member.as_object()?;
    if object.len() != 1 {
        return None;
    }
    let (key, argument) = object.iter().next()?;
    key.starts_with(DIRECTIVE_PREFIX)
        .then_some((key.as_str(), argument))
}

fn array_argument(
    name: &str,
    directive: &str,
    argument: &JsonValue,
) -> Result<Vec<Value>, GenerationError> {
    let items = argument.as_array().ok_or_else(|| {
        GenerationError::InvalidTemplate(format!("field '{name}': {directive} expects an array"))
    })?;
    Ok(items.iter().cloned().map(Value::from).collect())
}
