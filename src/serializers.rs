//! Per-widget value serializers applied to draft data before it is persisted.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::workflow::Field;

pub trait ValueSerializer: Send + Sync {
    /// Editor value to stored value.
    fn serialize(&self, value: &Value) -> Value;

    /// Stored value to editor value.
    fn deserialize(&self, value: &Value) -> Value;
}

#[derive(Clone, Copy)]
enum Direction {
    Serialize,
    Deserialize,
}

#[derive(Clone, Default)]
pub struct SerializerRegistry {
    by_widget: HashMap<String, Arc<dyn ValueSerializer>>,
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widgets: Vec<&String> = self.by_widget.keys().collect();
        widgets.sort();
        f.debug_struct("SerializerRegistry")
            .field("widgets", &widgets)
            .finish()
    }
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, widget: impl Into<String>, serializer: impl ValueSerializer + 'static) {
        self.by_widget.insert(widget.into(), Arc::new(serializer));
    }

    pub fn get(&self, widget: &str) -> Option<&Arc<dyn ValueSerializer>> {
        self.by_widget.get(widget)
    }

    pub fn serialize_values(&self, values: &Value, fields: &[Field]) -> Value {
        self.run(values, fields, Direction::Serialize)
    }

    pub fn deserialize_values(&self, values: &Value, fields: &[Field]) -> Value {
        self.run(values, fields, Direction::Deserialize)
    }

    fn run(&self, values: &Value, fields: &[Field], direction: Direction) -> Value {
        let Value::Object(map) = values else {
            return values.clone();
        };
        let mut out = map.clone();

        for field in fields {
            let Some(value) = map.get(&field.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let nested = if !field.fields.is_empty() {
                Some(field.fields.as_slice())
            } else {
                field.field.as_deref().map(std::slice::from_ref)
            };

            let converted = match (nested, value) {
                (Some(nested), Value::Array(items)) => Value::Array(
                    items
                        .iter()
                        .map(|item| match (item, &field.field) {
                            // single-field lists hold bare values, not objects
                            (item, Some(single)) if !item.is_object() => {
                                self.convert_one(item, single, direction)
                            }
                            (item, _) => self.run(item, nested, direction),
                        })
                        .collect(),
                ),
                (Some(nested), Value::Object(_)) => self.run(value, nested, direction),
                _ => self.convert_one(value, field, direction),
            };
            out.insert(field.name.clone(), converted);
        }

        Value::Object(out)
    }

    fn convert_one(&self, value: &Value, field: &Field, direction: Direction) -> Value {
        match (self.get(&field.widget), direction) {
            (Some(serializer), Direction::Serialize) => serializer.serialize(value),
            (Some(serializer), Direction::Deserialize) => serializer.deserialize(value),
            (None, _) => value.clone(),
        }
    }
}
