//! Argument and result objects
//!
//! One generic container pair serves every resource kind; the descriptor
//! supplies the per-kind field set, so no per-kind argument classes exist.

use std::collections::BTreeMap;

use perimeter_common::{Error, Result};

use crate::mapper;
use crate::schema::{FieldDescriptor, ResourceDescriptor};
use crate::value::Value;

/// Validated input values for one resource kind.
///
/// Construction fails when a required field is absent, an unknown key is
/// set, or a value contradicts its declared shape.
#[derive(Debug, Clone)]
pub struct Arguments {
    descriptor: &'static ResourceDescriptor,
    values: BTreeMap<&'static str, Value>,
}

impl Arguments {
    pub fn builder(descriptor: &'static ResourceDescriptor) -> ArgumentsBuilder {
        ArgumentsBuilder {
            descriptor,
            values: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Builder for [`Arguments`]
#[derive(Debug)]
pub struct ArgumentsBuilder {
    descriptor: &'static ResourceDescriptor,
    values: BTreeMap<String, Value>,
}

impl ArgumentsBuilder {
    /// Set a field. Null values count as absent.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        if !value.is_null() {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    pub fn set_opt(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn build(self) -> Result<Arguments> {
        for key in self.values.keys() {
            if self.descriptor.input(key).is_none() {
                return Err(Error::mismatch(
                    key.clone(),
                    format!("not a declared input of {}", self.descriptor.token),
                ));
            }
        }

        let mut values = BTreeMap::new();
        for field in self.descriptor.inputs {
            match self.values.get(field.key) {
                Some(value) => {
                    mapper::check_shape(field.key, &field.ty, value, false)?;
                    values.insert(field.key, value.clone());
                }
                None if field.required => return Err(Error::missing_field(field.key)),
                None => {}
            }
        }

        Ok(Arguments {
            descriptor: self.descriptor,
            values,
        })
    }
}

/// Read-only view over a provider response, keyed by declared outputs
#[derive(Debug, Clone)]
pub struct Outputs {
    fields: &'static [FieldDescriptor],
    id: Option<String>,
    values: BTreeMap<&'static str, Value>,
}

impl Outputs {
    pub(crate) fn new(
        fields: &'static [FieldDescriptor],
        values: BTreeMap<&'static str, Value>,
    ) -> Self {
        let id = values
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { fields, id, values }
    }

    /// Attach the provider-assigned identity from a register call
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| Error::mismatch("id", "provider returned no identity"))
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.str(key)
            .ok_or_else(|| Error::mismatch(key, "missing required output field"))
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Collect a list-of-strings output; absent fields yield an empty list
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.list(key)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
