//! Schema mapper
//!
//! Bidirectional conversion between typed argument/result objects and the
//! untyped property bags exchanged with the provider host. Pure data
//! transformation; the walk order is the descriptor's declaration order.

use std::collections::BTreeMap;

use perimeter_common::{Error, Result};

use crate::object::{Arguments, Outputs};
use crate::schema::{FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::Value;

/// Convert an argument object into a property bag.
///
/// Present values are copied in descriptor order, absent optional fields are
/// omitted, and an absent required field is an error naming the field.
pub fn to_bag(args: &Arguments) -> Result<Value> {
    let descriptor = args.descriptor();
    let mut bag = BTreeMap::new();

    for field in descriptor.inputs {
        match args.get(field.key) {
            Some(value) => {
                check_shape(field.key, &field.ty, value, false)?;
                bag.insert(field.key.to_string(), value.clone());
            }
            None if field.required => return Err(Error::missing_field(field.key)),
            None => {}
        }
    }

    Ok(Value::Map(bag))
}

/// Reconstruct a result object from a provider property bag.
///
/// Every required output must be present with a compatible shape; optional
/// outputs may be absent or null.
pub fn from_bag(descriptor: &'static ResourceDescriptor, bag: &Value) -> Result<Outputs> {
    outputs_from_map(descriptor.outputs, bag)
}

/// Like [`from_bag`], but against a bare field list. Used for the elements
/// of list-shaped query results.
pub fn outputs_from_map(fields: &'static [FieldDescriptor], bag: &Value) -> Result<Outputs> {
    let map = bag.as_map().ok_or_else(|| {
        Error::mismatch(
            "<root>",
            format!("expected object, found {}", bag.type_name()),
        )
    })?;

    let mut values = BTreeMap::new();
    for field in fields {
        let value = map.get(field.key).filter(|v| !v.is_null());
        match value {
            Some(value) => {
                check_shape(field.key, &field.ty, value, true)?;
                values.insert(field.key, value.clone());
            }
            None if field.required => {
                return Err(Error::mismatch(field.key, "missing required output field"));
            }
            None => {}
        }
    }

    Ok(Outputs::new(fields, values))
}

/// Check one value against its declared shape, recursing into lists and
/// nested objects. `output` selects which error a missing nested required
/// field maps to: responses are schema mismatches, inputs are missing
/// fields.
pub(crate) fn check_shape(
    path: &str,
    ty: &FieldType,
    value: &Value,
    output: bool,
) -> Result<()> {
    match (*ty, value) {
        (FieldType::String, Value::String(_)) => Ok(()),
        (FieldType::Int, Value::Number(n)) if n.as_i64().is_some() => Ok(()),
        (FieldType::Bool, Value::Bool(_)) => Ok(()),
        (FieldType::List(item_ty), Value::List(items)) => {
            for (idx, item) in items.iter().enumerate() {
                check_shape(&format!("{path}[{idx}]"), item_ty, item, output)?;
            }
            Ok(())
        }
        (FieldType::Object(fields), Value::Map(map)) => {
            for key in map.keys() {
                if !fields.iter().any(|f| f.key == key) {
                    return Err(Error::mismatch(
                        format!("{path}.{key}"),
                        "not a declared field",
                    ));
                }
            }
            for field in fields {
                let nested_path = format!("{path}.{}", field.key);
                let nested = map.get(field.key).filter(|v| !v.is_null());
                match nested {
                    Some(value) => check_shape(&nested_path, &field.ty, value, output)?,
                    None if field.required && output => {
                        return Err(Error::mismatch(nested_path, "missing required output field"));
                    }
                    None if field.required => {
                        return Err(Error::missing_field(nested_path));
                    }
                    None => {}
                }
            }
            Ok(())
        }
        (ty, value) => Err(Error::mismatch(
            path,
            format!("expected {}, found {}", ty.name(), value.type_name()),
        )),
    }
}
