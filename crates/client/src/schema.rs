//! Resource descriptors
//!
//! Static schema metadata for every resource kind and query the provider
//! exposes. Descriptors are fixed at build time; the mapper walks them to
//! convert between typed objects and property bags.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Shape of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Bool,
    List(&'static FieldType),
    Object(&'static [FieldDescriptor]),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::List(_) => "list",
            FieldType::Object(_) => "object",
        }
    }
}

/// One declared input or output field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire key in the property bag
    pub key: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

pub const fn required(key: &'static str, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        key,
        ty,
        required: true,
    }
}

pub const fn optional(key: &'static str, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        key,
        ty,
        required: false,
    }
}

/// Static schema for one resource kind or invokable query.
///
/// The token selects the kind on the provider host and must match exactly:
/// `perimeter:index/resourceKind:ResourceKind`.
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub token: &'static str,
    pub inputs: &'static [FieldDescriptor],
    pub outputs: &'static [FieldDescriptor],
}

impl ResourceDescriptor {
    pub fn input(&self, key: &str) -> Option<&FieldDescriptor> {
        self.inputs.iter().find(|f| f.key == key)
    }

    pub fn output(&self, key: &str) -> Option<&FieldDescriptor> {
        self.outputs.iter().find(|f| f.key == key)
    }

    /// Resource kind, the last segment of the type token
    pub fn kind(&self) -> &'static str {
        self.token.rsplit(':').next().unwrap_or(self.token)
    }
}

static REGISTRY: Lazy<HashMap<&'static str, &'static ResourceDescriptor>> = Lazy::new(|| {
    crate::resources::all_descriptors()
        .iter()
        .map(|d| (d.token, *d))
        .collect()
});

/// Look up a descriptor by its type token
pub fn lookup(token: &str) -> Option<&'static ResourceDescriptor> {
    REGISTRY.get(token).copied()
}
