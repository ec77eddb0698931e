//! Security policy lookups
//!
//! Policies are defined in the provider admin console; the SDK only reads
//! them.

use perimeter_common::{Error, Result, SecurityPolicy};

use super::query_list;
use crate::client::ProviderClient;
use crate::mapper;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::string_value;

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("name", FieldType::String),
];

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getSecurityPolicy:getSecurityPolicy",
    inputs: &[
        optional("id", FieldType::String),
        optional("name", FieldType::String),
    ],
    outputs: FIELDS,
};

pub static LIST_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getSecurityPolicies:getSecurityPolicies",
    inputs: &[],
    outputs: &[required(
        "securityPolicies",
        FieldType::List(&FieldType::Object(FIELDS)),
    )],
};

fn model(outputs: &Outputs) -> Result<SecurityPolicy> {
    Ok(SecurityPolicy {
        id: outputs.require_str("id")?.to_string(),
        name: outputs.require_str("name")?.to_string(),
    })
}

/// Look up a security policy by exactly one of id or name
pub async fn lookup(
    client: &mut ProviderClient,
    id: Option<&str>,
    name: Option<&str>,
) -> Result<SecurityPolicy> {
    if id.is_some() == name.is_some() {
        return Err(Error::InvalidConfig(
            "exactly one of id or name must be set".to_string(),
        ));
    }

    let arguments = Arguments::builder(&QUERY_DESCRIPTOR)
        .set_opt("id", id.map(string_value))
        .set_opt("name", name.map(string_value))
        .build()?;

    let result = client
        .invoke(QUERY_DESCRIPTOR.token, &mapper::to_bag(&arguments)?)
        .await?;
    let outputs = mapper::from_bag(&QUERY_DESCRIPTOR, &result)?;
    model(&outputs)
}

/// List every security policy in the tenant
pub async fn list(client: &mut ProviderClient) -> Result<Vec<SecurityPolicy>> {
    let arguments = Arguments::builder(&LIST_DESCRIPTOR).build()?;
    query_list(
        client,
        &LIST_DESCRIPTOR,
        arguments,
        "securityPolicies",
        FIELDS,
        model,
    )
    .await
}
