//! Remote network resource

use async_trait::async_trait;

use perimeter_common::{RemoteNetwork, Result};

use super::{query_list, ManagedKind};
use crate::client::ProviderClient;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::string_value;

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("name", FieldType::String),
    optional("location", FieldType::String),
];

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/remoteNetwork:RemoteNetwork",
    inputs: &[
        required("name", FieldType::String),
        optional("location", FieldType::String),
    ],
    outputs: FIELDS,
};

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getRemoteNetworks:getRemoteNetworks",
    inputs: &[optional("name", FieldType::String)],
    outputs: &[required(
        "remoteNetworks",
        FieldType::List(&FieldType::Object(FIELDS)),
    )],
};

/// Arguments for creating or updating a remote network
#[derive(Debug, Clone, Default)]
pub struct RemoteNetworkArgs {
    pub name: String,
    pub location: Option<String>,
}

fn model(outputs: &Outputs) -> Result<RemoteNetwork> {
    Ok(RemoteNetwork {
        id: outputs.require_id()?.to_string(),
        name: outputs.require_str("name")?.to_string(),
        location: outputs.str("location").map(str::to_string),
    })
}

#[async_trait]
impl ManagedKind for RemoteNetwork {
    type Args = RemoteNetworkArgs;
    type Model = RemoteNetwork;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &RemoteNetworkArgs) -> Result<Arguments> {
        Arguments::builder(&DESCRIPTOR)
            .set("name", string_value(&args.name))
            .set_opt("location", args.location.as_deref().map(string_value))
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<RemoteNetwork> {
        model(outputs)
    }
}

/// List remote networks, optionally filtered by exact name
pub async fn list(
    client: &mut ProviderClient,
    name: Option<&str>,
) -> Result<Vec<RemoteNetwork>> {
    let arguments = Arguments::builder(&QUERY_DESCRIPTOR)
        .set_opt("name", name.map(string_value))
        .build()?;
    query_list(
        client,
        &QUERY_DESCRIPTOR,
        arguments,
        "remoteNetworks",
        FIELDS,
        model,
    )
    .await
}
