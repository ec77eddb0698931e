//! Connector resource and its registration tokens

use async_trait::async_trait;

use perimeter_common::{Connector, ConnectorTokens, Result};

use super::{query_list, ManagedKind};
use crate::client::ProviderClient;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::{bool_value, string_value};

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("name", FieldType::String),
    required("remoteNetworkId", FieldType::String),
    optional("statusUpdatesEnabled", FieldType::Bool),
];

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/connector:Connector",
    inputs: &[
        required("remoteNetworkId", FieldType::String),
        // The host assigns a name when none is given.
        optional("name", FieldType::String),
        optional("statusUpdatesEnabled", FieldType::Bool),
    ],
    outputs: FIELDS,
};

pub static TOKENS_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/connectorTokens:ConnectorTokens",
    inputs: &[required("connectorId", FieldType::String)],
    outputs: &[
        required("id", FieldType::String),
        required("connectorId", FieldType::String),
        required("accessToken", FieldType::String),
        required("refreshToken", FieldType::String),
    ],
};

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getConnectors:getConnectors",
    inputs: &[optional("name", FieldType::String)],
    outputs: &[required(
        "connectors",
        FieldType::List(&FieldType::Object(FIELDS)),
    )],
};

/// Arguments for deploying a connector into a remote network
#[derive(Debug, Clone, Default)]
pub struct ConnectorArgs {
    pub remote_network_id: String,
    pub name: Option<String>,
    pub status_updates_enabled: Option<bool>,
}

/// Arguments for issuing registration tokens for a connector
#[derive(Debug, Clone, Default)]
pub struct ConnectorTokensArgs {
    pub connector_id: String,
}

fn model(outputs: &Outputs) -> Result<Connector> {
    Ok(Connector {
        id: outputs.require_id()?.to_string(),
        name: outputs.require_str("name")?.to_string(),
        remote_network_id: outputs.require_str("remoteNetworkId")?.to_string(),
        status_updates_enabled: outputs.bool("statusUpdatesEnabled").unwrap_or(false),
    })
}

#[async_trait]
impl ManagedKind for Connector {
    type Args = ConnectorArgs;
    type Model = Connector;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &ConnectorArgs) -> Result<Arguments> {
        Arguments::builder(&DESCRIPTOR)
            .set("remoteNetworkId", string_value(&args.remote_network_id))
            .set_opt("name", args.name.as_deref().map(string_value))
            .set_opt(
                "statusUpdatesEnabled",
                args.status_updates_enabled.map(bool_value),
            )
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<Connector> {
        model(outputs)
    }
}

#[async_trait]
impl ManagedKind for ConnectorTokens {
    type Args = ConnectorTokensArgs;
    type Model = ConnectorTokens;

    fn descriptor() -> &'static ResourceDescriptor {
        &TOKENS_DESCRIPTOR
    }

    fn to_arguments(args: &ConnectorTokensArgs) -> Result<Arguments> {
        Arguments::builder(&TOKENS_DESCRIPTOR)
            .set("connectorId", string_value(&args.connector_id))
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<ConnectorTokens> {
        Ok(ConnectorTokens {
            id: outputs.require_id()?.to_string(),
            connector_id: outputs.require_str("connectorId")?.to_string(),
            access_token: outputs.require_str("accessToken")?.to_string(),
            refresh_token: outputs.require_str("refreshToken")?.to_string(),
        })
    }
}

/// List connectors, optionally filtered by exact name
pub async fn list(client: &mut ProviderClient, name: Option<&str>) -> Result<Vec<Connector>> {
    let arguments = Arguments::builder(&QUERY_DESCRIPTOR)
        .set_opt("name", name.map(string_value))
        .build()?;
    query_list(
        client,
        &QUERY_DESCRIPTOR,
        arguments,
        "connectors",
        FIELDS,
        model,
    )
    .await
}
