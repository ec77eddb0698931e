//! Protected resource with its protocol rules

use async_trait::async_trait;

use perimeter_common::{Error, NetResource, Protocol, Protocols, Result};

use super::{query_list, ManagedKind};
use crate::client::ProviderClient;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::{bag, bool_value, string_list_value, string_value, Value};

const PROTOCOL_FIELDS: &[FieldDescriptor] = &[
    required("policy", FieldType::String),
    optional("ports", FieldType::List(&FieldType::String)),
];

const PROTOCOLS_FIELDS: &[FieldDescriptor] = &[
    optional("allowIcmp", FieldType::Bool),
    optional("tcp", FieldType::Object(PROTOCOL_FIELDS)),
    optional("udp", FieldType::Object(PROTOCOL_FIELDS)),
];

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("name", FieldType::String),
    required("address", FieldType::String),
    required("remoteNetworkId", FieldType::String),
    optional("groupIds", FieldType::List(&FieldType::String)),
    optional("protocols", FieldType::Object(PROTOCOLS_FIELDS)),
    optional("isActive", FieldType::Bool),
];

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/resource:Resource",
    inputs: &[
        required("name", FieldType::String),
        required("address", FieldType::String),
        required("remoteNetworkId", FieldType::String),
        optional("groupIds", FieldType::List(&FieldType::String)),
        optional("protocols", FieldType::Object(PROTOCOLS_FIELDS)),
    ],
    outputs: FIELDS,
};

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getResources:getResources",
    inputs: &[optional("name", FieldType::String)],
    outputs: &[required(
        "resources",
        FieldType::List(&FieldType::Object(FIELDS)),
    )],
};

/// Arguments for protecting a resource behind a remote network
#[derive(Debug, Clone, Default)]
pub struct NetResourceArgs {
    pub name: String,
    pub address: String,
    pub remote_network_id: String,
    pub group_ids: Vec<String>,
    pub protocols: Option<Protocols>,
}

/// Map protocol rules into their property bag form
pub fn protocols_to_value(protocols: &Protocols) -> Value {
    bag(vec![
        ("allowIcmp", bool_value(protocols.allow_icmp)),
        ("tcp", protocol_to_value(&protocols.tcp)),
        ("udp", protocol_to_value(&protocols.udp)),
    ])
}

fn protocol_to_value(protocol: &Protocol) -> Value {
    bag(vec![
        ("policy", string_value(protocol.policy.to_string())),
        ("ports", string_list_value(protocol.ports_to_strings())),
    ])
}

/// Rebuild protocol rules from their property bag form. Absent pieces fall
/// back to the permissive defaults.
pub fn protocols_from_value(value: &Value) -> Result<Protocols> {
    let mut protocols = Protocols::default();
    if let Some(allow_icmp) = value.get("allowIcmp").and_then(Value::as_bool) {
        protocols.allow_icmp = allow_icmp;
    }
    if let Some(tcp) = value.get("tcp") {
        protocols.tcp = protocol_from_value(tcp)?;
    }
    if let Some(udp) = value.get("udp") {
        protocols.udp = protocol_from_value(udp)?;
    }
    Ok(protocols)
}

fn protocol_from_value(value: &Value) -> Result<Protocol> {
    let policy = match value.get("policy").and_then(Value::as_str) {
        Some(policy) => policy.parse()?,
        None => return Ok(Protocol::allow_all()),
    };

    let mut ports = Vec::new();
    if let Some(items) = value.get("ports").and_then(Value::as_list) {
        for item in items {
            let port = item
                .as_str()
                .ok_or_else(|| Error::mismatch("ports", "expected a port string"))?;
            ports.push(port.parse()?);
        }
    }

    Ok(Protocol::new(policy, ports))
}

fn model(outputs: &Outputs) -> Result<NetResource> {
    let protocols = match outputs.get("protocols") {
        Some(value) => protocols_from_value(value)?,
        None => Protocols::default(),
    };

    Ok(NetResource {
        id: outputs.require_id()?.to_string(),
        name: outputs.require_str("name")?.to_string(),
        address: outputs.require_str("address")?.to_string(),
        remote_network_id: outputs.require_str("remoteNetworkId")?.to_string(),
        group_ids: outputs.string_list("groupIds"),
        protocols,
        is_active: outputs.bool("isActive").unwrap_or(false),
    })
}

#[async_trait]
impl ManagedKind for NetResource {
    type Args = NetResourceArgs;
    type Model = NetResource;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &NetResourceArgs) -> Result<Arguments> {
        let mut builder = Arguments::builder(&DESCRIPTOR)
            .set("name", string_value(&args.name))
            .set("address", string_value(&args.address))
            .set("remoteNetworkId", string_value(&args.remote_network_id));

        if !args.group_ids.is_empty() {
            builder = builder.set("groupIds", string_list_value(args.group_ids.clone()));
        }
        if let Some(protocols) = &args.protocols {
            builder = builder.set("protocols", protocols_to_value(protocols));
        }

        builder.build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<NetResource> {
        model(outputs)
    }
}

/// List protected resources, optionally filtered by exact name
pub async fn list(client: &mut ProviderClient, name: Option<&str>) -> Result<Vec<NetResource>> {
    let arguments = Arguments::builder(&QUERY_DESCRIPTOR)
        .set_opt("name", name.map(string_value))
        .build()?;
    query_list(
        client,
        &QUERY_DESCRIPTOR,
        arguments,
        "resources",
        FIELDS,
        model,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_common::{PortPolicy, PortRange};

    #[test]
    fn protocol_rules_round_trip_through_bags() {
        let protocols = Protocols {
            allow_icmp: true,
            tcp: Protocol::new(
                PortPolicy::Restricted,
                vec![PortRange::single(443), PortRange { start: 8000, end: 8080 }],
            ),
            udp: Protocol::allow_all(),
        };

        let value = protocols_to_value(&protocols);
        let rebuilt = protocols_from_value(&value).unwrap();
        assert_eq!(rebuilt, protocols);
    }

    #[test]
    fn absent_protocol_pieces_default_to_permissive() {
        let rebuilt = protocols_from_value(&bag(vec![])).unwrap();
        assert_eq!(rebuilt, Protocols::default());
    }

    #[test]
    fn bad_port_strings_fail_parsing() {
        let value = bag(vec![(
            "tcp",
            bag(vec![
                ("policy", string_value("RESTRICTED")),
                ("ports", string_list_value(["443-80"])),
            ]),
        )]);
        assert!(protocols_from_value(&value).is_err());
    }
}
