//! Provision a remote network with a connector and a protected resource.
//!
//! Expects a reachable provider host; point PERIMETER_ENDPOINT at it and
//! set PERIMETER_API_TOKEN if the host requires one.

use anyhow::Result;

use perimeter_client::resources::{connector, remote_network, resource};
use perimeter_client::{ClientConfig, ManagedKind, ProviderClient};
use perimeter_common::{Connector, NetResource, PortPolicy, Protocol, Protocols, RemoteNetwork};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let mut client = ProviderClient::connect(&config).await?;

    let network = RemoteNetwork::create(
        &mut client,
        "prod-network",
        &remote_network::RemoteNetworkArgs {
            name: "prod-network".to_string(),
            location: Some("AWS".to_string()),
        },
    )
    .await?;
    println!("remote network {} ({})", network.name, network.id);

    let edge = Connector::create(
        &mut client,
        "prod-connector",
        &connector::ConnectorArgs {
            remote_network_id: network.id.clone(),
            name: None,
            status_updates_enabled: Some(true),
        },
    )
    .await?;
    println!("connector {} ({})", edge.name, edge.id);

    let wiki = NetResource::create(
        &mut client,
        "wiki",
        &resource::NetResourceArgs {
            name: "wiki".to_string(),
            address: "wiki.internal".to_string(),
            remote_network_id: network.id.clone(),
            group_ids: Vec::new(),
            protocols: Some(Protocols {
                allow_icmp: false,
                tcp: Protocol::restricted(&["443", "8080"])?,
                udp: Protocol::new(PortPolicy::DenyAll, Vec::new()),
            }),
        },
    )
    .await?;
    println!("resource {} -> {}", wiki.name, wiki.address);

    Ok(())
}
