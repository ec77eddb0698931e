//! Lifecycle tests against an in-process provider host.
//!
//! The mock host keeps a per-name identity map so repeated registrations of
//! an unchanged object resolve to the same id, which is the contract the
//! client relies on.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use uuid::Uuid;

use perimeter_client::perimeter::provider_host_server::{ProviderHost, ProviderHostServer};
use perimeter_client::perimeter::{
    DeleteResourceRequest, DeleteResourceResponse, Failure, InvokeRequest, InvokeResponse,
    PropertyBag, ReadResourceRequest, ReadResourceResponse, RegisterResourceRequest,
    RegisterResourceResponse,
};
use perimeter_client::resources::{
    connector, group, remote_network, resource, security_policy, service_account, user,
};
use perimeter_client::value::{self, bag, string_value, Value};
use perimeter_client::{ClientConfig, ManagedKind, ProviderClient};
use perimeter_common::{
    Connector, ConnectorTokens, Error, Group, GroupType, NetResource, PortPolicy, PortRange,
    Protocol, Protocols, RemoteNetwork, ServiceAccount, ServiceAccountKey, User, UserRole,
};

struct StoredResource {
    token: String,
    inputs: Value,
    object: Value,
}

#[derive(Default)]
struct HostState {
    by_name: HashMap<(String, String), String>,
    by_id: HashMap<String, StoredResource>,
}

#[derive(Default)]
struct MockHost {
    state: Mutex<HostState>,
}

const KNOWN_POLICIES: [(&str, &str); 2] = [("sp-1", "Default Policy"), ("sp-2", "High Trust")];

fn to_status(err: perimeter_common::Error) -> Status {
    Status::invalid_argument(err.to_string())
}

fn encode_bag(value: &Value) -> PropertyBag {
    PropertyBag {
        msgpack: value::encode(value).expect("encode bag"),
    }
}

/// Build the stored object for a resource: echoed inputs plus the assigned
/// id and the handful of host-side outputs the real provider fills in.
fn materialize(token: &str, id: &str, inputs: &Value, prior: Option<&Value>) -> Value {
    let mut map = inputs.as_map().cloned().unwrap_or_default();
    map.insert("id".to_string(), string_value(id));

    let kind = token.rsplit(':').next().unwrap_or_default();
    match kind {
        "Connector" => {
            if !map.contains_key("name") {
                let name = prior
                    .and_then(|p| p.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("connector-{}", &id[..8]));
                map.insert("name".to_string(), string_value(name));
            }
        }
        "ConnectorTokens" => {
            map.insert("accessToken".to_string(), string_value(format!("at-{id}")));
            map.insert("refreshToken".to_string(), string_value(format!("rt-{id}")));
        }
        "ServiceAccountKey" => {
            if !map.contains_key("name") {
                map.insert("name".to_string(), string_value("key-1"));
            }
            if prior.is_none() {
                map.insert("token".to_string(), string_value(format!("sk-{id}")));
            }
        }
        "Resource" | "User" => {
            map.insert("isActive".to_string(), value::bool_value(true));
        }
        "Group" => {
            map.insert("isActive".to_string(), value::bool_value(true));
            map.insert("type".to_string(), string_value("MANUAL"));
        }
        _ => {}
    }

    Value::Map(map)
}

impl MockHost {
    fn list_objects(&self, token: &str, name_filter: Option<&str>) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<Value> = state
            .by_id
            .values()
            .filter(|stored| stored.token == token)
            .filter(|stored| match name_filter {
                Some(name) => stored.object.get("name").and_then(Value::as_str) == Some(name),
                None => true,
            })
            .map(|stored| stored.object.clone())
            .collect();
        items.sort_by_key(|item| {
            item.get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        });
        items
    }
}

#[tonic::async_trait]
impl ProviderHost for MockHost {
    async fn invoke(
        &self,
        request: Request<InvokeRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        let req = request.into_inner();
        let args = value::decode(&req.args.unwrap_or_default().msgpack).map_err(to_status)?;
        let name_filter = args.get("name").and_then(Value::as_str);

        let respond = |result: Value| {
            Ok(Response::new(InvokeResponse {
                result: Some(encode_bag(&result)),
                failures: vec![],
            }))
        };

        match req.token.as_str() {
            "perimeter:index/getRemoteNetworks:getRemoteNetworks" => respond(bag(vec![(
                "remoteNetworks",
                Value::List(self.list_objects(remote_network::DESCRIPTOR.token, name_filter)),
            )])),
            "perimeter:index/getConnectors:getConnectors" => respond(bag(vec![(
                "connectors",
                Value::List(self.list_objects(connector::DESCRIPTOR.token, name_filter)),
            )])),
            "perimeter:index/getResources:getResources" => respond(bag(vec![(
                "resources",
                Value::List(self.list_objects(resource::DESCRIPTOR.token, name_filter)),
            )])),
            "perimeter:index/getGroups:getGroups" => respond(bag(vec![(
                "groups",
                Value::List(self.list_objects(group::DESCRIPTOR.token, name_filter)),
            )])),
            "perimeter:index/getUsers:getUsers" => respond(bag(vec![(
                "users",
                Value::List(self.list_objects(user::DESCRIPTOR.token, None)),
            )])),
            "perimeter:index/getSecurityPolicies:getSecurityPolicies" => {
                let policies = KNOWN_POLICIES
                    .iter()
                    .map(|(id, name)| {
                        bag(vec![("id", string_value(*id)), ("name", string_value(*name))])
                    })
                    .collect();
                respond(bag(vec![("securityPolicies", Value::List(policies))]))
            }
            "perimeter:index/getSecurityPolicy:getSecurityPolicy" => {
                let id_filter = args.get("id").and_then(Value::as_str);
                let found = KNOWN_POLICIES.iter().find(|(id, name)| {
                    id_filter == Some(*id) || name_filter == Some(*name)
                });
                match found {
                    Some((id, name)) => respond(bag(vec![
                        ("id", string_value(*id)),
                        ("name", string_value(*name)),
                    ])),
                    None => Ok(Response::new(InvokeResponse {
                        result: None,
                        failures: vec![Failure {
                            reason: "security policy not found".to_string(),
                            property: String::new(),
                        }],
                    })),
                }
            }
            other => Err(Status::not_found(format!("unknown function: {other}"))),
        }
    }

    async fn register_resource(
        &self,
        request: Request<RegisterResourceRequest>,
    ) -> Result<Response<RegisterResourceResponse>, Status> {
        let req = request.into_inner();
        let inputs = value::decode(&req.object.unwrap_or_default().msgpack).map_err(to_status)?;

        let mut state = self.state.lock().unwrap();
        let key = (req.token.clone(), req.name.clone());

        let (id, object) = match state.by_name.get(&key).cloned() {
            Some(id) => {
                let stored = state.by_id.get(&id).expect("by_name and by_id agree");
                if stored.inputs == inputs {
                    // Unchanged object: same identity, no provider work.
                    (id.clone(), stored.object.clone())
                } else {
                    let object = materialize(&req.token, &id, &inputs, Some(&stored.object));
                    state.by_id.insert(
                        id.clone(),
                        StoredResource {
                            token: req.token.clone(),
                            inputs,
                            object: object.clone(),
                        },
                    );
                    (id, object)
                }
            }
            None => {
                let id = Uuid::new_v4().to_string();
                let object = materialize(&req.token, &id, &inputs, None);
                state.by_name.insert(key, id.clone());
                state.by_id.insert(
                    id.clone(),
                    StoredResource {
                        token: req.token.clone(),
                        inputs,
                        object: object.clone(),
                    },
                );
                (id, object)
            }
        };

        Ok(Response::new(RegisterResourceResponse {
            id,
            object: Some(encode_bag(&object)),
            failures: vec![],
        }))
    }

    async fn read_resource(
        &self,
        request: Request<ReadResourceRequest>,
    ) -> Result<Response<ReadResourceResponse>, Status> {
        let req = request.into_inner();
        let state = self.state.lock().unwrap();
        match state.by_id.get(&req.id) {
            Some(stored) if stored.token == req.token => {
                Ok(Response::new(ReadResourceResponse {
                    object: Some(encode_bag(&stored.object)),
                }))
            }
            _ => Err(Status::not_found(format!("no resource with id {}", req.id))),
        }
    }

    async fn delete_resource(
        &self,
        request: Request<DeleteResourceRequest>,
    ) -> Result<Response<DeleteResourceResponse>, Status> {
        let req = request.into_inner();
        let mut state = self.state.lock().unwrap();
        if state.by_id.remove(&req.id).is_none() {
            return Err(Status::not_found(format!("no resource with id {}", req.id)));
        }
        state.by_name.retain(|_, id| id != &req.id);
        Ok(Response::new(DeleteResourceResponse {}))
    }
}

async fn start_host() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        Server::builder()
            .add_service(ProviderHostServer::new(MockHost::default()))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("serve mock host");
    });

    addr
}

async fn connect(addr: SocketAddr) -> ProviderClient {
    let config = ClientConfig {
        endpoint: format!("http://{addr}"),
        api_token: Some("test-token".to_string()),
        ..ClientConfig::default()
    };
    ProviderClient::connect(&config).await.expect("connect")
}

#[tokio::test]
async fn created_remote_network_echoes_its_name() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let args = remote_network::RemoteNetworkArgs {
        name: "net-1".to_string(),
        location: None,
    };
    let network = RemoteNetwork::create(&mut client, "net-1", &args).await.unwrap();

    assert!(!network.id.is_empty());
    assert_eq!(network.name, "net-1");
    assert_eq!(network.location, None);
}

#[tokio::test]
async fn repeated_registration_keeps_the_identity() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let args = remote_network::RemoteNetworkArgs {
        name: "net-1".to_string(),
        location: Some("AWS".to_string()),
    };

    let first = RemoteNetwork::create(&mut client, "net-1", &args).await.unwrap();
    let second = RemoteNetwork::create(&mut client, "net-1", &args).await.unwrap();
    assert_eq!(first.id, second.id);

    // A changed object updates in place under the same identity.
    let moved = remote_network::RemoteNetworkArgs {
        name: "net-1".to_string(),
        location: Some("AZURE".to_string()),
    };
    let third = RemoteNetwork::update(&mut client, "net-1", &moved).await.unwrap();
    assert_eq!(third.id, first.id);
    assert_eq!(third.location.as_deref(), Some("AZURE"));
}

#[tokio::test]
async fn protocol_rules_survive_the_wire() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let protocols = Protocols {
        allow_icmp: true,
        tcp: Protocol::new(
            PortPolicy::Restricted,
            vec![PortRange::single(443), PortRange::single(8080)],
        ),
        udp: Protocol::allow_all(),
    };

    let args = resource::NetResourceArgs {
        name: "wiki".to_string(),
        address: "wiki.internal".to_string(),
        remote_network_id: "rn-1".to_string(),
        group_ids: vec!["g-1".to_string()],
        protocols: Some(protocols.clone()),
    };

    let created = NetResource::create(&mut client, "wiki", &args).await.unwrap();
    assert_eq!(created.protocols, protocols);
    assert_eq!(created.group_ids, vec!["g-1"]);
    assert!(created.is_active);

    let read = NetResource::read(&mut client, &created.id).await.unwrap();
    assert_eq!(read.protocols, protocols);
}

#[tokio::test]
async fn deleted_resources_stop_resolving() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let args = remote_network::RemoteNetworkArgs {
        name: "ephemeral".to_string(),
        location: None,
    };
    let network = RemoteNetwork::create(&mut client, "ephemeral", &args).await.unwrap();

    let read = RemoteNetwork::read(&mut client, &network.id).await.unwrap();
    assert_eq!(read, network);

    RemoteNetwork::delete(&mut client, &network.id).await.unwrap();

    let err = RemoteNetwork::read(&mut client, &network.id).await.unwrap_err();
    assert!(matches!(err, Error::OperationFailed { .. }));
}

#[tokio::test]
async fn list_queries_filter_by_name() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    for name in ["alpha", "beta"] {
        let args = remote_network::RemoteNetworkArgs {
            name: name.to_string(),
            location: None,
        };
        RemoteNetwork::create(&mut client, name, &args).await.unwrap();
    }

    let all = remote_network::list(&mut client, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let filtered = remote_network::list(&mut client, Some("alpha")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "alpha");
}

#[tokio::test]
async fn connector_names_are_host_assigned_when_absent() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let args = connector::ConnectorArgs {
        remote_network_id: "rn-1".to_string(),
        name: None,
        status_updates_enabled: Some(true),
    };
    let created = Connector::create(&mut client, "edge", &args).await.unwrap();
    assert!(!created.name.is_empty());
    assert!(created.status_updates_enabled);

    // The assigned name sticks across updates.
    let updated_args = connector::ConnectorArgs {
        remote_network_id: "rn-2".to_string(),
        name: None,
        status_updates_enabled: Some(true),
    };
    let updated = Connector::update(&mut client, "edge", &updated_args).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, created.name);

    let tokens_args = connector::ConnectorTokensArgs {
        connector_id: created.id.clone(),
    };
    let tokens = ConnectorTokens::create(&mut client, "edge-tokens", &tokens_args)
        .await
        .unwrap();
    assert_eq!(tokens.connector_id, created.id);
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
}

#[tokio::test]
async fn group_membership_and_user_listings_round_trip() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let dev = User::create(
        &mut client,
        "dev-user",
        &user::UserArgs {
            email: "dev@example.com".to_string(),
            first_name: Some("Dev".to_string()),
            last_name: None,
            role: Some(UserRole::Devops),
        },
    )
    .await
    .unwrap();
    assert_eq!(dev.role, UserRole::Devops);
    assert!(dev.is_active);

    let eng = Group::create(
        &mut client,
        "eng",
        &group::GroupArgs {
            name: "eng".to_string(),
            security_policy_id: Some("sp-1".to_string()),
            user_ids: vec![dev.id.clone()],
        },
    )
    .await
    .unwrap();
    assert_eq!(eng.group_type, GroupType::Manual);
    assert_eq!(eng.user_ids, vec![dev.id.clone()]);
    assert_eq!(eng.security_policy_id.as_deref(), Some("sp-1"));

    let everyone = user::list(&mut client).await.unwrap();
    assert_eq!(everyone.len(), 1);
    assert_eq!(everyone[0].email, "dev@example.com");

    let filtered = group::list(
        &mut client,
        &group::GroupsFilter {
            name: Some("eng".to_string()),
            ..group::GroupsFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, eng.id);

    let none = group::list(
        &mut client,
        &group::GroupsFilter {
            name: Some("sales".to_string()),
            ..group::GroupsFilter::default()
        },
    )
    .await
    .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn service_account_keys_issue_tokens_at_creation_only() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let account = ServiceAccount::create(
        &mut client,
        "ci",
        &service_account::ServiceAccountArgs {
            name: "ci".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(account.name, "ci");

    let key = ServiceAccountKey::create(
        &mut client,
        "ci-key",
        &service_account::ServiceAccountKeyArgs {
            service_account_id: account.id.clone(),
            name: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(key.service_account_id, account.id);
    assert!(key.token.is_some());
    assert!(key.is_active);

    // Renaming the key keeps its identity but does not re-issue the token.
    let renamed = ServiceAccountKey::update(
        &mut client,
        "ci-key",
        &service_account::ServiceAccountKeyArgs {
            service_account_id: account.id.clone(),
            name: Some("deploy".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.id, key.id);
    assert_eq!(renamed.name, "deploy");
    assert_eq!(renamed.token, None);
}

#[tokio::test]
async fn security_policy_lookups_resolve_and_fail_cleanly() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let policy = security_policy::lookup(&mut client, None, Some("Default Policy"))
        .await
        .unwrap();
    assert_eq!(policy.id, "sp-1");

    let by_id = security_policy::lookup(&mut client, Some("sp-2"), None)
        .await
        .unwrap();
    assert_eq!(by_id.name, "High Trust");

    let err = security_policy::lookup(&mut client, None, Some("No Such Policy"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OperationFailed { .. }));
    assert!(err.to_string().contains("security policy not found"));

    let both = security_policy::lookup(&mut client, Some("sp-1"), Some("Default Policy")).await;
    assert!(matches!(both, Err(Error::InvalidConfig(_))));

    let all = security_policy::list(&mut client).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn unknown_tokens_surface_provider_errors() {
    let addr = start_host().await;
    let mut client = connect(addr).await;

    let err = client
        .invoke("perimeter:index/getNothing:getNothing", &bag(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OperationFailed { .. }));
    assert!(err.to_string().contains("unknown function"));
}
