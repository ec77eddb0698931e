//! Resource kinds exposed by the provider
//!
//! One module per kind. Each supplies its descriptor and typed conversions;
//! the lifecycle plumbing is shared through [`ManagedKind`].

pub mod connector;
pub mod group;
pub mod remote_network;
pub mod resource;
pub mod security_policy;
pub mod service_account;
pub mod user;

use async_trait::async_trait;

use perimeter_common::Result;

use crate::client::{ProviderClient, RegisterOptions};
use crate::mapper;
use crate::object::{Arguments, Outputs};
use crate::schema::{FieldDescriptor, ResourceDescriptor};

static ALL: [&ResourceDescriptor; 15] = [
    &remote_network::DESCRIPTOR,
    &remote_network::QUERY_DESCRIPTOR,
    &connector::DESCRIPTOR,
    &connector::TOKENS_DESCRIPTOR,
    &connector::QUERY_DESCRIPTOR,
    &resource::DESCRIPTOR,
    &resource::QUERY_DESCRIPTOR,
    &group::DESCRIPTOR,
    &group::QUERY_DESCRIPTOR,
    &user::DESCRIPTOR,
    &user::QUERY_DESCRIPTOR,
    &service_account::DESCRIPTOR,
    &service_account::KEY_DESCRIPTOR,
    &security_policy::QUERY_DESCRIPTOR,
    &security_policy::LIST_DESCRIPTOR,
];

/// Every descriptor known to this SDK
pub fn all_descriptors() -> &'static [&'static ResourceDescriptor] {
    &ALL
}

/// Lifecycle operations shared by every managed resource kind.
///
/// Implementors provide the descriptor and the conversions between their
/// typed argument/model structs and the generic containers; create, read,
/// update and delete ride on the defaults.
#[async_trait]
pub trait ManagedKind {
    /// Typed inputs for create and update
    type Args: Send + Sync;
    /// Typed model built from provider outputs
    type Model: Send;

    fn descriptor() -> &'static ResourceDescriptor;

    fn to_arguments(args: &Self::Args) -> Result<Arguments>;

    fn from_outputs(outputs: &Outputs) -> Result<Self::Model>;

    async fn create(
        client: &mut ProviderClient,
        name: &str,
        args: &Self::Args,
    ) -> Result<Self::Model> {
        let outputs = register(client, Self::descriptor(), name, Self::to_arguments(args)?).await?;
        Self::from_outputs(&outputs)
    }

    /// Re-register under the same logical name; the host keeps the identity.
    async fn update(
        client: &mut ProviderClient,
        name: &str,
        args: &Self::Args,
    ) -> Result<Self::Model> {
        let outputs = register(client, Self::descriptor(), name, Self::to_arguments(args)?).await?;
        Self::from_outputs(&outputs)
    }

    async fn read(client: &mut ProviderClient, id: &str) -> Result<Self::Model> {
        let bag = client.read_resource(Self::descriptor().token, id).await?;
        let outputs = mapper::from_bag(Self::descriptor(), &bag)?;
        Self::from_outputs(&outputs)
    }

    async fn delete(client: &mut ProviderClient, id: &str) -> Result<()> {
        client.delete_resource(Self::descriptor().token, id).await
    }
}

async fn register(
    client: &mut ProviderClient,
    descriptor: &'static ResourceDescriptor,
    name: &str,
    arguments: Arguments,
) -> Result<Outputs> {
    let bag = mapper::to_bag(&arguments)?;
    let (id, object) = client
        .register_resource(descriptor.token, name, &bag, RegisterOptions::default())
        .await?;
    Ok(mapper::from_bag(descriptor, &object)?.with_id(id))
}

/// Run a list-shaped query: invoke the token, then map each element of the
/// named list output through `from_outputs`.
async fn query_list<T>(
    client: &mut ProviderClient,
    descriptor: &'static ResourceDescriptor,
    arguments: Arguments,
    list_key: &str,
    item_fields: &'static [FieldDescriptor],
    from_outputs: impl Fn(&Outputs) -> Result<T>,
) -> Result<Vec<T>> {
    let result = client
        .invoke(descriptor.token, &mapper::to_bag(&arguments)?)
        .await?;
    let outputs = mapper::from_bag(descriptor, &result)?;

    outputs
        .list(list_key)
        .unwrap_or(&[])
        .iter()
        .map(|item| from_outputs(&mapper::outputs_from_map(item_fields, item)?))
        .collect()
}
