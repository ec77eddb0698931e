//! Resource proxy for the provider host
//!
//! Wraps the generated gRPC client: encodes property bags, attaches auth
//! metadata, and maps transport and provider failures onto the SDK error
//! taxonomy. No retries happen here; each call either fully succeeds or
//! surfaces exactly one error.

use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use tracing::debug;
use uuid::Uuid;

use perimeter_common::{Error, Result};

use crate::config::ClientConfig;
use crate::generated::perimeter::provider_host_client::ProviderHostClient;
use crate::generated::perimeter::{
    DeleteResourceRequest, Failure, InvokeRequest, PropertyBag, ReadResourceRequest,
    RegisterResourceRequest,
};
use crate::value::{self, Value};

pub use crate::generated::perimeter::RegisterOptions;

/// Client for the provider host's resource lifecycle surface
pub struct ProviderClient {
    client: ProviderHostClient<Channel>,
    auth: Option<MetadataValue<Ascii>>,
}

impl ProviderClient {
    /// Connect to the provider host named by the configuration
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let endpoint = Endpoint::from_shared(config.endpoint.clone())
            .map_err(|e| {
                Error::InvalidConfig(format!("bad endpoint {}: {e}", config.endpoint))
            })?
            .timeout(config.timeout());

        let channel = endpoint.connect().await.map_err(|e| {
            Error::operation(format!(
                "cannot reach provider host at {}: {e}",
                config.endpoint
            ))
        })?;

        let auth = match &config.api_token {
            Some(token) => Some(
                format!("Bearer {token}")
                    .parse()
                    .map_err(|_| Error::InvalidConfig("API token is not valid ASCII".into()))?,
            ),
            None => None,
        };

        Ok(Self {
            client: ProviderHostClient::new(channel),
            auth,
        })
    }

    /// Read-only query against the provider host
    pub async fn invoke(&mut self, token: &str, args: &Value) -> Result<Value> {
        let call_id = Uuid::new_v4();
        debug!(%token, %call_id, "invoke");

        let request = self.request(InvokeRequest {
            token: token.to_string(),
            args: Some(encode_bag(args)?),
        });

        let response = self
            .client
            .invoke(request)
            .await
            .map_err(status_error)?
            .into_inner();

        check_failures(&response.failures)?;
        decode_bag(response.result)
    }

    /// Create-or-update a managed resource under a logical name.
    ///
    /// The host resolves the (token, name) pair to a stable identity, so
    /// repeating the call with an unchanged object returns the same id.
    pub async fn register_resource(
        &mut self,
        token: &str,
        name: &str,
        object: &Value,
        options: RegisterOptions,
    ) -> Result<(String, Value)> {
        let call_id = Uuid::new_v4();
        debug!(%token, name, %call_id, "register resource");

        let request = self.request(RegisterResourceRequest {
            token: token.to_string(),
            name: name.to_string(),
            object: Some(encode_bag(object)?),
            options: Some(options),
        });

        let response = self
            .client
            .register_resource(request)
            .await
            .map_err(status_error)?
            .into_inner();

        check_failures(&response.failures)?;
        if response.id.is_empty() {
            return Err(Error::operation("provider returned no resource id"));
        }

        let object = decode_bag(response.object)?;
        Ok((response.id, object))
    }

    /// Refresh a managed resource's state by id
    pub async fn read_resource(&mut self, token: &str, id: &str) -> Result<Value> {
        let call_id = Uuid::new_v4();
        debug!(%token, id, %call_id, "read resource");

        let request = self.request(ReadResourceRequest {
            token: token.to_string(),
            id: id.to_string(),
        });

        let response = self
            .client
            .read_resource(request)
            .await
            .map_err(status_error)?
            .into_inner();

        decode_bag(response.object)
    }

    /// Remove a managed resource by id
    pub async fn delete_resource(&mut self, token: &str, id: &str) -> Result<()> {
        let call_id = Uuid::new_v4();
        debug!(%token, id, %call_id, "delete resource");

        let request = self.request(DeleteResourceRequest {
            token: token.to_string(),
            id: id.to_string(),
        });

        self.client
            .delete_resource(request)
            .await
            .map_err(status_error)?;

        Ok(())
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(auth) = &self.auth {
            request.metadata_mut().insert("authorization", auth.clone());
        }
        request
    }
}

fn encode_bag(bag: &Value) -> Result<PropertyBag> {
    Ok(PropertyBag {
        msgpack: value::encode(bag)?,
    })
}

fn decode_bag(bag: Option<PropertyBag>) -> Result<Value> {
    match bag {
        Some(bag) => value::decode(&bag.msgpack),
        None => Ok(Value::Null),
    }
}

fn status_error(status: tonic::Status) -> Error {
    let message = if status.message().is_empty() {
        status.code().to_string()
    } else {
        status.message().to_string()
    };
    Error::OperationFailed { message }
}

fn check_failures(failures: &[Failure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    let message = failures
        .iter()
        .map(|f| {
            if f.property.is_empty() {
                f.reason.clone()
            } else {
                format!("{}: {}", f.property, f.reason)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(Error::OperationFailed { message })
}
