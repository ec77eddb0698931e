//! Service account resource and its API keys

use async_trait::async_trait;

use perimeter_common::{Result, ServiceAccount, ServiceAccountKey};

use super::ManagedKind;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldType, ResourceDescriptor};
use crate::value::string_value;

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/serviceAccount:ServiceAccount",
    inputs: &[required("name", FieldType::String)],
    outputs: &[
        required("id", FieldType::String),
        required("name", FieldType::String),
    ],
};

pub static KEY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/serviceAccountKey:ServiceAccountKey",
    inputs: &[
        required("serviceAccountId", FieldType::String),
        optional("name", FieldType::String),
    ],
    outputs: &[
        required("id", FieldType::String),
        required("name", FieldType::String),
        required("serviceAccountId", FieldType::String),
        // Only present in the create response; reads never return it.
        optional("token", FieldType::String),
        optional("isActive", FieldType::Bool),
    ],
};

/// Arguments for creating or renaming a service account
#[derive(Debug, Clone, Default)]
pub struct ServiceAccountArgs {
    pub name: String,
}

/// Arguments for issuing a service account key
#[derive(Debug, Clone, Default)]
pub struct ServiceAccountKeyArgs {
    pub service_account_id: String,
    pub name: Option<String>,
}

#[async_trait]
impl ManagedKind for ServiceAccount {
    type Args = ServiceAccountArgs;
    type Model = ServiceAccount;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &ServiceAccountArgs) -> Result<Arguments> {
        Arguments::builder(&DESCRIPTOR)
            .set("name", string_value(&args.name))
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<ServiceAccount> {
        Ok(ServiceAccount {
            id: outputs.require_id()?.to_string(),
            name: outputs.require_str("name")?.to_string(),
        })
    }
}

#[async_trait]
impl ManagedKind for ServiceAccountKey {
    type Args = ServiceAccountKeyArgs;
    type Model = ServiceAccountKey;

    fn descriptor() -> &'static ResourceDescriptor {
        &KEY_DESCRIPTOR
    }

    fn to_arguments(args: &ServiceAccountKeyArgs) -> Result<Arguments> {
        Arguments::builder(&KEY_DESCRIPTOR)
            .set("serviceAccountId", string_value(&args.service_account_id))
            .set_opt("name", args.name.as_deref().map(string_value))
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<ServiceAccountKey> {
        Ok(ServiceAccountKey {
            id: outputs.require_id()?.to_string(),
            name: outputs.require_str("name")?.to_string(),
            service_account_id: outputs.require_str("serviceAccountId")?.to_string(),
            token: outputs.str("token").map(str::to_string),
            is_active: outputs.bool("isActive").unwrap_or(true),
        })
    }
}
