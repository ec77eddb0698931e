//! Access group resource

use async_trait::async_trait;

use perimeter_common::{Group, GroupType, Result};

use super::{query_list, ManagedKind};
use crate::client::ProviderClient;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::{bool_value, string_list_value, string_value};

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("name", FieldType::String),
    optional("isActive", FieldType::Bool),
    optional("type", FieldType::String),
    optional("securityPolicyId", FieldType::String),
    optional("userIds", FieldType::List(&FieldType::String)),
];

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/group:Group",
    inputs: &[
        required("name", FieldType::String),
        optional("securityPolicyId", FieldType::String),
        optional("userIds", FieldType::List(&FieldType::String)),
    ],
    outputs: FIELDS,
};

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getGroups:getGroups",
    inputs: &[
        optional("name", FieldType::String),
        optional("isActive", FieldType::Bool),
        optional("type", FieldType::String),
    ],
    outputs: &[required(
        "groups",
        FieldType::List(&FieldType::Object(FIELDS)),
    )],
};

/// Arguments for creating or updating a group
#[derive(Debug, Clone, Default)]
pub struct GroupArgs {
    pub name: String,
    pub security_policy_id: Option<String>,
    pub user_ids: Vec<String>,
}

/// Filters for the group listing query
#[derive(Debug, Clone, Default)]
pub struct GroupsFilter {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub group_type: Option<GroupType>,
}

fn model(outputs: &Outputs) -> Result<Group> {
    let group_type = match outputs.str("type") {
        Some(value) => value.parse()?,
        None => GroupType::default(),
    };

    Ok(Group {
        id: outputs.require_id()?.to_string(),
        name: outputs.require_str("name")?.to_string(),
        is_active: outputs.bool("isActive").unwrap_or(true),
        group_type,
        security_policy_id: outputs.str("securityPolicyId").map(str::to_string),
        user_ids: outputs.string_list("userIds"),
    })
}

#[async_trait]
impl ManagedKind for Group {
    type Args = GroupArgs;
    type Model = Group;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &GroupArgs) -> Result<Arguments> {
        let mut builder = Arguments::builder(&DESCRIPTOR)
            .set("name", string_value(&args.name))
            .set_opt(
                "securityPolicyId",
                args.security_policy_id.as_deref().map(string_value),
            );
        if !args.user_ids.is_empty() {
            builder = builder.set("userIds", string_list_value(args.user_ids.clone()));
        }
        builder.build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<Group> {
        model(outputs)
    }
}

/// List groups matching the filter
pub async fn list(client: &mut ProviderClient, filter: &GroupsFilter) -> Result<Vec<Group>> {
    let arguments = Arguments::builder(&QUERY_DESCRIPTOR)
        .set_opt("name", filter.name.as_deref().map(string_value))
        .set_opt("isActive", filter.is_active.map(bool_value))
        .set_opt(
            "type",
            filter
                .group_type
                .map(|t| string_value(t.to_string())),
        )
        .build()?;
    query_list(client, &QUERY_DESCRIPTOR, arguments, "groups", FIELDS, model).await
}
