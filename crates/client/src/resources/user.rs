//! Tenant user resource

use async_trait::async_trait;

use perimeter_common::{Result, User, UserRole};

use super::{query_list, ManagedKind};
use crate::client::ProviderClient;
use crate::object::{Arguments, Outputs};
use crate::schema::{optional, required, FieldDescriptor, FieldType, ResourceDescriptor};
use crate::value::string_value;

const FIELDS: &[FieldDescriptor] = &[
    required("id", FieldType::String),
    required("email", FieldType::String),
    optional("firstName", FieldType::String),
    optional("lastName", FieldType::String),
    optional("role", FieldType::String),
    optional("isActive", FieldType::Bool),
];

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/user:User",
    inputs: &[
        required("email", FieldType::String),
        optional("firstName", FieldType::String),
        optional("lastName", FieldType::String),
        optional("role", FieldType::String),
    ],
    outputs: FIELDS,
};

pub static QUERY_DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    token: "perimeter:index/getUsers:getUsers",
    inputs: &[],
    outputs: &[required("users", FieldType::List(&FieldType::Object(FIELDS)))],
};

/// Arguments for inviting or updating a user
#[derive(Debug, Clone, Default)]
pub struct UserArgs {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

fn model(outputs: &Outputs) -> Result<User> {
    let role = match outputs.str("role") {
        Some(value) => value.parse()?,
        None => UserRole::default(),
    };

    Ok(User {
        id: outputs.require_id()?.to_string(),
        email: outputs.require_str("email")?.to_string(),
        first_name: outputs.str("firstName").map(str::to_string),
        last_name: outputs.str("lastName").map(str::to_string),
        role,
        is_active: outputs.bool("isActive").unwrap_or(true),
    })
}

#[async_trait]
impl ManagedKind for User {
    type Args = UserArgs;
    type Model = User;

    fn descriptor() -> &'static ResourceDescriptor {
        &DESCRIPTOR
    }

    fn to_arguments(args: &UserArgs) -> Result<Arguments> {
        Arguments::builder(&DESCRIPTOR)
            .set("email", string_value(&args.email))
            .set_opt("firstName", args.first_name.as_deref().map(string_value))
            .set_opt("lastName", args.last_name.as_deref().map(string_value))
            .set_opt("role", args.role.map(|r| string_value(r.to_string())))
            .build()
    }

    fn from_outputs(outputs: &Outputs) -> Result<User> {
        model(outputs)
    }
}

/// List every user in the tenant
pub async fn list(client: &mut ProviderClient) -> Result<Vec<User>> {
    let arguments = Arguments::builder(&QUERY_DESCRIPTOR).build()?;
    query_list(client, &QUERY_DESCRIPTOR, arguments, "users", FIELDS, model).await
}
