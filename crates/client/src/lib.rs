//! Perimeter Client SDK
//!
//! Client side of the Perimeter provider contract: typed argument objects,
//! a schema mapper between those objects and untyped property bags, and a
//! resource proxy that drives lifecycle operations against a provider host
//! over gRPC.

pub mod client;
pub mod config;
pub mod mapper;
pub mod object;
pub mod resources;
pub mod schema;
pub mod value;

mod generated {
    pub mod perimeter {
        include!("generated/perimeter.v1.rs");
    }
}

pub use generated::perimeter;

pub use client::{ProviderClient, RegisterOptions};
pub use config::ClientConfig;
pub use object::{Arguments, ArgumentsBuilder, Outputs};
pub use resources::ManagedKind;
pub use value::Value;
