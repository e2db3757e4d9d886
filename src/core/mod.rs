pub mod apphost;
pub mod engine;
pub mod env;
pub mod graph;
pub mod plan;

pub use crate::domain::model::{
    EnvEntry, EnvValue, ResourceKind, ResourceSpec, ServicePlan, StartupPlan, Wire,
};
pub use crate::domain::ports::{SecretSource, Storage};
pub use crate::utils::error::Result;
