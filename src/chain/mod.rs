//! Contract deployments per chain and Safe version

mod registry;

pub use registry::{
    chain_ids, ChainAddresses, ContractKind, Deployment, DeploymentRegistry, StaticRegistry,
};
