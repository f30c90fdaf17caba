//! ballotbox-deploy - Provisioning library for the ballot contract stack.
//!
//! This crate provides the orchestration for deploying the ballot artifacts
//! on a target network and recording their addresses for later tooling.

mod deployer;
pub use deployer::{
    BALLOTCONF_FILENAME, DeployConfig, DeployError, Deployer, RunReport, StepOutcome,
};

mod address_book;
pub use address_book::{AddressBook, StoreError, entry_key};

mod network;
pub use network::{Network, NetworkProfile};

mod plan;
pub use plan::{
    ArtifactKind, BALLOT_BOX, BALLOT_TOKEN, DeploymentPlan, DeploymentStep, PlanError,
};

mod provision;
pub use provision::{Provision, ProvisionReceipt, RpcProvisioner};
