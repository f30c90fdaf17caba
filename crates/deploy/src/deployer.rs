use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::address_book::{AddressBook, StoreError, entry_key};
use crate::network::{Network, NetworkProfile};
use crate::plan::{DeploymentPlan, PlanError};
use crate::provision::Provision;

/// The default name for the ballotbox configuration file.
pub const BALLOTCONF_FILENAME: &str = "Ballotbox.toml";

/// A run aborted before the plan could complete.
///
/// A deployment the collaborator reports as unsuccessful is not a
/// `DeployError`: it is recorded in the [`RunReport`] as a
/// [`StepOutcome::Failed`] and ends the sequence there.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("provisioning endpoint failed for step `{step}` on `{environment}`")]
    Endpoint {
        step: String,
        environment: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Per-step result of a run, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The collaborator deployed the artifact and the address was persisted.
    Deployed {
        logical_name: &'static str,
        address: String,
    },
    /// The collaborator reported the deployment as unsuccessful.
    Failed { logical_name: &'static str },
    /// Never attempted because an earlier step failed.
    Skipped { logical_name: &'static str },
}

impl StepOutcome {
    pub fn logical_name(&self) -> &'static str {
        match self {
            Self::Deployed { logical_name, .. }
            | Self::Failed { logical_name }
            | Self::Skipped { logical_name } => logical_name,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Deployed { address, .. } => Some(address),
            _ => None,
        }
    }
}

/// Ordered outcome of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The environment name the run was requested with.
    pub environment: String,
    /// The network whose profile was used, after fallback resolution.
    pub network: Network,
    /// One outcome per plan step, in plan order.
    pub outcomes: Vec<StepOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome, StepOutcome::Deployed { .. }))
    }

    /// The step whose deployment the collaborator reported as unsuccessful,
    /// if any.
    pub fn failed_step(&self) -> Option<&'static str> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            StepOutcome::Failed { logical_name } => Some(*logical_name),
            _ => None,
        })
    }
}

/// Orchestrates one sequential pass over the deployment plan.
///
/// Steps run strictly in order; each step's constructor receives the
/// addresses of the steps it depends on, taken from this run only. A step
/// the collaborator reports as unsuccessful halts the sequence, since every
/// later step builds on its output.
pub struct Deployer<P> {
    environment: String,
    plan: DeploymentPlan,
    address_book: AddressBook,
    provisioner: P,
}

impl<P: Provision> Deployer<P> {
    pub fn new(
        environment: impl Into<String>,
        plan: DeploymentPlan,
        address_book: AddressBook,
        provisioner: P,
    ) -> Self {
        Self {
            environment: environment.into(),
            plan,
            address_book,
            provisioner,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Run the plan against the configured environment.
    ///
    /// Returns the ordered per-step outcomes; collaborator-reported
    /// deployment failures are in-band outcomes, while endpoint and address
    /// book errors abort the run.
    pub async fn run(&self) -> Result<RunReport, DeployError> {
        let network = Network::from_name(&self.environment);
        if self.environment.parse::<Network>().is_err() {
            tracing::info!(
                environment = %self.environment,
                fallback = %network,
                "Unknown network, using the default profile"
            );
        }
        let profile = NetworkProfile::for_network(network);

        tracing::info!(
            environment = %self.environment,
            %network,
            steps = self.plan.steps().len(),
            "Starting deployment run..."
        );

        // Addresses deployed in this run, for later steps' dependencies.
        // Deliberately not seeded from the address book: a dependency must
        // have been deployed in the current run.
        let mut run_addresses: BTreeMap<&'static str, String> = BTreeMap::new();
        let mut outcomes = Vec::with_capacity(self.plan.steps().len());

        let mut steps = self.plan.steps().iter();
        for step in steps.by_ref() {
            let mut dependencies = Vec::with_capacity(step.depends_on.len());
            for dependency in step.depends_on {
                let Some(address) = run_addresses.get(dependency) else {
                    return Err(PlanError::UnknownDependency {
                        step: step.logical_name.to_string(),
                        dependency: dependency.to_string(),
                    }
                    .into());
                };
                dependencies.push(address.clone());
            }

            let args = step.kind.constructor_args(&profile, &dependencies);
            let receipt = self
                .provisioner
                .provision(step.kind, args)
                .await
                .map_err(|source| DeployError::Endpoint {
                    step: step.logical_name.to_string(),
                    environment: self.environment.clone(),
                    source,
                })?;

            if receipt.succeeded() {
                run_addresses.insert(step.logical_name, receipt.address.clone());
                self.address_book
                    .set(&self.environment, step.logical_name, &receipt.address)?;
                let outcome = StepOutcome::Deployed {
                    logical_name: step.logical_name,
                    address: receipt.address,
                };
                self.observe(&outcome);
                outcomes.push(outcome);
            } else {
                let outcome = StepOutcome::Failed {
                    logical_name: step.logical_name,
                };
                self.observe(&outcome);
                outcomes.push(outcome);
                break;
            }
        }

        // Anything left after a break was never attempted.
        for step in steps {
            let outcome = StepOutcome::Skipped {
                logical_name: step.logical_name,
            };
            self.observe(&outcome);
            outcomes.push(outcome);
        }

        Ok(RunReport {
            environment: self.environment.clone(),
            network,
            outcomes,
        })
    }

    /// Outcome observer, kept out of the provisioning control flow.
    fn observe(&self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Deployed {
                logical_name,
                address,
            } => {
                tracing::info!(
                    artifact = logical_name,
                    environment = %self.environment,
                    address,
                    key = entry_key(&self.environment, logical_name),
                    "Deployed"
                );
            }
            StepOutcome::Failed { logical_name } => {
                tracing::error!(
                    artifact = logical_name,
                    environment = %self.environment,
                    "Deployment unsuccessful"
                );
            }
            StepOutcome::Skipped { logical_name } => {
                tracing::warn!(
                    artifact = logical_name,
                    environment = %self.environment,
                    "Skipped: an earlier step failed"
                );
            }
        }
    }
}

/// Serializable run configuration for the CLI.
///
/// Can be saved to and reloaded from TOML, so a deployment can be repeated
/// without respelling the arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// The target environment name.
    pub network: String,
    /// JSON-RPC endpoint of the provisioning service.
    pub endpoint: Url,
    /// Path of the address book file.
    pub address_book: PathBuf,
}

impl DeployConfig {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(BALLOTCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save the configuration to the default location in the working
    /// directory.
    pub fn save_config(&self) -> Result<PathBuf> {
        let config_path = PathBuf::from(BALLOTCONF_FILENAME);
        self.save_to_file(&config_path)?;
        Ok(config_path)
    }
}
