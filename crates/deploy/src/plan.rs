//! Step descriptors for the fixed provisioning sequence.

use serde_json::{Value, json};

use crate::network::NetworkProfile;

/// Logical name of the badge collection artifact.
pub const BALLOT_TOKEN: &str = "ballot_token";
/// Logical name of the ballot artifact.
pub const BALLOT_BOX: &str = "ballot_box";

/// The artifact kinds the provisioning collaborator knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ArtifactKind {
    BallotToken,
    BallotBox,
}

impl ArtifactKind {
    /// Constructor arguments for this kind, in the positional order the
    /// collaborator expects.
    ///
    /// `dependencies` holds one resolved address per entry of the step's
    /// `depends_on`, in declaration order; the orchestrator guarantees the
    /// lengths match for a validated plan.
    pub fn constructor_args(
        &self,
        profile: &NetworkProfile,
        dependencies: &[String],
    ) -> Vec<Value> {
        match self {
            Self::BallotToken => vec![
                json!(profile.name),
                json!(profile.symbol),
                json!(profile.uri),
                json!(profile.token_ids),
                json!(profile.token_supplies),
            ],
            Self::BallotBox => vec![json!(dependencies[0]), json!(profile.token_ids)],
        }
    }
}

/// One unit of provisioning work in the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentStep {
    /// Identifies the artifact this step provisions; also the address book
    /// entry name.
    pub logical_name: &'static str,
    /// Which artifact the collaborator is asked to create.
    pub kind: ArtifactKind,
    /// Logical names whose addresses this step's constructor takes, all of
    /// which must be provisioned earlier in the same run.
    pub depends_on: &'static [&'static str],
}

/// A plan failed validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("step `{step}` is declared more than once")]
    DuplicateStep { step: String },
    #[error("step `{step}` depends on `{dependency}`, which is not an earlier step")]
    UnknownDependency { step: String, dependency: String },
}

/// An ordered, validated sequence of [`DeploymentStep`]s.
///
/// Validation happens once at construction: later steps may only depend on
/// steps declared before them, so the sequential walk in the orchestrator
/// always finds its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    /// Validate and build a plan from an ordered step list.
    pub fn new(steps: Vec<DeploymentStep>) -> Result<Self, PlanError> {
        let mut seen: Vec<&'static str> = Vec::with_capacity(steps.len());
        for step in &steps {
            if seen.contains(&step.logical_name) {
                return Err(PlanError::DuplicateStep {
                    step: step.logical_name.to_string(),
                });
            }
            for dependency in step.depends_on {
                if !seen.contains(dependency) {
                    return Err(PlanError::UnknownDependency {
                        step: step.logical_name.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
            seen.push(step.logical_name);
        }
        Ok(Self { steps })
    }

    /// The fixed ballot plan: the badge collection first, then the ballot
    /// contract constructed with the collection's address.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                DeploymentStep {
                    logical_name: BALLOT_TOKEN,
                    kind: ArtifactKind::BallotToken,
                    depends_on: &[],
                },
                DeploymentStep {
                    logical_name: BALLOT_BOX,
                    kind: ArtifactKind::BallotBox,
                    depends_on: &[BALLOT_TOKEN],
                },
            ],
        }
    }

    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Network, NetworkProfile};

    #[test]
    fn standard_plan_passes_validation() {
        let plan = DeploymentPlan::standard();
        assert!(DeploymentPlan::new(plan.steps().to_vec()).is_ok());
        assert_eq!(plan.steps().len(), 2);
        assert_eq!(plan.steps()[1].depends_on, &[BALLOT_TOKEN]);
    }

    #[test]
    fn forward_dependencies_are_rejected() {
        let err = DeploymentPlan::new(vec![
            DeploymentStep {
                logical_name: BALLOT_BOX,
                kind: ArtifactKind::BallotBox,
                depends_on: &[BALLOT_TOKEN],
            },
            DeploymentStep {
                logical_name: BALLOT_TOKEN,
                kind: ArtifactKind::BallotToken,
                depends_on: &[],
            },
        ])
        .unwrap_err();

        assert_eq!(
            err,
            PlanError::UnknownDependency {
                step: BALLOT_BOX.to_string(),
                dependency: BALLOT_TOKEN.to_string(),
            }
        );
    }

    #[test]
    fn duplicate_steps_are_rejected() {
        let step = DeploymentStep {
            logical_name: BALLOT_TOKEN,
            kind: ArtifactKind::BallotToken,
            depends_on: &[],
        };
        let err = DeploymentPlan::new(vec![step, step]).unwrap_err();
        assert_eq!(
            err,
            PlanError::DuplicateStep {
                step: BALLOT_TOKEN.to_string(),
            }
        );
    }

    #[test]
    fn token_constructor_args_follow_profile_order() {
        let profile = NetworkProfile::for_network(Network::Development);
        let args = ArtifactKind::BallotToken.constructor_args(&profile, &[]);
        assert_eq!(
            args,
            vec![
                serde_json::json!("Ballot Badge"),
                serde_json::json!("BALLOT"),
                serde_json::json!("http://127.0.0.1:3000/api/badge/{id}.json"),
                serde_json::json!([1, 2, 3]),
                serde_json::json!([10, 10, 10]),
            ]
        );
    }

    #[test]
    fn ballot_constructor_takes_token_address_first() {
        let profile = NetworkProfile::for_network(Network::Development);
        let args =
            ArtifactKind::BallotBox.constructor_args(&profile, &["0x111".to_string()]);
        assert_eq!(
            args,
            vec![serde_json::json!("0x111"), serde_json::json!([1, 2, 3])]
        );
    }

    #[test]
    fn kind_names_are_kebab_case() {
        assert_eq!(ArtifactKind::BallotToken.to_string(), "ballot-token");
        assert_eq!(ArtifactKind::BallotBox.to_string(), "ballot-box");
    }
}
