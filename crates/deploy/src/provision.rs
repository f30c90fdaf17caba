//! Provisioning collaborator interface.
//!
//! The orchestrator never creates artifacts itself; it hands constructor
//! arguments to a collaborator and checks the reported result. The default
//! collaborator is a JSON-RPC deployment service, but anything implementing
//! [`Provision`] fits the seam.

use std::future::Future;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::plan::ArtifactKind;

/// The collaborator's result for one provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReceipt {
    /// Address of the created artifact; empty when the deployment did not
    /// land.
    #[serde(default)]
    pub address: String,
    /// Whether the collaborator reports the artifact as deployed.
    pub deployed: bool,
}

impl ProvisionReceipt {
    /// A deployment counts as successful only with a non-empty address.
    pub fn succeeded(&self) -> bool {
        self.deployed && !self.address.is_empty()
    }
}

/// External collaborator that creates one artifact per call.
pub trait Provision {
    /// Ask the collaborator to create `kind` with the given positional
    /// constructor arguments.
    ///
    /// An `Err` means the collaborator could not be consulted at all; a
    /// receipt with `deployed == false` or an empty address means it was
    /// consulted and the deployment did not land.
    fn provision(
        &self,
        kind: ArtifactKind,
        constructor_args: Vec<Value>,
    ) -> impl Future<Output = Result<ProvisionReceipt>> + Send;
}

/// JSON-RPC response wrapper.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

/// [`Provision`] implementation backed by a JSON-RPC deployment service.
#[derive(Debug, Clone)]
pub struct RpcProvisioner {
    endpoint: Url,
    client: reqwest::Client,
}

impl RpcProvisioner {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .context("Failed to send RPC request")?;

        let body: JsonRpcResponse<T> = response
            .json()
            .await
            .context("Failed to parse RPC response")?;

        if let Some(error) = body.error {
            anyhow::bail!("RPC error: {}", error.message);
        }
        body.result.context("No result in RPC response")
    }

    /// Funded accounts of the signing runtime, deployer first.
    pub async fn accounts(&self) -> Result<Vec<String>> {
        self.call("deployer_accounts", serde_json::json!([])).await
    }
}

impl Provision for RpcProvisioner {
    async fn provision(
        &self,
        kind: ArtifactKind,
        constructor_args: Vec<Value>,
    ) -> Result<ProvisionReceipt> {
        tracing::debug!(
            endpoint = %self.endpoint,
            %kind,
            args = constructor_args.len(),
            "Requesting artifact deployment"
        );
        self.call(
            "deployer_provision",
            serde_json::json!([kind.to_string(), constructor_args]),
        )
        .await
        .with_context(|| format!("Provisioning call for `{kind}` failed"))
    }
}
