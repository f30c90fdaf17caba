//! ballotbox is a CLI tool that provisions the ballot contract stack on a
//! target network and records the deployed addresses.

mod cli;

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;

use ballotbox_deploy::{
    AddressBook, DeployConfig, Deployer, DeploymentPlan, RpcProvisioner, RunReport, StepOutcome,
};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // If a config file is provided, load it; otherwise build the
    // configuration from CLI arguments and save it for reruns.
    let config = if let Some(config_path) = &cli.config {
        let config = DeployConfig::load_from_file(config_path)?;
        tracing::info!(
            config_path = %config_path.display(),
            network = %config.network,
            endpoint = %config.endpoint,
            "Loading deployment from config file..."
        );
        config
    } else {
        let config = DeployConfig {
            network: cli.network,
            endpoint: cli.endpoint,
            address_book: cli.address_book,
        };
        config.save_config()?;
        config
    };

    let provisioner = RpcProvisioner::new(config.endpoint.clone());
    match provisioner.accounts().await {
        Ok(accounts) => {
            if let Some(creator) = accounts.first() {
                tracing::info!(%creator, "Provisioning account");
            }
        }
        Err(err) => tracing::debug!(%err, "Provisioning accounts unavailable"),
    }

    let deployer = Deployer::new(
        config.network,
        DeploymentPlan::standard(),
        AddressBook::new(config.address_book),
        provisioner,
    );

    let report = deployer.run().await?;

    println!("{}", summary_table(&report));

    if let Some(step) = report.failed_step() {
        anyhow::bail!(
            "deployment of `{}` on `{}` was unsuccessful",
            step,
            report.environment
        );
    }

    Ok(())
}

/// Per-step address summary printed after the run.
fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["artifact", "status", "address"]);
    for outcome in &report.outcomes {
        let (status, address) = match outcome {
            StepOutcome::Deployed { address, .. } => ("deployed", address.as_str()),
            StepOutcome::Failed { .. } => ("failed", "-"),
            StepOutcome::Skipped { .. } => ("skipped", "-"),
        };
        table.add_row(vec![outcome.logical_name(), status, address]);
    }
    table
}
