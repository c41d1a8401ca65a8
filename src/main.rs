//! Pulsar cloud provider CLI
//!
//! Applies a JSON manifest of typed resource configurations against the
//! control plane and blocks until every resource converges.
//!
//! ## Usage
//!
//! ```bash
//! # Apply a manifest (requires kubeconfig pointing at the control plane)
//! pulsar-cloud-provider apply --manifest plan.json
//!
//! # Tear everything down
//! pulsar-cloud-provider destroy --manifest plan.json
//!
//! # Run with custom log level
//! RUST_LOG=debug pulsar-cloud-provider apply --manifest plan.json
//! ```

use clap::{Parser, Subcommand};
use kube::Client;
use pulsar_cloud_provider::manifest::Manifest;
use pulsar_cloud_provider::resources::{
    OrganizationDataSource, PoolMemberHandler, PulsarClusterHandler, PulsarGatewayHandler,
    PulsarInstanceHandler, ServiceAccountBindingHandler,
};
use pulsar_cloud_provider::ProviderConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pulsar cloud provider
#[derive(Parser, Debug)]
#[command(name = "pulsar-cloud-provider")]
#[command(version, about = "Declarative provisioning for a managed Pulsar cloud")]
struct Args {
    /// Organization to operate in (overridden by the manifest's own)
    #[arg(long, default_value = "")]
    organization: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update every resource in the manifest, waiting for convergence
    Apply {
        /// Path to the JSON manifest
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Delete every resource in the manifest, waiting for teardown
    Destroy {
        /// Path to the JSON manifest
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Print the current state of every resource in the manifest
    Status {
        /// Path to the JSON manifest
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Print the configuration fields the provider understands
    Schema,
}

struct Handlers {
    pool_members: PoolMemberHandler,
    instances: PulsarInstanceHandler,
    clusters: PulsarClusterHandler,
    gateways: PulsarGatewayHandler,
    bindings: ServiceAccountBindingHandler,
}

impl Handlers {
    fn new(client: Client, config: Arc<ProviderConfig>, cancel: &CancellationToken) -> Self {
        Self {
            pool_members: PoolMemberHandler::new(client.clone(), config.clone())
                .with_cancellation(cancel.clone()),
            instances: PulsarInstanceHandler::new(client.clone(), config.clone())
                .with_cancellation(cancel.clone()),
            clusters: PulsarClusterHandler::new(client.clone(), config.clone())
                .with_cancellation(cancel.clone()),
            gateways: PulsarGatewayHandler::new(client.clone(), config.clone())
                .with_cancellation(cancel.clone()),
            bindings: ServiceAccountBindingHandler::new(client, config)
                .with_cancellation(cancel.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let args = Args::parse();

    if let Command::Schema = args.command {
        // No client required.
        let config = ProviderConfig::new(&args.organization);
        for (field, description) in config.descriptions() {
            println!("{:40} {}", field, description);
        }
        return Ok(());
    }

    let manifest_path = match &args.command {
        Command::Apply { manifest }
        | Command::Destroy { manifest }
        | Command::Status { manifest } => manifest.clone(),
        Command::Schema => unreachable!(),
    };
    let manifest = Manifest::from_path(&manifest_path)?;

    let organization = manifest
        .organization
        .clone()
        .filter(|o| !o.is_empty())
        .or_else(|| Some(args.organization.clone()).filter(|o| !o.is_empty()))
        .ok_or_else(|| {
            anyhow::anyhow!("no organization set (use --organization or the manifest)")
        })?;

    info!("Organization: {}", organization);
    info!(
        "Manifest {} names {} resource(s)",
        manifest_path.display(),
        manifest.len()
    );

    // Create the control plane client
    let client = Client::try_default().await?;
    info!("Connected to the control plane");

    let config = Arc::new(ProviderConfig::new(&organization));

    // Ctrl-c aborts any in-flight convergence wait
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, aborting waits");
            signal_token.cancel();
        }
    });

    let handlers = Handlers::new(client.clone(), config, &cancel);

    match args.command {
        Command::Apply { .. } => apply(&handlers, &manifest).await?,
        Command::Destroy { .. } => destroy(&handlers, &manifest).await?,
        Command::Status { .. } => status(&handlers, client, &organization, &manifest).await?,
        Command::Schema => unreachable!(),
    }

    Ok(())
}

/// Apply in dependency order; an existing resource gets its spec replaced.
async fn apply(handlers: &Handlers, manifest: &Manifest) -> anyhow::Result<()> {
    for cfg in &manifest.pool_members {
        match handlers.pool_members.read(cfg.organization.as_deref(), &cfg.name).await {
            Ok(_) => handlers.pool_members.update(cfg).await?,
            Err(e) if e.is_not_found() => handlers.pool_members.create(cfg).await?,
            Err(e) => return Err(e.into()),
        };
    }
    for cfg in &manifest.instances {
        match handlers.instances.read(cfg.organization.as_deref(), &cfg.name).await {
            Ok(_) => handlers.instances.update(cfg).await?,
            Err(e) if e.is_not_found() => handlers.instances.create(cfg).await?,
            Err(e) => return Err(e.into()),
        };
    }
    for cfg in &manifest.clusters {
        match handlers.clusters.read(cfg.organization.as_deref(), &cfg.name).await {
            Ok(_) => handlers.clusters.update(cfg).await?,
            Err(e) if e.is_not_found() => handlers.clusters.create(cfg).await?,
            Err(e) => return Err(e.into()),
        };
    }
    for cfg in &manifest.gateways {
        match handlers.gateways.read(cfg.organization.as_deref(), &cfg.name).await {
            Ok(_) => handlers.gateways.update(cfg).await?,
            Err(e) if e.is_not_found() => handlers.gateways.create(cfg).await?,
            Err(e) => return Err(e.into()),
        };
    }
    for cfg in &manifest.bindings {
        match handlers.bindings.read(cfg.organization.as_deref(), &cfg.name).await {
            Ok(_) => {
                info!("ServiceAccountBinding {} already exists, skipping", cfg.name);
            }
            Err(e) if e.is_not_found() => {
                handlers.bindings.create(cfg).await?;
            }
            Err(e) => return Err(e.into()),
        };
    }
    info!("Apply complete");
    Ok(())
}

/// Destroy in reverse dependency order; absent resources are skipped.
async fn destroy(handlers: &Handlers, manifest: &Manifest) -> anyhow::Result<()> {
    for cfg in manifest.bindings.iter().rev() {
        handlers.bindings.delete(cfg.organization.as_deref(), &cfg.name).await?;
    }
    for cfg in manifest.gateways.iter().rev() {
        handlers.gateways.delete(cfg.organization.as_deref(), &cfg.name).await?;
    }
    for cfg in manifest.clusters.iter().rev() {
        handlers.clusters.delete(cfg.organization.as_deref(), &cfg.name).await?;
    }
    for cfg in manifest.instances.iter().rev() {
        handlers.instances.delete(cfg.organization.as_deref(), &cfg.name).await?;
    }
    for cfg in manifest.pool_members.iter().rev() {
        handlers.pool_members.delete(cfg.organization.as_deref(), &cfg.name).await?;
    }
    info!("Destroy complete");
    Ok(())
}

/// Print the current state of every resource in the manifest as JSON.
async fn status(
    handlers: &Handlers,
    client: Client,
    organization: &str,
    manifest: &Manifest,
) -> anyhow::Result<()> {
    let orgs = OrganizationDataSource::new(client);
    match orgs.read(organization).await {
        Ok(state) => println!("{}", serde_json::to_string_pretty(&state)?),
        Err(e) => warn!("Organization {} lookup failed: {}", organization, e),
    }

    for cfg in &manifest.pool_members {
        print_state(handlers.pool_members.read(cfg.organization.as_deref(), &cfg.name).await);
    }
    for cfg in &manifest.instances {
        print_state(handlers.instances.read(cfg.organization.as_deref(), &cfg.name).await);
    }
    for cfg in &manifest.clusters {
        print_state(handlers.clusters.read(cfg.organization.as_deref(), &cfg.name).await);
    }
    for cfg in &manifest.gateways {
        print_state(handlers.gateways.read(cfg.organization.as_deref(), &cfg.name).await);
    }
    for cfg in &manifest.bindings {
        print_state(handlers.bindings.read(cfg.organization.as_deref(), &cfg.name).await);
    }
    Ok(())
}

fn print_state<T: serde::Serialize>(state: pulsar_cloud_provider::Result<T>) {
    match state {
        Ok(s) => match serde_json::to_string_pretty(&s) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to render state: {}", e),
        },
        Err(e) => warn!("{}", e),
    }
}
