//! Tokensleuth - Solana Token Risk Auditor
//!
//! Audits a fungible token before you touch it: who deployed it, what else
//! they deployed, who holds it and who funded those holders, and how all of
//! that folds into a single risk score.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tokensleuth::adapters::cli::{render, AuditCmd, CliApp, Command, DeployerCmd, HistoryCmd, HoldersCmd};
use tokensleuth::adapters::{
    DasConfig, DasMetadataLookup, DexScreenerConfig, DexScreenerProbe, LaunchpadConfig,
    LaunchpadCreatorLookup, RpcConfig, SolanaRpcGateway,
};
use tokensleuth::application::{AuditorConfig, TokenAuditor};
use tokensleuth::config::{load_config, Config};
use tokensleuth::ports::lookup::{CreatorLookup, LiquidityProbe, MetadataLookup};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Audit(cmd) => audit_command(cmd).await,
        Command::Deployer(cmd) => deployer_command(cmd).await,
        Command::History(cmd) => history_command(cmd).await,
        Command::Holders(cmd) => holders_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt().with_env_filter(filter).init();
}

fn resolve_config(path: &Option<std::path::PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
            load_config(&expanded).with_context(|| format!("Failed to load config {}", expanded))
        }
        None => Ok(Config::default()),
    }
}

fn build_auditor(config: &Config) -> Result<TokenAuditor> {
    let gateway = SolanaRpcGateway::new(RpcConfig {
        rpc_url: config.solana.get_rpc_url(),
        commitment: config.solana.commitment.clone(),
        timeout: Duration::from_secs(config.solana.timeout_secs),
    })
    .context("Failed to create RPC gateway")?;

    let creator_lookup: Option<Arc<dyn CreatorLookup>> = if config.lookups.launchpad_enabled {
        Some(Arc::new(
            LaunchpadCreatorLookup::new(LaunchpadConfig::default())
                .context("Failed to create launchpad lookup")?,
        ))
    } else {
        None
    };

    let metadata_lookup: Option<Arc<dyn MetadataLookup>> = match &config.lookups.das_url {
        Some(url) => Some(Arc::new(
            DasMetadataLookup::new(DasConfig::new(url.clone()))
                .context("Failed to create DAS lookup")?,
        )),
        None => None,
    };

    let liquidity_probe: Option<Arc<dyn LiquidityProbe>> = if config.lookups.dexscreener_enabled {
        Some(Arc::new(
            DexScreenerProbe::new(DexScreenerConfig::default())
                .context("Failed to create DexScreener probe")?,
        ))
    } else {
        None
    };

    Ok(TokenAuditor::new(
        Arc::new(gateway),
        creator_lookup,
        metadata_lookup,
        liquidity_probe,
        Arc::new(config.known_entities.to_entities()),
        AuditorConfig::from(config),
    ))
}

async fn audit_command(cmd: AuditCmd) -> Result<()> {
    let config = resolve_config(&cmd.config)?;
    let auditor = build_auditor(&config)?;

    let report = auditor
        .audit(&cmd.mint)
        .await
        .with_context(|| format!("Audit of {} failed", cmd.mint))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_audit(&report));
    }
    Ok(())
}

async fn deployer_command(cmd: DeployerCmd) -> Result<()> {
    let config = resolve_config(&cmd.config)?;
    let auditor = build_auditor(&config)?;

    let deployer = auditor
        .identify_deployer(&cmd.mint)
        .await
        .with_context(|| format!("Could not identify the deployer of {}", cmd.mint))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&deployer)?);
    } else {
        print!("{}", render::render_deployer(&cmd.mint, &deployer));
    }
    Ok(())
}

async fn history_command(cmd: HistoryCmd) -> Result<()> {
    let config = resolve_config(&cmd.config)?;
    let auditor = build_auditor(&config)?;

    let profile = auditor
        .deployment_history(&cmd.deployer)
        .await
        .with_context(|| format!("History scan of {} failed", cmd.deployer))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", render::render_history(&profile));
    }
    Ok(())
}

async fn holders_command(cmd: HoldersCmd) -> Result<()> {
    let config = resolve_config(&cmd.config)?;
    let auditor = build_auditor(&config)?;

    let (holders, clusters) = auditor
        .holder_clusters(&cmd.mint)
        .await
        .with_context(|| format!("Holder trace of {} failed", cmd.mint))?;

    if cmd.json {
        let body = serde_json::json!({
            "mint": cmd.mint,
            "holders": holders,
            "clusters": clusters,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render::render_holders(&holders, &clusters));
    }
    Ok(())
}
