//! Command-line interface.

pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Solana fungible-token risk auditor
#[derive(Parser, Debug)]
#[command(name = "tokensleuth", version, about = "Rug-pull risk audits for Solana tokens")]
pub struct CliApp {
    /// Verbose output (info-level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug output (debug-level logs)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full risk audit of a token mint
    Audit(AuditCmd),

    /// Identify the deployer of a token mint
    Deployer(DeployerCmd),

    /// Deployment history and track record of a deployer wallet
    History(HistoryCmd),

    /// Top holders, funding sources, and cluster analysis of a mint
    Holders(HoldersCmd),
}

/// Run the full audit pipeline for one mint
#[derive(Parser, Debug)]
pub struct AuditCmd {
    /// Token mint address (base58)
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Resolve only the deployer wallet
#[derive(Parser, Debug)]
pub struct DeployerCmd {
    /// Token mint address (base58)
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit the result as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Scan a deployer wallet's recent deployments
#[derive(Parser, Debug)]
pub struct HistoryCmd {
    /// Deployer wallet address (base58)
    #[arg(value_name = "DEPLOYER")]
    pub deployer: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit the profile as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Trace holders and group them by funding source
#[derive(Parser, Debug)]
pub struct HoldersCmd {
    /// Token mint address (base58)
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit the clusters as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
