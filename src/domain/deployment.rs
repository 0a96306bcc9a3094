//! Deployment history records and developer profiling.
//!
//! A deployer that keeps launching tokens which end up with a live mint
//! authority or one dominant holder is the strongest repeat-rug signal the
//! public ledger offers. The lifecycle classification here is an ownership
//! heuristic over holder concentration and supply state, not a liquidity
//! audit; the thresholds are named constants so the approximation is
//! visible and adjustable.

use serde::{Deserialize, Serialize};

use super::stats::deployment_cadence_hours;

/// Top-holder share above which a token is classified as rugged.
pub const RUGGED_TOP_HOLDER_PCT: f64 = 95.0;

/// Top-holder share above which a token is classified as dead.
pub const DEAD_TOP_HOLDER_PCT: f64 = 80.0;

/// Serial-scammer rule: minimum deployments considered.
pub const SERIAL_MIN_DEPLOYMENTS: usize = 3;

/// Serial-scammer rule: minimum rugged deployments.
pub const SERIAL_MIN_RUGGED: usize = 2;

/// Serial-scammer rule: win rate below which the rule fires, 0-100.
pub const SERIAL_MAX_WIN_RATE: f64 = 50.0;

/// Lifecycle classification of a discovered deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLifecycle {
    Active,
    Dead,
    Rugged,
}

impl TokenLifecycle {
    /// Classify from the facts the scanner can cheaply observe.
    ///
    /// `mint_authority_live` must already exclude the shared-launch
    /// authority, which holds mint authority on every token it launches.
    pub fn classify(mint_authority_live: bool, supply: u64, top_holder_pct: Option<f64>) -> Self {
        if mint_authority_live || supply == 0 {
            return TokenLifecycle::Rugged;
        }
        match top_holder_pct {
            Some(pct) if pct > RUGGED_TOP_HOLDER_PCT => TokenLifecycle::Rugged,
            Some(pct) if pct >= DEAD_TOP_HOLDER_PCT => TokenLifecycle::Dead,
            _ => TokenLifecycle::Active,
        }
    }
}

/// A token mint discovered in a deployer's transaction history.
///
/// Point-in-time snapshot, recomputed on every audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedToken {
    pub mint: String,
    /// Signature of the transaction that initialized the mint.
    pub creation_signature: String,
    /// Block time of the creation transaction, if reported.
    pub created_at: Option<i64>,
    pub lifecycle: TokenLifecycle,
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Age at audit time, whole days.
    pub age_days: Option<i64>,
}

/// Risk grade over a deployer's track record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeveloperRiskLevel {
    Clean,
    Watch,
    HighRisk,
    SerialScammer,
}

impl DeveloperRiskLevel {
    pub fn description(&self) -> &'static str {
        match self {
            DeveloperRiskLevel::Clean => "No rugged deployments on record",
            DeveloperRiskLevel::Watch => "Mixed track record, monitor closely",
            DeveloperRiskLevel::HighRisk => "Prior rugged deployment on record",
            DeveloperRiskLevel::SerialScammer => {
                "Repeat rug pattern: multiple rugged deployments with a losing record"
            }
        }
    }
}

/// Aggregated view of one deployer's history, newest deployment first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperProfile {
    pub deployer: String,
    pub tokens: Vec<DeployedToken>,
    pub total_deployed: usize,
    pub rugged_count: usize,
    pub active_count: usize,
    pub dead_count: usize,
    /// (total − rugged) / total × 100. 100 when nothing was deployed.
    pub win_rate: f64,
    /// Mean hours between consecutive deployments, when at least two exist.
    pub mean_hours_between_deploys: Option<f64>,
    /// Smallest gap between consecutive deployments, hours.
    pub min_hours_between_deploys: Option<f64>,
    pub risk_level: DeveloperRiskLevel,
}

impl DeveloperProfile {
    /// Derive the profile from classified deployments. The input order is
    /// preserved (scanner emits newest first).
    pub fn from_tokens(deployer: String, tokens: Vec<DeployedToken>) -> Self {
        let total = tokens.len();
        let rugged = tokens
            .iter()
            .filter(|t| t.lifecycle == TokenLifecycle::Rugged)
            .count();
        let active = tokens
            .iter()
            .filter(|t| t.lifecycle == TokenLifecycle::Active)
            .count();
        let dead = tokens
            .iter()
            .filter(|t| t.lifecycle == TokenLifecycle::Dead)
            .count();

        let win_rate = if total == 0 {
            100.0
        } else {
            (total - rugged) as f64 / total as f64 * 100.0
        };

        let timestamps: Vec<i64> = tokens.iter().filter_map(|t| t.created_at).collect();
        let cadence = deployment_cadence_hours(&timestamps);

        let risk_level = if total >= SERIAL_MIN_DEPLOYMENTS
            && rugged >= SERIAL_MIN_RUGGED
            && win_rate < SERIAL_MAX_WIN_RATE
        {
            DeveloperRiskLevel::SerialScammer
        } else if rugged > 0 {
            DeveloperRiskLevel::HighRisk
        } else if dead >= 2 {
            DeveloperRiskLevel::Watch
        } else {
            DeveloperRiskLevel::Clean
        };

        Self {
            deployer,
            tokens,
            total_deployed: total,
            rugged_count: rugged,
            active_count: active,
            dead_count: dead,
            win_rate,
            mean_hours_between_deploys: cadence.map(|(mean, _)| mean),
            min_hours_between_deploys: cadence.map(|(_, min)| min),
            risk_level,
        }
    }
}
