//! Holder records and funding-source cluster analysis.
//!
//! Groups the top holders of a token by the wallet that originally funded
//! them. Multiple large holders sharing one funding wallet is the classic
//! footprint of coordinated (sybil) ownership: one operator spreading a
//! position across wallets to hide concentration.
//!
//! Grouping is a pure function of its input so it can be re-run and tested
//! deterministically; all ledger I/O happens upstream in the tracer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::known_entities::KnownEntities;

/// Minimum members before a cluster can be suspicious.
pub const SUSPICIOUS_MIN_HOLDERS: usize = 2;

/// Minimum aggregate supply percentage before a cluster can be suspicious.
pub const SUSPICIOUS_MIN_PCT: f64 = 5.0;

/// Cluster percentage thresholds for the risk tiers.
pub const CLUSTER_CRITICAL_PCT: f64 = 30.0;
pub const CLUSTER_HIGH_PCT: f64 = 20.0;
pub const CLUSTER_MEDIUM_PCT: f64 = 10.0;

/// One of the top-N token holders, resolved to its owner wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderRecord {
    /// Owner wallet address.
    pub address: String,
    /// The SPL token account holding the balance.
    pub token_account: String,
    /// Balance in base units.
    pub balance: u64,
    /// Balance adjusted for decimals.
    pub ui_amount: f64,
    /// Percentage of total supply, 0-100.
    pub pct_of_supply: f64,
    /// 1 = largest holder.
    pub rank: usize,
}

/// The wallet that first sent native SOL to a holder.
///
/// Absent when no funding transfer was found within the scan depth; that is
/// a normal outcome for old or very active wallets, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingSource {
    /// Funder wallet address.
    pub funder: String,
    /// Signature of the funding transaction.
    pub signature: String,
    /// Block time of the funding transaction, if reported.
    pub block_time: Option<i64>,
    /// Lamports transferred in.
    pub lamports: u64,
    /// Funder is a known exchange hot wallet.
    pub is_known_exchange: bool,
    /// Funder is a known mixer withdrawal address.
    pub is_known_mixer: bool,
}

/// Holders grouped under one shared funding wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderCluster {
    /// The shared funding wallet (grouping key).
    pub funder: String,
    /// Member holders, in rank order.
    pub members: Vec<HolderRecord>,
    /// Sum of member balances in base units.
    pub total_balance: u64,
    /// Sum of member supply percentages.
    pub total_pct: f64,
    pub holder_count: usize,
    pub is_known_exchange: bool,
    pub is_known_mixer: bool,
}

impl HolderCluster {
    /// A cluster is suspicious when several holders share one funder that is
    /// neither an exchange nor a mixer, and together they control a
    /// non-trivial slice of supply.
    pub fn is_suspicious(&self) -> bool {
        self.holder_count >= SUSPICIOUS_MIN_HOLDERS
            && !self.is_known_exchange
            && !self.is_known_mixer
            && self.total_pct >= SUSPICIOUS_MIN_PCT
    }
}

/// Risk tier derived from the largest suspicious cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterRiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ClusterRiskLevel {
    pub fn description(&self) -> &'static str {
        match self {
            ClusterRiskLevel::Low => "No significant coordinated ownership detected",
            ClusterRiskLevel::Medium => "A funding cluster controls a notable share of supply",
            ClusterRiskLevel::High => "A funding cluster controls a large share of supply",
            ClusterRiskLevel::Critical => {
                "A single funding cluster controls a dominant share of supply"
            }
        }
    }
}

/// Output of the cluster grouper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterReport {
    /// All clusters, descending by aggregate percentage.
    pub clusters: Vec<HolderCluster>,
    /// Funders of the suspicious subset, same ordering.
    pub suspicious_funders: Vec<String>,
    /// Combined supply percentage held by suspicious clusters.
    pub suspicious_control_pct: f64,
    pub risk_level: ClusterRiskLevel,
}

impl ClusterReport {
    pub fn suspicious_clusters(&self) -> impl Iterator<Item = &HolderCluster> {
        self.clusters.iter().filter(|c| c.is_suspicious())
    }
}

/// Partition holders by shared funding origin.
///
/// Holders without a resolved funding source are excluded from every
/// cluster. Ordering is deterministic: descending aggregate percentage,
/// funder address as tie-break, so re-running on the same input yields an
/// identical report.
pub fn group_by_funder(
    holders: &[(HolderRecord, Option<FundingSource>)],
    entities: &KnownEntities,
) -> ClusterReport {
    let mut by_funder: HashMap<String, HolderCluster> = HashMap::new();

    for (holder, funding) in holders {
        let Some(funding) = funding else { continue };
        let cluster = by_funder
            .entry(funding.funder.clone())
            .or_insert_with(|| HolderCluster {
                funder: funding.funder.clone(),
                members: Vec::new(),
                total_balance: 0,
                total_pct: 0.0,
                holder_count: 0,
                is_known_exchange: entities.is_exchange(&funding.funder),
                is_known_mixer: entities.is_mixer(&funding.funder),
            });
        cluster.members.push(holder.clone());
        cluster.total_balance = cluster.total_balance.saturating_add(holder.balance);
        cluster.total_pct += holder.pct_of_supply;
        cluster.holder_count += 1;
    }

    let mut clusters: Vec<HolderCluster> = by_funder.into_values().collect();
    for cluster in &mut clusters {
        cluster.members.sort_by_key(|m| m.rank);
    }
    clusters.sort_by(|a, b| {
        b.total_pct
            .partial_cmp(&a.total_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.funder.cmp(&b.funder))
    });

    let suspicious: Vec<&HolderCluster> = clusters.iter().filter(|c| c.is_suspicious()).collect();
    let suspicious_funders = suspicious.iter().map(|c| c.funder.clone()).collect();
    let suspicious_control_pct = suspicious.iter().map(|c| c.total_pct).sum();
    let largest_suspicious_pct = suspicious.first().map(|c| c.total_pct).unwrap_or(0.0);

    let risk_level = if largest_suspicious_pct > CLUSTER_CRITICAL_PCT {
        ClusterRiskLevel::Critical
    } else if largest_suspicious_pct > CLUSTER_HIGH_PCT {
        ClusterRiskLevel::High
    } else if largest_suspicious_pct > CLUSTER_MEDIUM_PCT {
        ClusterRiskLevel::Medium
    } else {
        ClusterRiskLevel::Low
    };

    ClusterReport {
        clusters,
        suspicious_funders,
        suspicious_control_pct,
        risk_level,
    }
}
