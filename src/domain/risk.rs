//! Risk aggregation.
//!
//! Folds the independent audit signals into one bounded score, a coarse
//! level, and a warning list. Every check appends a line whether it passed
//! or failed, so the warning list doubles as a complete audit trail: a
//! reader can see what was checked, not only what went wrong.

use serde::{Deserialize, Serialize};

use super::deployment::{DeveloperProfile, DeveloperRiskLevel};
use super::holders::{ClusterReport, ClusterRiskLevel};

/// Score every audit starts from.
pub const BASELINE_SCORE: f64 = 100.0;

/// Penalty for a live mint authority: supply can be inflated at will.
pub const MINT_AUTHORITY_PENALTY: f64 = 50.0;

/// Penalty for a live freeze authority: individual holders can be frozen.
pub const FREEZE_AUTHORITY_PENALTY: f64 = 20.0;

/// Penalty for mutable token metadata.
pub const MUTABLE_METADATA_PENALTY: f64 = 10.0;

/// Scores at or above this are Safe.
pub const SAFE_THRESHOLD: f64 = 80.0;

/// Scores at or above this (but below Safe) are Caution.
pub const CAUTION_THRESHOLD: f64 = 50.0;

/// Verdict levels for the final assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Caution,
    RugPullRisk,
}

impl RiskLevel {
    fn from_score(score: f64) -> Self {
        if score >= SAFE_THRESHOLD {
            RiskLevel::Safe
        } else if score >= CAUTION_THRESHOLD {
            RiskLevel::Caution
        } else {
            RiskLevel::RugPullRisk
        }
    }
}

/// Liquidity tier reported by the (optional) liquidity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityTier {
    Safe,
    Medium,
    High,
    Critical,
}

impl LiquidityTier {
    fn penalty(&self) -> f64 {
        match self {
            LiquidityTier::Safe => 0.0,
            LiquidityTier::Medium => 10.0,
            LiquidityTier::High => 20.0,
            LiquidityTier::Critical => 30.0,
        }
    }
}

/// Holder-distribution facts, independent of cluster analysis.
///
/// Carries the concentration signal even when zero clusters form, e.g.
/// when no funding source resolved for any holder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConcentrationSignal {
    /// Largest single holder's share of supply, 0-100.
    pub top_holder_pct: f64,
    /// Combined share of the ten largest holders, 0-100.
    pub top10_pct: f64,
    /// Number of holders inspected.
    pub holder_count: usize,
    /// Gini coefficient over the inspected balances.
    pub gini: f64,
}

/// Everything the aggregator consumes. Optional signals degrade to a
/// warning line, never to a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInputs<'a> {
    pub mint_authority_active: bool,
    pub freeze_authority_active: bool,
    /// None when metadata status could not be resolved.
    pub metadata_mutable: Option<bool>,
    pub liquidity: Option<LiquidityTier>,
    pub developer: Option<&'a DeveloperProfile>,
    pub clusters: Option<&'a ClusterReport>,
    pub concentration: Option<ConcentrationSignal>,
}

/// Final verdict. Built once per audit, read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped to [0, 100].
    pub score: f64,
    pub level: RiskLevel,
    /// One line per check, in check order, positive outcomes included.
    pub warnings: Vec<String>,
}

fn cluster_penalty(level: ClusterRiskLevel) -> f64 {
    match level {
        ClusterRiskLevel::Low => 0.0,
        ClusterRiskLevel::Medium => 10.0,
        ClusterRiskLevel::High => 20.0,
        ClusterRiskLevel::Critical => 30.0,
    }
}

fn developer_penalty(level: DeveloperRiskLevel) -> f64 {
    match level {
        DeveloperRiskLevel::Clean => 0.0,
        DeveloperRiskLevel::Watch => 10.0,
        DeveloperRiskLevel::HighRisk => 20.0,
        DeveloperRiskLevel::SerialScammer => 40.0,
    }
}

fn concentration_penalty(top_holder_pct: f64) -> f64 {
    if top_holder_pct > 50.0 {
        20.0
    } else if top_holder_pct > 30.0 {
        10.0
    } else if top_holder_pct > 20.0 {
        5.0
    } else {
        0.0
    }
}

/// Fold all signals into a bounded assessment.
pub fn aggregate(inputs: &RiskInputs) -> RiskAssessment {
    let mut score = BASELINE_SCORE;
    let mut warnings = Vec::new();

    if inputs.mint_authority_active {
        score -= MINT_AUTHORITY_PENALTY;
        warnings.push(
            "Mint authority is ACTIVE - the deployer can mint unlimited new supply".to_string(),
        );
    } else {
        warnings.push("Mint authority revoked - supply is fixed".to_string());
    }

    if inputs.freeze_authority_active {
        score -= FREEZE_AUTHORITY_PENALTY;
        warnings.push(
            "Freeze authority is ACTIVE - individual holder accounts can be frozen".to_string(),
        );
    } else {
        warnings.push("Freeze authority revoked".to_string());
    }

    match inputs.metadata_mutable {
        Some(true) => {
            score -= MUTABLE_METADATA_PENALTY;
            warnings.push("Token metadata is mutable - name and symbol can change".to_string());
        }
        Some(false) => warnings.push("Token metadata is immutable".to_string()),
        None => warnings.push("Metadata status unavailable - no penalty applied".to_string()),
    }

    match inputs.liquidity {
        Some(tier) => {
            score -= tier.penalty();
            warnings.push(format!("Liquidity risk tier: {:?}", tier));
        }
        None => warnings.push("Liquidity signal unavailable - no penalty applied".to_string()),
    }

    match inputs.developer {
        Some(profile) => {
            score -= developer_penalty(profile.risk_level);
            warnings.push(format!(
                "Deployer history: {} deployed, {} rugged, win rate {:.2}% - {}",
                profile.total_deployed,
                profile.rugged_count,
                profile.win_rate,
                profile.risk_level.description()
            ));
        }
        None => {
            warnings.push("Deployer history unavailable - developer signal skipped".to_string())
        }
    }

    match inputs.clusters {
        Some(report) => {
            score -= cluster_penalty(report.risk_level);
            warnings.push(format!(
                "Funding clusters: {} total, {} suspicious controlling {:.2}% of supply - {}",
                report.clusters.len(),
                report.suspicious_funders.len(),
                report.suspicious_control_pct,
                report.risk_level.description()
            ));
        }
        None => warnings.push(
            "Cluster analysis unavailable - coordinated-ownership signal skipped".to_string(),
        ),
    }

    match inputs.concentration {
        Some(c) => {
            score -= concentration_penalty(c.top_holder_pct);
            warnings.push(format!(
                "Holder distribution: top holder {:.2}%, top 10 {:.2}%, gini {:.3} across {} holders",
                c.top_holder_pct, c.top10_pct, c.gini, c.holder_count
            ));
        }
        None => warnings.push("Holder distribution unavailable".to_string()),
    }

    let score = score.clamp(0.0, 100.0);
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::{DeployedToken, TokenLifecycle};
    use crate::domain::holders::{group_by_funder, FundingSource, HolderRecord};
    use crate::domain::known_entities::KnownEntities;
    use approx::assert_relative_eq;

    #[test]
    fn test_clean_token_scores_100() {
        let assessment = aggregate(&RiskInputs {
            metadata_mutable: Some(false),
            ..Default::default()
        });
        assert_relative_eq!(assessment.score, 100.0);
        assert_eq!(assessment.level, RiskLevel::Safe);
    }

    #[test]
    fn test_active_mint_authority_alone_is_caution() {
        // 100 - 50 = 50, right on the Caution threshold.
        let assessment = aggregate(&RiskInputs {
            mint_authority_active: true,
            metadata_mutable: Some(false),
            ..Default::default()
        });
        assert_relative_eq!(assessment.score, 50.0);
        assert_eq!(assessment.level, RiskLevel::Caution);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let tokens: Vec<DeployedToken> = (0..3)
            .map(|i| DeployedToken {
                mint: format!("m{}", i),
                creation_signature: format!("s{}", i),
                created_at: None,
                lifecycle: TokenLifecycle::Rugged,
                name: None,
                symbol: None,
                age_days: None,
            })
            .collect();
        let profile = DeveloperProfile::from_tokens("dev".to_string(), tokens);

        let holders: Vec<(HolderRecord, Option<FundingSource>)> = (0..2)
            .map(|i| {
                (
                    HolderRecord {
                        address: format!("w{}", i),
                        token_account: format!("a{}", i),
                        balance: 1,
                        ui_amount: 1.0,
                        pct_of_supply: 40.0,
                        rank: i + 1,
                    },
                    Some(FundingSource {
                        funder: "funder".to_string(),
                        signature: "sig".to_string(),
                        block_time: None,
                        lamports: 1,
                        is_known_exchange: false,
                        is_known_mixer: false,
                    }),
                )
            })
            .collect();
        let clusters = group_by_funder(&holders, &KnownEntities::default());

        let assessment = aggregate(&RiskInputs {
            mint_authority_active: true,
            freeze_authority_active: true,
            metadata_mutable: Some(true),
            liquidity: Some(LiquidityTier::Critical),
            developer: Some(&profile),
            clusters: Some(&clusters),
            concentration: Some(ConcentrationSignal {
                top_holder_pct: 90.0,
                top10_pct: 100.0,
                holder_count: 2,
                gini: 0.9,
            }),
        });

        assert_relative_eq!(assessment.score, 0.0);
        assert_eq!(assessment.level, RiskLevel::RugPullRisk);
    }

    #[test]
    fn test_warnings_cover_every_check() {
        // Seven checks, seven lines, even when everything is absent or clean.
        let assessment = aggregate(&RiskInputs::default());
        assert_eq!(assessment.warnings.len(), 7);
    }

    #[test]
    fn test_positive_outcomes_still_reported() {
        let assessment = aggregate(&RiskInputs {
            metadata_mutable: Some(false),
            ..Default::default()
        });
        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("Mint authority revoked")));
        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("metadata is immutable")));
    }

    #[test]
    fn test_high_concentration_flagged_without_clusters() {
        // Ten holders, top at 60%, no funding sources resolved anywhere:
        // zero clusters, yet the distribution alone must flag.
        let no_holders: Vec<(HolderRecord, Option<FundingSource>)> = vec![];
        let empty_clusters = group_by_funder(&no_holders, &KnownEntities::default());
        assert_relative_eq!(empty_clusters.suspicious_control_pct, 0.0);

        let assessment = aggregate(&RiskInputs {
            metadata_mutable: Some(false),
            clusters: Some(&empty_clusters),
            concentration: Some(ConcentrationSignal {
                top_holder_pct: 60.0,
                top10_pct: 95.0,
                holder_count: 10,
                gini: 0.8,
            }),
            ..Default::default()
        });

        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("top holder 60.00%")));
        assert!(assessment.score < 100.0);
    }

    #[test]
    fn test_liquidity_tier_penalties_ordered() {
        let score_for = |tier| {
            aggregate(&RiskInputs {
                liquidity: Some(tier),
                ..Default::default()
            })
            .score
        };
        assert!(score_for(LiquidityTier::Safe) > score_for(LiquidityTier::Medium));
        assert!(score_for(LiquidityTier::Medium) > score_for(LiquidityTier::High));
        assert!(score_for(LiquidityTier::High) > score_for(LiquidityTier::Critical));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(79.9), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(49.9), RiskLevel::RugPullRisk);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::RugPullRisk);
    }
}
