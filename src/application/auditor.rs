//! Token audit orchestration.
//!
//! One audit runs the sub-analyses in sequence: mint facts, deployer
//! identification, deployment history, holder tracing with cluster
//! grouping, and the liquidity probe, then feeds everything into the risk
//! aggregation. Only an unreadable mint is fatal; every other failure
//! degrades to an absent signal recorded in the report notes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::analysis::deployer::{DeployerConfig, DeployerResolver, ResolvedDeployer};
use crate::analysis::executor::FetchExecutor;
use crate::analysis::history::{DeploymentScanner, HistoryConfig};
use crate::analysis::holders::{HolderTracer, TraceError, TracerConfig};
use crate::analysis::liquidity::LiquidityCheck;
use crate::analysis::metadata_cache::MetadataCache;
use crate::domain::deployment::{DeployedToken, DeveloperProfile};
use crate::domain::holders::{group_by_funder, ClusterReport, FundingSource, HolderRecord};
use crate::domain::known_entities::KnownEntities;
use crate::domain::known_programs::is_shared_launch_authority;
use crate::domain::risk::{aggregate, ConcentrationSignal, LiquidityTier, RiskAssessment, RiskInputs};
use crate::domain::stats::{gini_coefficient, top_n_share};
use crate::ports::ledger::{LedgerError, LedgerGateway, MintState};
use crate::ports::lookup::{CreatorLookup, LiquidityProbe, LiquiditySnapshot, MetadataLookup};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    InvalidAddress(LedgerError),

    /// The mint account could not be read at all. Without it there is
    /// nothing to assess.
    #[error("could not read mint {mint}: {source}")]
    MintUnavailable {
        mint: String,
        #[source]
        source: LedgerError,
    },
}

/// Knobs for one auditor instance.
#[derive(Debug, Clone)]
pub struct AuditorConfig {
    pub executor: crate::analysis::executor::ExecutorConfig,
    pub deployer: DeployerConfig,
    pub history: HistoryConfig,
    pub tracer: TracerConfig,
    /// Hard deadline for the liquidity probe.
    pub liquidity_deadline: Duration,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            executor: crate::analysis::executor::ExecutorConfig::default(),
            deployer: DeployerConfig::default(),
            history: HistoryConfig::default(),
            tracer: TracerConfig::default(),
            liquidity_deadline: Duration::from_secs(5),
        }
    }
}

/// One audited holder with its funding origin, when resolvable.
#[derive(Debug, Clone, Serialize)]
pub struct AuditedHolder {
    #[serde(flatten)]
    pub holder: HolderRecord,
    pub funding: Option<FundingSource>,
}

/// Liquidity verdict alongside the raw snapshot it came from.
#[derive(Debug, Clone, Serialize)]
pub struct LiquidityReport {
    pub tier: LiquidityTier,
    pub snapshot: LiquiditySnapshot,
}

/// Everything one audit produced.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub supply: u64,
    pub decimals: u8,
    pub metadata_mutable: Option<bool>,
    pub deployer: Option<ResolvedDeployer>,
    pub developer: Option<DeveloperProfile>,
    pub holders: Vec<AuditedHolder>,
    /// Absent when holder analysis was skipped; the reason lands in notes.
    pub clusters: Option<ClusterReport>,
    pub concentration: Option<ConcentrationSignal>,
    pub liquidity: Option<LiquidityReport>,
    pub assessment: RiskAssessment,
    /// Sub-analyses that degraded, with why.
    pub notes: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Wires the analysis components together and runs audits.
pub struct TokenAuditor {
    gateway: Arc<dyn LedgerGateway>,
    executor: FetchExecutor,
    metadata: Arc<MetadataCache>,
    resolver: DeployerResolver,
    scanner: DeploymentScanner,
    tracer: HolderTracer,
    liquidity: LiquidityCheck,
    entities: Arc<KnownEntities>,
}

impl TokenAuditor {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        creator_lookup: Option<Arc<dyn CreatorLookup>>,
        metadata_lookup: Option<Arc<dyn MetadataLookup>>,
        liquidity_probe: Option<Arc<dyn LiquidityProbe>>,
        entities: Arc<KnownEntities>,
        config: AuditorConfig,
    ) -> Self {
        let executor = FetchExecutor::new(config.executor.clone());
        let metadata = Arc::new(MetadataCache::new(metadata_lookup));

        let resolver = DeployerResolver::new(
            Arc::clone(&gateway),
            creator_lookup,
            executor.clone(),
            config.deployer.clone(),
        );
        let scanner = DeploymentScanner::new(
            Arc::clone(&gateway),
            executor.clone(),
            Arc::clone(&metadata),
            config.history.clone(),
        );
        let tracer = HolderTracer::new(
            Arc::clone(&gateway),
            executor.clone(),
            Arc::clone(&entities),
            config.tracer.clone(),
        );
        let liquidity = LiquidityCheck::new(liquidity_probe, config.liquidity_deadline);

        Self {
            gateway,
            executor,
            metadata,
            resolver,
            scanner,
            tracer,
            liquidity,
            entities,
        }
    }

    /// Full audit of one mint.
    pub async fn audit(&self, mint: &str) -> Result<AuditReport, AuditError> {
        let started = Instant::now();
        let mut notes = Vec::new();

        let mint_state = self.mint_state(mint).await?;
        let display = self.metadata.display_of(mint).await;
        let symbol = display.as_ref().and_then(|d| d.symbol.as_deref());
        tracing::info!(mint, symbol, "audit started");

        // The deployer/history side and the holder side are independent of
        // each other; run both at once and merge their notes afterward.
        let developer_side = async {
            let mut notes = Vec::new();
            let deployer = match self.resolver.identify(mint).await {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    tracing::warn!(mint, error = %e, "deployer identification failed");
                    notes.push(format!("deployer identification failed: {}", e));
                    None
                }
            };
            let developer = match &deployer {
                Some(resolved) => match self.scanner.scan(&resolved.address).await {
                    Ok(tokens) => {
                        Some(DeveloperProfile::from_tokens(resolved.address.clone(), tokens))
                    }
                    Err(e) => {
                        tracing::warn!(deployer = %resolved.address, error = %e, "history scan failed");
                        notes.push(format!("deployment history unavailable: {}", e));
                        None
                    }
                },
                None => None,
            };
            (deployer, developer, notes)
        };

        let holder_side = async {
            let mut notes = Vec::new();
            let traced = match self.tracer.trace(mint).await {
                Ok(traced) => Some(traced),
                Err(TraceError::TooManyHolders(_)) => {
                    notes.push(
                        "holder analysis skipped: holder set too large for largest-accounts analysis"
                            .to_string(),
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(mint, error = %e, "holder trace failed");
                    notes.push(format!("holder analysis unavailable: {}", e));
                    None
                }
            };
            (traced, notes)
        };

        let ((deployer, developer, developer_notes), (traced, holder_notes)) =
            tokio::join!(developer_side, holder_side);
        notes.extend(developer_notes);
        notes.extend(holder_notes);

        let (holders, clusters, concentration) = match traced {
            Some(traced) => {
                let clusters = group_by_funder(&traced, &self.entities);
                let concentration = concentration_signal(&traced);
                let holders = traced
                    .into_iter()
                    .map(|(holder, funding)| AuditedHolder { holder, funding })
                    .collect();
                (holders, Some(clusters), concentration)
            }
            None => (Vec::new(), None, None),
        };

        let liquidity = self
            .liquidity
            .check(mint)
            .await
            .map(|(tier, snapshot)| LiquidityReport { tier, snapshot });
        if liquidity.is_none() {
            notes.push("liquidity unknown: no pool data within the deadline".to_string());
        }

        let metadata_mutable = display.as_ref().and_then(|d| d.mutable);
        let assessment = aggregate(&RiskInputs {
            mint_authority_active: effective_mint_authority(&mint_state),
            freeze_authority_active: mint_state.freeze_authority_active(),
            metadata_mutable,
            liquidity: liquidity.as_ref().map(|l| l.tier),
            developer: developer.as_ref(),
            clusters: clusters.as_ref(),
            concentration,
        });

        tracing::info!(
            mint,
            score = assessment.score,
            level = ?assessment.level,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audit complete"
        );

        Ok(AuditReport {
            mint: mint.to_string(),
            name: display.as_ref().and_then(|d| d.name.clone()),
            symbol: display.as_ref().and_then(|d| d.symbol.clone()),
            mint_authority: mint_state.mint_authority,
            freeze_authority: mint_state.freeze_authority,
            supply: mint_state.supply,
            decimals: mint_state.decimals,
            metadata_mutable,
            deployer,
            developer,
            holders,
            clusters,
            concentration,
            liquidity,
            assessment,
            notes,
            generated_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Deployer identification only.
    pub async fn identify_deployer(
        &self,
        mint: &str,
    ) -> Result<ResolvedDeployer, crate::analysis::deployer::DeployerError> {
        self.resolver.identify(mint).await
    }

    /// Deployment history of a known deployer wallet.
    pub async fn deployment_history(
        &self,
        deployer: &str,
    ) -> Result<DeveloperProfile, LedgerError> {
        let tokens: Vec<DeployedToken> = self.scanner.scan(deployer).await?;
        Ok(DeveloperProfile::from_tokens(deployer.to_string(), tokens))
    }

    /// Holder trace and cluster grouping only.
    pub async fn holder_clusters(
        &self,
        mint: &str,
    ) -> Result<(Vec<AuditedHolder>, ClusterReport), TraceError> {
        let traced = self.tracer.trace(mint).await?;
        let clusters = group_by_funder(&traced, &self.entities);
        let holders = traced
            .into_iter()
            .map(|(holder, funding)| AuditedHolder { holder, funding })
            .collect();
        Ok((holders, clusters))
    }

    async fn mint_state(&self, mint: &str) -> Result<MintState, AuditError> {
        crate::ports::ledger::validate_address(mint).map_err(AuditError::InvalidAddress)?;

        let gateway = Arc::clone(&self.gateway);
        let mint_owned = mint.to_string();
        self.executor
            .run(|| {
                let gateway = Arc::clone(&gateway);
                let mint = mint_owned.clone();
                async move { gateway.get_mint_state(&mint).await }
            })
            .await
            .map_err(|source| AuditError::MintUnavailable {
                mint: mint.to_string(),
                source,
            })
    }
}

/// The shared-launch platform keeps mint authority on every token it
/// launches; that is a platform invariant, not the deployer retaining
/// control.
fn effective_mint_authority(state: &MintState) -> bool {
    match &state.mint_authority {
        Some(authority) => !is_shared_launch_authority(authority),
        None => false,
    }
}

fn concentration_signal(
    traced: &[(HolderRecord, Option<FundingSource>)],
) -> Option<ConcentrationSignal> {
    if traced.is_empty() {
        return None;
    }
    let pcts: Vec<f64> = traced.iter().map(|(h, _)| h.pct_of_supply).collect();
    let balances: Vec<f64> = traced.iter().map(|(h, _)| h.balance as f64).collect();
    Some(ConcentrationSignal {
        top_holder_pct: top_n_share(&pcts, 1),
        top10_pct: top_n_share(&pcts, 10),
        holder_count: traced.len(),
        gini: gini_coefficient(&balances),
    })
}
