//! Best-effort liquidity check.
//!
//! Asks an external market-data probe for the token's deepest pool and maps
//! the reported USD liquidity onto a tier. The probe is outside the audit's
//! control, so the whole call runs under a hard deadline and every failure
//! mode (timeout, HTTP error, no pool listed) collapses to "unknown".

use std::sync::Arc;
use std::time::Duration;

use crate::domain::risk::LiquidityTier;
use crate::ports::lookup::{LiquidityProbe, LiquiditySnapshot};

const CRITICAL_BELOW_USD: f64 = 1_000.0;
const HIGH_BELOW_USD: f64 = 10_000.0;
const MEDIUM_BELOW_USD: f64 = 50_000.0;

/// Tier for a pool's USD liquidity depth.
pub fn tier_for(liquidity_usd: f64) -> LiquidityTier {
    if liquidity_usd < CRITICAL_BELOW_USD {
        LiquidityTier::Critical
    } else if liquidity_usd < HIGH_BELOW_USD {
        LiquidityTier::High
    } else if liquidity_usd < MEDIUM_BELOW_USD {
        LiquidityTier::Medium
    } else {
        LiquidityTier::Safe
    }
}

/// Deadline-bounded wrapper over a [`LiquidityProbe`].
pub struct LiquidityCheck {
    probe: Option<Arc<dyn LiquidityProbe>>,
    deadline: Duration,
}

impl LiquidityCheck {
    pub fn new(probe: Option<Arc<dyn LiquidityProbe>>, deadline: Duration) -> Self {
        Self { probe, deadline }
    }

    /// Liquidity tier and raw snapshot for `mint`, or `None` when the probe
    /// is unconfigured, times out, errors, or knows no pool.
    pub async fn check(&self, mint: &str) -> Option<(LiquidityTier, LiquiditySnapshot)> {
        let probe = self.probe.as_ref()?;

        let snapshot = match tokio::time::timeout(self.deadline, probe.probe(mint)).await {
            Ok(Ok(Some(snapshot))) => snapshot,
            Ok(Ok(None)) => {
                tracing::debug!(mint, "no liquidity pool listed");
                return None;
            }
            Ok(Err(e)) => {
                tracing::debug!(mint, error = %e, "liquidity probe failed");
                return None;
            }
            Err(_) => {
                tracing::debug!(mint, deadline_ms = self.deadline.as_millis() as u64, "liquidity probe timed out");
                return None;
            }
        };

        Some((tier_for(snapshot.liquidity_usd), snapshot))
    }
}
