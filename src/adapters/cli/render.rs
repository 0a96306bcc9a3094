//! Plain-text rendering of audit results.
//!
//! JSON output is plain serde elsewhere; this module only formats the
//! human-readable view.

use std::fmt::Write;

use crate::analysis::deployer::ResolvedDeployer;
use crate::application::{AuditReport, AuditedHolder};
use crate::domain::deployment::DeveloperProfile;
use crate::domain::holders::ClusterReport;

pub fn render_audit(report: &AuditReport) -> String {
    let mut out = String::new();

    let title = match (&report.name, &report.symbol) {
        (Some(name), Some(symbol)) => format!("{} ({})", name, symbol),
        (Some(name), None) => name.clone(),
        (None, Some(symbol)) => symbol.clone(),
        (None, None) => "unknown token".to_string(),
    };
    let _ = writeln!(out, "Audit: {} - {}", report.mint, title);
    let _ = writeln!(
        out,
        "Score: {:.1}/100 [{:?}]",
        report.assessment.score, report.assessment.level
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Checks:");
    for warning in &report.assessment.warnings {
        let _ = writeln!(out, "  - {}", warning);
    }

    if let Some(deployer) = &report.deployer {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Deployer: {} (via {})",
            deployer.address, deployer.strategy
        );
    }
    if let Some(developer) = &report.developer {
        let _ = write!(out, "{}", render_history(developer));
    }
    if let Some(clusters) = &report.clusters {
        let _ = write!(out, "{}", render_holders(&report.holders, clusters));
    }

    if !report.notes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Notes:");
        for note in &report.notes {
            let _ = writeln!(out, "  - {}", note);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated {} in {}ms",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed_ms
    );
    out
}

pub fn render_deployer(mint: &str, deployer: &ResolvedDeployer) -> String {
    format!(
        "Deployer of {}: {} (strategy: {})\n",
        mint, deployer.address, deployer.strategy
    )
}

pub fn render_history(profile: &DeveloperProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Deployment history of {}: {} deployed, {} active, {} dead, {} rugged",
        profile.deployer,
        profile.total_deployed,
        profile.active_count,
        profile.dead_count,
        profile.rugged_count
    );
    let _ = writeln!(
        out,
        "Win rate {:.2}% - {:?}: {}",
        profile.win_rate,
        profile.risk_level,
        profile.risk_level.description()
    );
    if let Some(mean) = profile.mean_hours_between_deploys {
        let _ = writeln!(out, "Mean gap between deploys: {:.1}h", mean);
    }
    for token in &profile.tokens {
        let label = match (&token.name, &token.symbol) {
            (_, Some(symbol)) => symbol.clone(),
            (Some(name), None) => name.clone(),
            (None, None) => "?".to_string(),
        };
        let age = token
            .age_days
            .map(|d| format!("{}d", d))
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(
            out,
            "  {:?}  {}  {}  age {}",
            token.lifecycle, token.mint, label, age
        );
    }
    out
}

pub fn render_holders(holders: &[AuditedHolder], clusters: &ClusterReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Top holders ({}):", holders.len());
    for entry in holders {
        let funder = entry
            .funding
            .as_ref()
            .map(|f| {
                if f.is_known_exchange {
                    format!("{} [exchange]", f.funder)
                } else if f.is_known_mixer {
                    format!("{} [mixer]", f.funder)
                } else {
                    f.funder.clone()
                }
            })
            .unwrap_or_else(|| "funding unknown".to_string());
        let _ = writeln!(
            out,
            "  #{:<3} {}  {:.2}%  funded by {}",
            entry.holder.rank, entry.holder.address, entry.holder.pct_of_supply, funder
        );
    }

    let _ = writeln!(
        out,
        "Clusters: {} total, {} suspicious controlling {:.2}% - {:?}",
        clusters.clusters.len(),
        clusters.suspicious_funders.len(),
        clusters.suspicious_control_pct,
        clusters.risk_level
    );
    for cluster in clusters.suspicious_clusters() {
        let _ = writeln!(
            out,
            "  funder {}: {} holders, {:.2}% of supply",
            cluster.funder, cluster.holder_count, cluster.total_pct
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::{DeployedToken, TokenLifecycle};

    #[test]
    fn test_render_deployer() {
        let text = render_deployer(
            "Mint111",
            &ResolvedDeployer {
                address: "Dev111".to_string(),
                strategy: "mint-authority",
            },
        );
        assert!(text.contains("Mint111"));
        assert!(text.contains("Dev111"));
        assert!(text.contains("mint-authority"));
    }

    #[test]
    fn test_render_history_lists_tokens() {
        let profile = DeveloperProfile::from_tokens(
            "Dev111".to_string(),
            vec![DeployedToken {
                mint: "MintA".to_string(),
                creation_signature: "sig".to_string(),
                created_at: None,
                lifecycle: TokenLifecycle::Rugged,
                name: None,
                symbol: Some("RUG".to_string()),
                age_days: Some(3),
            }],
        );
        let text = render_history(&profile);
        assert!(text.contains("1 rugged"));
        assert!(text.contains("MintA"));
        assert!(text.contains("RUG"));
        assert!(text.contains("age 3d"));
    }
}
