//! Application layer: audit orchestration over the analysis components.

pub mod auditor;

pub use auditor::{
    AuditError, AuditReport, AuditedHolder, AuditorConfig, LiquidityReport, TokenAuditor,
};
