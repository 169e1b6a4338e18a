//! Risk join & ranking engine.
//!
//! Reconciles the borrower, loan, and master risk record sets into a merged
//! risk view, ranks it by final risk score, and tallies the risk bands. The
//! merged view is recomputed on every dashboard request and never persisted.
//!
//! Identifiers are compared as exact text: `"7"` matches `"7"` but not
//! `"07"` or `"7.0"`. Records whose foreign keys fail either join hop are
//! dropped silently; malformed fields degrade to defaults rather than
//! aborting the aggregation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog;
use crate::error::StoreResult;
use crate::store::{Record, TableStore};

/// Number of entries in the ranked view.
pub const TOP_ENTRIES: usize = 10;

/// One joined row of the risk view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    pub loan_id: String,
    pub name: String,
    pub risk_band: String,
    pub score: f64,
}

/// Everything the dashboard page needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    /// Top-ranked merged entries, highest score first.
    pub top: Vec<MergedEntry>,
    /// Count of HIGH-band entries over the full merged view.
    pub high: usize,
    /// Count of MEDIUM-band entries over the full merged view.
    pub medium: usize,
    /// Count of LOW-band entries over the full merged view.
    pub low: usize,
    /// Table catalog, for navigation.
    pub tables: Vec<String>,
}

/// Join the three record sets into the merged risk view.
///
/// A risk record contributes one entry for every loan sharing its `loan_id`
/// and every borrower sharing that loan's `borrower_id`. Output order is
/// risk-set order, then loan order, then borrower order, so duplicate keys
/// fan out exactly like the underlying equi-join.
pub fn merge_risk_view(
    borrowers: &[Record],
    loans: &[Record],
    risks: &[Record],
) -> Vec<MergedEntry> {
    let mut loans_by_id: HashMap<&str, Vec<&Record>> = HashMap::new();
    for loan in loans {
        if let Some(id) = loan.get("loan_id") {
            loans_by_id.entry(id).or_default().push(loan);
        }
    }

    let mut borrowers_by_id: HashMap<&str, Vec<&Record>> = HashMap::new();
    for borrower in borrowers {
        if let Some(id) = borrower.get("borrower_id") {
            borrowers_by_id.entry(id).or_default().push(borrower);
        }
    }

    let mut merged = Vec::new();
    for risk in risks {
        let Some(loan_id) = risk.get("loan_id") else {
            continue;
        };
        let Some(matched_loans) = loans_by_id.get(loan_id) else {
            continue;
        };
        for loan in matched_loans {
            let Some(borrower_id) = loan.get("borrower_id") else {
                continue;
            };
            let Some(matched_borrowers) = borrowers_by_id.get(borrower_id) else {
                continue;
            };
            for borrower in matched_borrowers {
                merged.push(MergedEntry {
                    loan_id: loan_id.to_string(),
                    name: borrower.get("borrower_name").unwrap_or_default().to_string(),
                    risk_band: risk.get("risk_band").unwrap_or_default().to_string(),
                    score: parse_score(risk.get("final_risk_score")),
                });
            }
        }
    }
    merged
}

/// Missing or unparsable scores degrade to 0.0.
fn parse_score(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Rank the merged view by score descending and keep the top entries.
///
/// Ties keep their encounter order, so the output is a deterministic total
/// order over any input.
pub fn rank(mut merged: Vec<MergedEntry>) -> Vec<MergedEntry> {
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.truncate(TOP_ENTRIES);
    merged
}

/// Tally the recognized risk bands over the full merged view.
///
/// Bands outside HIGH/MEDIUM/LOW fall into none of the counts but still
/// belong to the merged view.
pub fn band_counts(merged: &[MergedEntry]) -> (usize, usize, usize) {
    let high = merged.iter().filter(|e| e.risk_band == "HIGH").count();
    let medium = merged.iter().filter(|e| e.risk_band == "MEDIUM").count();
    let low = merged.iter().filter(|e| e.risk_band == "LOW").count();
    (high, medium, low)
}

/// Builds the dashboard view from a table store snapshot.
///
/// The three reads are not atomic; concurrent writers may be observed
/// mid-update. Store failures propagate to the caller.
pub struct DashboardService {
    store: Arc<dyn TableStore>,
}

impl DashboardService {
    /// Create a dashboard service over the given store.
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Read the three record sets and build the ranked view.
    pub async fn build(&self) -> StoreResult<DashboardView> {
        let borrowers = self
            .store
            .read_table(catalog::BORROWERS_TABLE)
            .await?
            .records();
        let loans = self.store.read_table(catalog::LOANS_TABLE).await?.records();
        let risks = self
            .store
            .read_table(catalog::MASTER_RISK_TABLE)
            .await?
            .records();

        let merged = merge_risk_view(&borrowers, &loans, &risks);
        let (high, medium, low) = band_counts(&merged);
        debug!(
            entries = merged.len(),
            high, medium, low, "built merged risk view"
        );

        Ok(DashboardView {
            top: rank(merged),
            high,
            medium,
            low,
            tables: catalog::table_names(),
        })
    }
}
