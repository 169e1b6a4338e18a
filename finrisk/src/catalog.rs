//! Static catalog of dashboard tables.
//!
//! The catalog is configuration, not derived data: it enumerates every
//! worksheet the dashboard links to, in display order.

/// Borrower master table.
pub const BORROWERS_TABLE: &str = "borrowers";

/// Loan master table.
pub const LOANS_TABLE: &str = "loans";

/// Consolidated per-loan risk table the query service is grounded in.
pub const MASTER_RISK_TABLE: &str = "master_loan_risk";

/// Every table the dashboard knows about.
pub const RISK_TABLES: [&str; 24] = [
    "borrowers",
    "loans",
    "credit_risk",
    "fraud_risk",
    "esg_risk",
    "cashflow_risk",
    "liquidity_risk",
    "market_risk",
    "interest_rate_risk",
    "collateral_risk",
    "income_risk",
    "leverage_risk",
    "sector_risk",
    "geographic_risk",
    "climate_risk",
    "compliance_risk",
    "operational_risk",
    "reputation_risk",
    "recovery_risk",
    "restructuring_risk",
    "concentration_risk",
    "stress_risk",
    "early_warning_risk",
    "master_loan_risk",
];

/// Catalog as owned names, for view payloads.
pub fn table_names() -> Vec<String> {
    RISK_TABLES.iter().map(|name| name.to_string()).collect()
}

/// Check whether a table name is part of the catalog.
pub fn is_known_table(name: &str) -> bool {
    RISK_TABLES.contains(&name)
}
