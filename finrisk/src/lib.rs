//! finrisk - Lending-Risk Dashboard Core
//!
//! Aggregates borrower, loan, and multi-category risk records from an
//! external table store, ranks loans by final risk score, and answers
//! free-text risk questions by grounding a model provider in the current
//! dataset snapshot.
//!
//! ## Architecture
//!
//! Two subsystems do the real work:
//! - [`dashboard`] joins the three record sets into the ranked risk view
//!   plus band tallies.
//! - [`ask`] serializes the risk snapshot into a bounded context and queries
//!   the model provider under an answer-only-from-data instruction.
//!
//! Both receive their external collaborators ([`store::TableStore`],
//! [`ai::ModelProvider`]) as injected trait objects, never as ambient state,
//! so tests substitute fakes at the seams.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use finrisk::{DashboardService, SheetsConfig, SheetsStore};
//!
//! # async fn run() -> Result<(), finrisk::StoreError> {
//! let store = Arc::new(SheetsStore::new(SheetsConfig::default())?);
//! let view = DashboardService::new(store).build().await?;
//! println!("{} high-risk loans", view.high);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Runtime configuration
pub mod config;

// Static table catalog
pub mod catalog;

// External collaborators
pub mod ai;
pub mod store;

// Core engines
pub mod ask;
pub mod dashboard;

// Record creation
pub mod records;

// Public re-exports for the common wiring
pub use ai::{ModelProvider, OpenAiClient};
pub use ask::GroundedQueryService;
pub use config::{AiConfig, QueryConfig, SheetsConfig};
pub use dashboard::{DashboardService, DashboardView, MergedEntry};
pub use error::{AiError, AiResult, StoreError, StoreResult};
pub use store::{MemoryStore, Record, SheetsStore, Table, TableStore};
