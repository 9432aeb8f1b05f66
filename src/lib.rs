pub mod config;
pub mod harvest;
pub mod humanize;
pub mod ledger;
pub mod models;
pub mod observability;
pub mod queue;
pub mod reconcile;
pub mod storage;
pub mod table;
pub mod worker;

pub use harvest::{HarvestError, Harvester, RunSummary};
