//! Funnel dataset loading — CSV parsing, per-row KPI derivation, a
//! process-lifetime memoized store, and a simulated-data generator.

pub mod generator;
pub mod loader;
pub mod store;

pub use loader::{load_csv, parse_csv, Dataset, REQUIRED_COLUMNS};
pub use store::DatasetStore;
