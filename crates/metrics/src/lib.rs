//! Funnel metrics engine — KPI summaries, funnel and by-campaign
//! aggregates, daily install trends, activity (DAU/MAU) analysis, and the
//! A/B significance test.

pub mod abtest;
pub mod activity;
pub mod engine;
pub mod stats;

pub use abtest::{AbTestResult, TestMetric, Verdict};
pub use activity::ActivityReport;
pub use engine::MetricsEngine;
