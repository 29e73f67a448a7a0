//! A/B significance testing between two campaigns.
//!
//! Samples are drawn from the unfiltered dataset so the comparison is not
//! affected by the active dashboard filter. An empty or degenerate sample
//! produces an "N/A" verdict rather than an error.

use funnel_core::CampaignEvent;
use serde::{Deserialize, Serialize};

use crate::stats;

/// Row-level metrics the A/B test compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMetric {
    Ctr,
    Conversion,
    Roi,
    RetainedDay7,
}

impl TestMetric {
    /// The full comparison suite, in the order the dashboard reports it.
    pub const ALL: [TestMetric; 4] = [
        TestMetric::Ctr,
        TestMetric::Conversion,
        TestMetric::Roi,
        TestMetric::RetainedDay7,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestMetric::Ctr => "CTR",
            TestMetric::Conversion => "Conversion",
            TestMetric::Roi => "ROI",
            TestMetric::RetainedDay7 => "retained_day_7",
        }
    }

    fn value(&self, event: &CampaignEvent) -> f64 {
        match self {
            TestMetric::Ctr => event.ctr,
            TestMetric::Conversion => event.conversion,
            TestMetric::Roi => event.roi,
            TestMetric::RetainedDay7 => {
                if event.retained_day_7 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Significant,
    #[serde(rename = "Not Significant")]
    NotSignificant,
    #[serde(rename = "N/A")]
    NotAvailable,
}

/// One row of the A/B results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbTestResult {
    pub metric: TestMetric,
    /// t-statistic rounded to 3 decimals; absent when the test is undefined.
    pub t_stat: Option<f64>,
    /// Two-tailed p-value rounded to 4 decimals; absent when undefined.
    pub p_value: Option<f64>,
    pub verdict: Verdict,
}

impl AbTestResult {
    fn not_available(metric: TestMetric) -> Self {
        Self {
            metric,
            t_stat: None,
            p_value: None,
            verdict: Verdict::NotAvailable,
        }
    }
}

/// Run the two-sample comparison of one metric between two campaigns.
///
/// Non-finite row values (a CTR over zero impressions, for instance) are
/// treated as missing and dropped from the samples.
pub fn run(
    events: &[CampaignEvent],
    metric: TestMetric,
    control: &str,
    treatment: &str,
    alpha: f64,
) -> AbTestResult {
    let sample = |campaign: &str| -> Vec<f64> {
        events
            .iter()
            .filter(|e| e.campaign == campaign)
            .map(|e| metric.value(e))
            .filter(|v| v.is_finite())
            .collect()
    };

    let control_values = sample(control);
    let treatment_values = sample(treatment);
    if control_values.is_empty() || treatment_values.is_empty() {
        return AbTestResult::not_available(metric);
    }

    match stats::student_t_test(&control_values, &treatment_values) {
        Some(test) => AbTestResult {
            metric,
            t_stat: Some(round_to(test.t, 3)),
            p_value: Some(round_to(test.p, 4)),
            // Verdict uses the unrounded p-value.
            verdict: if test.p < alpha {
                Verdict::Significant
            } else {
                Verdict::NotSignificant
            },
        },
        None => AbTestResult::not_available(metric),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
