//! The metrics engine: every table the dashboard renders, computed as a
//! pure function of the immutable dataset and a filter.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use funnel_core::config::AnalyticsConfig;
use funnel_core::{CampaignEvent, FilterQuery, FunnelStage};
use funnel_dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::abtest::{self, AbTestResult, TestMetric};
use crate::activity::{self, ActivityReport};
use crate::stats;

/// Mean KPI values over a filtered view. Means over an empty view are 0.0
/// sentinels; the presentation layer handles formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiSummary {
    pub rows: usize,
    pub avg_ctr: f64,
    pub avg_conversion: f64,
    pub avg_cpi: f64,
    pub avg_ltv: f64,
    pub avg_roi: f64,
    pub retention_d7: f64,
}

/// One bar of the funnel chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTotal {
    pub stage: FunnelStage,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRevenue {
    pub campaign: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRetention {
    pub campaign: String,
    pub retention_d7: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyInstalls {
    pub date: NaiveDate,
    pub installs: u64,
}

/// Owns the loaded dataset and answers every dashboard query. All methods
/// are read-only; filtered views borrow from the dataset.
pub struct MetricsEngine {
    dataset: Arc<Dataset>,
    analytics: AnalyticsConfig,
}

impl MetricsEngine {
    pub fn new(dataset: Arc<Dataset>, analytics: AnalyticsConfig) -> Self {
        Self { dataset, analytics }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Rows matching the filter, in dataset order.
    pub fn filter(&self, query: &FilterQuery) -> Vec<&CampaignEvent> {
        self.dataset
            .events()
            .iter()
            .filter(|e| query.matches(e))
            .collect()
    }

    /// Mean KPIs over the filtered view. Non-finite row values (a CTR over
    /// zero impressions) are treated as missing and skipped, so the means
    /// stay finite for any valid input.
    pub fn kpi_summary(&self, query: &FilterQuery) -> KpiSummary {
        let rows = self.filter(query);
        let column = |f: fn(&CampaignEvent) -> f64| -> f64 {
            let values: Vec<f64> = rows
                .iter()
                .map(|e| f(e))
                .filter(|v| v.is_finite())
                .collect();
            stats::mean(&values)
        };

        KpiSummary {
            rows: rows.len(),
            avg_ctr: column(|e| e.ctr),
            avg_conversion: column(|e| e.conversion),
            avg_cpi: column(|e| e.cpi),
            avg_ltv: column(|e| e.ltv),
            avg_roi: column(|e| e.roi),
            retention_d7: column(|e| if e.retained_day_7 { 1.0 } else { 0.0 }),
        }
    }

    /// Stage totals over the filtered view, in funnel order.
    pub fn funnel(&self, query: &FilterQuery) -> Vec<StageTotal> {
        let rows = self.filter(query);
        FunnelStage::ORDERED
            .iter()
            .map(|stage| {
                let total = rows
                    .iter()
                    .map(|e| match stage {
                        FunnelStage::Impressions => e.impressions,
                        FunnelStage::Clicks => e.clicks,
                        FunnelStage::Installs => e.installs,
                        FunnelStage::Purchases => e.purchases,
                    })
                    .sum();
                StageTotal {
                    stage: *stage,
                    total,
                }
            })
            .collect()
    }

    /// Total revenue per campaign over the FULL dataset, ignoring the
    /// active filter, so campaign totals stay comparable.
    pub fn revenue_by_campaign(&self) -> Vec<CampaignRevenue> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for event in self.dataset.events() {
            *totals.entry(event.campaign.as_str()).or_insert(0.0) += event.revenue;
        }
        totals
            .into_iter()
            .map(|(campaign, revenue)| CampaignRevenue {
                campaign: campaign.to_string(),
                revenue,
            })
            .collect()
    }

    /// Mean day-7 retention per campaign over the FULL dataset.
    pub fn retention_by_campaign(&self) -> Vec<CampaignRetention> {
        let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for event in self.dataset.events() {
            let entry = counts.entry(event.campaign.as_str()).or_insert((0, 0));
            entry.0 += u64::from(event.retained_day_7);
            entry.1 += 1;
        }
        counts
            .into_iter()
            .map(|(campaign, (retained, total))| CampaignRetention {
                campaign: campaign.to_string(),
                retention_d7: if total == 0 {
                    0.0
                } else {
                    retained as f64 / total as f64
                },
            })
            .collect()
    }

    /// Installs summed per day over the filtered view, date-ordered. An
    /// empty view yields an empty sequence.
    pub fn daily_installs(&self, query: &FilterQuery) -> Vec<DailyInstalls> {
        let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for event in self.filter(query) {
            *totals.entry(event.date).or_insert(0) += event.installs;
        }
        totals
            .into_iter()
            .map(|(date, installs)| DailyInstalls { date, installs })
            .collect()
    }

    /// DAU/MAU/stickiness over the filtered view, or `None` when the
    /// module is disabled by configuration.
    pub fn activity(&self, query: &FilterQuery) -> Option<ActivityReport> {
        if !self.analytics.enable_activity {
            return None;
        }
        Some(activity::report(self.filter(query)))
    }

    /// One metric of the A/B comparison, always over the full dataset.
    pub fn ab_test(&self, metric: TestMetric) -> AbTestResult {
        abtest::run(
            self.dataset.events(),
            metric,
            &self.analytics.control_campaign,
            &self.analytics.treatment_campaign,
            self.analytics.alpha,
        )
    }

    /// The four-metric significance table.
    pub fn ab_test_suite(&self) -> Vec<AbTestResult> {
        TestMetric::ALL
            .iter()
            .map(|metric| self.ab_test(*metric))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::{CampaignSelector, DateRange};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_engine() -> MetricsEngine {
        // The three-row worked example from the dashboard's documentation.
        let events = vec![
            CampaignEvent::new(
                date("2025-06-01"),
                "A".into(),
                "u1".into(),
                100,
                10,
                5,
                1,
                50.0,
                true,
                0.01,
            ),
            CampaignEvent::new(
                date("2025-06-02"),
                "A".into(),
                "u2".into(),
                100,
                10,
                5,
                1,
                50.0,
                false,
                0.01,
            ),
            CampaignEvent::new(
                date("2025-06-03"),
                "B".into(),
                "u3".into(),
                100,
                20,
                10,
                4,
                200.0,
                true,
                0.01,
            ),
        ];
        MetricsEngine::new(
            Arc::new(Dataset::new(events)),
            AnalyticsConfig::default(),
        )
    }

    #[test]
    fn all_filter_restricts_by_date_only() {
        let engine = sample_engine();
        let query = FilterQuery {
            campaign: CampaignSelector::All,
            range: Some(DateRange::new(date("2025-06-01"), date("2025-06-02"))),
        };
        assert_eq!(engine.filter(&query).len(), 2);

        let unbounded = FilterQuery::all();
        assert_eq!(engine.filter(&unbounded).len(), 3);
    }

    #[test]
    fn campaign_filter_returns_only_that_campaign() {
        let engine = sample_engine();
        let query = FilterQuery {
            campaign: CampaignSelector::Only("A".into()),
            range: None,
        };
        let rows = engine.filter(&query);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|e| e.campaign == "A"));
    }

    #[test]
    fn kpi_means_match_the_worked_example() {
        let engine = sample_engine();
        let query = FilterQuery {
            campaign: CampaignSelector::Only("A".into()),
            range: None,
        };
        let kpis = engine.kpi_summary(&query);
        assert_eq!(kpis.rows, 2);
        assert!((kpis.avg_ctr - 0.10).abs() < 1e-12);
        assert!((kpis.retention_d7 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_view_yields_zero_kpis_not_nan() {
        let engine = sample_engine();
        let query = FilterQuery {
            campaign: CampaignSelector::Only("C".into()),
            range: None,
        };
        let kpis = engine.kpi_summary(&query);
        assert_eq!(kpis.rows, 0);
        assert_eq!(kpis.avg_ctr, 0.0);
        assert_eq!(kpis.avg_roi, 0.0);
    }

    #[test]
    fn zero_impression_rows_do_not_poison_the_ctr_mean() {
        // impressions == 0 is valid input; the undefined row-level CTR is
        // skipped rather than averaged in, as pandas' mean skips NaN.
        let events = vec![
            CampaignEvent::new(
                date("2025-06-01"),
                "A".into(),
                "u1".into(),
                0,
                0,
                5,
                1,
                50.0,
                true,
                0.01,
            ),
            CampaignEvent::new(
                date("2025-06-02"),
                "A".into(),
                "u2".into(),
                0,
                3,
                5,
                1,
                50.0,
                false,
                0.01,
            ),
            CampaignEvent::new(
                date("2025-06-03"),
                "A".into(),
                "u3".into(),
                100,
                10,
                5,
                1,
                50.0,
                true,
                0.01,
            ),
        ];
        let engine = MetricsEngine::new(
            Arc::new(Dataset::new(events)),
            AnalyticsConfig::default(),
        );

        let kpis = engine.kpi_summary(&FilterQuery::all());
        assert_eq!(kpis.rows, 3);
        assert!(kpis.avg_ctr.is_finite());
        // Only the defined CTR contributes to the mean.
        assert!((kpis.avg_ctr - 0.10).abs() < 1e-12);
        // The other KPI columns are defined on every row and keep all three.
        assert!((kpis.avg_conversion - 0.2).abs() < 1e-12);
    }

    #[test]
    fn funnel_totals_are_ordered_and_non_increasing() {
        let engine = sample_engine();
        let stages = engine.funnel(&FilterQuery::all());
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0].stage, FunnelStage::Impressions);
        assert_eq!(stages[0].total, 300);
        assert_eq!(stages[1].total, 40);
        assert_eq!(stages[2].total, 20);
        assert_eq!(stages[3].total, 6);
        assert!(stages.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn by_campaign_tables_ignore_the_filter() {
        let engine = sample_engine();
        let revenue = engine.revenue_by_campaign();
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[0].campaign, "A");
        assert_eq!(revenue[0].revenue, 100.0);
        assert_eq!(revenue[1].campaign, "B");
        assert_eq!(revenue[1].revenue, 200.0);

        let retention = engine.retention_by_campaign();
        assert_eq!(retention[0].retention_d7, 0.5);
        assert_eq!(retention[1].retention_d7, 1.0);
    }

    #[test]
    fn daily_installs_is_date_ordered_and_empty_safe() {
        let engine = sample_engine();
        let series = engine.daily_installs(&FilterQuery::all());
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));

        let none = FilterQuery {
            campaign: CampaignSelector::Only("C".into()),
            range: None,
        };
        assert!(engine.daily_installs(&none).is_empty());
    }

    #[test]
    fn activity_module_respects_the_config_gate() {
        let engine = sample_engine();
        assert!(engine.activity(&FilterQuery::all()).is_some());

        let disabled = MetricsEngine::new(
            Arc::new(Dataset::new(Vec::new())),
            AnalyticsConfig {
                enable_activity: false,
                ..AnalyticsConfig::default()
            },
        );
        assert!(disabled.activity(&FilterQuery::all()).is_none());
    }

    #[test]
    fn ab_suite_covers_the_four_metrics() {
        let engine = sample_engine();
        let suite = engine.ab_test_suite();
        assert_eq!(suite.len(), 4);
        assert_eq!(suite[0].metric, TestMetric::Ctr);
        assert_eq!(suite[3].metric, TestMetric::RetainedDay7);
    }
}
