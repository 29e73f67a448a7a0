//! End-to-end flow: parse a CSV, stand up the engine, and verify every
//! table the dashboard consumes.

use std::sync::Arc;

use funnel_core::config::AnalyticsConfig;
use funnel_core::{CampaignSelector, DateRange, FilterQuery};
use funnel_dataset::{generator, parse_csv};
use funnel_metrics::{MetricsEngine, TestMetric, Verdict};

const CSV: &str = "\
date,campaign,user_id,impressions,clicks,installs,purchases,revenue,retained_day_7
2025-06-01,A,user_001,100,10,5,1,50,1
2025-06-02,A,user_002,100,10,5,1,50,0
2025-06-03,B,user_003,100,20,10,4,200,1
";

fn engine_from(csv: &str) -> MetricsEngine {
    let dataset = parse_csv(csv, 0.01).expect("sample CSV parses");
    MetricsEngine::new(Arc::new(dataset), AnalyticsConfig::default())
}

#[test]
fn worked_example_end_to_end() {
    let engine = engine_from(CSV);

    let a_only = FilterQuery {
        campaign: CampaignSelector::Only("A".into()),
        range: None,
    };
    let kpis = engine.kpi_summary(&a_only);
    assert!((kpis.avg_ctr - 0.10).abs() < 1e-12);

    let revenue = engine.revenue_by_campaign();
    assert_eq!(revenue[0].revenue, 100.0);
    assert_eq!(revenue[1].revenue, 200.0);

    let retention = engine.retention_by_campaign();
    assert_eq!(retention[0].retention_d7, 0.5);
    assert_eq!(retention[1].retention_d7, 1.0);
}

#[test]
fn date_range_filter_is_inclusive_on_both_ends() {
    let engine = engine_from(CSV);
    let query = FilterQuery {
        campaign: CampaignSelector::All,
        range: Some(DateRange::new(
            "2025-06-01".parse().unwrap(),
            "2025-06-03".parse().unwrap(),
        )),
    };
    assert_eq!(engine.filter(&query).len(), 3);

    let narrower = FilterQuery {
        campaign: CampaignSelector::All,
        range: Some(DateRange::new(
            "2025-06-02".parse().unwrap(),
            "2025-06-02".parse().unwrap(),
        )),
    };
    assert_eq!(engine.filter(&narrower).len(), 1);
}

#[test]
fn ab_test_with_one_empty_campaign_is_not_available() {
    let single_campaign = "\
date,campaign,user_id,impressions,clicks,installs,purchases,revenue,retained_day_7
2025-06-01,A,user_001,100,10,5,1,50,1
2025-06-02,A,user_002,100,12,6,2,60,0
";
    let engine = engine_from(single_campaign);
    for result in engine.ab_test_suite() {
        assert_eq!(result.verdict, Verdict::NotAvailable);
        assert!(result.t_stat.is_none());
        assert!(result.p_value.is_none());
    }
}

#[test]
fn generated_data_produces_a_full_dashboard() {
    let config = generator::GeneratorConfig {
        rows: 400,
        ..generator::GeneratorConfig::default()
    };
    let csv = generator::to_csv(&generator::generate(&config));
    let engine = engine_from(&csv);

    let kpis = engine.kpi_summary(&FilterQuery::all());
    assert_eq!(kpis.rows, 400);
    assert!(kpis.avg_ctr > 0.0 && kpis.avg_ctr < 1.0);

    // The funnel narrows monotonically on sane simulated data.
    let funnel = engine.funnel(&FilterQuery::all());
    assert!(funnel.windows(2).all(|w| w[0].total >= w[1].total));

    let activity = engine
        .activity(&FilterQuery::all())
        .expect("activity enabled by default");
    assert!(!activity.dau.is_empty());
    assert!(activity.snapshot.latest_mau > 0);
    assert!(activity.snapshot.latest_stickiness > 0.0);
    assert!(activity.snapshot.latest_stickiness <= 1.0);

    // With 400 rows, the generator's deliberate A/B gap shows up in every
    // defined test; each verdict is well-formed either way.
    for result in engine.ab_test_suite() {
        match result.verdict {
            Verdict::NotAvailable => assert!(result.p_value.is_none()),
            _ => {
                assert!(result.t_stat.is_some());
                assert!(result.p_value.is_some());
            }
        }
    }

    // Conversion is tuned well apart between the campaigns.
    let conversion = engine.ab_test(TestMetric::Conversion);
    assert_eq!(conversion.verdict, Verdict::Significant);
}
