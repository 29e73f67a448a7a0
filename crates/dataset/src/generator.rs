//! Simulated funnel data generator.
//!
//! Produces the kind of dataset the dashboard is built around: two
//! acquisition campaigns where B converts and retains slightly better
//! than A. Deterministic for a given seed.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use funnel_core::CampaignEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tunable shape of the simulated dataset.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub users: usize,
    pub start: NaiveDate,
    pub days: u32,
    pub seed: u64,
    pub unit_cost: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            users: 120,
            start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
            days: 60,
            seed: 42,
            unit_cost: 0.01,
        }
    }
}

/// Per-campaign rate bands the funnel is sampled from.
struct CampaignProfile {
    name: &'static str,
    ctr: (f64, f64),
    install_rate: (f64, f64),
    purchase_rate: (f64, f64),
    retention: f64,
}

const PROFILES: [CampaignProfile; 2] = [
    CampaignProfile {
        name: "A",
        ctr: (0.05, 0.12),
        install_rate: (0.20, 0.45),
        purchase_rate: (0.05, 0.20),
        retention: 0.35,
    },
    CampaignProfile {
        name: "B",
        ctr: (0.08, 0.16),
        install_rate: (0.25, 0.50),
        purchase_rate: (0.12, 0.30),
        retention: 0.50,
    },
];

/// Generate simulated funnel events.
pub fn generate(config: &GeneratorConfig) -> Vec<CampaignEvent> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut events = Vec::with_capacity(config.rows);

    for _ in 0..config.rows {
        let profile = &PROFILES[rng.gen_range(0..PROFILES.len())];
        let date = config.start + Duration::days(rng.gen_range(0..config.days.max(1)) as i64);
        let user_id = format!("user_{:04}", rng.gen_range(0..config.users.max(1)));

        let impressions = rng.gen_range(200..2000u64);
        let ctr = rng.gen_range(profile.ctr.0..profile.ctr.1);
        let clicks = (impressions as f64 * ctr).round() as u64;
        let installs = (clicks as f64 * rng.gen_range(profile.install_rate.0..profile.install_rate.1))
            .round() as u64;
        let purchases = (installs as f64
            * rng.gen_range(profile.purchase_rate.0..profile.purchase_rate.1))
        .round() as u64;
        let revenue = purchases as f64 * rng.gen_range(5.0..25.0);
        let retained = installs > 0 && rng.gen_bool(profile.retention);

        events.push(CampaignEvent::new(
            date,
            profile.name.to_string(),
            user_id,
            impressions,
            clicks,
            installs,
            purchases,
            revenue,
            retained,
            config.unit_cost,
        ));
    }

    events.sort_by(|a, b| a.date.cmp(&b.date));
    events
}

/// Render events as the CSV shape the loader expects.
pub fn to_csv(events: &[CampaignEvent]) -> String {
    let mut out = String::from(
        "date,campaign,user_id,impressions,clicks,installs,purchases,revenue,retained_day_7\n",
    );
    for e in events {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{:.2},{}\n",
            e.date,
            e.campaign,
            e.user_id,
            e.impressions,
            e.clicks,
            e.installs,
            e.purchases,
            e.revenue,
            if e.retained_day_7 { 1 } else { 0 },
        ));
    }
    out
}

/// Generate and write a simulated dataset to disk.
pub fn write_csv(config: &GeneratorConfig, path: &Path) -> std::io::Result<usize> {
    let events = generate(config);
    std::fs::write(path, to_csv(&events))?;
    Ok(events.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    #[test]
    fn generates_the_requested_shape() {
        let config = GeneratorConfig {
            rows: 50,
            ..GeneratorConfig::default()
        };
        let events = generate(&config);
        assert_eq!(events.len(), 50);
        assert!(events.iter().all(|e| e.campaign == "A" || e.campaign == "B"));
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));

        let end = config.start + Duration::days(config.days as i64 - 1);
        assert!(events.iter().all(|e| e.date >= config.start && e.date <= end));
    }

    #[test]
    fn is_deterministic_for_a_seed() {
        let config = GeneratorConfig {
            rows: 20,
            ..GeneratorConfig::default()
        };
        assert_eq!(to_csv(&generate(&config)), to_csv(&generate(&config)));
    }

    #[test]
    fn output_round_trips_through_the_loader() {
        let config = GeneratorConfig {
            rows: 30,
            ..GeneratorConfig::default()
        };
        let csv = to_csv(&generate(&config));
        let dataset = loader::parse_csv(&csv, config.unit_cost).unwrap();
        assert_eq!(dataset.len(), 30);
    }
}
