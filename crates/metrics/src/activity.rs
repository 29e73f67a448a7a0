//! Active-user analysis: DAU, MAU, and the DAU/MAU stickiness ratio.
//!
//! An "active" row is one where the user did more than see an ad: clicked,
//! installed, or purchased. All series are computed over the rows the
//! caller passes in, so the dashboard filter applies here too.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use funnel_core::CampaignEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DauPoint {
    pub date: NaiveDate,
    pub dau: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MauPoint {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub mau: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickinessPoint {
    pub month: NaiveDate,
    pub avg_dau: f64,
    pub mau: u64,
    /// mean daily DAU / MAU; 0.0 when MAU is zero.
    pub ratio: f64,
}

/// Headline snapshot values for the KPI cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// Trailing 7-day average of DAU ending at the latest observed date.
    pub dau_7day_avg: f64,
    /// MAU of the latest observed month.
    pub latest_mau: u64,
    /// Stickiness of the latest observed month.
    pub latest_stickiness: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityReport {
    pub dau: Vec<DauPoint>,
    pub mau: Vec<MauPoint>,
    pub stickiness: Vec<StickinessPoint>,
    pub snapshot: ActivitySnapshot,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Build the full activity report for a set of rows. An empty input (or one
/// with no active rows) yields empty series and zeroed snapshot values.
pub fn report<'a, I>(rows: I) -> ActivityReport
where
    I: IntoIterator<Item = &'a CampaignEvent>,
{
    let mut daily_users: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
    let mut monthly_users: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();

    for event in rows.into_iter().filter(|e| e.is_active()) {
        daily_users
            .entry(event.date)
            .or_default()
            .insert(event.user_id.as_str());
        monthly_users
            .entry(month_start(event.date))
            .or_default()
            .insert(event.user_id.as_str());
    }

    let dau: Vec<DauPoint> = daily_users
        .iter()
        .map(|(date, users)| DauPoint {
            date: *date,
            dau: users.len() as u64,
        })
        .collect();

    let mau: Vec<MauPoint> = monthly_users
        .iter()
        .map(|(month, users)| MauPoint {
            month: *month,
            mau: users.len() as u64,
        })
        .collect();

    let stickiness: Vec<StickinessPoint> = mau
        .iter()
        .map(|point| {
            // Mean DAU over the days observed in this month.
            let days: Vec<u64> = dau
                .iter()
                .filter(|d| month_start(d.date) == point.month)
                .map(|d| d.dau)
                .collect();
            let avg_dau = if days.is_empty() {
                0.0
            } else {
                days.iter().sum::<u64>() as f64 / days.len() as f64
            };
            let ratio = if point.mau == 0 {
                0.0
            } else {
                avg_dau / point.mau as f64
            };
            StickinessPoint {
                month: point.month,
                avg_dau,
                mau: point.mau,
                ratio,
            }
        })
        .collect();

    let snapshot = snapshot(&dau, &mau, &stickiness);

    ActivityReport {
        dau,
        mau,
        stickiness,
        snapshot,
    }
}

fn snapshot(dau: &[DauPoint], mau: &[MauPoint], stickiness: &[StickinessPoint]) -> ActivitySnapshot {
    let dau_7day_avg = match dau.last() {
        Some(latest) => {
            let window_start = latest.date - Duration::days(6);
            let window: Vec<u64> = dau
                .iter()
                .filter(|d| d.date >= window_start)
                .map(|d| d.dau)
                .collect();
            if window.is_empty() {
                0.0
            } else {
                window.iter().sum::<u64>() as f64 / window.len() as f64
            }
        }
        None => 0.0,
    };

    let latest_month = mau.last().map(|m| m.month);
    let latest_mau = mau.last().map_or(0, |m| m.mau);
    let latest_stickiness = latest_month
        .and_then(|month| stickiness.iter().find(|s| s.month == month))
        .map_or(0.0, |s| s.ratio);

    ActivitySnapshot {
        dau_7day_avg,
        latest_mau,
        latest_stickiness,
    }
}
