//! Shared domain types for the funnel dataset and its query surface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The acquisition funnel stages, in drop-off order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Impressions,
    Clicks,
    Installs,
    Purchases,
}

impl FunnelStage {
    /// Stages in the order they are rendered, top of funnel first.
    pub const ORDERED: [FunnelStage; 4] = [
        FunnelStage::Impressions,
        FunnelStage::Clicks,
        FunnelStage::Installs,
        FunnelStage::Purchases,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::Impressions => "impressions",
            FunnelStage::Clicks => "clicks",
            FunnelStage::Installs => "installs",
            FunnelStage::Purchases => "purchases",
        }
    }
}

/// One observed funnel event row, with the derived ratio KPIs attached
/// once at load time.
///
/// Division-by-zero on the install-based ratios is avoided by flooring the
/// denominator at 1. The floor is a deliberate policy of the source data,
/// not a missing-value signal: `conversion`, `cpi`, `ltv` and `roi` are
/// always finite, though they may be exactly zero or arbitrarily large.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEvent {
    pub date: NaiveDate,
    pub campaign: String,
    pub user_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub installs: u64,
    pub purchases: u64,
    pub revenue: f64,
    pub retained_day_7: bool,
    pub ctr: f64,
    pub conversion: f64,
    pub cpi: f64,
    pub ltv: f64,
    pub roi: f64,
}

impl CampaignEvent {
    /// Build an event row and compute its derived KPI fields.
    /// `unit_cost` is the fixed per-impression cost used for CPI.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        campaign: String,
        user_id: String,
        impressions: u64,
        clicks: u64,
        installs: u64,
        purchases: u64,
        revenue: f64,
        retained_day_7: bool,
        unit_cost: f64,
    ) -> Self {
        let install_floor = installs.max(1) as f64;
        let ctr = clicks as f64 / impressions as f64;
        let conversion = purchases as f64 / install_floor;
        let cpi = (impressions as f64 * unit_cost) / install_floor;
        let ltv = revenue / install_floor;
        let roi = ltv / cpi.max(1.0);

        Self {
            date,
            campaign,
            user_id,
            impressions,
            clicks,
            installs,
            purchases,
            revenue,
            retained_day_7,
            ctr,
            conversion,
            cpi,
            ltv,
            roi,
        }
    }

    /// Whether the row represents real user activity beyond seeing an ad.
    pub fn is_active(&self) -> bool {
        self.clicks > 0 || self.installs > 0 || self.purchases > 0
    }
}

/// Campaign dimension of a dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignSelector {
    All,
    Only(String),
}

impl CampaignSelector {
    /// Parse the selector from a query string value. "All" (any casing)
    /// selects every campaign; anything else selects that campaign only.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            CampaignSelector::All
        } else {
            CampaignSelector::Only(value.to_string())
        }
    }

    pub fn matches(&self, campaign: &str) -> bool {
        match self {
            CampaignSelector::All => true,
            CampaignSelector::Only(name) => name == campaign,
        }
    }
}

impl Default for CampaignSelector {
    fn default() -> Self {
        CampaignSelector::All
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A dashboard filter: campaign selection plus an optional date range.
/// `range: None` means the full observed span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterQuery {
    pub campaign: CampaignSelector,
    pub range: Option<DateRange>,
}

impl FilterQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, event: &CampaignEvent) -> bool {
        self.campaign.matches(&event.campaign)
            && self.range.map_or(true, |r| r.contains(event.date))
    }
}
