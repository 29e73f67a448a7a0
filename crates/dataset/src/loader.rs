//! CSV loader for the marketing funnel dataset.
//!
//! The input is a comma-separated file with a header row. Columns may
//! appear in any order and extra columns are ignored; a missing required
//! column is a fatal load error. Value ranges are not validated.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use funnel_core::{CampaignEvent, FunnelError, FunnelResult};
use tracing::info;

/// Columns the loader requires in the header row.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "date",
    "campaign",
    "user_id",
    "impressions",
    "clicks",
    "installs",
    "purchases",
    "revenue",
    "retained_day_7",
];

/// The immutable in-memory dataset. Built once, never mutated; every
/// downstream computation works on borrowed views of `events`.
#[derive(Debug)]
pub struct Dataset {
    events: Vec<CampaignEvent>,
}

impl Dataset {
    pub fn new(events: Vec<CampaignEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[CampaignEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Minimum and maximum observed dates, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.events.iter().map(|e| e.date).min()?;
        let max = self.events.iter().map(|e| e.date).max()?;
        Some((min, max))
    }

    /// Distinct campaign identifiers, sorted.
    pub fn campaigns(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.events.iter().map(|e| e.campaign.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    date: usize,
    campaign: usize,
    user_id: usize,
    impressions: usize,
    clicks: usize,
    installs: usize,
    purchases: usize,
    revenue: usize,
    retained_day_7: usize,
}

impl ColumnIndex {
    fn resolve(header: &str) -> FunnelResult<Self> {
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let position = |name: &str| -> FunnelResult<usize> {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| FunnelError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: position("date")?,
            campaign: position("campaign")?,
            user_id: position("user_id")?,
            impressions: position("impressions")?,
            clicks: position("clicks")?,
            installs: position("installs")?,
            purchases: position("purchases")?,
            revenue: position("revenue")?,
            retained_day_7: position("retained_day_7")?,
        })
    }
}

/// Load and derive the dataset from a CSV file on disk.
pub fn load_csv(path: &Path, unit_cost: f64) -> FunnelResult<Dataset> {
    let raw = std::fs::read_to_string(path)?;
    let dataset = parse_csv(&raw, unit_cost)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        campaigns = ?dataset.campaigns(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Parse CSV text into a derived dataset.
pub fn parse_csv(raw: &str, unit_cost: f64) -> FunnelResult<Dataset> {
    let mut lines = raw.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line,
            None => return Err(FunnelError::MissingHeader),
        }
    };

    let index = ColumnIndex::resolve(header)?;
    let mut events = Vec::new();

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        // Header line numbering is zero-based; report one-based positions.
        events.push(parse_row(line, line_no + 1, &index, unit_cost)?);
    }

    Ok(Dataset::new(events))
}

fn parse_row(
    line: &str,
    line_no: usize,
    index: &ColumnIndex,
    unit_cost: f64,
) -> FunnelResult<CampaignEvent> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let field = |pos: usize, name: &str| -> FunnelResult<&str> {
        fields.get(pos).copied().ok_or_else(|| malformed(line_no, format!("missing field '{name}'")))
    };

    let date = parse_date(field(index.date, "date")?, line_no)?;
    let campaign = field(index.campaign, "campaign")?.to_string();
    let user_id = field(index.user_id, "user_id")?.to_string();
    let impressions = parse_count(field(index.impressions, "impressions")?, "impressions", line_no)?;
    let clicks = parse_count(field(index.clicks, "clicks")?, "clicks", line_no)?;
    let installs = parse_count(field(index.installs, "installs")?, "installs", line_no)?;
    let purchases = parse_count(field(index.purchases, "purchases")?, "purchases", line_no)?;
    let revenue = parse_amount(field(index.revenue, "revenue")?, "revenue", line_no)?;
    let retained = parse_flag(field(index.retained_day_7, "retained_day_7")?, line_no)?;

    Ok(CampaignEvent::new(
        date, campaign, user_id, impressions, clicks, installs, purchases, revenue, retained,
        unit_cost,
    ))
}

fn malformed(line: usize, message: String) -> FunnelError {
    FunnelError::MalformedRow { line, message }
}

fn parse_date(value: &str, line_no: usize) -> FunnelResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| malformed(line_no, format!("invalid date '{value}': {e}")))
}

fn parse_count(value: &str, name: &str, line_no: usize) -> FunnelResult<u64> {
    value
        .parse::<u64>()
        .map_err(|e| malformed(line_no, format!("invalid {name} '{value}': {e}")))
}

fn parse_amount(value: &str, name: &str, line_no: usize) -> FunnelResult<f64> {
    value
        .parse::<f64>()
        .map_err(|e| malformed(line_no, format!("invalid {name} '{value}': {e}")))
}

fn parse_flag(value: &str, line_no: usize) -> FunnelResult<bool> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => other
            .parse::<bool>()
            .map_err(|_| malformed(line_no, format!("invalid retained_day_7 '{other}'"))),
    }
}
