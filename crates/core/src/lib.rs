pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{FunnelError, FunnelResult};
pub use types::{CampaignEvent, CampaignSelector, DateRange, FilterQuery, FunnelStage};
