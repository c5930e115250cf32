use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::providers::gitlab::{Job, RunChart, SkippedTest};

/// Everything the dashboard template displays for one run.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub project: String,
    pub collected_at: DateTime<Utc>,
    pub pipeline_id: u64,
    pub pipeline_url: String,
    /// `updated_at` of the latest pipeline, as sent by the API
    pub pipeline_updated_at: String,
    /// All jobs of the latest pipeline, success then failed then other
    pub jobs: Vec<Job>,
    pub failed_jobs: Vec<Job>,
    pub teams: Vec<String>,
    pub run_chart: RunChart,
    pub skipped_tests: Vec<SkippedTest>,
}
