use serde::{Deserialize, Serialize};

/// A pipeline entry from `GET /projects/:id/pipelines`.
///
/// Only the fields the dashboard reads are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Instance-wide pipeline id
    pub id: u64,
    /// Last update time as sent by the API (ISO-8601, usually with a `Z` suffix)
    pub updated_at: String,
    /// Final or current pipeline status
    #[serde(default)]
    pub status: Option<String>,
    /// Browser link to the pipeline
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A job entry from `GET /projects/:id/pipelines/:pipeline_id/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiJob {
    pub web_url: String,
    /// e.g. "success", "failed", "skipped", "manual", "canceled"
    pub status: String,
    pub name: String,
    pub stage: String,
}

/// Response of `GET /projects/:id/pipelines/:pipeline_id/test_report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub total_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub test_suites: Vec<TestSuite>,
}

/// One suite of a test report. GitLab names suites after the job that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub status: String,
    pub name: String,
    #[serde(default)]
    pub classname: String,
}
