use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use super::links::test_report_url;
use super::types::{ApiJob, TestReport};

/// A job as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub job_run_url: String,
    /// "success", "failed", or empty for any other status
    pub job_run_status: String,
    pub job_name: String,
    pub job_stage: String,
    /// Comma separated team labels
    pub teams: String,
}

/// Jobs of one pipeline split by outcome, each bucket in fetch order.
#[derive(Debug, Default, Clone)]
pub struct JobBuckets {
    pub success: Vec<Job>,
    pub failed: Vec<Job>,
    pub other: Vec<Job>,
}

impl JobBuckets {
    /// Display order: successful, then failed, then everything else.
    pub fn all(&self) -> Vec<Job> {
        self.success
            .iter()
            .chain(&self.failed)
            .chain(&self.other)
            .cloned()
            .collect()
    }
}

/// Draws `count` labels from `teams`, uniformly and with replacement.
///
/// The labels are placeholders; they are not derived from the job itself.
pub fn assign_teams<R: Rng + ?Sized>(teams: &[String], count: usize, rng: &mut R) -> String {
    (0..count)
        .filter_map(|_| teams.choose(rng))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits jobs into success / failed / other buckets.
///
/// Status must match exactly; anything else lands in `other` with its
/// status cleared.
pub fn partition_jobs<R: Rng + ?Sized>(
    jobs: Vec<ApiJob>,
    teams: &[String],
    teams_per_job: usize,
    rng: &mut R,
) -> JobBuckets {
    let mut buckets = JobBuckets::default();

    for api_job in jobs {
        let mut job = Job {
            job_run_url: api_job.web_url,
            job_run_status: api_job.status,
            job_name: api_job.name,
            job_stage: api_job.stage,
            teams: assign_teams(teams, teams_per_job, rng),
        };

        match job.job_run_status.as_str() {
            "success" => buckets.success.push(job),
            "failed" => buckets.failed.push(job),
            _ => {
                job.job_run_status.clear();
                buckets.other.push(job);
            }
        }
    }

    buckets
}

/// Share of failed tests in percent; `0.0` for an empty report.
pub fn failed_percentage(failed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let rate = failed as f64 / total as f64 * 100.0;
    rate
}

/// Test counts of one historical pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub pipeline_id: u64,
    pub total: u64,
    pub failed_percentage: f64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunSummary {
    pub fn from_report(pipeline_id: u64, report: &TestReport) -> Self {
        Self {
            pipeline_id,
            total: report.total_count,
            failed_percentage: failed_percentage(report.failed_count, report.total_count),
            failed: report.failed_count,
            skipped: report.skipped_count,
        }
    }
}

/// Run history ordered oldest to newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunChart {
    runs: Vec<RunSummary>,
}

impl RunChart {
    /// Builds the chart from reports given newest first, as the pipelines
    /// were fetched, and flips them into chronological order.
    pub fn from_newest_first<'a, I>(reports: I) -> Self
    where
        I: IntoIterator<Item = (u64, &'a TestReport)>,
    {
        let mut runs: Vec<RunSummary> = reports
            .into_iter()
            .map(|(id, report)| RunSummary::from_report(id, report))
            .collect();
        runs.reverse();

        Self { runs }
    }

    pub fn pipeline_ids(&self) -> Vec<u64> {
        self.runs.iter().map(|r| r.pipeline_id).collect()
    }

    pub fn test_counts(&self) -> Vec<u64> {
        self.runs.iter().map(|r| r.total).collect()
    }

    pub fn failing_counts(&self) -> Vec<u64> {
        self.runs.iter().map(|r| r.failed).collect()
    }

    pub fn skipped_counts(&self) -> Vec<u64> {
        self.runs.iter().map(|r| r.skipped).collect()
    }

    pub fn failed_percentages(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.failed_percentage).collect()
    }

    /// Failed percentage of the newest run.
    pub fn latest_failed_percentage(&self) -> Option<f64> {
        self.runs.last().map(|r| r.failed_percentage)
    }
}

/// A skipped test case with a link to its suite in the web UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTest {
    pub classname: String,
    pub name: String,
    pub url: String,
}

/// Collects every test case with status `skipped`, in suite order.
pub fn collect_skipped_tests(
    report: &TestReport,
    base_url: &str,
    project_web_path: &str,
    pipeline_id: u64,
) -> Vec<SkippedTest> {
    let mut skipped = Vec::new();

    for suite in &report.test_suites {
        let url = test_report_url(base_url, project_web_path, pipeline_id, &suite.name);
        skipped.extend(
            suite
                .test_cases
                .iter()
                .filter(|case| case.status == "skipped")
                .map(|case| SkippedTest {
                    classname: case.classname.clone(),
                    name: case.name.clone(),
                    url: url.clone(),
                }),
        );
    }

    skipped
}
