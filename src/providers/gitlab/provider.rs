use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use rand::Rng;

use crate::auth::Token;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{DashboardError, Result};

use super::aggregate::{collect_skipped_tests, partition_jobs, RunChart};
use super::client::GitLabClient;
use super::links::pipeline_url;
use super::progress_bar::PhaseProgress;
use super::types::{Pipeline, TestReport};

/// GitLab dashboard provider.
///
/// Fetches the latest pipeline of the configured ref, its jobs, and the test
/// reports of recent pipelines, and turns them into a [`Dashboard`].
pub struct GitLabProvider {
    client: GitLabClient,
    config: Config,
}

impl GitLabProvider {
    /// Creates a provider from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL cannot be parsed.
    pub fn new(config: Config) -> Result<Self> {
        let token = config.gitlab.token.as_deref().map(Token::from);
        if token.is_none() {
            warn!("No GitLab token configured, requests are sent unauthenticated");
        }

        let client = GitLabClient::new(&config.gitlab.base_url, token)?;

        Ok(Self { client, config })
    }

    /// Returns the latest pipeline and the ids of the recent ones, newest first.
    ///
    /// Pipelines are sorted by id descending rather than relying on the API's
    /// default order; ids grow monotonically with creation time.
    async fn latest_pipelines(&self) -> Result<(Pipeline, Vec<u64>)> {
        let gitlab = &self.config.gitlab;

        let mut pipelines = self
            .client
            .fetch_pipelines(&gitlab.project, &gitlab.git_ref, gitlab.pipeline_limit)
            .await?;

        pipelines.sort_by(|a, b| b.id.cmp(&a.id));
        pipelines.truncate(gitlab.pipeline_limit);

        let ids = pipelines.iter().map(|p| p.id).collect();
        let latest = pipelines
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::NoPipelines {
                project: gitlab.project.clone(),
                ref_: gitlab.git_ref.clone(),
            })?;

        Ok((latest, ids))
    }

    /// Fetches test reports for `pipeline_ids`, returned in the same order.
    async fn fetch_test_reports(
        &self,
        pipeline_ids: &[u64],
        progress: &PhaseProgress,
    ) -> Result<Vec<TestReport>> {
        let project = self.config.gitlab.project.as_str();
        let concurrency = self.config.gitlab.concurrency.max(1);

        futures::stream::iter(pipeline_ids.iter().copied())
            .map(|pipeline_id| async move {
                let report = self.client.fetch_test_report(project, pipeline_id).await;
                progress.report_fetched();
                report
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// Runs the whole collection and aggregation for one dashboard.
    ///
    /// `rng` drives the placeholder team labels on each job.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - any API request answers with a non-success status
    /// - the project has no pipelines on the configured ref
    /// - a response body cannot be deserialized
    pub async fn collect_dashboard<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Dashboard> {
        let gitlab = &self.config.gitlab;
        let settings = &self.config.dashboard;

        info!(
            "Collecting dashboard data for project {} (ref {})",
            gitlab.project, gitlab.git_ref
        );

        // Phase 1: latest pipeline and its jobs
        let progress = PhaseProgress::start_phase_1();

        let (latest, pipeline_ids) = self.latest_pipelines().await?;
        info!(
            "Latest pipeline is {} ({} pipelines in history)",
            latest.id,
            pipeline_ids.len()
        );

        let api_jobs = self
            .client
            .fetch_jobs(&gitlab.project, latest.id, gitlab.jobs_per_page)
            .await?;
        let job_count = api_jobs.len();

        let buckets = partition_jobs(api_jobs, &settings.teams, settings.teams_per_job, rng);
        let jobs = buckets.all();
        for job in &jobs {
            info!(
                "Job: {}, Status: {}, URL: {}, Stage: {}",
                job.job_name, job.job_run_status, job.job_run_url, job.job_stage
            );
        }

        // Phase 2: test reports of the recent pipelines
        let progress = progress.finish_phase_1_start_phase_2(job_count, pipeline_ids.len());

        let reports = self.fetch_test_reports(&pipeline_ids, &progress).await?;

        // Phase 3: aggregation
        let progress = progress.finish_phase_2_start_phase_3();

        let run_chart = RunChart::from_newest_first(pipeline_ids.iter().copied().zip(&reports));

        // The latest pipeline heads the newest-first id list, so its report is the first one.
        let skipped_tests = reports
            .first()
            .map(|report| {
                collect_skipped_tests(
                    report,
                    &gitlab.base_url,
                    &gitlab.project_web_path,
                    latest.id,
                )
            })
            .unwrap_or_default();
        info!("Found {} skipped tests in pipeline {}", skipped_tests.len(), latest.id);

        let dashboard = Dashboard {
            project: gitlab.project.clone(),
            collected_at: Utc::now(),
            pipeline_id: latest.id,
            pipeline_url: latest.web_url.clone().unwrap_or_else(|| {
                pipeline_url(&gitlab.base_url, &gitlab.project_web_path, latest.id)
            }),
            pipeline_updated_at: latest.updated_at,
            jobs,
            failed_jobs: buckets.failed,
            teams: settings.teams.clone(),
            run_chart,
            skipped_tests,
        };

        progress.finish_phase_3();

        Ok(dashboard)
    }
}
