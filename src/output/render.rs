use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use minijinja::{context, path_loader, Environment};

use crate::dashboard::Dashboard;
use crate::error::{DashboardError, Result};

/// Formats a pipeline timestamp for display, e.g. "January 02, 2024 03:04 AM UTC".
///
/// Accepts RFC 3339 / ISO-8601 with a `Z` suffix or an explicit offset; the
/// result is always shown in UTC.
pub fn format_pipeline_time(updated_at: &str) -> Result<String> {
    let parsed =
        DateTime::parse_from_rfc3339(updated_at).map_err(|source| DashboardError::Timestamp {
            value: updated_at.to_string(),
            source,
        })?;

    Ok(parsed
        .with_timezone(&Utc)
        .format("%B %d, %Y %I:%M %p UTC")
        .to_string())
}

/// Two decimals and a percent sign, e.g. "20.00%".
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Renders dashboards from templates stored in a directory.
///
/// Templates ending in `.html` are auto-escaped.
pub struct DashboardRenderer {
    env: Environment<'static>,
}

impl DashboardRenderer {
    pub fn new(template_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(template_dir));
        Self { env }
    }

    /// Renders `template` with the dashboard's data.
    ///
    /// Chart series are passed as parallel arrays ordered oldest to newest.
    pub fn render(&self, template: &str, dashboard: &Dashboard) -> Result<String> {
        let tmpl = self.env.get_template(template)?;
        let chart = &dashboard.run_chart;

        let failed_job_percentage =
            format_percentage(chart.latest_failed_percentage().unwrap_or(0.0));
        let pipeline_end_time = format_pipeline_time(&dashboard.pipeline_updated_at)?;

        let html = tmpl.render(context! {
            gitlab_tests => &dashboard.jobs,
            failed_tests => &dashboard.failed_jobs,
            failed_job_percentage,
            pipeline_end_time,
            teams => &dashboard.teams,
            failing_test => chart.failing_counts(),
            pipeline_run_ids => chart.pipeline_ids(),
            skipped_tests => chart.skipped_counts(),
            number_of_tests => chart.test_counts(),
            failed_percentages => chart.failed_percentages(),
            pipeline_id => dashboard.pipeline_id,
            pipeline_url => &dashboard.pipeline_url,
            skipped_test_suites => &dashboard.skipped_tests,
            project => &dashboard.project,
            generated_at => dashboard.collected_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        })?;

        Ok(html)
    }
}

/// Writes the rendered page, replacing any previous file.
pub fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, html)?;
    info!("... wrote {}", path.display());

    Ok(())
}
