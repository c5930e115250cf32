use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{bright_green, export_json, write_output, DashboardRenderer};
use crate::providers::GitLabProvider;

/// Every flag is optional; without any, the configured (or default) project
/// is fetched and the dashboard written to the configured output path.
#[derive(Parser)]
#[command(name = "pipeboard")]
#[command(author, version, about = "Static HTML dashboard for GitLab CI pipelines", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./pipeboard.{toml,json,yaml,yml} when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitLab private token
    #[arg(short, long, env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitLab instance base URL
    #[arg(short, long)]
    url: Option<String>,

    /// Project id or 'group/project' path
    #[arg(short = 'P', long)]
    project: Option<String>,

    /// Project path used for links into the web UI
    #[arg(long)]
    project_web_path: Option<String>,

    /// Git ref whose pipelines are shown
    #[arg(short = 'r', long = "ref")]
    git_ref: Option<String>,

    /// Number of recent pipelines in the run chart
    #[arg(short, long)]
    limit: Option<usize>,

    /// Test report requests allowed in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory containing the dashboard template
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Rendered HTML destination
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the collected data as JSON to this path
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Pretty-print the JSON dump
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        let gitlab = &mut config.gitlab;
        if let Some(token) = &self.token {
            gitlab.token = Some(token.clone());
        }
        if let Some(url) = &self.url {
            gitlab.base_url = url.clone();
        }
        if let Some(project) = &self.project {
            gitlab.project = project.clone();
        }
        if let Some(path) = &self.project_web_path {
            gitlab.project_web_path = path.clone();
        }
        if let Some(git_ref) = &self.git_ref {
            gitlab.git_ref = git_ref.clone();
        }
        if let Some(limit) = self.limit {
            gitlab.pipeline_limit = limit;
        }
        if let Some(concurrency) = self.concurrency {
            gitlab.concurrency = concurrency;
        }

        let dashboard = &mut config.dashboard;
        if let Some(dir) = &self.template_dir {
            dashboard.template_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            dashboard.output = output.clone();
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;

        if let Some(path) = &self.save_config {
            config.save(path)?;
            info!("Configuration written to: {}", path.display());
            return Ok(());
        }

        let renderer = DashboardRenderer::new(&config.dashboard.template_dir);
        let template = config.dashboard.template.clone();
        let output_path = config.dashboard.output.clone();

        let provider = GitLabProvider::new(config)?;
        let dashboard = provider.collect_dashboard(&mut rand::rng()).await?;

        if let Some(path) = &self.dump_json {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create JSON dump: {}", path.display()))?;
            export_json(&dashboard, self.pretty, &mut file)?;
            info!("Dashboard data written to: {}", path.display());
        }

        let html = renderer.render(&template, &dashboard)?;
        write_output(&output_path, &html)?;

        eprintln!(
            "{} {}",
            bright_green("✓ Dashboard written to"),
            output_path.display()
        );

        Ok(())
    }
}
