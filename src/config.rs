use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for pipeboard.
///
/// Built once at startup and handed to the provider and the renderer.
/// Configuration files are loaded from the current directory or a specified path;
/// command line flags are applied on top afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitLab connection and fetch settings
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Rendering settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab private token
    pub token: Option<String>,

    /// GitLab instance base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Numeric project id or 'group/project' path used for API calls
    #[serde(default = "default_project")]
    pub project: String,

    /// Project path used when building links to the web UI
    #[serde(default = "default_project_web_path")]
    pub project_web_path: String,

    /// Git ref whose pipelines are shown
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,

    /// Number of historical pipelines in the run chart
    #[serde(default = "default_pipeline_limit")]
    pub pipeline_limit: usize,

    /// Page size for the jobs request
    #[serde(default = "default_jobs_per_page")]
    pub jobs_per_page: usize,

    /// Test report requests allowed in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardConfig {
    /// Team labels shown on the dashboard
    #[serde(default = "default_teams")]
    pub teams: Vec<String>,

    /// Labels assigned to each job
    #[serde(default = "default_teams_per_job")]
    pub teams_per_job: usize,

    /// Directory the template is loaded from
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Template name inside `template_dir`
    #[serde(default = "default_template")]
    pub template: String,

    /// Rendered HTML destination, overwritten on every run
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            project: default_project(),
            project_web_path: default_project_web_path(),
            git_ref: default_ref(),
            pipeline_limit: default_pipeline_limit(),
            jobs_per_page: default_jobs_per_page(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            teams: default_teams(),
            teams_per_job: default_teams_per_job(),
            template_dir: default_template_dir(),
            template: default_template(),
            output: default_output(),
        }
    }
}

fn default_base_url() -> String {
    "https://git.esss.dk".to_string()
}

fn default_project() -> String {
    "301".to_string()
}

fn default_project_web_path() -> String {
    "dmsc-nightly/dmsc-nightly".to_string()
}

fn default_ref() -> String {
    "main".to_string()
}

fn default_pipeline_limit() -> usize {
    50
}

fn default_jobs_per_page() -> usize {
    100
}

fn default_concurrency() -> usize {
    1
}

fn default_teams() -> Vec<String> {
    ["ECDC", "SCIPP", "SWAT", "DST", "DONKI", "IDS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_teams_per_job() -> usize {
    2
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_template() -> String {
    "dashboard.html".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("render/rendered.html")
}

const CANDIDATES: [&str; 4] = [
    "pipeboard.toml",
    "pipeboard.json",
    "pipeboard.yaml",
    "pipeboard.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipeboard.toml
    /// 3. ./pipeboard.json
    /// 4. ./pipeboard.yaml
    /// 5. ./pipeboard.yml
    ///
    /// Returns default configuration if no file is found. A path given
    /// explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        Self::discover(Path::new("."))
    }

    /// Load the first candidate file found in `dir`, or defaults.
    fn discover(dir: &Path) -> Result<Self> {
        for candidate in &CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                log::debug!("Using config file: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Reject settings that would make a run fetch nothing.
    pub fn validate(&self) -> Result<()> {
        if self.gitlab.pipeline_limit == 0 {
            bail!("pipeline-limit must be at least 1");
        }
        if self.gitlab.jobs_per_page == 0 {
            bail!("jobs-per-page must be at least 1");
        }

        Ok(())
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
