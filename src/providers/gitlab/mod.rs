mod aggregate;
mod client;
mod links;
mod progress_bar;
mod provider;
mod types;

pub use aggregate::{Job, RunChart, SkippedTest};
pub use provider::GitLabProvider;

#[cfg(test)]
pub(crate) use types::TestReport;
