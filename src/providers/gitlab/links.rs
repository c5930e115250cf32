use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched when quoting a query value: unreserved
/// characters plus `/`, which parallel job names ("test 1/3") contain.
const QUOTE_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes `value` for use inside a URL (space becomes `%20`).
pub fn quote(value: &str) -> String {
    utf8_percent_encode(value, QUOTE_SAFE).to_string()
}

/// Builds a link to a pipeline's page in the GitLab web UI.
///
/// # Arguments
///
/// * `base_url` - GitLab instance base URL (e.g., <https://gitlab.com>)
/// * `project_path` - Project path (e.g., "group/project")
/// * `pipeline_id` - Numeric pipeline id
///
/// # Returns
///
/// Clickable URL to the pipeline (e.g., <https://gitlab.com/group/project/-/pipelines/123>)
pub fn pipeline_url(base_url: &str, project_path: &str, pipeline_id: u64) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/{project_path}/-/pipelines/{pipeline_id}")
}

/// Builds a deep link to one suite of a pipeline's test report.
///
/// The suite name is quoted into the `job_name` query parameter, so a suite
/// named "A B" yields `.../test_report?job_name=A%20B`.
pub fn test_report_url(
    base_url: &str,
    project_path: &str,
    pipeline_id: u64,
    suite_name: &str,
) -> String {
    format!(
        "{}/test_report?job_name={}",
        pipeline_url(base_url, project_path, pipeline_id),
        quote(suite_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_url() {
        let url = pipeline_url("https://gitlab.com", "group/project", 123_456);
        assert_eq!(url, "https://gitlab.com/group/project/-/pipelines/123456");
    }

    #[test]
    fn test_pipeline_url_trailing_slash() {
        let url = pipeline_url("https://gitlab.com/", "group/project", 1);
        assert_eq!(url, "https://gitlab.com/group/project/-/pipelines/1");
    }

    #[test]
    fn test_report_url_encodes_space() {
        let url = test_report_url("https://git.esss.dk", "dmsc-nightly/dmsc-nightly", 42, "A B");
        assert_eq!(
            url,
            "https://git.esss.dk/dmsc-nightly/dmsc-nightly/-/pipelines/42/test_report?job_name=A%20B"
        );
    }

    #[test]
    fn test_quote_keeps_slash_and_unreserved() {
        assert_eq!(quote("unit-tests_py3.11 1/3"), "unit-tests_py3.11%201/3");
    }

    #[test]
    fn test_quote_encodes_reserved_and_unicode() {
        assert_eq!(quote("a&b=c?"), "a%26b%3Dc%3F");
        assert_eq!(quote("é"), "%C3%A9");
    }
}
