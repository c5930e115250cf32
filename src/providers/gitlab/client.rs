use log::{debug, info};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{DashboardError, Result};

use super::types::{ApiJob, Pipeline, TestReport};

/// Thin client over the GitLab v4 REST API.
///
/// Every call is a single GET; non-2xx responses become `DashboardError::Api`
/// and nothing is retried.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipeboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {e}")))?;

        // A trailing slash keeps any path prefix of the instance when joining.
        let mut base = Url::parse(base_url)
            .map_err(|e| DashboardError::Config(format!("Invalid base URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_url = base
            .join("api/v4/")
            .map_err(|e| DashboardError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// Attaches the private token, when one is configured.
    ///
    /// Without a token the request goes out unauthenticated and the server
    /// answers with its own authentication error.
    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request.header(AUTHORIZATION, format!("PRIVATE-TOKEN {}", token.as_str()))
        } else {
            request
        }
    }

    /// Construct project base URL
    fn project_url(&self, project: &str) -> Result<Url> {
        let encoded = utf8_percent_encode(project, NON_ALPHANUMERIC);
        self.api_url
            .join(&format!("projects/{encoded}/"))
            .map_err(|e| DashboardError::Config(format!("Invalid project URL: {e}")))
    }

    fn endpoint(&self, project: &str, path: &str) -> Result<Url> {
        self.project_url(project)?
            .join(path)
            .map_err(|e| DashboardError::Config(format!("Invalid endpoint URL: {e}")))
    }

    async fn get_json<T>(&self, url: Url, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.auth_request(self.client.get(url.clone()).query(query));
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(DashboardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        debug!("GET {url} returned {} bytes", body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetches one page of pipelines for `git_ref`, in the order the API returns them.
    pub async fn fetch_pipelines(
        &self,
        project: &str,
        git_ref: &str,
        per_page: usize,
    ) -> Result<Vec<Pipeline>> {
        let url = self.endpoint(project, "pipelines")?;
        info!("Fetching pipelines from URL: {url}?ref={git_ref}&per_page={per_page}");

        self.get_json(
            url,
            &[("ref", git_ref.to_string()), ("per_page", per_page.to_string())],
        )
        .await
    }

    /// Fetches up to `per_page` jobs of a pipeline.
    pub async fn fetch_jobs(
        &self,
        project: &str,
        pipeline_id: u64,
        per_page: usize,
    ) -> Result<Vec<ApiJob>> {
        let url = self.endpoint(project, &format!("pipelines/{pipeline_id}/jobs"))?;
        info!("Fetching jobs for pipeline {pipeline_id}");

        self.get_json(url, &[("per_page", per_page.to_string())])
            .await
    }

    pub async fn fetch_test_report(&self, project: &str, pipeline_id: u64) -> Result<TestReport> {
        let url = self.endpoint(project, &format!("pipelines/{pipeline_id}/test_report"))?;
        debug!("Fetching test report from URL: {url}");

        self.get_json(url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard, token: Option<&str>) -> GitLabClient {
        GitLabClient::new(&server.url(), token.map(Token::from)).unwrap()
    }

    #[test]
    fn test_project_url_encodes_path() {
        let client = GitLabClient::new("https://gitlab.com", None).unwrap();
        let url = client.project_url("group/project").unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.com/api/v4/projects/group%2Fproject/"
        );
    }

    #[test]
    fn test_base_url_with_prefix_is_kept() {
        let client = GitLabClient::new("https://example.com/gitlab", None).unwrap();
        let url = client.endpoint("301", "pipelines").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/gitlab/api/v4/projects/301/pipelines"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GitLabClient::new("not a url", None);
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_pipelines_sends_query_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/301/pipelines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ref".into(), "main".into()),
                Matcher::UrlEncoded("per_page".into(), "50".into()),
            ]))
            .match_header("authorization", "PRIVATE-TOKEN secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 7, "updated_at": "2024-01-02T03:04:05Z", "status": "success"}]"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("secret"));
        let pipelines = client.fetch_pipelines("301", "main", 50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].id, 7);
        assert_eq!(pipelines[0].status.as_deref(), Some("success"));
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/301/pipelines/9/jobs")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let jobs = client.fetch_jobs("301", 9, 100).await.unwrap();

        mock.assert_async().await;
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _report = server
            .mock("GET", "/api/v4/projects/301/pipelines/9/test_report")
            .with_status(401)
            .with_body(r#"{"message":"401 Unauthorized"}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.fetch_test_report("301", 9).await.unwrap_err();

        match err {
            DashboardError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Unauthorized"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_test_report_parses_suites() {
        let mut server = mockito::Server::new_async().await;
        let _report = server
            .mock("GET", "/api/v4/projects/301/pipelines/9/test_report")
            .with_status(200)
            .with_body(
                r#"{
                    "total_count": 3, "failed_count": 1, "skipped_count": 1,
                    "success_count": 1, "error_count": 0,
                    "test_suites": [{
                        "name": "unit",
                        "test_cases": [
                            {"status": "success", "name": "a", "classname": "pkg.A"},
                            {"status": "skipped", "name": "b", "classname": "pkg.B"},
                            {"status": "failed", "name": "c", "classname": "pkg.C"}
                        ]
                    }]
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("t"));
        let report = client.fetch_test_report("301", 9).await.unwrap();

        assert_eq!(report.total_count, 3);
        assert_eq!(report.test_suites.len(), 1);
        assert_eq!(report.test_suites[0].test_cases[1].classname, "pkg.B");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let mut server = mockito::Server::new_async().await;
        let _report = server
            .mock("GET", "/api/v4/projects/301/pipelines/9/test_report")
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.fetch_test_report("301", 9).await.unwrap_err();
        assert!(matches!(err, DashboardError::Json(_)));
    }
}
