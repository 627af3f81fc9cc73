use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::LabelError;

// -----------------------------------------------------------------------------
// HttpTransport trait

/// Raw HTTP access to the GitHub REST API.
///
/// Implementations return the response body of a 2xx answer and map everything else to a
/// [`LabelError`]. Decoding the body is left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, LabelError>;

    /// POST a JSON document.
    async fn post(&self, url: &str, json_data: &str) -> Result<String, LabelError>;

    async fn delete(&self, url: &str) -> Result<String, LabelError>;
}

// -----------------------------------------------------------------------------
// GithubCurlClient

/// HTTP client using curl for making GitHub API requests
pub struct GithubCurlClient {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubError {
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    documentation_url: Option<String>,
}

impl GithubCurlClient {
    /// Without a token, requests go out unauthenticated and GitHub will reject label writes.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    fn common_args(&self, method: &str) -> Vec<String> {
        let mut args = vec![
            "-sS".to_string(),
            "-L".to_string(),
            "-w".to_string(),
            "\n%{http_code}".to_string(),
            "-X".to_string(),
            method.to_string(),
            "-H".to_string(),
            "Accept: application/vnd.github+json".to_string(),
            "-H".to_string(),
            "User-Agent: garden-cli".to_string(),
        ];
        if let Some(token) = &self.token {
            args.push("-H".to_string());
            args.push(format!("Authorization: Bearer {}", token));
        }
        args
    }

    fn post_args(json_data: &str) -> Vec<String> {
        vec![
            "-H".to_string(),
            "Content-Type: application/json".to_string(),
            "-d".to_string(),
            json_data.to_string(),
        ]
    }

    async fn run(
        &self,
        method: &str,
        url: &str,
        extra_args: Vec<String>,
    ) -> Result<String, LabelError> {
        let mut args = self.common_args(method);
        args.extend(extra_args);
        args.push(url.to_string());
        debug!("curl {} {}", method, url);

        let output = Command::new("curl")
            .args(&args)
            .output()
            .await
            .map_err(|err| LabelError::Transport {
                url: url.to_string(),
                message: format!("failed to execute curl command: {}", err),
            })?;

        if !output.status.success() {
            return Err(LabelError::Transport {
                url: url.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_response(url, &output.stdout)
    }
}

#[async_trait]
impl HttpTransport for GithubCurlClient {
    async fn get(&self, url: &str) -> Result<String, LabelError> {
        self.run("GET", url, Vec::new()).await
    }

    async fn post(&self, url: &str, json_data: &str) -> Result<String, LabelError> {
        self.run("POST", url, Self::post_args(json_data)).await
    }

    async fn delete(&self, url: &str) -> Result<String, LabelError> {
        self.run("DELETE", url, Vec::new()).await
    }
}

/// Parse curl output with the status code appended on its own line
fn parse_response(url: &str, stdout: &[u8]) -> Result<String, LabelError> {
    let output_str = String::from_utf8_lossy(stdout);
    let (response, status) = match output_str.rsplit_once('\n') {
        Some((body, status)) => (body.to_string(), status),
        None => (String::new(), &*output_str),
    };
    let status_code = status
        .trim()
        .parse::<u16>()
        .map_err(|_| LabelError::Transport {
            url: url.to_string(),
            message: format!("missing HTTP status in curl output: {:?}", status.trim()),
        })?;

    if status_code >= 400 {
        // Try to parse error message from response
        let message = match serde_json::from_str::<GitHubError>(&response) {
            Ok(error) => error.message,
            Err(_) => response,
        };
        return Err(LabelError::Api {
            status: status_code,
            message,
        });
    }

    Ok(response)
}
