use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::instrument;

use crate::clients::github_curl::HttpTransport;
use crate::error::LabelError;
use crate::issue::repo_url;

/// Largest page size the REST API accepts.
const PER_PAGE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub login: String,
}

/// An issue or pull request as returned by the issues endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignee: Option<User>,
    /// Present only on pull requests.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

/// GET `url` page by page until a short page comes back.
async fn fetch_pages<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    url: &str,
) -> Result<Vec<T>, LabelError> {
    let separator = if url.contains('?') { '&' } else { '?' };
    let mut items = Vec::new();

    for page in 1.. {
        let page_url = format!("{}{}per_page={}&page={}", url, separator, PER_PAGE, page);
        let response = transport.get(&page_url).await?;
        let batch: Vec<T> = serde_json::from_str(&response)?;
        debug!("page {} has {} items", page, batch.len());

        let last = batch.len() < PER_PAGE;
        items.extend(batch);
        if last {
            break;
        }
    }

    Ok(items)
}

/// Fetch every label defined in `repo` (`owner/repo`).
#[instrument(skip(transport, api_base))]
pub async fn fetch_labels(
    transport: &dyn HttpTransport,
    api_base: &str,
    repo: &str,
) -> Result<Vec<Label>, LabelError> {
    fetch_pages(transport, &format!("{}/labels", repo_url(api_base, repo))).await
}

/// Labels currently on the issue at `issue_url`.
#[instrument(skip(transport))]
pub async fn fetch_issue_labels(
    transport: &dyn HttpTransport,
    issue_url: &str,
) -> Result<Vec<Label>, LabelError> {
    fetch_pages(transport, &format!("{}/labels", issue_url)).await
}

/// Open issues and pull requests of `repo` (`owner/repo`).
#[instrument(skip(transport, api_base))]
pub async fn fetch_open_issues(
    transport: &dyn HttpTransport,
    api_base: &str,
    repo: &str,
) -> Result<Vec<Issue>, LabelError> {
    let url = format!("{}/issues?state=open", repo_url(api_base, repo));
    fetch_pages(transport, &url).await
}
