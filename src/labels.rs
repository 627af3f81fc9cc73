//! Adding, removing and replacing labels on a single issue.
//!
//! [`LabelUpdater`] is stateless apart from its transport and [`RemovePolicy`]. Network effects run
//! on spawned Tokio tasks: every operation returns as soon as the request is issued, and the
//! outcome is logged when it arrives. Callers that care about the outcome await the returned
//! [`LabelTask`]; dropping it detaches the request.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use tokio::task::JoinHandle;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::clients::github_curl::HttpTransport;
use crate::error::LabelError;

/// Advice logged whenever a label request fails.
pub const AUTH_HINT: &str = "you may have to authenticate at github.com";

/// Outcome of one label request: the decoded response body.
pub type LabelResult = Result<serde_json::Value, LabelError>;

// -----------------------------------------------------------------------------
// RemovePolicy

/// What [`LabelUpdater::remove_label`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovePolicy {
    /// Only log the removal. The label stays on the issue.
    #[default]
    LogOnly,
    /// Also send `DELETE <issue>/labels/<label>`.
    Remote,
}

impl FromStr for RemovePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "log-only" | "log" => Ok(Self::LogOnly),
            "remote" => Ok(Self::Remote),
            other => anyhow::bail!(
                "Unknown remove policy '{}' (expected log-only or remote)",
                other
            ),
        }
    }
}

impl Display for RemovePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogOnly => f.write_str("log-only"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

// -----------------------------------------------------------------------------
// Task handles

/// A label request running in the background.
///
/// Await it for the result, [`abort`](Self::abort) it, or [`detach`](Self::detach) it.
#[must_use = "dropping a LabelTask detaches it; call detach() to make that explicit"]
pub struct LabelTask {
    handle: JoinHandle<LabelResult>,
}

impl LabelTask {
    fn spawn<F>(request: F) -> Self
    where
        F: Future<Output = LabelResult> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(async move {
                let result = request.await;
                log_outcome(&result);
                result
            }),
        }
    }

    /// Cancel the request. Awaiting the task afterwards yields [`LabelError::Cancelled`].
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Let the request run to completion unobserved. Its outcome still reaches the log.
    pub fn detach(self) {
        drop(self.handle);
    }
}

impl Future for LabelTask {
    type Output = LabelResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(LabelError::Cancelled),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        })
    }
}

/// What happened to a label removal.
#[must_use]
pub enum Removal {
    /// Logged locally, nothing sent.
    Logged,
    /// A DELETE request is in flight.
    Requested(LabelTask),
}

impl Removal {
    /// Wait for the DELETE, if one was sent.
    pub async fn finish(self) -> Option<LabelResult> {
        match self {
            Self::Logged => None,
            Self::Requested(task) => Some(task.await),
        }
    }
}

/// Handles for both halves of [`LabelUpdater::replace_label`].
#[must_use]
pub struct Replacement {
    pub added: LabelTask,
    pub removed: Removal,
}

impl Replacement {
    pub async fn finish(self) -> (LabelResult, Option<LabelResult>) {
        let added = self.added.await;
        let removed = self.removed.finish().await;
        (added, removed)
    }
}

// -----------------------------------------------------------------------------
// LabelUpdater

/// Issues label mutations against the GitHub REST API.
///
/// All operations must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct LabelUpdater {
    transport: Arc<dyn HttpTransport>,
    remove_policy: RemovePolicy,
}

impl LabelUpdater {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            remove_policy: RemovePolicy::default(),
        }
    }

    pub fn with_remove_policy(mut self, remove_policy: RemovePolicy) -> Self {
        self.remove_policy = remove_policy;
        self
    }

    pub fn remove_policy(&self) -> RemovePolicy {
        self.remove_policy
    }

    /// Ask GitHub to add `label` to the issue at `issue_url`.
    ///
    /// Sends `POST <issue_url>/labels` with `{"labels": [label]}`. GitHub treats this as "ensure
    /// present", so repeating it is harmless, but nothing here deduplicates: each call is a new
    /// request.
    pub fn add_label(&self, issue_url: &str, label: &str) -> LabelTask {
        let url = labels_url(issue_url);
        info!("post: {}", url);

        let body = serde_json::json!({ "labels": [label] }).to_string();
        let transport = Arc::clone(&self.transport);
        LabelTask::spawn(async move {
            let response = transport.post(&url, &body).await?;
            Ok(serde_json::from_str(&response)?)
        })
    }

    /// Record that `label` should come off the issue.
    ///
    /// With [`RemovePolicy::LogOnly`] this only logs; the remote label set is left alone.
    pub fn remove_label(&self, issue_url: &str, label: &str) -> Removal {
        info!("Remove label: {}", label);

        match self.remove_policy {
            RemovePolicy::LogOnly => Removal::Logged,
            RemovePolicy::Remote => {
                let url = label_url(issue_url, label);
                let transport = Arc::clone(&self.transport);
                Removal::Requested(LabelTask::spawn(async move {
                    let url = url?;
                    info!("delete: {}", url);
                    let response = transport.delete(&url).await?;
                    if response.trim().is_empty() {
                        return Ok(serde_json::Value::Null);
                    }
                    Ok(serde_json::from_str(&response)?)
                }))
            }
        }
    }

    /// Add `new_label`, then remove `old_label`.
    ///
    /// The two steps are independent: the add may still be in flight (or fail) when the removal
    /// is logged, and nothing is rolled back.
    pub fn replace_label(&self, issue_url: &str, old_label: &str, new_label: &str) -> Replacement {
        let added = self.add_label(issue_url, new_label);
        let removed = self.remove_label(issue_url, old_label);
        Replacement { added, removed }
    }
}

fn labels_url(issue_url: &str) -> String {
    format!("{}/labels", issue_url)
}

/// `<issue_url>/labels/<label>` with the label percent-encoded as a path segment.
fn label_url(issue_url: &str, label: &str) -> Result<String, LabelError> {
    let base = labels_url(issue_url);
    let mut url = Url::parse(&base).map_err(|err| LabelError::InvalidUrl {
        url: base.clone(),
        message: err.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|()| LabelError::InvalidUrl {
            url: base.clone(),
            message: "URL cannot have path segments".to_string(),
        })?
        .push(label);
    Ok(url.into())
}

fn log_outcome(result: &LabelResult) {
    match result {
        Ok(response) => info!("{}", response),
        Err(err) => warn!("label update failed, {}: {}", AUTH_HINT, err),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::clients::github_curl::MockHttpTransport;

    const ISSUE: &str = "https://api.github.com/repos/acme/widgets/issues/42";
    const LABELS: &str = "https://api.github.com/repos/acme/widgets/issues/42/labels";

    /// Log lines written by the scoped subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn count(&self, needle: &str) -> usize {
            self.lines().iter().filter(|l| l.contains(needle)).count()
        }

        fn position(&self, needle: &str) -> Option<usize> {
            self.lines().iter().position(|l| l.contains(needle))
        }
    }

    // Tests run on the current-thread runtime, so spawned tasks log through this subscriber too.
    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    fn updater(transport: MockHttpTransport) -> LabelUpdater {
        LabelUpdater::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_add_label_request_shape() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|url: &str, body: &str| url == LABELS && body == r#"{"labels":["in-progress"]}"#)
            .times(1)
            .returning(|_, _| Ok(r#"[{"name":"in-progress"}]"#.to_string()));

        let result = updater(transport).add_label(ISSUE, "in-progress").await;

        assert_eq!(result.unwrap(), serde_json::json!([{ "name": "in-progress" }]));
    }

    #[tokio::test]
    async fn test_add_label_logs_response() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .returning(|_, _| Ok(r#"[{"name":"bug"}]"#.to_string()));

        updater(transport).add_label(ISSUE, "bug").await.unwrap();

        assert_eq!(logs.count(&format!("post: {}", LABELS)), 1);
        assert_eq!(logs.count(r#"[{"name":"bug"}]"#), 1);
        assert_eq!(logs.count(AUTH_HINT), 0);
    }

    #[tokio::test]
    async fn test_add_label_transport_failure_is_contained() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport.expect_post().times(1).returning(|url, _| {
            Err(LabelError::Transport {
                url: url.to_string(),
                message: "Could not resolve host: api.github.com".to_string(),
            })
        });

        let result = updater(transport).add_label(ISSUE, "bug").await;

        assert!(matches!(result, Err(LabelError::Transport { .. })));
        assert_eq!(logs.count(AUTH_HINT), 1);
        assert_eq!(logs.count("Could not resolve host"), 1);
    }

    #[tokio::test]
    async fn test_add_label_malformed_json_is_contained() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .returning(|_, _| Ok("<html>sign in</html>".to_string()));

        let result = updater(transport).add_label(ISSUE, "bug").await;

        assert!(matches!(result, Err(LabelError::Decode(_))));
        assert_eq!(logs.count(AUTH_HINT), 1);
    }

    #[tokio::test]
    async fn test_add_label_auth_failure_is_contained() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport.expect_post().returning(|_, _| {
            Err(LabelError::Api {
                status: 401,
                message: "Requires authentication".to_string(),
            })
        });

        let err = updater(transport)
            .add_label(ISSUE, "bug")
            .await
            .unwrap_err();

        assert!(err.is_auth());
        assert_eq!(logs.count(AUTH_HINT), 1);
    }

    #[tokio::test]
    async fn test_add_label_twice_sends_two_requests() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|url: &str, body: &str| url == LABELS && body == r#"{"labels":["bug"]}"#)
            .times(2)
            .returning(|_, _| Ok("[]".to_string()));
        let updater = updater(transport);

        let first = updater.add_label(ISSUE, "bug");
        let second = updater.add_label(ISSUE, "bug");

        assert!(first.await.is_ok());
        assert!(second.await.is_ok());
    }

    #[tokio::test]
    async fn test_detached_add_still_runs() {
        let (logs, _guard) = capture_logs();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let mut transport = MockHttpTransport::new();
        transport.expect_post().times(1).returning(move |_, _| {
            if let Some(tx) = tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
            Ok("[]".to_string())
        });

        updater(transport).add_label(ISSUE, "bug").detach();
        rx.await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(logs.count("post: "), 1);
        assert_eq!(logs.count(AUTH_HINT), 0);
    }

    #[tokio::test]
    async fn test_aborted_add_reports_cancelled() {
        let transport = MockHttpTransport::new();

        // Current-thread runtime: the task cannot start before abort() runs.
        let task = updater(transport).add_label(ISSUE, "bug");
        task.abort();

        assert!(matches!(task.await, Err(LabelError::Cancelled)));
    }

    #[tokio::test]
    async fn test_remove_label_is_log_only() {
        let (logs, _guard) = capture_logs();
        // No expectations: any network call panics.
        let transport = MockHttpTransport::new();

        let removal = updater(transport).remove_label(ISSUE, "needs-triage");

        assert!(matches!(removal, Removal::Logged));
        assert!(removal.finish().await.is_none());
        assert_eq!(logs.lines().len(), 1);
        assert_eq!(logs.count("Remove label: needs-triage"), 1);
    }

    #[tokio::test]
    async fn test_remote_remove_sends_delete() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_delete()
            .withf(|url: &str| url == format!("{}/good%20first%20issue", LABELS))
            .times(1)
            .returning(|_| Ok(r#"[{"name":"bug"}]"#.to_string()));
        let updater = updater(transport).with_remove_policy(RemovePolicy::Remote);

        let removal = updater.remove_label(ISSUE, "good first issue");

        let result = removal.finish().await.expect("a DELETE was sent");
        assert_eq!(result.unwrap(), serde_json::json!([{ "name": "bug" }]));
    }

    #[tokio::test]
    async fn test_remote_remove_rejects_unparseable_issue() {
        let (logs, _guard) = capture_logs();
        let transport = MockHttpTransport::new();
        let updater = updater(transport).with_remove_policy(RemovePolicy::Remote);

        let result = updater.remove_label("not a url", "bug").finish().await;

        assert!(matches!(result, Some(Err(LabelError::InvalidUrl { .. }))));
        assert_eq!(logs.count(AUTH_HINT), 1);
    }

    #[tokio::test]
    async fn test_replace_label_end_to_end() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|url: &str, body: &str| url == LABELS && body == r#"{"labels":["in-progress"]}"#)
            .times(1)
            .returning(|_, _| {
                Ok(r#"[{"name":"in-progress"},{"name":"needs-triage"}]"#.to_string())
            });
        transport.expect_delete().times(0);

        let replacement = updater(transport).replace_label(ISSUE, "needs-triage", "in-progress");
        let (added, removed) = replacement.finish().await;

        assert!(added.is_ok());
        assert!(removed.is_none());

        let post = logs.position(&format!("post: {}", LABELS)).unwrap();
        let remove = logs.position("Remove label: needs-triage").unwrap();
        assert!(post < remove);
        assert_eq!(logs.count("Remove label"), 1);
    }

    #[tokio::test]
    async fn test_replace_label_does_not_roll_back_on_failure() {
        let (logs, _guard) = capture_logs();
        let mut transport = MockHttpTransport::new();
        transport.expect_post().returning(|_, _| {
            Err(LabelError::Api {
                status: 404,
                message: "Not Found".to_string(),
            })
        });

        let (added, removed) = updater(transport)
            .replace_label(ISSUE, "needs-triage", "in-progress")
            .finish()
            .await;

        assert!(added.is_err());
        assert!(removed.is_none());
        assert_eq!(logs.count("Remove label: needs-triage"), 1);
    }

    #[test]
    fn test_remove_policy_parse() {
        assert_eq!("remote".parse::<RemovePolicy>().unwrap(), RemovePolicy::Remote);
        assert_eq!("log-only".parse::<RemovePolicy>().unwrap(), RemovePolicy::LogOnly);
        assert!("sometimes".parse::<RemovePolicy>().is_err());
        assert_eq!(RemovePolicy::Remote.to_string(), "remote");
    }

    #[test]
    fn test_label_url_encoding() {
        assert_eq!(
            label_url(ISSUE, "type: bug/crash").unwrap(),
            format!("{}/type:%20bug%2Fcrash", LABELS)
        );
    }
}
