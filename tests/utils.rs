use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use garden::LabelError;
use garden::clients::github_curl::HttpTransport;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer as _;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// A request seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

enum Reply {
    Body(String),
    Status(u16, String),
}

/// Transport that records every request and answers from canned replies.
///
/// Unknown URLs answer `[]` with a 200.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<Request>>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next request to `url` with a 200 and `body`.
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.push(url, Reply::Body(body.to_string()));
        self
    }

    /// Answer the next request to `url` with an error status.
    pub fn with_status(self, url: &str, status: u16, message: &str) -> Self {
        self.push(url, Reply::Status(status, message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, url: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<&str>,
    ) -> Result<String, LabelError> {
        self.requests.lock().unwrap().push(Request {
            method,
            url: url.to_string(),
            body: body.map(str::to_string),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match reply {
            None => Ok("[]".to_string()),
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status, message)) => Err(LabelError::Api { status, message }),
        }
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn get(&self, url: &str) -> Result<String, LabelError> {
        self.answer("GET", url, None)
    }

    async fn post(&self, url: &str, json_data: &str) -> Result<String, LabelError> {
        self.answer("POST", url, Some(json_data))
    }

    async fn delete(&self, url: &str) -> Result<String, LabelError> {
        self.answer("DELETE", url, None)
    }
}

pub fn setup_logging() -> anyhow::Result<()> {
    let timer = tracing_subscriber::fmt::time::ChronoLocal::new("%H:%M:%S%.3f".into());
    let format = tracing_subscriber::fmt::format().with_timer(timer);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let subscriber = tracing_subscriber::fmt::layer()
        .event_format(format)
        .with_test_writer()
        .with_filter(filter);
    tracing_subscriber::registry().with(subscriber).init();
    Ok(())
}
