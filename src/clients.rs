//! Clients for the external systems `garden` talks to.
//!
//! - [`github_curl`]: the [`github_curl::HttpTransport`] seam and its curl-based implementation
//!   for the GitHub REST API

pub mod github_curl;
