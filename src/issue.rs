//! Turning what the user typed into an issue URL for the REST API.

use std::sync::LazyLock;

use regex::Regex;

/// Base URL of the repository endpoints of the GitHub REST API.
pub const GITHUB_API_URL_BASE: &str = "https://api.github.com/repos/";

/// `owner/repo#42`
static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<owner>[\w.-]+)/(?P<repo>[\w.-]+)#(?P<number>\d+)$").expect("valid regex")
});

/// `https://github.com/owner/repo/issues/42` or `.../pull/42`
static HTML_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^https://github\.com/(?P<owner>[\w.-]+)/(?P<repo>[\w.-]+)",
        r"/(?:issues|pull)/(?P<number>\d+)/?$",
    ))
    .expect("valid regex")
});

/// Resolve an issue reference to its API URL.
///
/// Shorthands and browser URLs are expanded against `api_base`. Anything else is assumed to be
/// an API URL already and returned unchanged.
pub fn resolve_issue_url(api_base: &str, issue: &str) -> String {
    let issue = issue.trim();
    let caps = SHORTHAND
        .captures(issue)
        .or_else(|| HTML_URL.captures(issue));

    match caps {
        Some(caps) => format!(
            "{}/issues/{}",
            repo_url(api_base, &format!("{}/{}", &caps["owner"], &caps["repo"])),
            &caps["number"]
        ),
        None => issue.to_string(),
    }
}

/// API URL of a repository given as `owner/repo`.
pub fn repo_url(api_base: &str, repo: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        repo.trim_matches('/')
    )
}
