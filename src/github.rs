//! GitHub REST item fetching.
//!
//! Fetches the candidate set for one analysis run from
//! `GET /repos/{owner}/{repo}/issues`, which returns both issues and pull
//! requests; pull requests are recognized by their `pull_request` stub.
//! Every page request goes through the rate-limit guard in [`crate::retry`].
//!
//! The client is constructed per run and dependency-injected into the
//! pipeline; there is no shared module-scope instance.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::error::FetchError;
use crate::models::{Item, ItemState, ItemType};
use crate::retry::{with_retry, RetryPolicy};

const USER_AGENT: &str = concat!("issue-radar/", env!("CARGO_PKG_VERSION"));

/// Wire shape of an entry in the issues listing. The same shape comes back
/// from the single-issue endpoint.
#[derive(Debug, Deserialize)]
struct IssueJson {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    html_url: String,
    created_at: DateTime<Utc>,
    pull_request: Option<PullRequestStub>,
}

/// Marker object present only on pull requests in the issues listing.
#[derive(Debug, Deserialize)]
struct PullRequestStub {
    merged_at: Option<DateTime<Utc>>,
}

impl IssueJson {
    fn into_item(self) -> Item {
        let (item_type, state) = match &self.pull_request {
            Some(stub) => {
                let state = if stub.merged_at.is_some() {
                    ItemState::Merged
                } else if self.state == "closed" {
                    ItemState::Closed
                } else {
                    ItemState::Open
                };
                (ItemType::PullRequest, state)
            }
            None => {
                let state = if self.state == "closed" {
                    ItemState::Closed
                } else {
                    ItemState::Open
                };
                (ItemType::Issue, state)
            }
        };

        Item::new(
            self.number,
            self.title,
            self.body,
            state,
            item_type,
            self.created_at,
            self.html_url,
        )
    }
}

/// GitHub REST client for one analysis run.
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    per_page: usize,
    retry: RetryPolicy,
}

impl GithubClient {
    /// Build a client from config. The token is read from the environment
    /// variable named by `github.token_env` and is optional (unauthenticated
    /// requests work against public repositories at a lower rate limit).
    pub fn new(config: &GithubConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        let token = std::env::var(&config.token_env).ok().filter(|t| !t.is_empty());

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            per_page: config.per_page,
            retry: RetryPolicy {
                max_attempts: config.max_retries.max(1),
                ..RetryPolicy::default()
            },
        })
    }

    /// Fetch up to `max_items` items of `item_type` from `owner/repo`,
    /// newest first, across states (open, closed, merged).
    pub async fn fetch_items(
        &self,
        owner: &str,
        repo: &str,
        item_type: ItemType,
        max_items: usize,
    ) -> Result<Vec<Item>, FetchError> {
        let repository = format!("{}/{}", owner, repo);
        let mut items: Vec<Item> = Vec::new();
        let mut page = 1u32;

        while items.len() < max_items {
            let url = format!(
                "{}/repos/{}/{}/issues?state=all&per_page={}&page={}",
                self.api_url, owner, repo, self.per_page, page
            );

            let raw: Vec<IssueJson> = with_retry(self.retry, || {
                self.get_json(url.clone(), &repository)
            })
            .await?;

            let page_len = raw.len();
            for entry in raw {
                let item = entry.into_item();
                if item.item_type == item_type {
                    items.push(item);
                    if items.len() == max_items {
                        break;
                    }
                }
            }

            if page_len < self.per_page {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Fetch a single item by number. Used for single-target mode when the
    /// target falls outside the candidate window.
    pub async fn fetch_item(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Item, FetchError> {
        let repository = format!("{}/{}", owner, repo);
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_url, owner, repo, number
        );

        let raw: IssueJson = with_retry(self.retry, || async {
            match self.get_json::<IssueJson>(url.clone(), &repository).await {
                // The repository listing resolved earlier, so a 404 here
                // means the item itself is missing.
                Err(FetchError::RepositoryNotFound(_)) => Err(FetchError::TargetItemNotFound {
                    repository: repository.clone(),
                    number,
                }),
                other => other,
            }
        })
        .await?;

        Ok(raw.into_item())
    }

    /// One GET request with auth headers and status mapping.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        repository: &str,
    ) -> Result<T, FetchError> {
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        match status.as_u16() {
            404 => Err(FetchError::RepositoryNotFound(repository.to_string())),
            403 | 429 => {
                let reset_at = response
                    .headers()
                    .get("x-ratelimit-reset")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<i64>().ok());
                Err(FetchError::RateLimited { reset_at })
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(FetchError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_json(pull_request: Option<&str>, state: &str) -> IssueJson {
        let pr = pull_request.map(|merged_at| {
            serde_json::from_value::<PullRequestStub>(serde_json::json!({
                "merged_at": if merged_at.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(merged_at.to_string())
                }
            }))
            .unwrap()
        });
        IssueJson {
            number: 12,
            title: "A title".to_string(),
            body: Some("A body".to_string()),
            state: state.to_string(),
            html_url: "https://github.com/o/r/issues/12".to_string(),
            created_at: Utc::now(),
            pull_request: pr,
        }
    }

    #[test]
    fn plain_entry_maps_to_issue() {
        let item = issue_json(None, "open").into_item();
        assert_eq!(item.item_type, ItemType::Issue);
        assert_eq!(item.state, ItemState::Open);
    }

    #[test]
    fn closed_issue_maps_to_closed() {
        let item = issue_json(None, "closed").into_item();
        assert_eq!(item.state, ItemState::Closed);
    }

    #[test]
    fn pull_request_stub_maps_to_pr() {
        let item = issue_json(Some(""), "open").into_item();
        assert_eq!(item.item_type, ItemType::PullRequest);
        assert_eq!(item.state, ItemState::Open);
    }

    #[test]
    fn merged_at_wins_over_closed_state() {
        let item = issue_json(Some("2025-03-01T12:00:00Z"), "closed").into_item();
        assert_eq!(item.item_type, ItemType::PullRequest);
        assert_eq!(item.state, ItemState::Merged);
    }

    #[test]
    fn issue_listing_deserializes() {
        let json = serde_json::json!([{
            "number": 3,
            "title": "Crash on startup",
            "body": null,
            "state": "open",
            "html_url": "https://github.com/o/r/issues/3",
            "created_at": "2025-02-10T08:30:00Z",
            "labels": [{"name": "bug"}],
            "user": {"login": "someone"}
        }]);
        let parsed: Vec<IssueJson> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].number, 3);
        assert!(parsed[0].body.is_none());
        assert!(parsed[0].pull_request.is_none());
    }
}
