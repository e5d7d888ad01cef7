//! HTTP [`RepositorySource`] for the public repository-hosting API.
//!
//! Browser builds go through `gloo-net`, native builds through `reqwest`.
//! Both bound every request by the configured fetch timeout.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::RuntimeConfig;
use crate::repositories::{FetchError, Profile, Repository, RepositorySource};

const ACCEPT_HEADER: &str = "application/vnd.github+json";
#[cfg(not(target_arch = "wasm32"))]
const USER_AGENT: &str = "portfolio-site/0.1";

pub struct GithubApi {
    base_url: Url,
    user: String,
    timeout: Duration,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
}

impl GithubApi {
    #[cfg(target_arch = "wasm32")]
    pub fn new(config: &RuntimeConfig) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: config.api_base_url.clone(),
            user: config.github_user.clone(),
            timeout: config.fetch_timeout,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(config: &RuntimeConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| FetchError::Transport(error.to_string()))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            user: config.github_user.clone(),
            timeout: config.fetch_timeout,
            client,
        })
    }

    fn profile_url(&self) -> Result<Url, FetchError> {
        endpoint(&self.base_url, &["users", &self.user])
    }

    fn repositories_url(&self, limit: usize) -> Result<Url, FetchError> {
        let mut url = endpoint(&self.base_url, &["users", &self.user, "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", &limit.clamp(1, 100).to_string())
            .append_pair("type", "owner");
        Ok(url)
    }

    #[cfg(target_arch = "wasm32")]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        use futures_util::future::{select, Either};
        use gloo_net::http::Request;
        use gloo_timers::future::TimeoutFuture;

        let endpoint = url.path().to_string();
        let request_endpoint = endpoint.clone();
        let request = async move {
            let response = Request::get(url.as_str())
                .header("Accept", ACCEPT_HEADER)
                .send()
                .await
                .map_err(|error| FetchError::Transport(error.to_string()))?;

            if !response.ok() {
                return Err(FetchError::Status {
                    endpoint: request_endpoint,
                    status: response.status(),
                });
            }

            response
                .json::<T>()
                .await
                .map_err(|error| FetchError::Decode(error.to_string()))
        };
        let deadline = TimeoutFuture::new(self.timeout.as_millis().min(u128::from(u32::MAX)) as u32);

        match select(Box::pin(request), Box::pin(deadline)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(FetchError::Timeout { endpoint }),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let endpoint = url.path().to_string();
        let classify = |error: reqwest::Error| {
            if error.is_timeout() {
                FetchError::Timeout {
                    endpoint: endpoint.clone(),
                }
            } else {
                FetchError::Transport(error.to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify)?;
        serde_json::from_slice(&body).map_err(|error| FetchError::Decode(error.to_string()))
    }
}

impl RepositorySource for GithubApi {
    async fn profile(&self) -> Result<Profile, FetchError> {
        self.get_json(self.profile_url()?).await
    }

    async fn repositories(&self, limit: usize) -> Result<Vec<Repository>, FetchError> {
        self.get_json(self.repositories_url(limit)?).await
    }
}

fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_for(base: &str, user: &str) -> GithubApi {
        let config = RuntimeConfig::from_lookup(|key| match key {
            "PORTFOLIO_API_BASE_URL" => Some(base.to_string()),
            "PORTFOLIO_GITHUB_USER" => Some(user.to_string()),
            _ => None,
        });
        GithubApi::new(&config).expect("client builds")
    }

    #[test]
    fn profile_endpoint_appends_user_segment() {
        let api = api_for("https://api.github.com/", "octocat");
        assert_eq!(
            api.profile_url().map(String::from),
            Ok("https://api.github.com/users/octocat".to_string())
        );
    }

    #[test]
    fn repositories_endpoint_carries_listing_query() {
        let api = api_for("https://ghe.example.com/api/v3", "octocat");
        assert_eq!(
            api.repositories_url(50).map(String::from),
            Ok("https://ghe.example.com/api/v3/users/octocat/repos?sort=updated&per_page=50&type=owner".to_string())
        );
    }

    #[test]
    fn page_size_is_kept_within_api_limits() {
        let api = api_for("https://api.github.com/", "octocat");
        let url = api.repositories_url(500).map(String::from).unwrap_or_default();
        assert!(url.contains("per_page=100"));
    }

    #[test]
    fn user_names_are_percent_encoded() {
        let api = api_for("https://api.github.com/", "a b");
        assert_eq!(
            api.profile_url().map(String::from),
            Ok("https://api.github.com/users/a%20b".to_string())
        );
    }

    #[test]
    fn api_payloads_decode_with_missing_optionals() {
        let payload = r#"[{
            "id": 7,
            "name": "portfolio",
            "full_name": "octocat/portfolio",
            "description": null,
            "html_url": "https://github.com/octocat/portfolio",
            "homepage": "",
            "language": "Rust",
            "stargazers_count": 3,
            "forks_count": 1,
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": "2024-04-01T00:00:00Z",
            "size": 512,
            "default_branch": "main"
        }]"#;

        let repositories: Vec<Repository> = serde_json::from_str(payload).expect("payload decodes");
        assert_eq!(repositories[0].topics, Vec::<String>::new());
        assert_eq!(repositories[0].language.as_deref(), Some("Rust"));
        assert_eq!(repositories[0].updated_at.to_rfc3339(), "2024-04-01T00:00:00+00:00");

        let profile: Profile =
            serde_json::from_str(r#"{"login":"octocat","public_repos":8,"followers":3}"#).expect("profile decodes");
        assert_eq!(profile.public_repos, 8);
    }
}
