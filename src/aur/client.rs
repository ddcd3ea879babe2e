use crate::config::DEFAULT_AUR_URL;
use crate::retry::{check_retryable, with_retry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::types::{SearchResponse, SearchResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

pub struct AurClient {
    client: Client,
    base_url: String,
}

impl AurClient {
    #[tracing::instrument(skip(client, base_url))]
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_AUR_URL.to_string());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchIndex for AurClient {
    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/rpc/", self.base_url);
        debug!("Searching {} for '{}'...", url, query);

        let response: SearchResponse = with_retry("Searching the package index", || {
            let client = self.client.clone();
            let url = url.clone();
            let query = query.to_string();
            async move {
                let response = client
                    .get(&url)
                    .query(&[("v", "5"), ("type", "search"), ("arg", query.as_str())])
                    .send()
                    .await
                    .context("Failed to send request to the package index")?;

                let response = response.error_for_status().map_err(check_retryable)?;

                response
                    .json::<SearchResponse>()
                    .await
                    .context("Failed to parse JSON response from the package index")
            }
        })
        .await?;

        let mut results = response.results;
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }
}

/// Build the HTTP client used against the package index.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent("aursmith")
        .build()
        .context("Failed to build the HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_search_parses_and_sorts_results() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rpc/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("v".into(), "5".into()),
                Matcher::UrlEncoded("type".into(), "search".into()),
                Matcher::UrlEncoded("arg".into(), "foo".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "resultcount": 2,
                    "results": [
                        {"Name": "zeta-foo", "Version": "2.0-1", "NumVotes": 3, "Description": "later"},
                        {"Name": "alpha-foo", "Version": "1.0-1", "NumVotes": 7, "Description": "earlier"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = AurClient::new(Client::new(), Some(server.url()));
        let results = client.search("foo").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "alpha-foo");
        assert_eq!(results[1].name, "zeta-foo");
    }

    #[tokio::test]
    async fn test_search_not_found_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rpc/")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = AurClient::new(Client::new(), Some(server.url()));
        assert!(client.search("foo").await.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = AurClient::new(Client::new(), Some("https://aur.example.org/".into()));
        assert_eq!(client.base_url, "https://aur.example.org");
    }

    #[test]
    fn test_default_base_url() {
        let client = AurClient::new(Client::new(), None);
        assert_eq!(client.base_url, DEFAULT_AUR_URL);
    }
}
