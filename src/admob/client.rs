// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! AdMob REST client
//!
//! [`AdMobApi`] is the seam the dispatcher talks through; [`AdMobClient`]
//! implements it over `reqwest` with a bearer access token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::admob::args::ReportKind;
use crate::admob::pagination::Page;
use crate::admob::report::ReportSpec;
use crate::core::error::{McpError, McpResult};

/// Operations the tools need from the AdMob API
#[async_trait]
pub trait AdMobApi: Send + Sync {
    /// `GET accounts/{publisher}`
    async fn get_account(&self, publisher: &str) -> McpResult<Value>;

    /// `GET accounts/{publisher}/adUnits`, one page
    async fn list_ad_units(
        &self,
        publisher: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> McpResult<Page<Value>>;

    /// `GET accounts/{publisher}/apps`, one page
    async fn list_apps(
        &self,
        publisher: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> McpResult<Page<Value>>;

    /// `POST accounts/{publisher}/{networkReport|mediationReport}:generate`
    async fn generate_report(
        &self,
        publisher: &str,
        kind: ReportKind,
        spec: &ReportSpec,
    ) -> McpResult<Value>;
}

/// Resource name of the account, accepting either `pub-…` or `accounts/pub-…`
pub fn account_name(publisher: &str) -> String {
    if publisher.starts_with("accounts/") {
        publisher.to_string()
    } else {
        format!("accounts/{publisher}")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAdUnitsResponse {
    #[serde(default)]
    ad_units: Vec<Value>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAppsResponse {
    #[serde(default)]
    apps: Vec<Value>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
}

/// `reqwest` implementation of [`AdMobApi`]
#[derive(Debug, Clone)]
pub struct AdMobClient {
    http: Client,
    base_url: Url,
    access_token: String,
}

impl AdMobClient {
    pub fn new(http: Client, base_url: &str, access_token: impl Into<String>) -> McpResult<Self> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            access_token: access_token.into(),
        })
    }

    fn url(&self, path: &str) -> McpResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> McpResult<T> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), "AdMob API request failed");
            return Err(McpError::upstream(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }

    async fn list_page<T: DeserializeOwned>(
        &self,
        publisher: &str,
        collection: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> McpResult<T> {
        let mut request = self
            .http
            .get(self.url(&format!("{}/{collection}", account_name(publisher)))?);
        if let Some(size) = page_size {
            request = request.query(&[("pageSize", size.to_string())]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        self.send(request).await
    }
}

#[async_trait]
impl AdMobApi for AdMobClient {
    async fn get_account(&self, publisher: &str) -> McpResult<Value> {
        let request = self.http.get(self.url(&account_name(publisher))?);
        self.send(request).await
    }

    async fn list_ad_units(
        &self,
        publisher: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> McpResult<Page<Value>> {
        let response: ListAdUnitsResponse = self
            .list_page(publisher, "adUnits", page_size, page_token)
            .await?;
        Ok(Page {
            items: response.ad_units,
            next_page_token: response.next_page_token,
        })
    }

    async fn list_apps(
        &self,
        publisher: &str,
        page_size: Option<u32>,
        page_token: Option<String>,
    ) -> McpResult<Page<Value>> {
        let response: ListAppsResponse = self
            .list_page(publisher, "apps", page_size, page_token)
            .await?;
        Ok(Page {
            items: response.apps,
            next_page_token: response.next_page_token,
        })
    }

    async fn generate_report(
        &self,
        publisher: &str,
        kind: ReportKind,
        spec: &ReportSpec,
    ) -> McpResult<Value> {
        let url = self.url(&format!("{}/{}", account_name(publisher), kind.endpoint()))?;
        let request = self.http.post(url).json(&json!({ "reportSpec": spec }));
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_account_name() {
        assert_eq!(account_name("pub-1"), "accounts/pub-1");
        assert_eq!(account_name("accounts/pub-1"), "accounts/pub-1");
    }

    async fn client_for(server: &MockServer) -> AdMobClient {
        AdMobClient::new(Client::new(), &format!("{}/v1/", server.uri()), "token").unwrap()
    }

    #[tokio::test]
    async fn test_list_page_forwards_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts/pub-1/apps"))
            .and(query_param("pageSize", "2"))
            .and(query_param("pageToken", "t1"))
            .and(header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apps": [{"appId": "a"}, {"appId": "b"}],
                "nextPageToken": "t2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .await
            .list_apps("pub-1", Some(2), Some("t1".to_string()))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("t2"));
    }

    #[tokio::test]
    async fn test_error_message_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts/pub-1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "The caller does not have permission",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_account("pub-1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "AdMob API error (status 403): The caller does not have permission"
        );
    }

    #[tokio::test]
    async fn test_raw_body_used_when_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_account("pub-1").await.unwrap_err();
        assert!(matches!(err, McpError::Upstream { status: 502, ref message } if message == "Bad Gateway"));
    }
}
