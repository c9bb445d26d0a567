// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! AdMob tools
//!
//! Tool descriptors, the dispatcher that executes a parsed [`ToolCall`]
//! against the AdMob API, and the glue that registers all five tools on an
//! [`McpServer`].
//!
//! Every call re-reads the credential store, so a fresh `admob-mcp auth`
//! takes effect without restarting the server.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::admob::args::*;
use crate::admob::client::{AdMobApi, AdMobClient};
use crate::admob::pagination::collect_pages;
use crate::admob::report::ReportSpec;
use crate::auth::client_secret::DEFAULT_TOKEN_URI;
use crate::auth::store::{AuthorizedClient, CredentialStore};
use crate::config::Config;
use crate::core::error::{McpError, McpResult};
use crate::core::tool::ToolHandler;
use crate::protocol::types::{ToolAnnotations, ToolInfo, ToolInputSchema, ToolResult};
use crate::server::McpServer;

/// Fields of the account resource returned by `get_account`
const ACCOUNT_FIELDS: &[&str] = &["name", "publisherId", "reportingTimeZone", "currencyCode"];

/// Executes AdMob tool calls
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    config: Arc<Config>,
    store: CredentialStore,
    http: Client,
}

impl ToolDispatcher {
    pub fn new(config: Arc<Config>) -> McpResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| McpError::internal(format!("Failed to build HTTP client: {e}")))?;
        let store = CredentialStore::new(&config.credentials_dir);
        Ok(Self {
            config,
            store,
            http,
        })
    }

    /// Run one tool call end to end.
    ///
    /// Failures the caller can act on come back as an error result; only an
    /// unknown tool name is returned as `Err`.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: HashMap<String, Value>,
    ) -> McpResult<ToolResult> {
        match self.try_dispatch(name, arguments).await {
            Ok(text) => Ok(ToolResult::text(text)),
            Err(error) if error.is_tool_error() => {
                tracing::warn!(tool = %name, category = error.category(), "Tool call failed: {}", error);
                Ok(ToolResult::error(error.to_string()))
            }
            Err(error) => Err(error),
        }
    }

    async fn try_dispatch(&self, name: &str, arguments: HashMap<String, Value>) -> McpResult<String> {
        if !TOOL_NAMES.contains(&name) {
            return Err(McpError::ToolNotFound(name.to_string()));
        }

        let publisher = self
            .config
            .publisher_code
            .as_deref()
            .ok_or_else(|| McpError::config("PUBLISHER_CODE is not set"))?;

        let credential = self.store.load().ok_or_else(|| {
            McpError::NotAuthenticated(
                "no stored credential found. Run `admob-mcp auth` to authorize.".to_string(),
            )
        })?;

        let call = ToolCall::parse(name, arguments)?;

        let token_uri = self
            .config
            .token_uri_override
            .as_deref()
            .unwrap_or(DEFAULT_TOKEN_URI);
        let authorized = AuthorizedClient::new(credential, token_uri, self.http.clone());
        let access_token = authorized.access_token().await?;
        let api = AdMobClient::new(self.http.clone(), &self.config.api_base_url, access_token)?;

        let value = execute(&api, publisher, call).await?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// Execute a parsed call against an API implementation
pub async fn execute(api: &dyn AdMobApi, publisher: &str, call: ToolCall) -> McpResult<Value> {
    tracing::debug!(tool = call.name(), "Executing AdMob call");

    match call {
        ToolCall::GetAccount => {
            let account = api.get_account(publisher).await?;
            Ok(project(&account, ACCOUNT_FIELDS))
        }
        ToolCall::ListAdUnits(args) => {
            let units = collect_pages(|token| api.list_ad_units(publisher, args.page_size, token)).await?;
            Ok(Value::Array(units))
        }
        ToolCall::ListApps(args) => {
            let apps = collect_pages(|token| api.list_apps(publisher, args.page_size, token)).await?;
            Ok(Value::Array(apps))
        }
        ToolCall::GenerateNetworkReport(args) => {
            let spec = ReportSpec::build(ReportKind::Network, &args)?;
            api.generate_report(publisher, ReportKind::Network, &spec).await
        }
        ToolCall::GenerateMediationReport(args) => {
            let spec = ReportSpec::build(ReportKind::Mediation, &args)?;
            api.generate_report(publisher, ReportKind::Mediation, &spec).await
        }
    }
}

fn project(value: &Value, fields: &[&str]) -> Value {
    let projected = fields
        .iter()
        .filter_map(|field| value.get(*field).map(|v| (field.to_string(), v.clone())))
        .collect();
    Value::Object(projected)
}

// ============================================================================
// Tool descriptors
// ============================================================================

fn list_schema(what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "pageSize": {
                "type": "integer",
                "minimum": 1,
                "maximum": MAX_PAGE_SIZE,
                "description": format!("Number of {what} requested per page; all pages are fetched")
            }
        },
        "additionalProperties": false
    })
}

fn report_schema(kind: ReportKind) -> Value {
    let date = |description: &str| {
        json!({
            "type": "string",
            "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
            "description": description
        })
    };
    let order = json!({"type": "string", "enum": SORT_ORDERS});

    json!({
        "type": "object",
        "properties": {
            "dateRangeStart": date("First day of the report, YYYY-MM-DD"),
            "dateRangeEnd": date("Last day of the report (inclusive), YYYY-MM-DD"),
            "metrics": {
                "type": "array",
                "items": {"type": "string", "enum": kind.metrics()},
                "minItems": 1
            },
            "dimensions": {
                "type": "array",
                "items": {"type": "string", "enum": kind.dimensions()}
            },
            "dimensionFilters": {
                "type": "array",
                "description": "Keep rows whose dimension matches any of the values",
                "items": {
                    "type": "object",
                    "properties": {
                        "dimension": {"type": "string", "enum": kind.dimensions()},
                        "values": {"type": "array", "items": {"type": "string"}, "minItems": 1}
                    },
                    "required": ["dimension", "values"],
                    "additionalProperties": false
                }
            },
            "sortByDimension": {
                "type": "object",
                "properties": {
                    "dimension": {"type": "string", "enum": kind.dimensions()},
                    "order": order
                },
                "additionalProperties": false
            },
            "sortByMetric": {
                "type": "object",
                "properties": {
                    "metric": {"type": "string", "enum": kind.metrics()},
                    "order": order
                },
                "additionalProperties": false
            },
            "maxReportRows": {"type": "integer", "minimum": 1},
            "currencyCode": {"type": "string", "description": "ISO 4217 currency for earnings, e.g. USD"},
            "languageCode": {"type": "string", "description": "Language for localized names, e.g. en-US"},
            "timeZone": {"type": "string", "description": "IANA time zone, e.g. America/Los_Angeles"}
        },
        "required": ["dateRangeStart", "dateRangeEnd", "metrics"],
        "additionalProperties": false
    })
}

fn descriptor(name: &str, title: &str, description: &str, schema: Value) -> ToolInfo {
    ToolInfo {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: ToolInputSchema::from_json(schema),
        annotations: Some(ToolAnnotations::read_only_remote(title)),
    }
}

/// Descriptors of every AdMob tool
pub fn tool_definitions() -> Vec<ToolInfo> {
    vec![
        descriptor(
            GET_ACCOUNT,
            "Get AdMob account",
            "Get the AdMob publisher account: name, publisher ID, reporting time zone and currency.",
            json!({"type": "object", "properties": {}, "additionalProperties": false}),
        ),
        descriptor(
            LIST_AD_UNITS,
            "List ad units",
            "List every ad unit under the AdMob account.",
            list_schema("ad units"),
        ),
        descriptor(
            LIST_APPS,
            "List apps",
            "List every app under the AdMob account.",
            list_schema("apps"),
        ),
        descriptor(
            GENERATE_NETWORK_REPORT,
            "Generate network report",
            "Generate an AdMob Network report for a date range, metrics and optional dimensions, filters and sorting.",
            report_schema(ReportKind::Network),
        ),
        descriptor(
            GENERATE_MEDIATION_REPORT,
            "Generate mediation report",
            "Generate an AdMob Mediation report for a date range, metrics and optional dimensions, filters and sorting.",
            report_schema(ReportKind::Mediation),
        ),
    ]
}

// ============================================================================
// Registration
// ============================================================================

/// Tool handler that forwards to the shared dispatcher
struct AdMobTool {
    name: &'static str,
    dispatcher: Arc<ToolDispatcher>,
}

#[async_trait]
impl ToolHandler for AdMobTool {
    async fn call(&self, arguments: HashMap<String, Value>) -> McpResult<ToolResult> {
        self.dispatcher.dispatch(self.name, arguments).await
    }
}

/// Register all AdMob tools on the server
pub async fn register_tools(server: &McpServer, dispatcher: Arc<ToolDispatcher>) -> McpResult<()> {
    for info in tool_definitions() {
        let name = TOOL_NAMES
            .iter()
            .copied()
            .find(|n| *n == info.name)
            .ok_or_else(|| McpError::internal(format!("No handler for tool {}", info.name)))?;
        server
            .add_tool(
                info,
                AdMobTool {
                    name,
                    dispatcher: Arc::clone(&dispatcher),
                },
            )
            .await?;
    }
    Ok(())
}
