// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Tool arguments
//!
//! Each tool's JSON arguments are parsed into one variant of [`ToolCall`]
//! before anything is sent upstream. Unknown fields are rejected.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::error::{McpError, McpResult};

pub const GET_ACCOUNT: &str = "get_account";
pub const LIST_AD_UNITS: &str = "list_ad_units";
pub const LIST_APPS: &str = "list_apps";
pub const GENERATE_NETWORK_REPORT: &str = "generate_network_report";
pub const GENERATE_MEDIATION_REPORT: &str = "generate_mediation_report";

/// Every tool the server exposes
pub const TOOL_NAMES: &[&str] = &[
    GENERATE_MEDIATION_REPORT,
    GENERATE_NETWORK_REPORT,
    GET_ACCOUNT,
    LIST_AD_UNITS,
    LIST_APPS,
];

pub const NETWORK_DIMENSIONS: &[&str] = &[
    "DATE",
    "MONTH",
    "WEEK",
    "AD_UNIT",
    "APP",
    "AD_TYPE",
    "COUNTRY",
    "FORMAT",
    "PLATFORM",
    "MOBILE_OS_VERSION",
    "GMA_SDK_VERSION",
    "APP_VERSION_NAME",
    "SERVING_RESTRICTION",
];

pub const NETWORK_METRICS: &[&str] = &[
    "AD_REQUESTS",
    "CLICKS",
    "ESTIMATED_EARNINGS",
    "IMPRESSIONS",
    "IMPRESSION_CTR",
    "IMPRESSION_RPM",
    "MATCHED_REQUESTS",
    "MATCH_RATE",
    "SHOW_RATE",
];

pub const MEDIATION_DIMENSIONS: &[&str] = &[
    "DATE",
    "MONTH",
    "WEEK",
    "AD_SOURCE",
    "AD_SOURCE_INSTANCE",
    "AD_UNIT",
    "APP",
    "MEDIATION_GROUP",
    "COUNTRY",
    "FORMAT",
    "PLATFORM",
    "MOBILE_OS_VERSION",
    "GMA_SDK_VERSION",
    "APP_VERSION_NAME",
    "SERVING_RESTRICTION",
];

pub const MEDIATION_METRICS: &[&str] = &[
    "AD_REQUESTS",
    "CLICKS",
    "ESTIMATED_EARNINGS",
    "IMPRESSIONS",
    "IMPRESSION_CTR",
    "MATCHED_REQUESTS",
    "MATCH_RATE",
    "OBSERVED_ECPM",
];

pub const SORT_ORDERS: &[&str] = &["ASCENDING", "DESCENDING"];

/// Largest page the list endpoints accept
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Which reporting endpoint a report request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Network,
    Mediation,
}

impl ReportKind {
    pub fn dimensions(self) -> &'static [&'static str] {
        match self {
            Self::Network => NETWORK_DIMENSIONS,
            Self::Mediation => MEDIATION_DIMENSIONS,
        }
    }

    pub fn metrics(self) -> &'static [&'static str] {
        match self {
            Self::Network => NETWORK_METRICS,
            Self::Mediation => MEDIATION_METRICS,
        }
    }

    /// Method suffix appended to the account resource name
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Network => "networkReport:generate",
            Self::Mediation => "mediationReport:generate",
        }
    }
}

/// Arguments of `list_ad_units` and `list_apps`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ListArgs {
    pub page_size: Option<u32>,
}

/// `{dimension, values}` filter entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DimensionFilterArg {
    pub dimension: String,
    pub values: Vec<String>,
}

/// Sort by a dimension. Blank fields drop the sort silently.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DimensionSortArg {
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub order: String,
}

/// Sort by a metric. Blank fields drop the sort silently.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricSortArg {
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub order: String,
}

/// Arguments of both report tools
///
/// The required fields are optional here so a request missing several of
/// them can be rejected with one message naming all of them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ReportArgs {
    #[serde(default)]
    pub date_range_start: Option<String>,
    #[serde(default)]
    pub date_range_end: Option<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
    #[serde(default)]
    pub dimension_filters: Option<Vec<DimensionFilterArg>>,
    #[serde(default)]
    pub sort_by_dimension: Option<DimensionSortArg>,
    #[serde(default)]
    pub sort_by_metric: Option<MetricSortArg>,
    #[serde(default)]
    pub max_report_rows: Option<u32>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

/// A parsed tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetAccount,
    ListAdUnits(ListArgs),
    ListApps(ListArgs),
    GenerateNetworkReport(ReportArgs),
    GenerateMediationReport(ReportArgs),
}

impl ToolCall {
    /// Parse the arguments of the named tool
    pub fn parse(name: &str, arguments: HashMap<String, Value>) -> McpResult<Self> {
        let call = match name {
            GET_ACCOUNT => {
                let _: NoArgs = parse_args(name, arguments)?;
                Self::GetAccount
            }
            LIST_AD_UNITS => Self::ListAdUnits(parse_list_args(name, arguments)?),
            LIST_APPS => Self::ListApps(parse_list_args(name, arguments)?),
            GENERATE_NETWORK_REPORT => Self::GenerateNetworkReport(parse_args(name, arguments)?),
            GENERATE_MEDIATION_REPORT => {
                Self::GenerateMediationReport(parse_args(name, arguments)?)
            }
            other => return Err(McpError::ToolNotFound(other.to_string())),
        };
        Ok(call)
    }

    /// Name of the tool this call belongs to
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAccount => GET_ACCOUNT,
            Self::ListAdUnits(_) => LIST_AD_UNITS,
            Self::ListApps(_) => LIST_APPS,
            Self::GenerateNetworkReport(_) => GENERATE_NETWORK_REPORT,
            Self::GenerateMediationReport(_) => GENERATE_MEDIATION_REPORT,
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: HashMap<String, Value>) -> McpResult<T> {
    let object: serde_json::Map<String, Value> = arguments.into_iter().collect();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| McpError::validation(format!("Invalid arguments for {tool}: {e}")))
}

fn parse_list_args(tool: &str, arguments: HashMap<String, Value>) -> McpResult<ListArgs> {
    let args: ListArgs = parse_args(tool, arguments)?;
    if let Some(size) = args.page_size {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(McpError::validation(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_each_tool() {
        assert_eq!(
            ToolCall::parse(GET_ACCOUNT, HashMap::new()).unwrap(),
            ToolCall::GetAccount
        );
        assert_eq!(
            ToolCall::parse(LIST_APPS, args(json!({"pageSize": 50}))).unwrap(),
            ToolCall::ListApps(ListArgs {
                page_size: Some(50)
            })
        );

        let report = ToolCall::parse(
            GENERATE_MEDIATION_REPORT,
            args(json!({
                "dateRangeStart": "2024-01-01",
                "dateRangeEnd": "2024-01-07",
                "metrics": ["CLICKS"],
                "sortByMetric": {"metric": "CLICKS", "order": "DESCENDING"}
            })),
        )
        .unwrap();
        match report {
            ToolCall::GenerateMediationReport(ref r) => {
                assert_eq!(r.date_range_start.as_deref(), Some("2024-01-01"));
                assert_eq!(r.sort_by_metric.as_ref().unwrap().order, "DESCENDING");
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(report.name(), GENERATE_MEDIATION_REPORT);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = ToolCall::parse(GET_ACCOUNT, args(json!({"verbose": true}))).unwrap_err();
        assert!(matches!(err, McpError::Validation(_)));

        let err = ToolCall::parse(
            GENERATE_NETWORK_REPORT,
            args(json!({"dateRangeStart": "2024-01-01", "colour": "blue"})),
        )
        .unwrap_err();
        assert!(matches!(err, McpError::Validation(ref msg) if msg.contains("colour")));
    }

    #[test]
    fn test_page_size_bounds() {
        for bad in [0, MAX_PAGE_SIZE + 1] {
            let err = ToolCall::parse(LIST_AD_UNITS, args(json!({"pageSize": bad}))).unwrap_err();
            assert!(matches!(err, McpError::Validation(_)));
        }
        assert!(ToolCall::parse(LIST_AD_UNITS, args(json!({"pageSize": MAX_PAGE_SIZE}))).is_ok());
    }

    #[test]
    fn test_unknown_tool() {
        let err = ToolCall::parse("delete_account", HashMap::new()).unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound(_)));
    }
}
