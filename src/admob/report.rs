// Copyright (c) 2025 MCP Rust Contributors
// SPDX-License-Identifier: MIT

//! Report specification
//!
//! Turns validated [`ReportArgs`] into the nested `reportSpec` object the
//! AdMob reporting endpoints expect. Optional keys are left out entirely
//! when the caller did not supply them.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::admob::args::{ReportArgs, ReportKind, SORT_ORDERS};
use crate::core::error::{McpError, McpResult};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StringList {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub dimension: String,
    pub matches_any: StringList,
}

/// One sort entry; exactly one of `dimension` or `metric` is set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SortCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    pub order: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// `reportSpec` body shared by network and mediation reports
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSpec {
    pub date_range: DateRange,
    pub metrics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filters: Option<Vec<DimensionFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_conditions: Option<Vec<SortCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localization_settings: Option<LocalizationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_report_rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl ReportSpec {
    /// Validate the arguments and build the spec for the given report kind
    pub fn build(kind: ReportKind, args: &ReportArgs) -> McpResult<Self> {
        let start = non_blank(&args.date_range_start);
        let end = non_blank(&args.date_range_end);
        let metrics = args.metrics.as_ref().filter(|m| !m.is_empty());

        let mut missing = Vec::new();
        if start.is_none() {
            missing.push("dateRangeStart");
        }
        if end.is_none() {
            missing.push("dateRangeEnd");
        }
        if metrics.is_none() {
            missing.push("metrics");
        }
        let (Some(start), Some(end), Some(metrics)) = (start, end, metrics) else {
            return Err(McpError::validation(format!(
                "Missing required arguments: {}",
                missing.join(", ")
            )));
        };

        let start = parse_date("dateRangeStart", start)?;
        let end = parse_date("dateRangeEnd", end)?;
        if start > end {
            return Err(McpError::validation(format!(
                "dateRangeStart ({start}) is after dateRangeEnd ({end})"
            )));
        }

        check_names("metric", metrics, kind.metrics())?;

        let dimensions = match args.dimensions {
            Some(ref dims) if !dims.is_empty() => {
                check_names("dimension", dims, kind.dimensions())?;
                Some(dims.clone())
            }
            _ => None,
        };

        let dimension_filters = match args.dimension_filters {
            Some(ref filters) if !filters.is_empty() => {
                let mut out = Vec::with_capacity(filters.len());
                for filter in filters {
                    check_names(
                        "dimension",
                        std::slice::from_ref(&filter.dimension),
                        kind.dimensions(),
                    )?;
                    if filter.values.is_empty() {
                        return Err(McpError::validation(format!(
                            "dimensionFilters entry for {} has no values",
                            filter.dimension
                        )));
                    }
                    out.push(DimensionFilter {
                        dimension: filter.dimension.clone(),
                        matches_any: StringList {
                            values: filter.values.clone(),
                        },
                    });
                }
                Some(out)
            }
            _ => None,
        };

        let mut sort_conditions = Vec::new();
        if let Some(ref sort) = args.sort_by_dimension {
            if !sort.dimension.is_empty() && !sort.order.is_empty() {
                check_names("dimension", std::slice::from_ref(&sort.dimension), kind.dimensions())?;
                check_order(&sort.order)?;
                sort_conditions.push(SortCondition {
                    dimension: Some(sort.dimension.clone()),
                    metric: None,
                    order: sort.order.clone(),
                });
            }
        }
        if let Some(ref sort) = args.sort_by_metric {
            if !sort.metric.is_empty() && !sort.order.is_empty() {
                check_names("metric", std::slice::from_ref(&sort.metric), kind.metrics())?;
                check_order(&sort.order)?;
                sort_conditions.push(SortCondition {
                    dimension: None,
                    metric: Some(sort.metric.clone()),
                    order: sort.order.clone(),
                });
            }
        }

        let currency_code = non_blank(&args.currency_code).map(str::to_string);
        let language_code = non_blank(&args.language_code).map(str::to_string);
        let localization_settings = (currency_code.is_some() || language_code.is_some()).then(|| {
            LocalizationSettings {
                currency_code,
                language_code,
            }
        });

        if args.max_report_rows == Some(0) {
            return Err(McpError::validation("maxReportRows must be at least 1"));
        }

        Ok(Self {
            date_range: DateRange {
                start_date: start.into(),
                end_date: end.into(),
            },
            metrics: metrics.clone(),
            dimensions,
            dimension_filters,
            sort_conditions: (!sort_conditions.is_empty()).then_some(sort_conditions),
            localization_settings,
            max_report_rows: args.max_report_rows,
            time_zone: non_blank(&args.time_zone).map(str::to_string),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: &str) -> McpResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        McpError::validation(format!("{field} must be a YYYY-MM-DD date, got '{value}'"))
    })
}

fn check_names(kind: &str, names: &[String], allowed: &[&str]) -> McpResult<()> {
    for name in names {
        if !allowed.contains(&name.as_str()) {
            return Err(McpError::validation(format!(
                "Unknown {kind} '{name}'; expected one of {}",
                allowed.join(", ")
            )));
        }
    }
    Ok(())
}

fn check_order(order: &str) -> McpResult<()> {
    if SORT_ORDERS.contains(&order) {
        Ok(())
    } else {
        Err(McpError::validation(format!(
            "Sort order must be ASCENDING or DESCENDING, got '{order}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admob::args::{DimensionFilterArg, DimensionSortArg, MetricSortArg};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn minimal() -> ReportArgs {
        ReportArgs {
            date_range_start: Some("2024-01-01".to_string()),
            date_range_end: Some("2024-01-07".to_string()),
            metrics: Some(vec!["CLICKS".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_spec_has_no_optional_keys() {
        let spec = ReportSpec::build(ReportKind::Network, &minimal()).unwrap();
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "dateRange": {
                    "startDate": {"year": 2024, "month": 1, "day": 1},
                    "endDate": {"year": 2024, "month": 1, "day": 7}
                },
                "metrics": ["CLICKS"]
            })
        );
    }

    #[test]
    fn test_filters_keep_order() {
        let args = ReportArgs {
            dimensions: Some(vec!["APP".to_string(), "COUNTRY".to_string()]),
            dimension_filters: Some(vec![
                DimensionFilterArg {
                    dimension: "COUNTRY".to_string(),
                    values: vec!["US".to_string(), "CA".to_string()],
                },
                DimensionFilterArg {
                    dimension: "PLATFORM".to_string(),
                    values: vec!["Android".to_string()],
                },
            ]),
            ..minimal()
        };
        let value = serde_json::to_value(ReportSpec::build(ReportKind::Network, &args).unwrap()).unwrap();
        assert_eq!(value["dimensions"], json!(["APP", "COUNTRY"]));
        assert_eq!(
            value["dimensionFilters"],
            json!([
                {"dimension": "COUNTRY", "matchesAny": {"values": ["US", "CA"]}},
                {"dimension": "PLATFORM", "matchesAny": {"values": ["Android"]}}
            ])
        );
    }

    #[test]
    fn test_sort_conditions() {
        let both = ReportArgs {
            sort_by_metric: Some(MetricSortArg {
                metric: "CLICKS".to_string(),
                order: "DESCENDING".to_string(),
            }),
            sort_by_dimension: Some(DimensionSortArg {
                dimension: "DATE".to_string(),
                order: "ASCENDING".to_string(),
            }),
            ..minimal()
        };
        let value = serde_json::to_value(ReportSpec::build(ReportKind::Network, &both).unwrap()).unwrap();
        assert_eq!(
            value["sortConditions"],
            json!([
                {"dimension": "DATE", "order": "ASCENDING"},
                {"metric": "CLICKS", "order": "DESCENDING"}
            ])
        );

        let blank = ReportArgs {
            sort_by_dimension: Some(DimensionSortArg {
                dimension: "DATE".to_string(),
                order: String::new(),
            }),
            sort_by_metric: Some(MetricSortArg::default()),
            ..minimal()
        };
        let value = serde_json::to_value(ReportSpec::build(ReportKind::Network, &blank).unwrap()).unwrap();
        assert!(value.get("sortConditions").is_none());
    }

    #[test]
    fn test_missing_fields_listed_together() {
        let err = ReportSpec::build(
            ReportKind::Mediation,
            &ReportArgs {
                date_range_end: Some("2024-01-07".to_string()),
                metrics: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Missing required arguments: dateRangeStart, metrics"
        );
    }

    #[test]
    fn test_date_validation() {
        let bad_format = ReportArgs {
            date_range_start: Some("01/01/2024".to_string()),
            ..minimal()
        };
        assert!(ReportSpec::build(ReportKind::Network, &bad_format).is_err());

        let reversed = ReportArgs {
            date_range_start: Some("2024-02-01".to_string()),
            ..minimal()
        };
        let err = ReportSpec::build(ReportKind::Network, &reversed).unwrap_err();
        assert!(err.to_string().contains("is after"));
    }

    #[test]
    fn test_names_checked_per_report_kind() {
        let ecpm = ReportArgs {
            metrics: Some(vec!["OBSERVED_ECPM".to_string()]),
            dimensions: Some(vec!["AD_SOURCE".to_string()]),
            ..minimal()
        };
        assert!(ReportSpec::build(ReportKind::Mediation, &ecpm).is_ok());
        assert!(ReportSpec::build(ReportKind::Network, &ecpm).is_err());

        let bad_order = ReportArgs {
            sort_by_metric: Some(MetricSortArg {
                metric: "CLICKS".to_string(),
                order: "UP".to_string(),
            }),
            ..minimal()
        };
        assert!(ReportSpec::build(ReportKind::Network, &bad_order).is_err());
    }

    #[test]
    fn test_localization_and_limits() {
        let args = ReportArgs {
            currency_code: Some("EUR".to_string()),
            max_report_rows: Some(500),
            time_zone: Some("America/Los_Angeles".to_string()),
            ..minimal()
        };
        let value = serde_json::to_value(ReportSpec::build(ReportKind::Network, &args).unwrap()).unwrap();
        assert_eq!(value["localizationSettings"], json!({"currencyCode": "EUR"}));
        assert_eq!(value["maxReportRows"], 500);
        assert_eq!(value["timeZone"], "America/Los_Angeles");
    }
}
