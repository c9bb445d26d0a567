//! Canned prompts
//!
//! Two templates that steer an agent towards the AdMob tools. The only
//! substitution is the app identifier of `admob_app_analysis`; required
//! arguments are enforced by [`crate::core::prompt::Prompt::get`].

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::error::{McpError, McpResult};
use crate::core::prompt::PromptHandler;
use crate::protocol::types::{PromptArgument, PromptInfo, PromptMessage, PromptResult};
use crate::server::McpServer;

pub const PERFORMANCE_OVERVIEW: &str = "admob_performance_overview";
pub const APP_ANALYSIS: &str = "admob_app_analysis";

const PERFORMANCE_OVERVIEW_TEXT: &str = "\
Give me an overview of my AdMob performance over the last 7 days.

Use the generate_network_report tool with the DATE and APP dimensions and the \
ESTIMATED_EARNINGS, IMPRESSIONS, CLICKS, IMPRESSION_CTR and IMPRESSION_RPM metrics. \
Summarize total earnings, the best and worst performing apps, and any notable \
day-over-day changes.";

struct PerformanceOverview;

#[async_trait]
impl PromptHandler for PerformanceOverview {
    async fn get(&self, _arguments: HashMap<String, String>) -> McpResult<PromptResult> {
        Ok(PromptResult {
            description: Some("AdMob performance over the last 7 days".to_string()),
            messages: vec![PromptMessage::user_text(PERFORMANCE_OVERVIEW_TEXT)],
        })
    }
}

struct AppAnalysis;

#[async_trait]
impl PromptHandler for AppAnalysis {
    async fn get(&self, arguments: HashMap<String, String>) -> McpResult<PromptResult> {
        let app_id = arguments
            .get("app_id")
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| McpError::validation("app_id is required"))?;

        let text = format!(
            "Analyze the AdMob performance of the app {app_id}.\n\n\
             First call list_apps to confirm the app exists. Then generate a network \
             report for the last 30 days filtered to APP = {app_id}, broken down by DATE \
             and FORMAT, and a mediation report for the same period broken down by \
             AD_SOURCE. Explain earnings trends, which ad formats and ad sources \
             contribute most, and suggest concrete optimizations."
        );

        Ok(PromptResult {
            description: Some(format!("Performance analysis for app {app_id}")),
            messages: vec![PromptMessage::user_text(text)],
        })
    }
}

/// Descriptors of both prompts
pub fn prompt_definitions() -> Vec<PromptInfo> {
    vec![
        PromptInfo {
            name: PERFORMANCE_OVERVIEW.to_string(),
            description: Some("Summarize AdMob earnings and traffic for the last 7 days".to_string()),
            arguments: None,
        },
        PromptInfo {
            name: APP_ANALYSIS.to_string(),
            description: Some("Analyze one app across network and mediation reports".to_string()),
            arguments: Some(vec![PromptArgument {
                name: "app_id".to_string(),
                description: Some("AdMob app ID, e.g. ca-app-pub-1234567890123456~1234567890".to_string()),
                required: Some(true),
            }]),
        },
    ]
}

/// Register both prompts on the server
pub async fn register_prompts(server: &McpServer) -> McpResult<()> {
    for info in prompt_definitions() {
        if info.name == APP_ANALYSIS {
            server.add_prompt(info, AppAnalysis).await?;
        } else {
            server.add_prompt(info, PerformanceOverview).await?;
        }
    }
    Ok(())
}
