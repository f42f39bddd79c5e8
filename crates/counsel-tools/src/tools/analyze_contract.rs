//! Forwards contract text to an external analysis service.

use async_trait::async_trait;
use counsel_core::{Tool, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::http::{build_client, send_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeContractArgs {
    pub contract_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

pub struct AnalyzeContractTool {
    client: reqwest::Client,
    endpoint: String,
}

impl AnalyzeContractTool {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Tool for AnalyzeContractTool {
    fn name(&self) -> &str {
        "analyzeContract"
    }

    fn description(&self) -> &str {
        "Analyzes the text of a contract or lease and reports risky clauses, missing terms and an overall assessment. Optionally answers a specific question about the contract."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contractText": {
                    "type": "string",
                    "description": "Full text of the contract to analyze."
                },
                "question": {
                    "type": "string",
                    "description": "Optional question to answer about the contract."
                }
            },
            "required": ["contractText"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let mut args: AnalyzeContractArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;

        if args.contract_text.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "contractText cannot be empty".to_string(),
            ));
        }
        args.question = args
            .question
            .take()
            .map(|question| question.trim().to_string())
            .filter(|question| !question.is_empty());

        log::info!(
            "Analyzing contract ({} chars) via {}",
            args.contract_text.len(),
            self.endpoint
        );

        let request = self.client.post(&self.endpoint).json(&args);
        send_json::<Value>(request, "Contract analyzer").await
    }
}
