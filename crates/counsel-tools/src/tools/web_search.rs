//! Web search backed by the Tavily search API.

use async_trait::async_trait;
use counsel_core::{Tool, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::http::{build_client, send_json};

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const MAX_RESULTS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchArgs {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    include_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            api_key: api_key.into(),
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn search(&self, query: &str, max_results: u32) -> Result<SearchOutput, ToolError> {
        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
            include_answer: true,
        };

        log::debug!("Web search for '{}' (max {} results)", query, max_results);

        let request = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body);
        send_json(request, "Search API").await
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "webSearch"
    }

    fn description(&self) -> &str {
        "Searches the web for current information such as recent legal news, statutes or court decisions. Returns a short answer when available plus the top matching pages."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query."
                },
                "maxResults": {
                    "type": "integer",
                    "description": format!("How many results to return (1-{MAX_RESULTS_LIMIT}, default {DEFAULT_MAX_RESULTS}).")
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: WebSearchArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;

        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments(
                "query cannot be empty".to_string(),
            ));
        }

        let max_results = args
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT);

        let output = self.search(query, max_results).await?;
        log::info!("Web search returned {} result(s)", output.results.len());

        serde_json::to_value(output).map_err(|error| ToolError::Execution(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_posts_query_and_maps_results() {
        if std::env::var("CODEX_SANDBOX_NETWORK_DISABLED").is_ok() {
            return;
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({
                "api_key": "tv-test",
                "query": "tenant rights colorado",
                "max_results": 3,
                "include_answer": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Tenants have a right to habitable housing.",
                "query": "tenant rights colorado",
                "results": [
                    {"title": "Warranty of habitability", "url": "https://example.com/a", "content": "...", "score": 0.9}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = WebSearchTool::new("tv-test").with_base_url(format!("{}/", server.uri()));
        let result = tool
            .execute(json!({"query": " tenant rights colorado ", "maxResults": 3}))
            .await
            .unwrap();

        assert_eq!(result["answer"], "Tenants have a right to habitable housing.");
        assert_eq!(result["results"].as_array().unwrap().len(), 1);
        assert_eq!(result["results"][0]["url"], "https://example.com/a");
        assert!(result["results"][0].get("score").is_none());
    }

    #[tokio::test]
    async fn test_missing_answer_is_omitted_and_limit_clamped() {
        if std::env::var("CODEX_SANDBOX_NETWORK_DISABLED").is_ok() {
            return;
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({"max_results": MAX_RESULTS_LIMIT})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = WebSearchTool::new("tv-test").with_base_url(server.uri());
        let result = tool
            .execute(json!({"query": "probate", "maxResults": 50}))
            .await
            .unwrap();

        assert_eq!(result, json!({"results": []}));
    }

    #[tokio::test]
    async fn test_http_error_is_execution_error() {
        if std::env::var("CODEX_SANDBOX_NETWORK_DISABLED").is_ok() {
            return;
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(432).set_body_string("plan limit exceeded"))
            .mount(&server)
            .await;

        let tool = WebSearchTool::new("tv-test").with_base_url(server.uri());
        match tool.execute(json!({"query": "probate"})).await {
            Err(ToolError::Execution(message)) => {
                assert!(message.contains("432"));
                assert!(message.contains("plan limit exceeded"));
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_request() {
        let tool = WebSearchTool::new("tv-test").with_base_url("http://127.0.0.1:9");
        let result = tool.execute(json!({"query": "   "})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
