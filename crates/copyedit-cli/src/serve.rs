//! Line-delimited JSON request loop
//!
//! Each input line is `{"id"?, "endpoint", "body"}` and produces exactly one
//! output line `{"id"?, "status", "body"}`. Blank lines are skipped.

use anyhow::Result;
use copyedit_core::api::{self, Endpoint, Reply};
use copyedit_core::LanguageModel;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ServeRequest {
    #[serde(default)]
    id: Option<serde_json::Value>,
    endpoint: String,
    #[serde(default)]
    body: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ServeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<serde_json::Value>,
    status: u16,
    body: serde_json::Value,
}

impl ServeResponse {
    fn new(id: Option<serde_json::Value>, reply: Reply) -> Self {
        Self {
            id,
            status: reply.status,
            body: reply.body,
        }
    }
}

async fn handle_line(line: &str, model: Option<&dyn LanguageModel>) -> ServeResponse {
    let request: ServeRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!("Unparseable request line: {}", e);
            return ServeResponse::new(None, Reply::error(400, &format!("Parse error: {}", e)));
        }
    };

    let Ok(endpoint) = request.endpoint.parse::<Endpoint>() else {
        return ServeResponse::new(
            request.id,
            Reply::error(404, &format!("Endpoint not found: {}", request.endpoint)),
        );
    };

    let reply = api::handle(endpoint, &request.body, model).await;
    debug!(endpoint = endpoint.as_str(), status = reply.status, "Request served");
    ServeResponse::new(request.id, reply)
}

pub async fn run<R, W>(reader: R, mut writer: W, model: Option<&dyn LanguageModel>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(live = model.is_some(), "Serving requests on stdio");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&line, model).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn serve(input: &str) -> Vec<serde_json::Value> {
        let mut output = Vec::new();
        run(input.as_bytes(), &mut output, None).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let input = concat!(
            r#"{"id": 1, "endpoint": "text-action-mock", "body": {"action": "shorten", "text": "one two three four five six seven"}}"#,
            "\n\n",
            r#"{"id": "b", "endpoint": "/api/chat-mock", "body": {"messages": [{"role": "user", "content": "fix it"}]}}"#,
            "\n",
        );
        let responses = serve(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["status"], 200);
        assert_eq!(responses[0]["body"]["result"], "one two three...");
        assert_eq!(responses[1]["id"], "b");
        assert!(responses[1]["body"]["message"]["content"]
            .as_str()
            .unwrap()
            .starts_with("[EDIT]"));
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_the_loop() {
        let input = "not json\n{\"endpoint\": \"nope\"}\n{\"endpoint\": \"chat\", \"body\": {\"messages\": []}}\n";
        let responses = serve(input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["status"], 400);
        assert!(responses[0]["body"]["error"].as_str().unwrap().starts_with("Parse error"));
        assert!(responses[0].get("id").is_none());
        assert_eq!(responses[1]["status"], 404);
        // Live endpoint with no model configured
        assert_eq!(responses[2]["status"], 500);
    }
}
