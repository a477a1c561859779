//! One-shot `platechat ask` command.

use anyhow::Context;
use console::style;

use platechat_types::chat::ChatRequest;

use crate::state::AppState;

/// Send `message` (with an optional plate) through the chat service and
/// print the reply.
pub async fn ask(
    state: &AppState,
    message: String,
    plate: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut body = serde_json::json!({ "message": message });
    if let Some(raw) = plate {
        let plate: serde_json::Value =
            serde_json::from_str(&raw).context("--plate must be a JSON object")?;
        body["context"] = serde_json::json!({ "license_plate": plate });
    }
    let request = ChatRequest::from_json(&body)?;

    let reply = state.chat_service.chat(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!();
        println!("  {}", reply.response);
        println!();
        if reply.context_used {
            println!("  {}", style("(plate context used)").dim());
        }
    }

    Ok(())
}
