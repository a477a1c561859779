//! `platechat session-id` command.

use console::style;

use platechat_core::service::session_id::SessionIdGenerator;
use platechat_infra::crypto::session_id::Sha256SessionIdGenerator;

pub fn print_session_id(user_id: Option<&str>, device_id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let id = Sha256SessionIdGenerator::new().generate(user_id, device_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "session_id": id }))?);
    } else {
        println!("{}", style(id).cyan());
    }
    Ok(())
}
