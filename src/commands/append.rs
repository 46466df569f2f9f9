use crate::config::Config;
use crate::error::Result;
use crate::session::{Attachment, Role};
use anyhow::bail;
use colored::Colorize;

/// Handle the append command
pub fn handle_append(
    config: Config,
    session: String,
    user: String,
    role: String,
    content: String,
    attachment_urls: Vec<String>,
) -> Result<()> {
    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => bail!("{} (expected 'user' or 'assistant')", e),
    };

    let attachments: Vec<Attachment> = attachment_urls
        .into_iter()
        .map(|url| Attachment::new(url, ""))
        .collect();

    let store = super::open_store(&config)?;
    let message_id = store.add_message(&session, role, content, &user, attachments)?;

    println!(
        "{}",
        format!("Stored message {} in session {}", message_id, session).green()
    );

    Ok(())
}
