use crate::config::Config;
use crate::error::Result;
use crate::session::Message;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle the show command: print the full transcript
pub fn handle_show(config: Config, session: String) -> Result<()> {
    let store = super::open_store(&config)?;
    let messages = store.get_conversation(&session)?;

    if messages.is_empty() {
        println!("{}", format!("No messages in session {}.", session).yellow());
        return Ok(());
    }

    println!("\nConversation {} ({} messages):", session, messages.len());
    print_transcript(&messages);
    Ok(())
}

/// Handle the tail command: print the last N messages
pub fn handle_tail(config: Config, session: String, count: usize) -> Result<()> {
    let store = super::open_store(&config)?;
    let messages = store.get_n_messages(&session, count)?;

    if messages.is_empty() {
        println!("{}", format!("No messages in session {}.", session).yellow());
        return Ok(());
    }

    println!("\nLast {} messages of {}:", messages.len(), session);
    print_transcript(&messages);
    Ok(())
}

/// Handle the page command: print one page of history
pub fn handle_page(config: Config, session: String, offset: usize, limit: usize) -> Result<()> {
    let store = super::open_store(&config)?;
    let messages = store.get_messages_paginated(&session, offset, limit)?;

    if messages.is_empty() {
        println!(
            "{}",
            format!("No messages at offset {} in session {}.", offset, session).yellow()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Role".bold(),
        "Content".bold(),
        "Time".bold(),
        "Attachments".bold()
    ]);

    for message in &messages {
        table.add_row(prettytable::row![
            message.role.to_string().cyan(),
            truncate(&message.content, 60),
            message.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            message.attachments.len()
        ]);
    }

    println!(
        "\nSession {}, {} messages starting {} back from the newest:",
        session,
        messages.len(),
        offset
    );
    table.printstd();
    println!();
    Ok(())
}

fn print_transcript(messages: &[Message]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["Role".bold(), "Content".bold()]);

    for message in messages {
        table.add_row(prettytable::row![
            message.role.to_string().cyan(),
            truncate(&message.content, 80)
        ]);
    }

    table.printstd();
    println!();
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string_adds_ellipsis() {
        assert_eq!(truncate("this is a very long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_exact_length_unchanged() {
        assert_eq!(truncate("exact", 5), "exact");
    }
}
