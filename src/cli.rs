//! Command-line interface definition for Silo
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to append to and inspect stored conversations.

use clap::{Parser, Subcommand};

/// Silo - chunked conversation history storage
///
/// Append chat messages to session-scoped storage and read them back as
/// full transcripts, tail windows, or pages.
#[derive(Parser, Debug, Clone)]
#[command(name = "silo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the session database directory
    #[arg(long, env = "SILO_DB")]
    pub db: Option<String>,

    /// Override the configured chunk capacity
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Silo
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Append a message to a session
    Append {
        /// Session to append to
        #[arg(short, long)]
        session: String,

        /// User the session belongs to
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Author role: user or assistant
        #[arg(short, long, default_value = "user")]
        role: String,

        /// Attachment URL, repeatable
        #[arg(long = "attach")]
        attachments: Vec<String>,

        /// Message text
        content: String,
    },

    /// Print the full conversation transcript
    Show {
        /// Session to read
        #[arg(short, long)]
        session: String,
    },

    /// Print the most recent messages of a conversation
    Tail {
        /// Session to read
        #[arg(short, long)]
        session: String,

        /// Number of messages to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Print one page of history, stepping back from the newest message
    Page {
        /// Session to read
        #[arg(short, long)]
        session: String,

        /// How many messages back the page starts (0 = most recent page)
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Page size
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_append() {
        let cli = Cli::try_parse_from([
            "silo", "append", "--session", "s1", "--role", "assistant", "hello there",
        ])
        .expect("parse failed");

        match cli.command {
            Commands::Append {
                session,
                user,
                role,
                content,
                attachments,
            } => {
                assert_eq!(session, "s1");
                assert_eq!(user, "local");
                assert_eq!(role, "assistant");
                assert_eq!(content, "hello there");
                assert!(attachments.is_empty());
            }
            other => panic!("expected append, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_tail_with_count() {
        let cli = Cli::try_parse_from(["silo", "tail", "--session", "s1", "-n", "6"])
            .expect("parse failed");

        match cli.command {
            Commands::Tail { session, count } => {
                assert_eq!(session, "s1");
                assert_eq!(count, 6);
            }
            other => panic!("expected tail, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_page_defaults() {
        let cli =
            Cli::try_parse_from(["silo", "page", "--session", "s1"]).expect("parse failed");

        match cli.command {
            Commands::Page {
                offset, limit, ..
            } => {
                assert_eq!(offset, 0);
                assert_eq!(limit, 20);
            }
            other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_repeatable_attachments() {
        let cli = Cli::try_parse_from([
            "silo",
            "append",
            "--session",
            "s1",
            "--attach",
            "https://example.com/a.jpg",
            "--attach",
            "https://example.com/b.jpg",
            "what is this?",
        ])
        .expect("parse failed");

        match cli.command {
            Commands::Append { attachments, .. } => {
                assert_eq!(attachments.len(), 2);
            }
            other => panic!("expected append, got {:?}", other),
        }
    }
}
