//! Command-line argument parsing for NyayaSetu
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NyayaSetu - Multilingual legal question answering over local documents
#[derive(Parser, Debug)]
#[command(name = "nyayasetu")]
#[command(version = "0.1.0")]
#[command(about = "Ask legal questions over a local document corpus", long_about = None)]
pub struct Args {
    /// Question to answer (one-shot mode)
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Answer language code (en/hi/pa/ta/te/bn); auto-detected when omitted
    #[arg(short, long)]
    pub language: Option<String>,

    /// Document directory (overrides the configured path)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the answer)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive question loop
    Start,

    /// Show device, corpus size, and model identifiers
    Info,

    /// Display current configuration
    Config,

    /// Run the canned multilingual queries and report latency
    Showcase,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose == 0 {
            Verbosity::Normal
        } else {
            Verbosity::Verbose
        }
    }

    /// Check that question and subcommand are used consistently
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_none() && self.question.is_none() {
            return Err(
                "Question required. Use 'nyayasetu <QUESTION>' or run a subcommand.".to_string(),
            );
        }

        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Check if progress output should be shown
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if stage timings and retrieval detail should be shown
    pub fn show_detail(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            question: Some("test".to_string()),
            language: None,
            database: None,
            config: None,
            verbose: 0,
            quiet: false,
            command: None,
        }
    }

    #[test]
    fn test_verbosity_quiet() {
        let mut args = base_args();
        args.quiet = true;
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(base_args().verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let mut args = base_args();
        args.verbose = 1;
        assert_eq!(args.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_validate_success_with_question() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_success_with_subcommand() {
        let mut args = base_args();
        args.question = None;
        args.command = Some(Commands::Info);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_fail_no_question_or_command() {
        let mut args = base_args();
        args.question = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_fail_both_question_and_command() {
        let mut args = base_args();
        args.command = Some(Commands::Info);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert!(!Verbosity::Normal.show_detail());
        assert!(Verbosity::Verbose.show_detail());
    }
}
