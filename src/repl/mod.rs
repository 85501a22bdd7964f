//! Interactive question loop.
//!
//! Reads questions with rustyline (persistent history), detects the input
//! language by script unless one was forced on the command line, and prints
//! answers. Query failures are reported and the loop continues; only
//! startup failures abort the process.

use std::path::PathBuf;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::errors::Result;
use crate::language::{Language, LanguageDetector, ScriptDetector};
use crate::pipeline::LegalAssistant;

const PROMPT: &str = "\nYour Question (en/hi/pa/ta/te/bn) > ";

/// Interactive session over an initialized assistant
pub struct ReplSession {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    detector: ScriptDetector,
    forced_language: Option<Language>,
    show_detail: bool,
}

impl ReplSession {
    /// Create a session with history at ~/.nyayasetu_history
    pub fn new(forced_language: Option<Language>, show_detail: bool) -> Result<Self> {
        let mut editor = DefaultEditor::new()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        let history_path = dirs::home_dir().map(|home| home.join(".nyayasetu_history"));
        if let Some(path) = &history_path {
            // first run: no history yet
            let _ = editor.load_history(path);
        }

        Ok(Self {
            editor,
            history_path,
            detector: ScriptDetector,
            forced_language,
            show_detail,
        })
    }

    /// Run the loop until `exit` or EOF
    pub fn run(&mut self, assistant: &LegalAssistant) -> Result<()> {
        println!(
            "\n{}  Bot ready. Type 'exit' to quit.",
            "NyayaSetu".cyan().bold()
        );

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let question = line.trim();
                    if question.is_empty() {
                        continue;
                    }
                    if question.eq_ignore_ascii_case("exit") {
                        break;
                    }

                    let _ = self.editor.add_history_entry(question);
                    self.answer(assistant, question);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Type 'exit' to quit.");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{}: {}", "Input error".red(), e);
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    fn answer(&self, assistant: &LegalAssistant, question: &str) {
        let language = self
            .forced_language
            .unwrap_or_else(|| self.detector.detect(question));
        println!("Thinking ({})...", language.code());

        match assistant.ask_with_report(question, language.code()) {
            Ok(report) => {
                if self.show_detail {
                    for passage in &report.passages {
                        println!(
                            "  {} passage #{} (score {:.2})",
                            "retrieved".dimmed(),
                            passage.ordinal,
                            passage.score
                        );
                    }
                    println!("  {} {}", "timings".dimmed(), report.timings);
                }
                println!("{}: {}", "NyayaSetu".cyan().bold(), report.answer);
            }
            Err(e) => {
                // later queries may still succeed
                eprintln!("{}: {}", "Query failed".red(), e);
            }
        }
    }
}
