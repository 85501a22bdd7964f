//! Supported answer languages and script-based input detection.
//!
//! The language set is a fixed, closed mapping from ISO-639-1 codes to the
//! names used in generation prompts. Unknown codes silently resolve to
//! English. Input detection is an explicit trait so the interactive loop's
//! heuristic stays replaceable and testable.

use serde::{Deserialize, Serialize};

/// Languages the assistant can answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Punjabi,
    Tamil,
    Telugu,
    Bengali,
}

impl Language {
    /// Resolve an ISO-639-1 code; unknown codes default to English
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::English,
            "hi" => Language::Hindi,
            "pa" => Language::Punjabi,
            "ta" => Language::Tamil,
            "te" => Language::Telugu,
            "bn" => Language::Bengali,
            _ => Language::English,
        }
    }

    /// ISO-639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Punjabi => "pa",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Bengali => "bn",
        }
    }

    /// Human-readable name used in the prompt's language directive
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Punjabi => "Punjabi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Bengali => "Bengali",
        }
    }
}

/// Detects the language of raw user input
pub trait LanguageDetector {
    fn detect(&self, text: &str) -> Language;
}

/// Unicode script-range detector for the supported Indic scripts.
///
/// Scripts are probed in a fixed order; the first script with any matching
/// character wins, so mixed-script input resolves deterministically. Text
/// with no Indic characters is treated as English.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

const SCRIPT_RANGES: &[(Language, u32, u32)] = &[
    (Language::Hindi, 0x0900, 0x097F),   // Devanagari
    (Language::Bengali, 0x0980, 0x09FF), // Bengali
    (Language::Punjabi, 0x0A00, 0x0A7F), // Gurmukhi
    (Language::Tamil, 0x0B80, 0x0BFF),   // Tamil
    (Language::Telugu, 0x0C00, 0x0C7F),  // Telugu
];

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Language {
        for &(language, start, end) in SCRIPT_RANGES {
            if text
                .chars()
                .any(|c| (start..=end).contains(&(c as u32)))
            {
                return language;
            }
        }
        Language::English
    }
}
