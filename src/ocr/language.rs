//! Recognition languages offered in the language selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language the OCR engine is asked to recognize.
///
/// Serialized as the Tesseract language code (`eng`, `ind`, ...), which is
/// also the name of the language data file the engine loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "ind")]
    Indonesian,
    #[serde(rename = "fra")]
    French,
    #[serde(rename = "spa")]
    Spanish,
    #[serde(rename = "deu")]
    German,
}

impl Language {
    /// Every selectable language, in selector order
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Indonesian,
        Language::French,
        Language::Spanish,
        Language::German,
    ];

    /// Tesseract language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Indonesian => "ind",
            Language::French => "fra",
            Language::Spanish => "spa",
            Language::German => "deu",
        }
    }

    /// Name shown in the language selector
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Indonesian => "Indonesian",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::German => "German",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a string names no supported language
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}' (expected one of eng, ind, fra, spa, deu)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts either the code or the display name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(needle)
                    || lang.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }

    #[test]
    fn test_parse_code_and_name() {
        assert_eq!("ind".parse::<Language>().unwrap(), Language::Indonesian);
        assert_eq!("German".parse::<Language>().unwrap(), Language::German);
        assert_eq!(" SPA ".parse::<Language>().unwrap(), Language::Spanish);
        assert!("jpn".parse::<Language>().is_err());
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&Language::French).unwrap();
        assert_eq!(json, "\"fra\"");
        let parsed: Language = serde_json::from_str("\"deu\"").unwrap();
        assert_eq!(parsed, Language::German);
    }
}
