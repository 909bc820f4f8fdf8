//! Static catalog of target languages for translation.

/// A selectable target language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

/// Source/default language code. Translation to this code is a no-op.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Supported target languages
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { name: "English", code: "en" },
    Language { name: "Hindi", code: "hi" },
    Language { name: "Marathi", code: "mr" },
    Language { name: "Gujarati", code: "gu" },
    Language { name: "Tamil", code: "ta" },
    Language { name: "Telugu", code: "te" },
    Language { name: "Bengali", code: "bn" },
    Language { name: "Punjabi", code: "pa" },
];

/// Resolve a language name (or code) to its translation code.
/// Unknown names fall back to the default language.
pub fn language_code(name: &str) -> &'static str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(name) || l.code.eq_ignore_ascii_case(name))
        .map(|l| l.code)
        .unwrap_or(DEFAULT_LANGUAGE_CODE)
}
