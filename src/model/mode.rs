use clap::ValueEnum;
use strum::Display;

use super::Catalog;

/// The discriminant of a [`Mode`], used to request a mode without its payload
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum ModeKind {
    #[default]
    Normal,
    Emoji,
    #[value(name = "special")]
    SpecialChars,
    Clipboard,
    Snippet,
    Translate,
}

/// Which step of the translate wizard is collecting input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TranslateStep {
    /// Collecting the source language
    #[default]
    Source = 0,
    /// Collecting the target language
    Target = 1,
    /// Collecting the sentence to translate
    Sentence = 2,
}

/// The last result received for the sentence being translated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslateOutcome {
    Translated(String),
    Failed,
}

/// State carried by the translate wizard between keystrokes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslateState {
    pub step: TranslateStep,
    pub lang_from: String,
    pub lang_to: String,
    pub outcome: Option<TranslateOutcome>,
}

/// The active interpretation grammar of the query.
///
/// Exactly one mode is active at a time, the payload lives inside the variant that owns it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Emoji,
    SpecialChars,
    /// Browsing a snapshot of the clipboard history, taken when the mode was entered
    Clipboard { snapshot: Vec<String> },
    Snippet,
    Translate(TranslateState),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Normal => ModeKind::Normal,
            Mode::Emoji => ModeKind::Emoji,
            Mode::SpecialChars => ModeKind::SpecialChars,
            Mode::Clipboard { .. } => ModeKind::Clipboard,
            Mode::Snippet => ModeKind::Snippet,
            Mode::Translate(_) => ModeKind::Translate,
        }
    }

    /// The glyph catalog browsed by this mode, if it is a picker
    pub fn catalog(&self) -> Option<Catalog> {
        match self {
            Mode::Emoji => Some(Catalog::Emoji),
            Mode::SpecialChars => Some(Catalog::Special),
            _ => None,
        }
    }

    /// Whether this is one of the glyph picker modes
    pub fn is_picker(&self) -> bool {
        self.catalog().is_some()
    }

    /// Hint to display on an empty query field
    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Normal => "Type a command or search...",
            Mode::Emoji => "Type emoji name...",
            Mode::SpecialChars => "Type special character name...",
            Mode::Clipboard { .. } => "Search clipboard history...",
            Mode::Snippet => "Search snippets...",
            Mode::Translate(state) => match state.step {
                TranslateStep::Source => "Enter the language to translate from...",
                TranslateStep::Target => "Enter the language to translate to...",
                TranslateStep::Sentence => "Type sentence to translate...",
            },
        }
    }
}
