//! Mode transition rules

use crate::model::{Mode, ModeKind, TranslateState, TranslateStep};

/// A mode change intercepted from a key, along with the query the field must show afterwards
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub mode: Mode,
    pub query: String,
}

impl Transition {
    fn to(mode: Mode, query: impl Into<String>) -> Self {
        Self {
            mode,
            query: query.into(),
        }
    }

    fn normal() -> Self {
        Self::to(Mode::Normal, "")
    }
}

/// Builds the initial state of a mode being entered, the query is always cleared on entry
pub fn enter(kind: ModeKind, clipboard: &[String]) -> Transition {
    let mode = match kind {
        ModeKind::Normal => Mode::Normal,
        ModeKind::Emoji => Mode::Emoji,
        ModeKind::SpecialChars => Mode::SpecialChars,
        ModeKind::Clipboard => Mode::Clipboard {
            snapshot: clipboard.to_vec(),
        },
        ModeKind::Snippet => Mode::Snippet,
        ModeKind::Translate => Mode::Translate(TranslateState::default()),
    };
    Transition::to(mode, "")
}

/// Intercepts a Backspace press, before it edits the query.
///
/// Returns `None` when the active mode doesn't consume the key.
pub fn on_backspace(mode: &Mode, query: &str) -> Option<Transition> {
    match mode {
        Mode::Normal => None,
        Mode::Emoji | Mode::SpecialChars if query.is_empty() => Some(Transition::normal()),
        Mode::Emoji | Mode::SpecialChars => None,
        Mode::Clipboard { .. } | Mode::Snippet if query.trim().is_empty() => Some(Transition::normal()),
        Mode::Clipboard { .. } | Mode::Snippet => None,
        Mode::Translate(_) if !query.trim().is_empty() => None,
        Mode::Translate(state) => Some(match state.step {
            TranslateStep::Source => Transition::normal(),
            // Step back, restoring the stored value into the field
            TranslateStep::Target => Transition::to(
                Mode::Translate(TranslateState {
                    step: TranslateStep::Source,
                    lang_from: String::new(),
                    lang_to: state.lang_to.clone(),
                    outcome: None,
                }),
                state.lang_from.clone(),
            ),
            TranslateStep::Sentence => Transition::to(
                Mode::Translate(TranslateState {
                    step: TranslateStep::Target,
                    lang_from: state.lang_from.clone(),
                    lang_to: String::new(),
                    outcome: None,
                }),
                state.lang_to.clone(),
            ),
        }),
    }
}

/// Intercepts an Enter press, before it activates the selected candidate.
///
/// Returns `None` when the active mode doesn't consume the key.
pub fn on_enter(mode: &Mode, query: &str) -> Option<Transition> {
    let Mode::Translate(state) = mode else {
        return None;
    };
    let value = query.trim().to_lowercase();
    if value.is_empty() {
        return Some(Transition::normal());
    }
    match state.step {
        TranslateStep::Source => Some(Transition::to(
            Mode::Translate(TranslateState {
                step: TranslateStep::Target,
                lang_from: value,
                ..state.clone()
            }),
            "",
        )),
        TranslateStep::Target => Some(Transition::to(
            Mode::Translate(TranslateState {
                step: TranslateStep::Sentence,
                lang_to: value,
                outcome: None,
                ..state.clone()
            }),
            "",
        )),
        TranslateStep::Sentence => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn translate(step: TranslateStep, lang_from: &str, lang_to: &str) -> Mode {
        Mode::Translate(TranslateState {
            step,
            lang_from: lang_from.to_owned(),
            lang_to: lang_to.to_owned(),
            outcome: None,
        })
    }

    #[test]
    fn test_enter_clears_query() {
        let clipboard = vec![String::from("copied")];
        for kind in [
            ModeKind::Emoji,
            ModeKind::SpecialChars,
            ModeKind::Clipboard,
            ModeKind::Snippet,
            ModeKind::Translate,
        ] {
            let transition = enter(kind, &clipboard);
            assert_eq!(transition.mode.kind(), kind);
            assert_eq!(transition.query, "");
        }
        assert_eq!(
            enter(ModeKind::Clipboard, &clipboard).mode,
            Mode::Clipboard { snapshot: clipboard }
        );
    }

    #[test]
    fn test_backspace_exits_pickers_only_on_empty_query() {
        assert_eq!(on_backspace(&Mode::Emoji, ""), Some(Transition::normal()));
        assert_eq!(on_backspace(&Mode::SpecialChars, " "), None);
        assert_eq!(on_backspace(&Mode::Snippet, " "), Some(Transition::normal()));
        assert_eq!(
            on_backspace(&Mode::Clipboard { snapshot: Vec::new() }, ""),
            Some(Transition::normal())
        );
        assert_eq!(on_backspace(&Mode::Snippet, "a"), None);
        assert_eq!(on_backspace(&Mode::Normal, ""), None);
    }

    #[test]
    fn test_translate_backspace_restores_previous_value() {
        let transition = on_backspace(&translate(TranslateStep::Sentence, "en", "fr"), "").unwrap();
        assert_eq!(transition.mode, translate(TranslateStep::Target, "en", ""));
        assert_eq!(transition.query, "fr");

        let transition = on_backspace(&translate(TranslateStep::Target, "en", ""), "").unwrap();
        assert_eq!(transition.mode, translate(TranslateStep::Source, "", ""));
        assert_eq!(transition.query, "en");

        let transition = on_backspace(&translate(TranslateStep::Source, "", ""), "").unwrap();
        assert_eq!(transition, Transition::normal());

        assert_eq!(on_backspace(&translate(TranslateStep::Target, "en", ""), "f"), None);
    }

    #[test]
    fn test_translate_enter_advances() {
        let transition = on_enter(&translate(TranslateStep::Source, "", ""), " EN ").unwrap();
        assert_eq!(transition.mode, translate(TranslateStep::Target, "en", ""));
        assert_eq!(transition.query, "");

        let transition = on_enter(&transition.mode, "fr").unwrap();
        assert_eq!(transition.mode, translate(TranslateStep::Sentence, "en", "fr"));

        assert_eq!(on_enter(&transition.mode, "hello"), None);
        assert_eq!(on_enter(&transition.mode, ""), Some(Transition::normal()));
        assert_eq!(on_enter(&Mode::Emoji, ""), None);
    }
}
