use itertools::Itertools;

use super::{Session, UsageRanker, grammar};
use crate::{
    config::PaletteConfig,
    model::{Activation, Candidate, Catalog, Command, Mode, TranslateOutcome, TranslateState, TranslateStep},
};

/// Rank key of a candidate name for the given lower-cased query: the character index of the first occurrence of the
/// query in the lower-cased name, or `None` if the name doesn't contain it
pub fn rank_key(q: &str, name: &str) -> Option<usize> {
    let name = name.to_lowercase();
    name.find(q).map(|idx| name[..idx].chars().count())
}

/// Keeps the candidates whose name contains the lower-cased query, earliest match first.
///
/// Candidates with the same rank key keep their relative order.
pub fn rank(q: &str, candidates: impl IntoIterator<Item = Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter_map(|c| rank_key(q, c.display_name()).map(|key| (key, c)))
        .sorted_by_key(|(key, _)| *key)
        .map(|(_, c)| c)
        .collect()
}

/// Resolves the query into the ordered list of candidates for the given mode.
///
/// Resolution is pure: the same inputs always produce the same list.
pub fn resolve(
    mode: &Mode,
    query: &str,
    session: &Session,
    usage: &UsageRanker,
    config: &PaletteConfig,
) -> Vec<Candidate> {
    match mode {
        Mode::Normal => resolve_normal(query, session, config),
        Mode::Emoji => resolve_picker(Catalog::Emoji, query, usage, config),
        Mode::SpecialChars => resolve_picker(Catalog::Special, query, usage, config),
        Mode::Clipboard { snapshot } => resolve_clipboard(snapshot, query, config),
        Mode::Snippet => resolve_snippets(session, query),
        Mode::Translate(state) => resolve_translate(state, query),
    }
}

fn resolve_normal(query: &str, session: &Session, config: &PaletteConfig) -> Vec<Candidate> {
    let query = query.trim();
    let q = query.to_lowercase();

    let commands = grammar::static_commands()
        .into_iter()
        .chain(grammar::grammar_commands(query, session.calculation_for(query)))
        .map(Candidate::from);

    let apps = session
        .applications
        .iter()
        .filter(|app| app.name.to_lowercase().contains(&q))
        .cloned()
        .map(Candidate::from);

    let files = session.file_results.iter().cloned().map(Candidate::from);

    rank(&q, commands)
        .into_iter()
        .chain(apps)
        .chain(files)
        .take(config.max_results)
        .collect()
}

fn resolve_picker(catalog: Catalog, query: &str, usage: &UsageRanker, config: &PaletteConfig) -> Vec<Candidate> {
    let q = query.trim().to_lowercase();
    let entries = if q.is_empty() {
        usage.promoted_entries(catalog, config.top_used)
    } else {
        catalog
            .entries()
            .iter()
            .filter(|(name, _)| name.contains(&q))
            .copied()
            .collect()
    };
    entries
        .into_iter()
        .map(|(name, glyph)| {
            Candidate::from(Command::new(
                format!("{glyph} {name}"),
                Activation::CopyGlyph { catalog, name, glyph },
            ))
        })
        .collect()
}

fn resolve_clipboard(snapshot: &[String], query: &str, config: &PaletteConfig) -> Vec<Candidate> {
    let q = query.to_lowercase();
    snapshot
        .iter()
        .filter(|text| text.to_lowercase().contains(&q))
        .map(|text| {
            Candidate::from(Command::new(
                preview(text, config.preview_len),
                Activation::CopyAndExit(text.clone()),
            ))
        })
        .collect()
}

fn resolve_snippets(session: &Session, query: &str) -> Vec<Candidate> {
    let q = query.to_lowercase();
    session
        .snippets
        .iter()
        .filter(|snippet| snippet.name.to_lowercase().contains(&q))
        .map(|snippet| {
            Candidate::from(Command::new(
                format!(r#"Insert snippet "{}""#, snippet.name),
                Activation::CopyAndExit(snippet.content.clone()),
            ))
        })
        .collect()
}

fn resolve_translate(state: &TranslateState, query: &str) -> Vec<Candidate> {
    match state.step {
        TranslateStep::Source => vec![Command::inert(r#"Enter source language (or type "auto")"#).into()],
        TranslateStep::Target => vec![Command::inert("Enter target language").into()],
        TranslateStep::Sentence if query.trim().is_empty() => Vec::new(),
        TranslateStep::Sentence => match &state.outcome {
            Some(TranslateOutcome::Translated(text)) => vec![
                Command::new(
                    format!("Translation: {text}"),
                    Activation::CopyTranslation(text.clone()),
                )
                .into(),
            ],
            Some(TranslateOutcome::Failed) => vec![Command::inert("Translation failed").into()],
            None => Vec::new(),
        },
    }
}

/// Truncates the text to the given amount of characters, appending an ellipsis when truncated
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_owned()
    }
}
