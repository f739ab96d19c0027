//! Normal-mode command grammar

use std::sync::LazyLock;

use regex::Regex;

use super::Calculation;
use crate::model::{Activation, Command, Effect, ModeKind};

/// Words that route the query to the multimedia sub-grammar
const MULTIMEDIA_TRIGGERS: [&str; 8] = ["set", "increase", "decrease", "play", "pause", "skip", "previous", "mute"];

static PERCENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,3})\s*%").unwrap());
static EXPRESSION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d\s+\-*/().]+$").unwrap());

/// Navigational commands always offered in normal mode, before any grammar output
pub fn static_commands() -> Vec<Command> {
    vec![
        Command::new("Clipboard history", Activation::EnterMode(ModeKind::Clipboard)),
        Command::new("Snippets", Activation::EnterMode(ModeKind::Snippet)),
        Command::new("Emoji", Activation::EnterMode(ModeKind::Emoji)),
        Command::new("Special Characters", Activation::EnterMode(ModeKind::SpecialChars)),
        Command::new("Translate", Activation::EnterMode(ModeKind::Translate)),
    ]
}

/// Whether the trimmed query looks like an arithmetic expression worth evaluating
pub fn is_expression(query: &str) -> bool {
    EXPRESSION_REGEX.is_match(query.trim())
}

/// Parses the multimedia sub-grammar from the lower-cased query.
///
/// Volume and brightness branches are exclusive within their own group, media controls are independent. Branches
/// requiring a percentage produce nothing when there's none, out of range percentages are clamped.
pub fn multimedia_commands(q: &str) -> Vec<Command> {
    let percent = PERCENT_REGEX
        .captures(q)
        .and_then(|c| c[1].parse::<u16>().ok())
        .map(|n| n.min(100) as u8);

    let mut commands = Vec::new();

    if q.starts_with("set volume")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Set volume to {n}%"),
            Activation::Invoke(Effect::SetVolume(n)),
        ));
    } else if q.starts_with("mute") {
        commands.push(Command::new("Mute volume", Activation::Invoke(Effect::MuteVolume)));
    } else if q.starts_with("increase volume")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Increase volume by {n}%"),
            Activation::Invoke(Effect::AdjustVolume(n as i8)),
        ));
    } else if q.starts_with("decrease volume")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Decrease volume by {n}%"),
            Activation::Invoke(Effect::AdjustVolume(-(n as i8))),
        ));
    }

    if q.starts_with("set brightness")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Set brightness to {n}%"),
            Activation::Invoke(Effect::SetBrightness(n)),
        ));
    } else if q.starts_with("increase brightness")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Increase brightness by {n}%"),
            Activation::Invoke(Effect::AdjustBrightness(n as i8)),
        ));
    } else if q.starts_with("decrease brightness")
        && let Some(n) = percent
    {
        commands.push(Command::new(
            format!("Decrease brightness by {n}%"),
            Activation::Invoke(Effect::AdjustBrightness(-(n as i8))),
        ));
    }

    if q.starts_with("play") {
        commands.push(Command::new("Play media", Activation::Invoke(Effect::MediaPlay)));
    }
    if q.starts_with("pause") {
        commands.push(Command::new("Pause media", Activation::Invoke(Effect::MediaPause)));
    }
    if q.starts_with("skip") {
        commands.push(Command::new("Skip track", Activation::Invoke(Effect::MediaSkip)));
    }
    if q.starts_with("previous") {
        commands.push(Command::new("Previous track", Activation::Invoke(Effect::MediaPrevious)));
    }

    commands
}

/// Evaluates the normal-mode grammar on the trimmed query, returning the commands of the first matching branch.
///
/// Multimedia triggers take precedence over every other branch, the web search is the fallback when nothing else
/// matched.
pub fn grammar_commands(query: &str, calculation: Option<&Calculation>) -> Vec<Command> {
    let q = query.to_lowercase();
    let invoke = |name: String, effect: Effect| vec![Command::new(name, Activation::Invoke(effect))];

    if MULTIMEDIA_TRIGGERS.iter().any(|t| q.contains(t)) {
        multimedia_commands(&q)
    } else if q.contains("minimize") || q.contains("min") {
        invoke("Minimize Window".into(), Effect::MinimizeWindow)
    } else if q.contains("maximize") || q.contains("max") {
        invoke("Maximize Window".into(), Effect::MaximizeWindow)
    } else if q.contains("resize") {
        invoke("Resize to 80%".into(), Effect::ResizeWindow80)
    } else if q.contains("close") || q.contains("quit") {
        invoke("Close Window".into(), Effect::CloseWindow)
    } else if let Some(calc) = calculation
        && q != calc.value.to_lowercase()
    {
        vec![Command {
            name: format!("Calculate: {query} = {}", calc.value),
            activation: Activation::ReplaceQuery(calc.value.clone()),
            calc_result: Some(calc.value.clone()),
        }]
    } else if q.starts_with("yt:") {
        let term = strip_prefix_len(query, 3);
        if term.is_empty() {
            Vec::new()
        } else {
            invoke(format!(r#"Search YouTube for "{term}""#), Effect::SearchYoutube(term.to_owned()))
        }
    } else if q.starts_with("http://") || q.starts_with("https://") {
        invoke(format!(r#"Open link "{query}""#), Effect::OpenLink(query.to_owned()))
    } else if (q.starts_with("toggle") && !q.contains("start"))
        || q.starts_with("toggle autostart")
        || q.starts_with("toggle start")
    {
        invoke("Toggle autostart".into(), Effect::ToggleAutostart)
    } else if q.starts_with("restart") || q.starts_with("reboot") {
        invoke("Restart system".into(), Effect::RestartSystem)
    } else if q.starts_with("shutdown") || q.starts_with("power off") {
        invoke("Shutdown system".into(), Effect::ShutdownSystem)
    } else if q.starts_with("lock") || q.starts_with("disconnect") {
        invoke("Lock system (disconnect)".into(), Effect::LockSystem)
    } else if q.starts_with("empty") || q.starts_with("trash") {
        invoke("Empty trash".into(), Effect::EmptyTrash)
    } else if q.starts_with("shortcut") || q.starts_with("run shortcut") {
        let prefix = if q.starts_with("shortcut") { "shortcut" } else { "run shortcut" };
        let name = strip_prefix_len(query, prefix.len());
        invoke(
            format!(r#"Run shortcut "{name}""#),
            Effect::RunNamedShortcut(name.to_owned()),
        )
    } else if let Some((_, term)) = q.split_once("search file") {
        let term = term.trim();
        if term.is_empty() {
            Vec::new()
        } else {
            vec![Command::new(
                format!(r#"Search local files for "{term}""#),
                Activation::SearchFiles(term.to_owned()),
            )]
        }
    } else if query.is_empty() {
        Vec::new()
    } else {
        invoke(format!(r#"Search the web for "{query}""#), Effect::SearchWeb(query.to_owned()))
    }
}

/// Drops the first `len` bytes of the query, trimming the remainder
fn strip_prefix_len(query: &str, len: usize) -> &str {
    query.get(len..).unwrap_or_default().trim()
}
