use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::PathBuf,
};

use color_eyre::{
    Result,
    eyre::{Context, ContextCompat, eyre},
};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    style::{Attribute, Attributes, Color, ContentStyle},
};
use directories::{ProjectDirs, UserDirs};
use itertools::Itertools;
use serde::{
    Deserialize,
    de::{Deserializer, Error},
};

/// Main configuration struct for the palette
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct Config {
    /// Directory where the data must be stored
    pub data_dir: PathBuf,
    /// Whether the TUI must be rendered "inline" below the shell prompt
    pub inline: bool,
    /// Configuration of the palette behavior
    pub palette: PaletteConfig,
    /// Configuration of the system capabilities
    pub capabilities: CapabilitiesConfig,
    /// Configuration settings for application logging
    pub logs: LogsConfig,
    /// Configuration for the key bindings used within the TUI
    pub keybindings: KeyBindingsConfig,
    /// Configuration for the visual theme of the TUI
    pub theme: Theme,
}

/// Configuration of the palette behavior
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[cfg_attr(not(test), serde(default))]
pub struct PaletteConfig {
    /// Maximum number of candidates displayed in normal mode
    pub max_results: usize,
    /// Number of most used glyphs promoted on an empty picker query
    pub top_used: usize,
    /// Number of characters displayed for each clipboard entry
    pub preview_len: usize,
    /// The delay (in ms) to wait and accumulate type events before evaluating or translating the query
    pub delay: u64,
}

/// Configuration of the system capabilities backing the palette commands
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct CapabilitiesConfig {
    /// Url used to search the web, `{}` is replaced with the encoded query
    pub web_search_url: String,
    /// Url used to search YouTube, `{}` is replaced with the encoded query
    pub youtube_search_url: String,
    /// Endpoint of the translation service
    pub translate_url: String,
    /// Directory containing one file per snippet, defaults to `snippets` under the data dir
    pub snippets_dir: PathBuf,
    /// Directories scanned for applications, defaults to the platform ones
    pub application_dirs: Vec<PathBuf>,
    /// Directories walked when searching files, defaults to the home dir
    pub file_search_roots: Vec<PathBuf>,
    /// Maximum number of file search results
    pub file_search_limit: usize,
    /// Minimum similarity (from 0 to 1) of a file name to be a search result
    pub file_search_threshold: f64,
    /// Maximum number of entries kept in the clipboard history
    pub clipboard_history_size: usize,
    /// The interval (in ms) between clipboard reads
    pub clipboard_poll: u64,
}

/// Configuration settings for application logging
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct LogsConfig {
    /// Whether application logging is enabled
    pub enabled: bool,
    /// The log filter to apply, controlling which logs are recorded.
    ///
    /// This string supports the `tracing-subscriber`'s environment filter syntax.
    pub filter: String,
}

/// Key bindings used in the palette TUI
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct KeyBindingsConfig(
    #[serde(deserialize_with = "deserialize_bindings_with_defaults")] BTreeMap<KeyBindingAction, KeyBinding>,
);

/// The palette actions that can be bound to keys
#[derive(Copy, Clone, Deserialize, PartialOrd, PartialEq, Eq, Ord, Debug)]
#[cfg_attr(test, derive(strum::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum KeyBindingAction {
    /// Hide the palette (ignored while picking glyphs)
    Quit,
    /// Activate the selected candidate, or advance the translate wizard
    Confirm,
    /// Move the selection down
    SelectNext,
    /// Move the selection up
    SelectPrev,
}

/// One logical key binding, triggered by any of its key events
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct KeyBinding(#[serde(deserialize_with = "deserialize_key_events")] Vec<KeyEvent>);

/// TUI theme configuration
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct Theme {
    /// Style of the query and the selected candidate
    #[serde(deserialize_with = "deserialize_style")]
    pub primary: ContentStyle,
    /// Style of placeholders and unselected candidates
    #[serde(deserialize_with = "deserialize_style")]
    pub secondary: ContentStyle,
    /// Style of the mode indicator
    #[serde(deserialize_with = "deserialize_style")]
    pub accent: ContentStyle,
    /// Style of status messages about failures
    #[serde(deserialize_with = "deserialize_style")]
    pub error: ContentStyle,
    /// Optional background color for the selected candidate
    #[serde(deserialize_with = "deserialize_color")]
    pub highlight: Option<Color>,
    /// The symbol displayed next to the selected candidate
    pub highlight_symbol: String,
}

impl Config {
    /// Initializes the configuration.
    ///
    /// Loads `config.toml` from the user's config directory, or the given file. Missing files or fields fall back to
    /// their default values.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("org", "CmdPal", "cmdpal").wrap_err("Couldn't initialize project directory")?;

        let config_path = config_file.unwrap_or_else(|| proj_dirs.config_dir().join("config.toml"));
        let mut config = if config_path.exists() {
            let config_str = fs::read_to_string(&config_path)
                .wrap_err_with(|| format!("Couldn't read config file {}", config_path.display()))?;
            toml::from_str(&config_str)
                .wrap_err_with(|| format!("Couldn't parse config file {}", config_path.display()))?
        } else {
            Config::default()
        };
        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = proj_dirs.data_dir().to_path_buf();
        }
        if config.capabilities.snippets_dir.as_os_str().is_empty() {
            config.capabilities.snippets_dir = config.data_dir.join("snippets");
        }
        if config.capabilities.application_dirs.is_empty() {
            config.capabilities.application_dirs = default_application_dirs();
        }
        if config.capabilities.file_search_roots.is_empty()
            && let Some(user_dirs) = UserDirs::new()
        {
            config.capabilities.file_search_roots = vec![user_dirs.home_dir().to_path_buf()];
        }

        let conflicts = config.keybindings.find_conflicts();
        if !conflicts.is_empty() {
            return Err(eyre!(
                "Couldn't parse config file {}\n\nThere are some key binding conflicts:\n{}",
                config_path.display(),
                conflicts
                    .into_iter()
                    .map(|(_, a)| format!("- {}", a.into_iter().map(|a| format!("{a:?}")).join(", ")))
                    .join("\n")
            ));
        }

        fs::create_dir_all(&config.data_dir)
            .wrap_err_with(|| format!("Couldn't create data dir {}", config.data_dir.display()))?;

        Ok(config)
    }
}

/// Platform directories containing launchable applications
fn default_application_dirs() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![PathBuf::from("/Applications"), PathBuf::from("/System/Applications")]
    } else if cfg!(target_os = "windows") {
        let mut dirs = vec![PathBuf::from(
            r"C:\ProgramData\Microsoft\Windows\Start Menu\Programs",
        )];
        if let Some(base) = directories::BaseDirs::new() {
            dirs.push(base.config_dir().join(r"Microsoft\Windows\Start Menu\Programs"));
        }
        dirs
    } else {
        let mut dirs = vec![PathBuf::from("/usr/share/applications")];
        if let Some(base) = directories::BaseDirs::new() {
            dirs.push(base.data_dir().join("applications"));
        }
        dirs
    }
}

impl KeyBindingsConfig {
    /// Finds the [KeyBindingAction] associated with the given [KeyEvent], if any
    pub fn get_action_matching(&self, event: &KeyEvent) -> Option<KeyBindingAction> {
        self.0
            .iter()
            .find(|(_, binding)| binding.matches(event))
            .map(|(action, _)| *action)
    }

    /// Finds every key event bound to more than one action
    pub fn find_conflicts(&self) -> Vec<(KeyEvent, Vec<KeyBindingAction>)> {
        let mut actions_by_event: HashMap<KeyEvent, Vec<KeyBindingAction>> = HashMap::new();
        for (action, binding) in &self.0 {
            for event in &binding.0 {
                actions_by_event.entry(*event).or_default().push(*action);
            }
        }
        actions_by_event
            .into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .collect()
    }
}

impl KeyBinding {
    /// Checks if the event matches any of the bound key events, comparing only its code and modifiers
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.0
            .iter()
            .any(|e| e.code == event.code && e.modifiers == event.modifiers)
    }
}

impl Theme {
    /// Primary style including the highlight background color
    pub fn highlight_full(&self) -> ContentStyle {
        let mut style = self.primary;
        if let Some(color) = self.highlight {
            style.background_color = Some(color);
        }
        style
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            inline: false,
            palette: PaletteConfig::default(),
            capabilities: CapabilitiesConfig::default(),
            logs: LogsConfig::default(),
            keybindings: KeyBindingsConfig::default(),
            theme: Theme::default(),
        }
    }
}
impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_results: 8,
            top_used: 4,
            preview_len: 60,
            delay: 150,
        }
    }
}
impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            web_search_url: String::from("https://www.google.com/search?q={}"),
            youtube_search_url: String::from("https://www.youtube.com/results?search_query={}"),
            translate_url: String::from("https://translate.googleapis.com/translate_a/single"),
            snippets_dir: PathBuf::new(),
            application_dirs: Vec::new(),
            file_search_roots: Vec::new(),
            file_search_limit: 8,
            file_search_threshold: 0.6,
            clipboard_history_size: 10,
            clipboard_poll: 500,
        }
    }
}
impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: String::from("info"),
        }
    }
}
impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self(BTreeMap::from([
            (KeyBindingAction::Quit, KeyBinding(vec![KeyEvent::from(KeyCode::Esc)])),
            (
                KeyBindingAction::Confirm,
                KeyBinding(vec![KeyEvent::from(KeyCode::Enter), KeyEvent::from(KeyCode::Tab)]),
            ),
            (
                KeyBindingAction::SelectNext,
                KeyBinding(vec![
                    KeyEvent::from(KeyCode::Down),
                    KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
                ]),
            ),
            (
                KeyBindingAction::SelectPrev,
                KeyBinding(vec![
                    KeyEvent::from(KeyCode::Up),
                    KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL),
                ]),
            ),
        ]))
    }
}
impl Default for Theme {
    fn default() -> Self {
        let primary = ContentStyle::new();

        let mut secondary = ContentStyle::new();
        secondary.attributes.set(Attribute::Dim);

        let mut accent = ContentStyle::new();
        accent.foreground_color = Some(Color::Yellow);

        let mut error = ContentStyle::new();
        error.foreground_color = Some(Color::DarkRed);

        Self {
            primary,
            secondary,
            accent,
            error,
            highlight: Some(Color::DarkGrey),
            highlight_symbol: String::from("» "),
        }
    }
}

/// Deserializes the key bindings, filling the actions missing from the config with their defaults
fn deserialize_bindings_with_defaults<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<KeyBindingAction, KeyBinding>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut bindings = BTreeMap::<KeyBindingAction, KeyBinding>::deserialize(deserializer)?;

    // Tests must define every action, to keep the default config file complete
    #[cfg(test)]
    {
        use strum::IntoEnumIterator;
        if let Some(missing) = KeyBindingAction::iter().find(|a| !bindings.contains_key(a)) {
            return Err(D::Error::custom(format!("Missing key binding for action '{missing:?}'.")));
        }
    }

    for (action, default_binding) in KeyBindingsConfig::default().0 {
        bindings.entry(action).or_insert(default_binding);
    }
    Ok(bindings)
}

/// Deserializes a single key event string, or a list of them
fn deserialize_key_events<'de, D>(deserializer: D) -> Result<Vec<KeyEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    };
    raw.iter()
        .map(|s| parse_key_event(s).map_err(D::Error::custom))
        .collect()
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    parse_color(&String::deserialize(deserializer)?).map_err(D::Error::custom)
}

fn deserialize_style<'de, D>(deserializer: D) -> Result<ContentStyle, D::Error>
where
    D: Deserializer<'de>,
{
    parse_style(&String::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Parses a key event like `ctrl-n`, `alt-enter` or `shift-tab`
fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    const MODIFIERS: [(&str, KeyModifiers); 3] = [
        ("ctrl", KeyModifiers::CONTROL),
        ("alt", KeyModifiers::ALT),
        ("shift", KeyModifiers::SHIFT),
    ];

    let lower = raw.to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut modifiers = KeyModifiers::empty();
    'outer: loop {
        for (name, modifier) in MODIFIERS {
            if let Some(stripped) = rest.strip_prefix(name)
                && let Some(stripped) = stripped.strip_prefix(['-', '+'])
            {
                modifiers.insert(modifier);
                rest = stripped;
                continue 'outer;
            }
        }
        break;
    }

    let code = match rest {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "minus" | "hyphen" => KeyCode::Char('-'),
        f if f.len() > 1 && f.starts_with('f') && f[1..].parse::<u8>().is_ok_and(|n| (1..=12).contains(&n)) => {
            KeyCode::F(f[1..].parse().map_err(|_| format!("Unable to parse key binding: {raw}"))?)
        }
        c if c.chars().count() == 1 => {
            let c = c.chars().next().unwrap_or_default();
            if modifiers.contains(KeyModifiers::SHIFT) {
                KeyCode::Char(c.to_ascii_uppercase())
            } else {
                KeyCode::Char(c)
            }
        }
        _ => return Err(format!("Unable to parse key binding: {raw}")),
    };
    Ok(KeyEvent::new(code, modifiers))
}

/// Parses an optional color, `none` or an empty string meaning no color
fn parse_color(raw: &str) -> Result<Option<Color>, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(None),
        color => parse_color_value(color).map(Some),
    }
}

/// Parses a style made of optional attributes followed by an optional color, like `bold`, `dim red` or
/// `italic #ff0064`
fn parse_style(raw: &str) -> Result<ContentStyle, String> {
    const ATTRIBUTES: [(&str, Attribute); 5] = [
        ("bold", Attribute::Bold),
        ("dim", Attribute::Dim),
        ("italic", Attribute::Italic),
        ("underlined", Attribute::Underlined),
        ("underline", Attribute::Underlined),
    ];

    let lower = raw.to_ascii_lowercase();
    let mut rest = lower.trim();
    let mut attributes = Attributes::none();
    'outer: loop {
        for (name, attribute) in ATTRIBUTES {
            if let Some(stripped) = rest.strip_prefix(name) {
                attributes.set(attribute);
                rest = stripped.trim_start();
                continue 'outer;
            }
        }
        break;
    }

    let mut style = ContentStyle::new();
    style.attributes = attributes;
    if !rest.is_empty() && rest != "default" {
        style.foreground_color = Some(parse_color_value(rest)?);
    }
    Ok(style)
}

/// Parses a named, `rgb(r, g, b)`, `#rrggbb` or ansi-indexed color
fn parse_color_value(raw: &str) -> Result<Color, String> {
    let invalid = || format!("Unable to parse color: {raw}");
    let named = match raw.replace(' ', "").as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Grey),
        "darkgray" | "darkgrey" => Some(Color::DarkGrey),
        "darkred" => Some(Color::DarkRed),
        "darkgreen" => Some(Color::DarkGreen),
        "darkyellow" => Some(Color::DarkYellow),
        "darkblue" => Some(Color::DarkBlue),
        "darkmagenta" => Some(Color::DarkMagenta),
        "darkcyan" => Some(Color::DarkCyan),
        _ => None,
    };
    if let Some(color) = named {
        return Ok(color);
    }

    if let Some(rgb) = raw.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        let (r, g, b) = rgb
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .ok()
            .and_then(|c| c.into_iter().collect_tuple())
            .ok_or_else(invalid)?;
        Ok(Color::Rgb { r, g, b })
    } else if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    } else {
        raw.parse::<u8>().map(Color::AnsiValue).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_default_config() -> Result<()> {
        let config_str = fs::read_to_string("default_config.toml").wrap_err("Couldn't read default config file")?;
        let config: Config = toml::from_str(&config_str).wrap_err("Couldn't parse default config file")?;

        assert_eq!(Config::default(), config);

        Ok(())
    }

    #[test]
    fn test_default_keybindings_complete_without_conflicts() {
        let config = KeyBindingsConfig::default();
        for action in KeyBindingAction::iter() {
            assert!(config.0.contains_key(&action), "Missing default binding for {action:?}");
        }
        assert!(config.find_conflicts().is_empty());
    }

    #[test]
    fn test_keybinding_conflicts() {
        let config: KeyBindingsConfig = toml::from_str::<BTreeMap<String, KeyBindingsConfig>>(
            r#"
            [keybindings]
            quit = "esc"
            confirm = ["enter", "ctrl-n"]
            select_next = "ctrl-n"
            select_prev = "up"
            "#,
        )
        .unwrap()
        .remove("keybindings")
        .unwrap();

        let conflicts = config.find_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(
            conflicts[0].1,
            vec![KeyBindingAction::Confirm, KeyBindingAction::SelectNext]
        );
    }

    #[test]
    fn test_get_action_matching() {
        let config = KeyBindingsConfig::default();
        assert_eq!(
            config.get_action_matching(&KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            Some(KeyBindingAction::SelectPrev)
        );
        assert_eq!(
            config.get_action_matching(&KeyEvent::from(KeyCode::Tab)),
            Some(KeyBindingAction::Confirm)
        );
        assert_eq!(config.get_action_matching(&KeyEvent::from(KeyCode::Char('p'))), None);
    }

    #[test]
    fn test_parse_key_event() {
        assert_eq!(parse_key_event("a"), Ok(KeyEvent::from(KeyCode::Char('a'))));
        assert_eq!(parse_key_event("Enter"), Ok(KeyEvent::from(KeyCode::Enter)));
        assert_eq!(parse_key_event("f5"), Ok(KeyEvent::from(KeyCode::F(5))));
        assert_eq!(
            parse_key_event("ctrl+alt-n"),
            Ok(KeyEvent::new(
                KeyCode::Char('n'),
                KeyModifiers::CONTROL | KeyModifiers::ALT
            ))
        );
        assert_eq!(
            parse_key_event("shift-a"),
            Ok(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT))
        );
        assert_eq!(
            parse_key_event("ctrl-space"),
            Ok(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key_event("hyper-x"),
            Err(String::from("Unable to parse key binding: hyper-x"))
        );
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("none"), Ok(None));
        assert_eq!(parse_color("Dark Grey"), Ok(Some(Color::DarkGrey)));
        assert_eq!(parse_color("rgb(50, 25, 15)"), Ok(Some(Color::Rgb { r: 50, g: 25, b: 15 })));
        assert_eq!(parse_color("#4287f5"), Ok(Some(Color::Rgb { r: 66, g: 135, b: 245 })));
        assert_eq!(parse_color("6"), Ok(Some(Color::AnsiValue(6))));
        assert_eq!(
            parse_color("rgb(500, 25, 15)"),
            Err(String::from("Unable to parse color: rgb(500, 25, 15)"))
        );
        assert_eq!(parse_color("#4287fg"), Err(String::from("Unable to parse color: #4287fg")));
        assert_eq!(parse_color("1234"), Err(String::from("Unable to parse color: 1234")));
    }

    #[test]
    fn test_parse_style() {
        assert_eq!(parse_style(""), Ok(ContentStyle::new()));
        assert_eq!(parse_style("default"), Ok(ContentStyle::new()));

        let style = parse_style("underline dim dark red").unwrap();
        assert_eq!(style.foreground_color, Some(Color::DarkRed));
        let mut expected = Attributes::none();
        expected.set(Attribute::Underlined);
        expected.set(Attribute::Dim);
        assert_eq!(style.attributes, expected);

        let style = parse_style("bold").unwrap();
        assert_eq!(style.foreground_color, None);
        assert!(style.attributes.has(Attribute::Bold));
    }
}
