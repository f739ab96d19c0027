use serde::{Deserialize, Serialize};
use strum::Display;

use super::{Catalog, ModeKind};

/// An installed application that can be launched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Display name of the application
    pub name: String,
    /// Path used to launch it, which is also its identity
    pub path: String,
}

/// A named piece of text that can be copied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snippet {
    pub name: String,
    pub content: String,
}

/// A file found by a file search, launched with its default handler when activated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileResult {
    pub name: String,
    pub path: String,
}

/// A fire-and-forget call to an OS-level effector.
///
/// The palette never waits on these, failures are logged by whoever runs them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Writes the text into the system clipboard
    CopyText(String),
    LaunchApplication(String),
    OpenLink(String),
    /// Opens the web search page for the given terms
    SearchWeb(String),
    /// Opens the YouTube results page for the given terms
    SearchYoutube(String),
    SetVolume(u8),
    MuteVolume,
    /// Relative volume change, in percentage points
    AdjustVolume(i8),
    SetBrightness(u8),
    /// Relative brightness change, in percentage points
    AdjustBrightness(i8),
    MediaPlay,
    MediaPause,
    MediaSkip,
    MediaPrevious,
    MinimizeWindow,
    MaximizeWindow,
    ResizeWindow80,
    CloseWindow,
    ToggleAutostart,
    RestartSystem,
    ShutdownSystem,
    LockSystem,
    EmptyTrash,
    RunNamedShortcut(String),
}

/// What happens when a [`Candidate`] is activated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Nothing, the candidate is just a prompt or a status
    Inert,
    /// Switches the palette into another mode
    EnterMode(ModeKind),
    /// Runs an effector
    Invoke(Effect),
    /// Replaces the query with the given text, without leaving the palette
    ReplaceQuery(String),
    /// Starts a file search for the given term
    SearchFiles(String),
    /// Copies the text, then returns to normal mode with an empty query
    CopyAndExit(String),
    /// Copies a catalog glyph, records its usage and leaves the picker
    CopyGlyph {
        catalog: Catalog,
        name: &'static str,
        glyph: &'static str,
    },
    /// Copies the translated text and leaves the translate wizard
    CopyTranslation(String),
}

/// A built-in or grammar-produced command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub activation: Activation,
    /// When this is a calculator command, the text of the result
    pub calc_result: Option<String>,
}

impl Command {
    /// Creates a new [`Command`]
    pub fn new(name: impl Into<String>, activation: Activation) -> Self {
        Self {
            name: name.into(),
            activation,
            calc_result: None,
        }
    }

    /// Creates a command that does nothing when activated
    pub fn inert(name: impl Into<String>) -> Self {
        Self::new(name, Activation::Inert)
    }
}

/// The discriminant of a [`Candidate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CandidateKind {
    App,
    Command,
    File,
}

/// One selectable entry of the palette list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    Application(Application),
    Command(Command),
    FileResult(FileResult),
}

impl Candidate {
    /// The text displayed for this candidate, also the text the query is matched against
    pub fn display_name(&self) -> &str {
        match self {
            Candidate::Application(app) => &app.name,
            Candidate::Command(cmd) => &cmd.name,
            Candidate::FileResult(file) => &file.name,
        }
    }

    pub fn kind(&self) -> CandidateKind {
        match self {
            Candidate::Application(_) => CandidateKind::App,
            Candidate::Command(_) => CandidateKind::Command,
            Candidate::FileResult(_) => CandidateKind::File,
        }
    }

    /// The identity of the candidate: the path for applications and files, the name otherwise
    pub fn identity(&self) -> &str {
        match self {
            Candidate::Application(app) => &app.path,
            Candidate::Command(cmd) => &cmd.name,
            Candidate::FileResult(file) => &file.path,
        }
    }

    /// What activating this candidate does
    pub fn activation(&self) -> Activation {
        match self {
            Candidate::Application(app) => Activation::Invoke(Effect::LaunchApplication(app.path.clone())),
            Candidate::Command(cmd) => cmd.activation.clone(),
            Candidate::FileResult(file) => Activation::Invoke(Effect::LaunchApplication(file.path.clone())),
        }
    }
}

impl From<Command> for Candidate {
    fn from(cmd: Command) -> Self {
        Candidate::Command(cmd)
    }
}

impl From<Application> for Candidate {
    fn from(app: Application) -> Self {
        Candidate::Application(app)
    }
}

impl From<FileResult> for Candidate {
    fn from(file: FileResult) -> Self {
        Candidate::FileResult(file)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_identity_and_activation_by_variant() {
        let app = Candidate::from(Application {
            name: String::from("Firefox"),
            path: String::from("/usr/share/applications/firefox.desktop"),
        });
        assert_eq!(app.kind(), CandidateKind::App);
        assert_eq!(app.identity(), "/usr/share/applications/firefox.desktop");
        assert_eq!(
            app.activation(),
            Activation::Invoke(Effect::LaunchApplication(String::from(
                "/usr/share/applications/firefox.desktop"
            )))
        );

        let file = Candidate::from(FileResult {
            name: String::from("/home/me/notes.txt"),
            path: String::from("/home/me/notes.txt"),
        });
        assert_eq!(file.kind().to_string(), "file");
        assert_eq!(file.display_name(), "/home/me/notes.txt");

        let cmd = Candidate::from(Command::inert("Enter target language"));
        assert_eq!(cmd.identity(), "Enter target language");
        assert_eq!(cmd.activation(), Activation::Inert);
    }
}
