use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::{Catalog, ModeKind};

/// A keystroke-driven command palette
///
/// Type to find applications, system commands, emoji and special characters, clipboard history and snippets, or to
/// calculate, search the web and translate text.
#[derive(Parser, Debug)]
#[command(author, version, verbatim_doc_comment, infer_subcommands = true)]
pub struct Cli {
    /// Path of the configuration file (defaults to the user's config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to be executed (defaults to `open`)
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Opens the interactive palette
    Open(OpenCommand),

    /// Prints the candidates a query resolves to, without opening the palette
    Resolve(ResolveCommand),

    /// Shows or resets the usage counters of the glyph pickers
    Usage(UsageCommand),
}

/// Opens the interactive palette
#[derive(Args, Debug, Default)]
pub struct OpenCommand {
    /// Query to start with
    pub query: Option<String>,

    /// Mode to start in
    #[arg(short, long, value_enum, default_value_t)]
    pub mode: ModeKind,

    /// Force the palette to render inline (takes less space)
    #[arg(short = 'l', long, conflicts_with = "full_screen")]
    pub inline: bool,

    /// Force the palette to render in full screen
    #[arg(short, long, conflicts_with = "inline")]
    pub full_screen: bool,
}

/// Prints the candidates a query resolves to
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// The query to resolve
    pub query: String,

    /// Mode to resolve the query in, the clipboard history is only recorded while the palette is open
    #[arg(short, long, value_enum, default_value_t)]
    pub mode: ModeKind,
}

/// Shows or resets the usage counters
#[derive(Args, Debug)]
pub struct UsageCommand {
    /// Only consider this catalog
    #[arg(short, long, value_enum)]
    pub catalog: Option<CatalogArg>,

    /// Resets the counters instead of listing them
    #[arg(long)]
    pub reset: bool,
}

/// The glyph catalog to consider
#[derive(ValueEnum, Copy, Clone, PartialEq, Eq, Debug)]
pub enum CatalogArg {
    Emoji,
    Special,
}

impl From<CatalogArg> for Catalog {
    fn from(arg: CatalogArg) -> Self {
        match arg {
            CatalogArg::Emoji => Catalog::Emoji,
            CatalogArg::Special => Catalog::Special,
        }
    }
}

impl Cli {
    /// Retrieves the command to run, opening the palette when none was given
    pub fn into_command(self) -> (Option<PathBuf>, CliCommand) {
        let command = self.command.unwrap_or_else(|| CliCommand::Open(OpenCommand::default()));
        (self.config, command)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_asserts() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_defaults_to_open() {
        let (config, command) = Cli::parse_from(["cmdpal"]).into_command();
        assert_eq!(config, None);
        let CliCommand::Open(open) = command else {
            panic!("expected the open command");
        };
        assert_eq!(open.mode, ModeKind::Normal);
        assert_eq!(open.query, None);
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["cmdpal", "open", "--mode", "special", "--inline", "arrow"]);
        let Some(CliCommand::Open(open)) = cli.command else {
            panic!("expected the open command");
        };
        assert_eq!(open.mode, ModeKind::SpecialChars);
        assert_eq!(open.query.as_deref(), Some("arrow"));
        assert!(open.inline);

        let cli = Cli::parse_from(["cmdpal", "--config", "/tmp/cmdpal.toml", "res", "2+2"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cmdpal.toml")));
        assert!(matches!(cli.command, Some(CliCommand::Resolve(ref r)) if r.query == "2+2"));

        let cli = Cli::parse_from(["cmdpal", "usage", "-c", "emoji", "--reset"]);
        let Some(CliCommand::Usage(usage)) = cli.command else {
            panic!("expected the usage command");
        };
        assert_eq!(usage.catalog.map(Catalog::from), Some(Catalog::Emoji));
        assert!(usage.reset);

        assert!(Cli::try_parse_from(["cmdpal", "open", "--inline", "--full-screen"]).is_err());
    }
}
