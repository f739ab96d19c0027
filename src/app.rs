use color_eyre::Result;
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    cli::{CliCommand, OpenCommand, ResolveCommand, UsageCommand},
    component::{Component, palette::PaletteComponent},
    config::{Config, KeyBindingsConfig},
    engine::{Palette, Request},
    errors::AppError,
    model::ModeKind,
    service::PaletteService,
    tui::{Event, Tui},
};

/// What the app must do after a component processed an event
#[derive(Debug, Default)]
pub enum Action {
    /// Nothing has to be done
    #[default]
    NoOp,
    /// The app should quit
    Quit,
}

/// The main application, dispatching the CLI commands and hosting the interactive palette
pub struct App {
    cancellation_token: CancellationToken,
}

impl App {
    /// Creates a new instance of the application
    pub fn new(cancellation_token: CancellationToken) -> Self {
        Self { cancellation_token }
    }

    /// Runs the given command, returning the text to print once finished, if any
    #[instrument(skip_all)]
    pub async fn run(self, config: Config, service: PaletteService, command: CliCommand) -> Result<Option<String>> {
        match command {
            CliCommand::Open(open) => {
                tracing::info!("Running 'open' command");
                tracing::debug!("Options: {open:?}");
                self.run_interactive(open, config, service).await?;
                Ok(None)
            }
            CliCommand::Resolve(resolve) => {
                tracing::info!("Running 'resolve' command");
                tracing::debug!("Options: {resolve:?}");
                resolve_once(resolve, config, service).await.map(Some)
            }
            CliCommand::Usage(usage) => {
                tracing::info!("Running 'usage' command");
                tracing::debug!("Options: {usage:?}");
                usage_report(usage, service).await.map(Some)
            }
        }
    }

    async fn run_interactive(self, open: OpenCommand, config: Config, service: PaletteService) -> Result<()> {
        let inline = open.inline || (!open.full_screen && config.inline);
        let usage = service.load_usage().await.map_err(AppError::into_report)?;
        let palette = Palette::new(config.palette.clone(), usage);
        let keybindings = config.keybindings;
        let mut component = PaletteComponent::new(service, palette, config.theme, inline, config.palette.delay);

        component.init().await?;
        if let Action::Quit = component.open(open.mode, open.query) {
            return component.exit().await;
        }

        let mut tui = Tui::new(self.cancellation_token.clone())?;
        if inline {
            tracing::debug!("Displaying inline {}", component.name());
            tui.enter_inline(component.min_inline_height())?;
        } else {
            tracing::debug!("Displaying full-screen {}", component.name());
            tui.enter()?;
        }

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Cancellation token received, exiting TUI loop");
                    break;
                }
                maybe_event = tui.next_event() => {
                    let Some(event) = maybe_event else {
                        tracing::error!("TUI closed unexpectedly, no event received");
                        break;
                    };
                    if let Action::Quit = handle_tui_event(&mut component, event, &mut tui, &keybindings).await? {
                        break;
                    }
                }
            }
        }

        tui.exit()?;
        component.exit().await
    }
}

#[instrument(skip_all)]
async fn handle_tui_event(
    component: &mut impl Component,
    event: Event,
    tui: &mut Tui,
    keybindings: &KeyBindingsConfig,
) -> Result<Action> {
    if event != Event::Render {
        tracing::trace!("{event:?}");
    }
    Ok(match event {
        Event::Render | Event::Resize(..) => {
            tui.render(|frame, area| component.render(frame, area))?;
            Action::NoOp
        }
        Event::Paste(content) => component.process_paste_event(content)?,
        Event::Key(key) => component.process_key_event(keybindings, key).await?,
    })
}

/// Resolves a query without any interface, waiting for the data it needs
async fn resolve_once(resolve: ResolveCommand, config: Config, service: PaletteService) -> Result<String> {
    let usage = service.load_usage().await.map_err(AppError::into_report)?;
    let mut palette = Palette::new(config.palette, usage);

    let mut requests = palette.start();
    if resolve.mode != ModeKind::Normal {
        requests.extend(palette.enter_mode(resolve.mode));
    }
    perform_all(&service, &mut palette, requests).await;
    let requests = palette.set_query(resolve.query);
    perform_all(&service, &mut palette, requests).await;

    let mut lines = palette
        .candidates()
        .iter()
        .map(|c| format!("{}\t{}", c.kind(), c.display_name()))
        .collect::<Vec<_>>();
    if let Some(status) = palette.status() {
        lines.push(format!("! {status}"));
    }
    Ok(lines.join("\n"))
}

/// Performs the data requests sequentially, skipping effects
async fn perform_all(service: &PaletteService, palette: &mut Palette, requests: Vec<Request>) {
    for request in requests {
        if matches!(request, Request::Invoke(_) | Request::HideWindow | Request::RecordUsage { .. }) {
            continue;
        }
        if let Some(completion) = service.execute(request).await {
            palette.complete(completion);
        }
    }
}

async fn usage_report(usage: UsageCommand, service: PaletteService) -> Result<String> {
    let catalog = usage.catalog.map(Into::into);
    if usage.reset {
        let count = service.reset_usage(catalog).await.map_err(AppError::into_report)?;
        return Ok(format!("Reset {count} usage counters"));
    }

    let entries = service.usage_report(catalog).await.map_err(AppError::into_report)?;
    if entries.is_empty() {
        return Ok(String::from("No glyph has been used yet"));
    }
    Ok(entries
        .iter()
        .map(|e| {
            format!(
                "{}\t{}\t{}\t{}",
                e.catalog,
                e.glyph.unwrap_or("?"),
                e.usage.name,
                e.usage.usage_count
            )
        })
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{cli::CatalogArg, model::Catalog, service::tests::service};

    #[tokio::test]
    async fn test_resolve_once() {
        let (palette_service, _) = service().await;
        let resolve = ResolveCommand {
            query: String::from("2+2"),
            mode: ModeKind::Normal,
        };
        let output = resolve_once(resolve, Config::default(), palette_service).await.unwrap();
        assert_eq!(output.lines().next(), Some("command\tCalculate: 2+2 = 4"));

        let (palette_service, _) = service().await;
        let resolve = ResolveCommand {
            query: String::from("fire"),
            mode: ModeKind::Emoji,
        };
        let output = resolve_once(resolve, Config::default(), palette_service).await.unwrap();
        assert!(output.lines().any(|line| line == "command\t🔥 fire"));
    }

    #[tokio::test]
    async fn test_resolve_once_uses_session_data() {
        let (palette_service, _) = service().await;
        let resolve = ResolveCommand {
            query: String::from("fire"),
            mode: ModeKind::Normal,
        };
        let output = resolve_once(resolve, Config::default(), palette_service).await.unwrap();
        assert!(output.lines().any(|line| line == "app\tFirefox"));
    }

    #[tokio::test]
    async fn test_usage_report() {
        let (palette_service, _) = service().await;
        for _ in 0..3 {
            palette_service
                .execute(Request::RecordUsage {
                    catalog: Catalog::Emoji,
                    name: String::from("fire"),
                })
                .await;
        }

        let list = UsageCommand {
            catalog: None,
            reset: false,
        };
        assert_eq!(usage_report(list, palette_service.clone()).await.unwrap(), "emoji\t🔥\tfire\t3");

        let reset = UsageCommand {
            catalog: Some(CatalogArg::Emoji),
            reset: true,
        };
        assert_eq!(usage_report(reset, palette_service.clone()).await.unwrap(), "Reset 1 usage counters");

        let list = UsageCommand {
            catalog: None,
            reset: false,
        };
        assert_eq!(usage_report(list, palette_service).await.unwrap(), "No glyph has been used yet");
    }
}
