use std::{mem, sync::Arc, time::Duration};

use async_trait::async_trait;
use color_eyre::Result;
use parking_lot::{Mutex, RwLock};
use ratatui::{
    Frame,
    backend::FromCrossterm,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use unicode_width::UnicodeWidthStr;

use super::Component;
use crate::{
    app::Action,
    config::Theme,
    engine::{Palette, PaletteKey, Request},
    model::{CandidateKind, Effect, Mode, ModeKind, TranslateStep},
    service::PaletteService,
};

/// The command palette: a query line, the list of candidates and a status line
#[derive(Clone)]
pub struct PaletteComponent {
    /// Visual theme for styling the component
    theme: Theme,
    /// Whether the TUI is rendered inline or not
    inline: bool,
    /// How long typing must pause before query-keyed requests run
    delay: Duration,
    /// Rows used by the candidate list
    max_results: u16,
    /// Service performing the palette requests
    service: PaletteService,
    /// Cancellation token for the current debounced requests
    debounce_token: Arc<Mutex<Option<CancellationToken>>>,
    /// Effects and usage records still running, awaited on exit
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
    /// The palette session
    state: Arc<RwLock<Palette>>,
}

impl PaletteComponent {
    /// Creates a new [`PaletteComponent`]
    pub fn new(service: PaletteService, palette: Palette, theme: Theme, inline: bool, delay: u64) -> Self {
        let max_results = u16::try_from(palette.config().max_results).unwrap_or(u16::MAX);
        Self {
            theme,
            inline,
            delay: Duration::from_millis(delay),
            max_results,
            service,
            debounce_token: Arc::new(Mutex::new(None)),
            pending: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(RwLock::new(palette)),
        }
    }

    /// Opens the palette on the given mode, optionally with a query already typed
    pub fn open(&self, mode: ModeKind, query: Option<String>) -> Action {
        let mut requests = Vec::new();
        {
            let mut palette = self.state.write();
            if mode != ModeKind::Normal {
                requests.extend(palette.enter_mode(mode));
            }
            if let Some(query) = query {
                requests.extend(palette.set_query(query));
            }
        }
        self.dispatch(requests)
    }

    /// Runs a key through the palette and performs the resulting requests
    fn handle(&self, key: PaletteKey) -> Action {
        let requests = self.state.write().handle_key(key);
        self.dispatch(requests)
    }

    /// Performs the requests of the palette.
    ///
    /// Hiding or closing the window quits the app, query-keyed requests are debounced and the rest run right away.
    fn dispatch(&self, requests: Vec<Request>) -> Action {
        let mut action = Action::NoOp;
        let mut debounced = Vec::new();
        for request in requests {
            match request {
                Request::HideWindow | Request::Invoke(Effect::CloseWindow) => action = Action::Quit,
                request if request.is_query_keyed() => debounced.push(request),
                request @ (Request::Invoke(_) | Request::RecordUsage { .. }) => {
                    let handle = self.spawn(request);
                    let mut pending = self.pending.lock();
                    pending.retain(|h| !h.is_finished());
                    pending.push(handle);
                }
                request => {
                    self.spawn(request);
                }
            }
        }
        if !debounced.is_empty() {
            self.schedule_debounced(debounced);
        }
        action
    }

    /// Performs a request in the background, feeding its completion back into the palette
    fn spawn(&self, request: Request) -> JoinHandle<()> {
        let service = self.service.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            if let Some(completion) = service.execute(request).await {
                state.write().complete(completion);
            }
        })
    }

    /// Performs the requests once no other input arrived for the configured delay
    fn schedule_debounced(&self, requests: Vec<Request>) {
        let token = CancellationToken::new();
        if let Some(previous) = self.debounce_token.lock().replace(token.clone()) {
            previous.cancel();
        }

        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(this.delay) => {
                    for request in requests {
                        this.spawn(request);
                    }
                }
            }
        });
    }

    /// Renders the query line, with the mode indicator and the placeholder when empty
    fn render_query(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let label = mode_label(palette.mode());
        let query = palette.query();
        let text = if query.is_empty() {
            Span::styled(palette.mode().placeholder(), Style::from_crossterm(self.theme.secondary))
        } else {
            Span::styled(query, Style::from_crossterm(self.theme.primary))
        };

        let inner = if self.inline {
            let prefix = format!("{label} › ");
            let prefix_width = prefix.width() as u16;
            let line = Line::from(vec![Span::styled(prefix, Style::from_crossterm(self.theme.accent)), text]);
            frame.render_widget(Paragraph::new(line), area);
            Rect {
                x: area.x.saturating_add(prefix_width),
                ..area
            }
        } else {
            let block = Block::bordered()
                .border_style(Style::from_crossterm(self.theme.secondary))
                .title(Span::styled(format!(" {label} "), Style::from_crossterm(self.theme.accent)));
            let inner = block.inner(area);
            frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
            inner
        };

        let typed = query.width() as u16;
        let x = inner.x.saturating_add(typed).min(inner.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }

    /// Renders the candidates, or a notice when there is nothing to show
    fn render_candidates(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let candidates = palette.candidates();
        if candidates.is_empty() {
            let lists_something = !matches!(palette.mode(), Mode::Normal | Mode::Translate(_));
            if !palette.query().is_empty() || lists_something {
                frame.render_widget(
                    Paragraph::new(Span::styled("No results found.", Style::from_crossterm(self.theme.secondary))),
                    area,
                );
            }
            return;
        }

        let items = candidates
            .iter()
            .map(|candidate| {
                let mut spans = vec![Span::styled(candidate.display_name(), Style::from_crossterm(self.theme.primary))];
                if candidate.kind() != CandidateKind::Command {
                    spans.push(Span::styled(format!("  {}", candidate.kind()), Style::from_crossterm(self.theme.secondary)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect::<Vec<_>>();
        let list = List::new(items)
            .highlight_symbol(self.theme.highlight_symbol.as_str())
            .highlight_style(Style::from_crossterm(self.theme.highlight_full()));
        let mut list_state = ListState::default().with_selected(palette.cursor().selected());
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

#[async_trait]
impl Component for PaletteComponent {
    fn name(&self) -> &'static str {
        "PaletteComponent"
    }

    fn min_inline_height(&self) -> u16 {
        // Query, candidates and status
        1 + self.max_results + 1
    }

    #[instrument(skip_all)]
    async fn init(&mut self) -> Result<Action> {
        let requests = self.state.read().start();
        Ok(self.dispatch(requests))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let palette = self.state.read();
        let query_height = if self.inline { 1 } else { 3 };
        let [query_area, list_area, status_area] = Layout::vertical([
            Constraint::Length(query_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_query(frame, query_area, &palette);
        self.render_candidates(frame, list_area, &palette);
        if let Some(status) = palette.status() {
            frame.render_widget(Paragraph::new(Span::styled(status, Style::from_crossterm(self.theme.error))), status_area);
        }
    }

    #[instrument(skip_all)]
    async fn exit(&mut self) -> Result<()> {
        let debounce_token = self.debounce_token.lock().take();
        if let Some(token) = debounce_token {
            token.cancel();
        }
        let pending = mem::take(&mut *self.pending.lock());
        if !pending.is_empty() {
            tracing::debug!("Waiting for {} pending effects", pending.len());
        }
        for handle in pending {
            if let Err(err) = handle.await {
                tracing::error!("Pending effect failed: {err}");
            }
        }
        Ok(())
    }

    fn process_paste_event(&mut self, content: String) -> Result<Action> {
        let pasted = content.replace(['\r', '\n'], " ");
        let requests = {
            let mut palette = self.state.write();
            let query = format!("{}{pasted}", palette.query());
            palette.set_query(query)
        };
        Ok(self.dispatch(requests))
    }

    fn quit(&mut self) -> Result<Action> {
        Ok(self.handle(PaletteKey::Escape))
    }

    fn confirm(&mut self) -> Result<Action> {
        Ok(self.handle(PaletteKey::Enter))
    }

    fn select_next(&mut self) -> Result<Action> {
        Ok(self.handle(PaletteKey::Down))
    }

    fn select_prev(&mut self) -> Result<Action> {
        Ok(self.handle(PaletteKey::Up))
    }

    fn delete_char(&mut self) -> Result<Action> {
        Ok(self.handle(PaletteKey::Backspace))
    }

    fn insert_char(&mut self, c: char) -> Result<Action> {
        Ok(self.handle(PaletteKey::Char(c)))
    }
}

/// Text of the mode indicator
fn mode_label(mode: &Mode) -> String {
    match mode {
        Mode::Normal => String::from("cmdpal"),
        Mode::Emoji => String::from("emoji"),
        Mode::SpecialChars => String::from("special chars"),
        Mode::Clipboard { .. } => String::from("clipboard"),
        Mode::Snippet => String::from("snippets"),
        Mode::Translate(state) => match state.step {
            TranslateStep::Source => String::from("translate"),
            TranslateStep::Target => format!("translate {} →", state.lang_from),
            TranslateStep::Sentence => format!("translate {} → {}", state.lang_from, state.lang_to),
        },
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{
        config::{KeyBindingsConfig, PaletteConfig},
        engine::UsageRanker,
        model::{Catalog, TranslateState},
        service::tests::{FakeGateway, service},
    };

    async fn component() -> (PaletteComponent, PaletteService, Arc<FakeGateway>) {
        let (service, gateway) = service().await;
        let palette = Palette::new(PaletteConfig::default(), UsageRanker::default());
        let component = PaletteComponent::new(service.clone(), palette, Theme::default(), false, 10);
        (component, service, gateway)
    }

    async fn press(component: &mut PaletteComponent, code: KeyCode) -> Action {
        component
            .process_key_event(&KeyBindingsConfig::default(), KeyEvent::new(code, KeyModifiers::NONE))
            .await
            .unwrap()
    }

    async fn type_text(component: &mut PaletteComponent, text: &str) {
        for c in text.chars() {
            press(component, KeyCode::Char(c)).await;
        }
    }

    fn screen(component: &mut PaletteComponent) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| component.render(frame, frame.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_typing_and_quitting() {
        let (mut component, _, _) = component().await;

        type_text(&mut component, "emoji").await;
        assert_eq!(component.state.read().query(), "emoji");

        press(&mut component, KeyCode::Backspace).await;
        assert_eq!(component.state.read().query(), "emoj");

        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        component
            .process_key_event(&KeyBindingsConfig::default(), ctrl_a)
            .await
            .unwrap();
        assert_eq!(component.state.read().query(), "emoj");

        assert!(matches!(press(&mut component, KeyCode::Esc).await, Action::Quit));
    }

    #[tokio::test]
    async fn test_escape_stays_in_pickers() {
        let (mut component, _, _) = component().await;
        component.open(ModeKind::Emoji, None);

        assert!(matches!(press(&mut component, KeyCode::Esc).await, Action::NoOp));
        assert_eq!(*component.state.read().mode(), Mode::Emoji);
    }

    #[tokio::test]
    async fn test_debounced_evaluation() {
        let (mut component, _, _) = component().await;

        type_text(&mut component, "2+2").await;
        assert!(component.state.read().session().calculation.is_none());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let palette = component.state.read();
        let calculation = palette.session().calculation_for("2+2").map(|c| c.value.as_str());
        assert_eq!(calculation, Some("4"));
    }

    #[tokio::test]
    async fn test_effects_finish_on_exit() {
        let (mut component, service, gateway) = component().await;
        component.open(ModeKind::Emoji, None);

        let action = press(&mut component, KeyCode::Enter).await;
        assert!(matches!(action, Action::NoOp));
        assert_eq!(*component.state.read().mode(), Mode::Normal);

        component.exit().await.unwrap();
        assert!(matches!(gateway.invoked.lock().as_slice(), [Effect::CopyText(_)]));
        let usage = service.load_usage().await.unwrap();
        assert_eq!(usage.ranked(Catalog::Emoji).len(), 1);
    }

    #[tokio::test]
    async fn test_paste_appends_to_query() {
        let (mut component, _, _) = component().await;
        type_text(&mut component, "yt:").await;

        component.process_paste_event(String::from("rust\nlang")).unwrap();
        assert_eq!(component.state.read().query(), "yt:rust lang");
    }

    #[tokio::test]
    async fn test_render() {
        let (mut component, _, _) = component().await;

        let text = screen(&mut component);
        assert!(text.contains("cmdpal"));
        assert!(text.contains("Type a command or search..."));

        component.open(ModeKind::Emoji, Some(String::from("zzzzqqq")));
        let text = screen(&mut component);
        assert!(text.contains("emoji"));
        assert!(text.contains("No results found."));
    }

    #[test]
    fn test_mode_label() {
        let state = TranslateState {
            step: TranslateStep::Sentence,
            lang_from: String::from("en"),
            lang_to: String::from("fr"),
            outcome: None,
        };
        assert_eq!(mode_label(&Mode::Translate(state)), "translate en → fr");
        assert_eq!(mode_label(&Mode::SpecialChars), "special chars");
    }
}
