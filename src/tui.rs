use std::{
    cmp,
    io::{self, Stdout, stdout},
    thread,
    time::Duration,
};

use color_eyre::Result;
use crossterm::{
    cursor,
    event::{self, Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style,
    terminal::{self, ClearType},
};
use futures_util::{FutureExt, StreamExt};
use ratatui::{CompletedFrame, Frame, Terminal, backend::CrosstermBackend as Backend, layout::Rect};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::interval,
};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

const FRAME_RATE: f64 = 30.0;

/// Events received by the palette host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The UI should be redrawn
    Render,
    /// Text was pasted into the terminal
    Paste(String),
    /// A key was pressed
    Key(KeyEvent),
    /// The terminal window was resized (columns and rows)
    Resize(u16, u16),
}

/// Owns the terminal while the palette is displayed, translating terminal input into [`Event`]s
pub struct Tui {
    stdout: Stdout,
    terminal: Terminal<Backend<Stdout>>,
    task: JoinHandle<()>,
    loop_token: CancellationToken,
    global_token: CancellationToken,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
    state: Option<State>,
}

#[derive(Clone, Copy)]
enum State {
    FullScreen,
    Inline(InlineArea),
}

/// Where the inline palette is drawn, and where the cursor goes back to afterwards
#[derive(Clone, Copy)]
struct InlineArea {
    min_height: u16,
    x: u16,
    y: u16,
    restore_x: u16,
    restore_y: u16,
}

impl Tui {
    /// Creates a new terminal UI, which cancels the given token on `ctrl+c`
    pub fn new(cancellation_token: CancellationToken) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            stdout: stdout(),
            terminal: Terminal::new(Backend::new(stdout()))?,
            task: tokio::spawn(async {}),
            loop_token: CancellationToken::new(),
            global_token: cancellation_token,
            event_rx,
            event_tx,
            state: None,
        })
    }

    /// Retrieves the next event, or `None` once the event loop has stopped
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Takes over the whole terminal, on the alternate screen
    pub fn enter(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }
        tracing::trace!("Entering a full-screen TUI");
        self.enter_raw_mode(true)?;
        self.state = Some(State::FullScreen);
        self.start();
        Ok(())
    }

    /// Renders below the cursor, reserving at least `min_height` lines
    pub fn enter_inline(&mut self, min_height: u16) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }
        tracing::trace!(min_height, "Entering an inline TUI");

        let (orig_x, orig_y) = cursor::position()?;
        crossterm::execute!(
            self.stdout,
            style::Print("\n".repeat(min_height as usize)),
            cursor::MoveToPreviousLine(min_height),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        let (x, y) = cursor::position()?;
        tracing::trace!("Inline area starts at ({x},{y}), cursor was at ({orig_x},{orig_y})");

        self.enter_raw_mode(false)?;
        self.state = Some(State::Inline(InlineArea {
            min_height,
            x,
            y,
            restore_x: orig_x,
            restore_y: cmp::min(orig_y, y),
        }));
        self.start();
        Ok(())
    }

    /// Draws a frame, the callback receives the area to render in, which is smaller than the frame when inline
    pub fn render<F>(&mut self, render_callback: F) -> io::Result<CompletedFrame<'_>>
    where
        F: FnOnce(&mut Frame, Rect),
    {
        let Some(state) = self.state else {
            return Err(io::Error::other("Cannot render on a non-entered TUI"));
        };

        self.terminal.draw(|frame| {
            let area = match state {
                State::FullScreen => frame.area(),
                State::Inline(inline) => {
                    let full = frame.area();
                    let y = cmp::min(inline.y, full.height.saturating_sub(1));
                    let height = cmp::max(cmp::min(full.height, inline.min_height), full.height - y);
                    Rect::new(inline.x, y, full.width.saturating_sub(inline.x), height).intersection(full)
                }
            };
            render_callback(frame, area);
        })
    }

    /// Stops the event loop and gives the terminal back
    pub fn exit(mut self) -> Result<()> {
        self.stop();
        self.restore_terminal()
    }

    fn restore_terminal(&mut self) -> Result<()> {
        match self.state.take() {
            None => (),
            Some(State::FullScreen) => {
                tracing::trace!("Leaving the full-screen TUI");
                self.terminal.flush()?;
                self.exit_raw_mode(true)?;
            }
            Some(State::Inline(area)) => {
                tracing::trace!("Leaving the inline TUI");
                self.terminal.flush()?;
                self.exit_raw_mode(false)?;
                crossterm::execute!(
                    self.stdout,
                    cursor::MoveTo(area.restore_x, area.restore_y),
                    terminal::Clear(ClearType::FromCursorDown)
                )?;
            }
        }
        Ok(())
    }

    fn enter_raw_mode(&mut self, alt_screen: bool) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(self.stdout, cursor::Hide, event::EnableBracketedPaste)?;
        if alt_screen {
            crossterm::execute!(self.stdout, terminal::EnterAlternateScreen)?;
        }
        Ok(())
    }

    fn exit_raw_mode(&mut self, alt_screen: bool) -> Result<()> {
        crossterm::execute!(self.stdout, event::DisableBracketedPaste)?;
        if alt_screen {
            crossterm::execute!(self.stdout, terminal::LeaveAlternateScreen)?;
        }
        crossterm::execute!(self.stdout, cursor::Show)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn start(&mut self) {
        self.loop_token.cancel();
        self.loop_token = CancellationToken::new();
        tracing::trace!(frame_rate = FRAME_RATE, "Starting the event loop");
        self.task = tokio::spawn(Self::event_loop(
            self.event_tx.clone(),
            self.loop_token.clone(),
            self.global_token.clone(),
        ));
    }

    #[instrument(skip_all)]
    async fn event_loop(
        event_tx: UnboundedSender<Event>,
        loop_token: CancellationToken,
        global_token: CancellationToken,
    ) {
        let mut event_stream = EventStream::new();
        let mut render_interval = interval(Duration::from_secs_f64(1.0 / FRAME_RATE));

        loop {
            let event = tokio::select! {
                biased;

                _ = loop_token.cancelled() => break,
                _ = global_token.cancelled() => break,

                crossterm_event = event_stream.next().fuse() => match crossterm_event {
                    Some(Ok(event)) => match event {
                        // Raw mode swallows SIGINT
                        CrosstermEvent::Key(KeyEvent {
                            code: KeyCode::Char('c'),
                            modifiers: KeyModifiers::CONTROL,
                            ..
                        }) => {
                            tracing::debug!("Ctrl+C pressed, cancelling");
                            global_token.cancel();
                            continue;
                        }
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                        CrosstermEvent::Paste(text) => Event::Paste(text),
                        CrosstermEvent::Resize(cols, rows) => Event::Resize(cols, rows),
                        _ => continue,
                    },
                    Some(Err(err)) => {
                        tracing::error!("Error retrieving next terminal event: {err}");
                        break;
                    }
                    None => break,
                },

                _ = render_interval.tick() => Event::Render,
            };

            if event_tx.send(event).is_err() {
                break;
            }
        }

        loop_token.cancel();
    }

    fn stop(&self) {
        if self.task.is_finished() {
            return;
        }
        tracing::trace!("Stopping the event loop");
        self.loop_token.cancel();
        let mut waited = 0;
        while !self.task.is_finished() {
            thread::sleep(Duration::from_millis(1));
            waited += 1;
            if waited == 50 {
                tracing::debug!("Event loop hasn't finished in 50 milliseconds, aborting");
                self.task.abort();
            }
            if waited > 100 {
                tracing::error!("Failed to abort the event loop in 100 milliseconds");
                break;
            }
        }
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.stop();
        if let Err(err) = self.restore_terminal() {
            tracing::error!("Failed to restore terminal state: {err:?}");
        }
    }
}
