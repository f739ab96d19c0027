use super::{
    Calculation, Completion, Request, SelectionCursor, Session, UsageRanker, grammar,
    machine::{self, Transition},
    resolve,
};
use crate::{
    config::PaletteConfig,
    model::{Activation, Candidate, Effect, FileResult, Mode, ModeKind, TranslateOutcome, TranslateStep},
};

/// A key the palette reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteKey {
    Up,
    Down,
    Enter,
    Backspace,
    Escape,
    Char(char),
}

/// The palette session: query, active mode, candidates and selection.
///
/// Every input is processed to completion and returns the [`Request`]s the host must perform. Data-producing requests
/// carry a token, and their [`Completion`] is discarded if the palette moved on since they were issued.
#[derive(Debug)]
pub struct Palette {
    config: PaletteConfig,
    query: String,
    mode: Mode,
    session: Session,
    usage: UsageRanker,
    candidates: Vec<Candidate>,
    cursor: SelectionCursor,
    /// Bumped on every query or mode change
    generation: u64,
    /// Generation at which the current mode was entered
    mode_since: u64,
    /// Generation at which the clipboard history was activated while the cached one was empty
    clipboard_pending: Option<u64>,
    /// Transient message about the last failure
    status: Option<String>,
}

impl Palette {
    /// Creates a new palette in normal mode, with an empty query
    pub fn new(config: PaletteConfig, usage: UsageRanker) -> Self {
        let mut palette = Self {
            config,
            query: String::new(),
            mode: Mode::Normal,
            session: Session::default(),
            usage,
            candidates: Vec::new(),
            cursor: SelectionCursor::default(),
            generation: 0,
            mode_since: 0,
            clipboard_pending: None,
            status: None,
        };
        palette.resolve();
        palette
    }

    /// Requests loading the session data
    pub fn start(&self) -> Vec<Request> {
        vec![
            Request::ListApplications,
            Request::ListSnippets,
            Request::FetchClipboard {
                token: self.mode_since,
            },
        ]
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn usage(&self) -> &UsageRanker {
        &self.usage
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn cursor(&self) -> SelectionCursor {
        self.cursor
    }

    /// The candidate at the cursor, if any
    pub fn selected(&self) -> Option<&Candidate> {
        self.cursor.selected().and_then(|i| self.candidates.get(i))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Replaces the whole query
    pub fn set_query(&mut self, query: impl Into<String>) -> Vec<Request> {
        let query = query.into();
        if query == self.query {
            return Vec::new();
        }
        self.query = query;
        self.on_query_changed()
    }

    /// Handles a key press, mode-specific interceptions first
    pub fn handle_key(&mut self, key: PaletteKey) -> Vec<Request> {
        match key {
            PaletteKey::Char(c) => {
                let mut query = self.query.clone();
                query.push(c);
                self.set_query(query)
            }
            PaletteKey::Backspace => match machine::on_backspace(&self.mode, &self.query) {
                Some(transition) => self.apply(transition),
                None => {
                    let mut query = self.query.clone();
                    query.pop();
                    self.set_query(query)
                }
            },
            PaletteKey::Enter => match machine::on_enter(&self.mode, &self.query) {
                Some(transition) => self.apply(transition),
                None => self.activate_selected(),
            },
            PaletteKey::Up => {
                self.cursor.select_prev();
                Vec::new()
            }
            PaletteKey::Down => {
                self.cursor.select_next();
                Vec::new()
            }
            PaletteKey::Escape if self.mode.is_picker() => Vec::new(),
            PaletteKey::Escape => vec![Request::HideWindow],
        }
    }

    /// Activates the candidate at the cursor
    pub fn activate_selected(&mut self) -> Vec<Request> {
        match self.selected() {
            Some(candidate) => {
                let activation = candidate.activation();
                self.activate(activation)
            }
            None => Vec::new(),
        }
    }

    /// Runs an activation
    pub fn activate(&mut self, activation: Activation) -> Vec<Request> {
        match activation {
            Activation::Inert => Vec::new(),
            Activation::EnterMode(ModeKind::Clipboard) if self.session.clipboard.is_empty() => {
                tracing::debug!("Cached clipboard history is empty, refreshing it");
                self.clipboard_pending = Some(self.generation);
                vec![Request::FetchClipboard {
                    token: self.generation,
                }]
            }
            Activation::EnterMode(ModeKind::Snippet) if self.session.snippets.is_empty() => {
                tracing::debug!("There are no snippets");
                Vec::new()
            }
            Activation::EnterMode(kind) => self.enter_mode(kind),
            Activation::Invoke(effect) => vec![Request::Invoke(effect)],
            Activation::ReplaceQuery(text) => {
                self.session.calculation = None;
                self.set_query(text)
            }
            Activation::SearchFiles(term) => vec![Request::SearchFiles {
                token: self.generation,
                term,
            }],
            Activation::CopyAndExit(text) | Activation::CopyTranslation(text) => {
                let mut requests = vec![Request::Invoke(Effect::CopyText(text))];
                requests.extend(self.apply(machine::enter(ModeKind::Normal, &[])));
                requests
            }
            Activation::CopyGlyph { catalog, name, glyph } => {
                let count = self.usage.record(catalog, name);
                tracing::debug!("Copied {catalog} '{name}', used {count} times");
                let mut requests = vec![
                    Request::Invoke(Effect::CopyText(glyph.to_owned())),
                    Request::RecordUsage {
                        catalog,
                        name: name.to_owned(),
                    },
                ];
                requests.extend(self.apply(machine::enter(ModeKind::Normal, &[])));
                requests
            }
        }
    }

    /// Enters the given mode, clearing the query
    pub fn enter_mode(&mut self, kind: ModeKind) -> Vec<Request> {
        let mut requests = self.apply(machine::enter(kind, &self.session.clipboard));
        if kind == ModeKind::Clipboard {
            requests.push(Request::FetchClipboard {
                token: self.mode_since,
            });
        }
        requests
    }

    /// Applies the outcome of a previous request
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Evaluated {
                token,
                expression,
                result,
            } => {
                if !self.is_current(token, "evaluation") {
                    return;
                }
                self.session.calculation = match result {
                    Ok(value) if value.is_finite() => Some(Calculation {
                        expression,
                        value: value.to_string(),
                    }),
                    Ok(_) => None,
                    Err(err) => {
                        tracing::debug!("Couldn't evaluate '{expression}': {err}");
                        None
                    }
                };
            }
            Completion::FilesFound { token, result } => {
                if !self.is_current(token, "file search") {
                    return;
                }
                match result {
                    Ok(paths) => {
                        self.session.file_results = paths
                            .into_iter()
                            .map(|path| FileResult {
                                name: path.clone(),
                                path,
                            })
                            .collect();
                    }
                    Err(err) => {
                        tracing::warn!("File search failed: {err}");
                        self.session.file_results.clear();
                        self.status = Some(err.to_string());
                    }
                }
            }
            Completion::Translated { token, result } => {
                if !self.is_current(token, "translation") {
                    return;
                }
                let Mode::Translate(state) = &mut self.mode else {
                    return;
                };
                if state.step != TranslateStep::Sentence {
                    return;
                }
                state.outcome = Some(match result {
                    Ok(text) => TranslateOutcome::Translated(text),
                    Err(err) => {
                        tracing::warn!("Translation failed: {err}");
                        TranslateOutcome::Failed
                    }
                });
            }
            Completion::Clipboard { token, result } => {
                let pending = self.clipboard_pending.take_if(|pending| *pending == token);
                match result {
                    Ok(items) => {
                        if token == self.mode_since
                            && let Mode::Clipboard { snapshot } = &mut self.mode
                        {
                            snapshot.clone_from(&items);
                        }
                        self.session.clipboard = items;
                        // Enters the history the user asked for, unless the palette moved on meanwhile
                        if pending.is_some_and(|pending| pending == self.generation)
                            && self.mode == Mode::Normal
                            && !self.session.clipboard.is_empty()
                        {
                            self.apply(machine::enter(ModeKind::Clipboard, &self.session.clipboard));
                            return;
                        }
                    }
                    Err(err) => tracing::warn!("Couldn't fetch clipboard history: {err}"),
                }
            }
            Completion::Applications(result) => match result {
                Ok(applications) => self.session.applications = applications,
                Err(err) => tracing::warn!("Couldn't list applications: {err}"),
            },
            Completion::Snippets(result) => match result {
                Ok(snippets) => self.session.snippets = snippets,
                Err(err) => tracing::warn!("Couldn't list snippets: {err}"),
            },
        }
        self.resolve();
    }

    fn is_current(&self, token: u64, what: &str) -> bool {
        if token == self.generation {
            true
        } else {
            tracing::trace!("Discarding stale {what} [{token}], current is {}", self.generation);
            false
        }
    }

    fn apply(&mut self, transition: Transition) -> Vec<Request> {
        let changed = transition.mode.kind() != self.mode.kind();
        if changed {
            tracing::debug!("Mode transition: {} -> {}", self.mode.kind(), transition.mode.kind());
        }
        self.mode = transition.mode;
        self.query = transition.query;
        let requests = self.on_query_changed();
        if changed {
            self.mode_since = self.generation;
        }
        requests
    }

    fn on_query_changed(&mut self) -> Vec<Request> {
        self.generation += 1;
        self.status = None;

        if self.session.calculation_for(&self.query).is_none() {
            self.session.calculation = None;
        }
        if !self.query.to_lowercase().contains("search file") {
            self.session.file_results.clear();
        }
        if let Mode::Translate(state) = &mut self.mode
            && self.query.trim().is_empty()
        {
            state.outcome = None;
        }

        self.resolve();
        self.query_requests()
    }

    /// Requests keyed by the current query
    fn query_requests(&self) -> Vec<Request> {
        match &self.mode {
            Mode::Normal if grammar::is_expression(&self.query) => vec![Request::Evaluate {
                token: self.generation,
                expression: self.query.trim().to_owned(),
            }],
            Mode::Translate(state) if state.step == TranslateStep::Sentence && !self.query.trim().is_empty() => {
                let from = if state.lang_from.is_empty() {
                    String::from("auto")
                } else {
                    state.lang_from.clone()
                };
                vec![Request::Translate {
                    token: self.generation,
                    sentence: self.query.clone(),
                    from,
                    to: state.lang_to.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn resolve(&mut self) {
        self.candidates = resolve(&self.mode, &self.query, &self.session, &self.usage, &self.config);
        self.cursor.reset(self.candidates.len());
    }
}
