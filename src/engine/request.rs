use crate::{
    errors::Result,
    model::{Application, Catalog, Effect, Snippet},
};

/// Work the palette asks its host to perform after handling an input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Runs an effector, without waiting for it
    Invoke(Effect),
    /// Hides the host window
    HideWindow,
    /// Evaluates an arithmetic expression
    Evaluate { token: u64, expression: String },
    /// Searches local files by name
    SearchFiles { token: u64, term: String },
    /// Translates a sentence
    Translate {
        token: u64,
        sentence: String,
        from: String,
        to: String,
    },
    /// Lists installed applications
    ListApplications,
    /// Lists the available snippets
    ListSnippets,
    /// Fetches the clipboard history
    FetchClipboard { token: u64 },
    /// Persists one usage of a catalog entry
    RecordUsage { catalog: Catalog, name: String },
}

impl Request {
    /// Whether this request is keyed by the query, and should be debounced while typing
    pub fn is_query_keyed(&self) -> bool {
        matches!(self, Request::Evaluate { .. } | Request::Translate { .. })
    }
}

/// The outcome of a data-producing [`Request`], fed back into the palette
#[derive(Debug)]
pub enum Completion {
    Evaluated {
        token: u64,
        expression: String,
        result: Result<f64>,
    },
    FilesFound {
        token: u64,
        result: Result<Vec<String>>,
    },
    Translated {
        token: u64,
        result: Result<String>,
    },
    Clipboard {
        token: u64,
        result: Result<Vec<String>>,
    },
    Applications(Result<Vec<Application>>),
    Snippets(Result<Vec<Snippet>>),
}
