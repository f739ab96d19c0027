use crate::model::{Application, FileResult, Snippet};

/// A calculator result, only valid while the query still reads as the evaluated expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calculation {
    /// The trimmed query that was evaluated
    pub expression: String,
    /// The result, formatted as text
    pub value: String,
}

/// Data gathered from the capability gateway that feeds resolution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Installed applications, listed once at startup
    pub applications: Vec<Application>,
    /// Snippets, listed once at startup
    pub snippets: Vec<Snippet>,
    /// Latest known clipboard history, oldest first
    pub clipboard: Vec<String>,
    pub calculation: Option<Calculation>,
    /// Results of the last file search
    pub file_results: Vec<FileResult>,
}

impl Session {
    /// Returns the calculation if it was computed for the given query
    pub fn calculation_for(&self, query: &str) -> Option<&Calculation> {
        self.calculation.as_ref().filter(|c| c.expression == query.trim())
    }
}
