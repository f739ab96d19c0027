use std::{collections::VecDeque, sync::Arc, thread, time::Duration};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::errors::{Result, UserFacingError};

/// A bounded history of the texts copied into the system clipboard
#[derive(Clone)]
pub struct ClipboardHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

struct HistoryInner {
    capacity: usize,
    items: VecDeque<String>,
    unavailable: bool,
}

impl ClipboardHistory {
    /// Creates an empty history keeping at most `capacity` texts
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HistoryInner {
                capacity,
                items: VecDeque::with_capacity(capacity),
                unavailable: false,
            })),
        }
    }

    /// Records a copied text, returning whether it was added.
    ///
    /// Blank texts and texts equal to the latest one are skipped. The oldest text is evicted when full.
    pub fn push(&self, text: String) -> bool {
        let mut inner = self.inner.lock();
        if text.trim().is_empty() || inner.items.back() == Some(&text) || inner.capacity == 0 {
            return false;
        }
        if inner.items.len() == inner.capacity {
            inner.items.pop_front();
        }
        inner.items.push_back(text);
        true
    }

    /// Returns the recorded texts, oldest first
    pub fn snapshot(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock();
        if inner.unavailable && inner.items.is_empty() {
            return Err(UserFacingError::ClipboardUnavailable.into());
        }
        Ok(inner.items.iter().cloned().collect())
    }

    /// Polls the system clipboard on a dedicated thread, until the token is cancelled
    pub fn spawn_poller(&self, interval: Duration, cancellation_token: CancellationToken) {
        let history = self.clone();
        let spawned = thread::Builder::new()
            .name(String::from("clipboard-poller"))
            .spawn(move || {
                let mut clipboard = match arboard::Clipboard::new() {
                    Ok(clipboard) => clipboard,
                    Err(err) => {
                        tracing::warn!("Clipboard history is disabled: {err}");
                        history.inner.lock().unavailable = true;
                        return;
                    }
                };
                while !cancellation_token.is_cancelled() {
                    if let Ok(text) = clipboard.get_text()
                        && history.push(text)
                    {
                        tracing::trace!("Recorded a new clipboard entry");
                    }
                    thread::sleep(interval);
                }
            });
        if let Err(err) = spawned {
            tracing::warn!("Couldn't spawn the clipboard poller: {err}");
            self.inner.lock().unavailable = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_push_skips_blank_and_repeated() {
        let history = ClipboardHistory::new(10);
        assert!(history.push(String::from("first")));
        assert!(!history.push(String::from("first")));
        assert!(!history.push(String::from("  \n")));
        assert!(history.push(String::from("second")));
        assert!(history.push(String::from("first")));

        assert_eq!(history.snapshot().unwrap(), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_push_evicts_oldest() {
        let history = ClipboardHistory::new(3);
        for text in ["a", "b", "c", "d"] {
            history.push(String::from(text));
        }
        assert_eq!(history.snapshot().unwrap(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_snapshot_unavailable() {
        let history = ClipboardHistory::new(3);
        history.inner.lock().unavailable = true;
        assert!(history.snapshot().is_err());
    }
}
