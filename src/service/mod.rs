use std::sync::Arc;

use tracing::instrument;

use crate::{
    engine::{Completion, Request},
    gateway::Gateway,
    storage::SqliteStorage,
};

mod usage;

pub use usage::UsageEntry;

/// Service performing the requests of the palette, through the capability gateway and the storage
#[derive(Clone)]
pub struct PaletteService {
    gateway: Arc<dyn Gateway>,
    storage: SqliteStorage,
}

impl PaletteService {
    /// Creates a new instance of `PaletteService`
    pub fn new(gateway: Arc<dyn Gateway>, storage: SqliteStorage) -> Self {
        Self { gateway, storage }
    }

    /// Performs a request, returning the completion to feed back into the palette if it produces data.
    ///
    /// Failures of effectors and usage recording are logged and swallowed, data failures travel inside the completion.
    #[instrument(skip_all)]
    pub async fn execute(&self, request: Request) -> Option<Completion> {
        match request {
            Request::Invoke(effect) => {
                tracing::debug!("Invoking {effect:?}");
                if let Err(err) = self.gateway.invoke(effect).await {
                    tracing::warn!("Effector failed: {err}");
                }
                None
            }
            Request::HideWindow => None,
            Request::Evaluate { token, expression } => {
                let result = self.gateway.evaluate_expression(&expression).await;
                Some(Completion::Evaluated {
                    token,
                    expression,
                    result,
                })
            }
            Request::SearchFiles { token, term } => Some(Completion::FilesFound {
                token,
                result: self.gateway.search_files(&term).await,
            }),
            Request::Translate {
                token,
                sentence,
                from,
                to,
            } => Some(Completion::Translated {
                token,
                result: self.gateway.translate(&sentence, &from, &to).await,
            }),
            Request::ListApplications => Some(Completion::Applications(self.gateway.list_applications().await)),
            Request::ListSnippets => Some(Completion::Snippets(self.gateway.list_snippets().await)),
            Request::FetchClipboard { token } => Some(Completion::Clipboard {
                token,
                result: self.gateway.clipboard_history().await,
            }),
            Request::RecordUsage { catalog, name } => {
                match self.storage.increment_usage(catalog, &name).await {
                    Ok(count) => tracing::debug!("Usage of {catalog} '{name}' is now {count}"),
                    Err(err) => tracing::warn!("Couldn't record usage of {catalog} '{name}': {err}"),
                }
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        errors::{Result, UserFacingError},
        model::{Application, Catalog, Effect, Snippet},
    };

    /// In-memory gateway recording the invoked effects
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub(crate) invoked: Mutex<Vec<Effect>>,
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn list_applications(&self) -> Result<Vec<Application>> {
            Ok(vec![Application {
                name: String::from("Firefox"),
                path: String::from("/usr/share/applications/firefox.desktop"),
            }])
        }

        async fn list_snippets(&self) -> Result<Vec<Snippet>> {
            Ok(vec![Snippet {
                name: String::from("greeting"),
                content: String::from("Hello there!"),
            }])
        }

        async fn clipboard_history(&self) -> Result<Vec<String>> {
            Ok(vec![String::from("copied text")])
        }

        async fn evaluate_expression(&self, expression: &str) -> Result<f64> {
            match expression {
                "2+2" => Ok(4.0),
                _ => Err(UserFacingError::InvalidExpression.into()),
            }
        }

        async fn search_files(&self, term: &str) -> Result<Vec<String>> {
            Ok(vec![format!("/home/me/{term}")])
        }

        async fn translate(&self, sentence: &str, _from: &str, to: &str) -> Result<String> {
            match (sentence, to) {
                ("hello", "fr") => Ok(String::from("bonjour")),
                _ => Err(UserFacingError::TranslationFailed(String::from("unknown sentence")).into()),
            }
        }

        async fn invoke(&self, effect: Effect) -> Result<()> {
            if effect == Effect::EmptyTrash {
                return Err(UserFacingError::UnsupportedPlatform("System management").into());
            }
            self.invoked.lock().push(effect);
            Ok(())
        }
    }

    pub(crate) async fn service() -> (PaletteService, Arc<FakeGateway>) {
        let gateway = Arc::new(FakeGateway::default());
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        (PaletteService::new(gateway.clone(), storage), gateway)
    }

    #[tokio::test]
    async fn test_execute_data_requests() {
        let (service, _) = service().await;

        let completion = service
            .execute(Request::Evaluate {
                token: 7,
                expression: String::from("2+2"),
            })
            .await;
        assert!(matches!(
            completion,
            Some(Completion::Evaluated { token: 7, ref expression, result: Ok(value) }) if expression == "2+2" && value == 4.0
        ));

        let completion = service
            .execute(Request::Translate {
                token: 3,
                sentence: String::from("hello"),
                from: String::from("auto"),
                to: String::from("fr"),
            })
            .await;
        assert!(matches!(
            completion,
            Some(Completion::Translated { token: 3, result: Ok(ref text) }) if text == "bonjour"
        ));

        let completion = service.execute(Request::ListApplications).await;
        assert!(matches!(completion, Some(Completion::Applications(Ok(ref apps))) if apps.len() == 1));
    }

    #[tokio::test]
    async fn test_execute_effects() {
        let (service, gateway) = service().await;

        assert!(service.execute(Request::Invoke(Effect::MediaPlay)).await.is_none());
        // Failures are swallowed
        assert!(service.execute(Request::Invoke(Effect::EmptyTrash)).await.is_none());
        assert!(service.execute(Request::HideWindow).await.is_none());

        assert_eq!(*gateway.invoked.lock(), vec![Effect::MediaPlay]);
    }

    #[tokio::test]
    async fn test_execute_record_usage() {
        let (service, _) = service().await;
        for _ in 0..2 {
            let completion = service
                .execute(Request::RecordUsage {
                    catalog: Catalog::Emoji,
                    name: String::from("fire"),
                })
                .await;
            assert!(completion.is_none());
        }

        let usage = service.load_usage().await.unwrap();
        assert_eq!(usage.count(Catalog::Emoji, "fire"), 2);
    }
}
