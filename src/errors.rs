use std::{
    fmt, io,
    panic::{self, UnwindSafe},
    path::PathBuf,
    process,
};

use color_eyre::{Report, Section, config::HookBuilder, owo_colors::style};
use futures_util::FutureExt;
use tokio::sync::mpsc;

/// Result type whose error defaults to [`AppError`]
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Top-level error of the palette
#[derive(Debug)]
pub enum AppError {
    /// A recoverable failure, whose message can be displayed to the user
    UserFacing(UserFacingError),
    /// An unexpected error, most probably a bug
    Unexpected(Report),
}

/// Recoverable failures of the capability gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFacingError {
    /// The effector is not available on the current platform
    UnsupportedPlatform(&'static str),
    /// An external command run by an effector exited unsuccessfully
    EffectFailed(String),
    /// The expression couldn't be evaluated into a finite number
    InvalidExpression,
    /// The system clipboard couldn't be accessed
    ClipboardUnavailable,
    /// The file search couldn't be performed
    FileSearchFailed(String),
    /// The translation request failed
    TranslationFailed(String),
}

impl fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserFacingError::UnsupportedPlatform(what) => write!(f, "{what} is not supported on this platform"),
            UserFacingError::EffectFailed(reason) => write!(f, "System action failed: {reason}"),
            UserFacingError::InvalidExpression => write!(f, "Invalid expression"),
            UserFacingError::ClipboardUnavailable => write!(f, "Clipboard is not available"),
            UserFacingError::FileSearchFailed(reason) => write!(f, "File search failed: {reason}"),
            UserFacingError::TranslationFailed(reason) => write!(f, "Translation failed: {reason}"),
        }
    }
}

impl std::error::Error for UserFacingError {}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UserFacing(err) => write!(f, "{err}"),
            AppError::Unexpected(report) => write!(f, "{report}"),
        }
    }
}

impl AppError {
    /// Converts this error into a report
    pub fn into_report(self) -> Report {
        match self {
            AppError::UserFacing(err) => Report::new(err),
            AppError::Unexpected(report) => report,
        }
    }
}

impl From<UserFacingError> for AppError {
    fn from(err: UserFacingError) -> Self {
        AppError::UserFacing(err)
    }
}

impl From<Report> for AppError {
    fn from(report: Report) -> Self {
        AppError::Unexpected(report)
    }
}

macro_rules! impl_from_unexpected {
    ($($err:ty),*) => {
        $(
            impl From<$err> for AppError {
                fn from(err: $err) -> Self {
                    AppError::Unexpected(Report::new(err))
                }
            }
        )*
    };
}
impl_from_unexpected!(io::Error, rusqlite::Error, rusqlite_migration::Error, reqwest::Error, tokio::task::JoinError);

/// Initializes error and panics handling
pub async fn init<F>(log_path: Option<PathBuf>, fut: F) -> color_eyre::Result<()>
where
    F: Future<Output = color_eyre::Result<()>> + UnwindSafe,
{
    tracing::trace!("Initializing error handlers");
    let panic_section = if let Some(log_path) = log_path {
        format!("This is a bug.\nLogs can be found at {}", log_path.display())
    } else {
        String::from(
            "This is a bug.\nLogs were not generated, consider enabling them on the config or running with \
             CMDPAL_LOG=debug.",
        )
    };
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(panic_section.clone())
        .display_env_section(false)
        .display_location_section(true)
        .capture_span_trace_by_default(true)
        .into_hooks();

    let (panic_tx, mut panic_rx) = mpsc::channel(1);

    eyre_hook.install()?;
    panic::set_hook(Box::new(move |panic_info| {
        // The terminal might still be in raw mode here, the report is printed once the main future is dropped
        let panic_report = panic_hook.panic_report(panic_info).to_string();
        tracing::error!("Error: {}", strip_ansi_escapes::strip_str(&panic_report));
        if panic_tx.try_send(panic_report).is_err() {
            tracing::error!("Error sending panic report");
            process::exit(2);
        }
    }));

    tokio::select! {
        biased;
        panic_report = panic_rx.recv().fuse() => {
            if let Some(report) = panic_report {
                eprintln!("{report}");
            } else {
                eprintln!(
                    "{}\n\n{panic_section}",
                    style().bright_red().style("A panic occurred, but the detailed report could not be captured.")
                );
                tracing::error!("A panic occurred, but the detailed report could not be captured.");
            }
            process::exit(1);
        }
        res = Box::pin(fut).catch_unwind() => {
            match res {
                Ok(r) => r
                    .with_section(move || panic_section)
                    .inspect_err(|err| tracing::error!("Error: {}", strip_ansi_escapes::strip_str(format!("{err:?}")))),
                Err(err) => {
                    if let Ok(report) = panic_rx.try_recv() {
                        eprintln!("{report}");
                    } else if let Some(err) = err.downcast_ref::<&str>() {
                        print_panic_msg(err, &panic_section);
                    } else if let Some(err) = err.downcast_ref::<String>() {
                        print_panic_msg(err, &panic_section);
                    } else {
                        eprintln!(
                            "{}\n\n{panic_section}",
                            style().bright_red().style("An unexpected panic happened")
                        );
                        tracing::error!("An unexpected panic happened");
                    }
                    process::exit(1);
                }
            }
        }
    }
}

fn print_panic_msg(err: impl AsRef<str>, panic_section: &str) {
    let err = err.as_ref();
    eprintln!(
        "{}\nMessage: {}\n\n{panic_section}",
        style().bright_red().style("The palette panicked (crashed)."),
        style().blue().style(err)
    );
    tracing::error!("Panic: {err}");
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_facing_display() {
        let err = AppError::from(UserFacingError::UnsupportedPlatform("Brightness control"));
        assert_eq!(err.to_string(), "Brightness control is not supported on this platform");
        assert!(matches!(err, AppError::UserFacing(_)));

        let err = AppError::from(eyre!("boom"));
        assert!(matches!(err, AppError::Unexpected(_)));
        assert_eq!(err.into_report().to_string(), "boom");
    }
}
