// Logging for baton
//
// baton itself only emits `tracing` events; nothing is printed unless the
// application installs a subscriber. This module offers a few ready-made
// subscribers so that binaries and tests do not have to wire up
// `tracing-subscriber` themselves.
//
// What the library logs:
// - TRACE  every delivery decision (`inbox`, `delivery`, `pending`)
// - DEBUG  drain spans and drain completion (`inbox`, `depth`, `executed`)
// - WARN   backlog / inline nesting thresholds from `InboxConfig`,
//          probes created inside a drain
// - ERROR  an operation panicked and its drain was abandoned
//
// ```rust
// use baton::logging;
//
// // INFO and up, human readable
// logging::init(logging::LogConfig::default());
//
// // or: everything baton does, with thread ids, for chasing a handoff
// logging::init_development();
// ```
//
// Only the first initialization in a process takes effect.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

#[doc(hidden)]
pub use tracing as __tracing;

/// Settings for the subscribers installed by this module.
///
/// ```rust
/// use baton::logging::LogConfig;
/// use tracing::Level;
///
/// let config = LogConfig {
///     level: Level::DEBUG,
///     target_filters: Some("baton::inbox=trace".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level for everything not matched by `target_filters`
    pub level: Level,
    /// Emit one JSON object per event instead of text
    pub json_format: bool,
    /// Include source file and line
    pub show_file_line: bool,
    /// Include thread names and ids; handy since drains hop threads
    pub show_thread_info: bool,
    /// Include timestamps
    pub show_time: bool,
    /// Extra directives, "target=level,target2=level2"
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

static INIT: Once = Once::new();

impl LogConfig {
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::from_default_env().add_directive(self.level.into());
        if let Some(filters) = &self.target_filters {
            for directive in filters.split(',').filter(|d| !d.trim().is_empty()) {
                match directive.trim().parse() {
                    Ok(directive) => filter = filter.add_directive(directive),
                    Err(err) => eprintln!("ignoring log filter {:?}: {}", directive, err),
                }
            }
        }
        filter
    }

    fn console_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_file(self.show_file_line)
            .with_line_number(self.show_file_line)
            .with_thread_names(self.show_thread_info)
            .with_thread_ids(self.show_thread_info);

        match (self.json_format, self.show_time) {
            (true, true) => base.json().flatten_event(true).boxed(),
            (true, false) => base.json().flatten_event(true).without_time().boxed(),
            (false, true) => base.with_ansi(atty::is(atty::Stream::Stdout)).boxed(),
            (false, false) => base.with_ansi(atty::is(atty::Stream::Stdout)).without_time().boxed(),
        }
    }
}

/// Installs a console subscriber built from `config`.
pub fn init(config: LogConfig) {
    install(|| {
        tracing_subscriber::registry()
            .with(config.console_layer())
            .with(config.env_filter())
    });
}

/// Installs a console subscriber plus a plain-text copy appended to `path`.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] if logging was already
/// initialized in this process, in which case no file is created and the
/// existing subscriber stays in place. The file is opened before anything
/// is installed, so an unwritable path returns its I/O error and also
/// leaves logging untouched.
pub fn init_with_file(config: LogConfig, path: impl AsRef<Path>) -> io::Result<()> {
    if INIT.is_completed() {
        return Err(already_initialized());
    }
    let file = open_log_file(path.as_ref())?;
    let installed = install(move || {
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true)
            .boxed();

        tracing_subscriber::registry()
            .with(vec![config.console_layer(), file_layer])
            .with(config.env_filter())
    });
    if installed { Ok(()) } else { Err(already_initialized()) }
}

/// Runs `build` and installs its subscriber if this is the first
/// initialization in the process. Returns whether it was.
fn install<S, F>(build: F) -> bool
where
    S: Subscriber + Send + Sync + 'static,
    F: FnOnce() -> S,
{
    let mut installed = false;
    INIT.call_once(|| {
        installed = set_global_subscriber(build());
    });
    installed
}

fn already_initialized() -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        "logging is already initialized; file output was not installed",
    )
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn set_global_subscriber<S>(subscriber: S) -> bool
where
    S: Subscriber + Send + Sync + 'static,
{
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Error setting global tracing subscriber: {}", err);
            false
        }
    }
}

/// DEBUG everywhere, TRACE for baton, with thread info.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        target_filters: Some("baton=trace".to_string()),
        ..Default::default()
    });
}

/// INFO, JSON lines, no source locations.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        ..Default::default()
    });
}

/// WARN and up without timestamps or thread info, to keep test output short.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        show_thread_info: false,
        show_time: false,
        ..Default::default()
    });
}

/// The dispatcher active on this thread.
///
/// Drains run on whichever thread sends, so a scoped subscriber set with
/// `tracing::dispatcher::with_default` does not follow an inbox onto a
/// helper thread by itself. Hand this to the new thread and enter it there.
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

/// Span covering one drain of an inbox.
///
/// ```rust
/// let inbox = baton::Inbox::new();
/// let span = baton::drain_span!(inbox, 1);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! drain_span {
    ($inbox:expr, $depth:expr) => {
        $crate::logging::__tracing::debug_span!("drain", inbox = %$inbox, depth = $depth)
    };
    ($inbox:expr, $depth:expr, $($fields:tt)*) => {
        $crate::logging::__tracing::debug_span!("drain", inbox = %$inbox, depth = $depth, $($fields)*)
    };
}

/// Records how a send was handled.
///
/// ```rust
/// use baton::Delivery;
///
/// let inbox = baton::Inbox::new();
/// baton::log_delivery!(inbox, Delivery::Queued, pending = 3);
/// ```
#[macro_export]
macro_rules! log_delivery {
    ($inbox:expr, $delivery:expr) => {
        $crate::logging::__tracing::trace!(inbox = %$inbox, delivery = $delivery.as_str())
    };
    ($inbox:expr, $delivery:expr, $($fields:tt)*) => {
        $crate::logging::__tracing::trace!(inbox = %$inbox, delivery = $delivery.as_str(), $($fields)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.json_format);
        assert!(config.target_filters.is_none());
    }

    #[test]
    fn test_bad_directives_are_skipped() {
        let config = LogConfig {
            target_filters: Some("baton=trace,,=nonsense=".to_string()),
            ..Default::default()
        };
        let rendered = config.env_filter().to_string();
        assert!(rendered.contains("baton=trace"));
    }

    #[test]
    fn test_init_with_file_after_init_reports_error() {
        init_test();
        let path = std::env::temp_dir().join(format!("baton-{}.log", uuid::Uuid::new_v4()));

        let err = init_with_file(LogConfig::default(), &path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(!path.exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        init_test();
        init_development();
        tracing::warn!("still logging after repeated init");
    }
}
