use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- level helpers --------

/// `None` turns the output off; unknown names fall back to INFO.
fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" | "" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" | "none" => None,
        _ => Some(LevelFilter::INFO),
    }
}

// -------- rotating file writer --------

type SharedRotate = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct RotWriter(SharedRotate);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

/// Relative paths are resolved against `base_dir` (the server home dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(path: &Path, section: &Section) -> io::Result<SharedRotate> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let keep = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    let rot = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(keep)),
        ContentLimit::BytesSurpassed(usize::try_from(max_bytes).unwrap_or(usize::MAX)),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

/// Picks the file of the most specific section whose target prefixes the
/// event target, else the default file. Events without a file are dropped.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_target: Vec<(String, SharedRotate)>,
}

/// `target == prefix` or `target` starts with `prefix::`.
fn matches_target(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl FileRouter {
    fn resolve(&self, target: &str) -> Option<SharedRotate> {
        self.by_target
            .iter()
            .filter(|(prefix, _)| matches_target(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }
}

#[derive(Clone)]
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone().map(RotWriter))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve(meta.target()).map(RotWriter))
    }
}

// -------- filters --------

/// Console and file target filters built from the config sections.
struct Filters {
    console: Targets,
    file: Targets,
}

fn build_filters(cfg: &LoggingConfig, has_file: impl Fn(&str) -> bool) -> Filters {
    let level_or_off = |raw: &str| parse_level(raw).unwrap_or(LevelFilter::OFF);

    let (mut console, mut file) = match cfg.get(DEFAULT_SECTION) {
        Some(s) => (
            Targets::new().with_default(level_or_off(&s.console_level)),
            Targets::new().with_default(if has_file(DEFAULT_SECTION) {
                level_or_off(&s.file_level)
            } else {
                LevelFilter::OFF
            }),
        ),
        None => (
            Targets::new().with_default(LevelFilter::INFO),
            Targets::new().with_default(LevelFilter::OFF),
        ),
    };

    for (target, section) in cfg.iter().filter(|(k, _)| k.as_str() != DEFAULT_SECTION) {
        console = console.with_target(target.clone(), level_or_off(&section.console_level));
        if has_file(target) {
            file = file.with_target(target.clone(), level_or_off(&section.file_level));
        }
    }

    Filters { console, file }
}

fn build_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();

    for (target, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        let path = resolve_log_path(section.file.trim(), base_dir);
        let writer = match open_rotating(&path, section) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Failed to open log file '{}' for '{target}': {e}", path.display());
                continue;
            }
        };
        if target == DEFAULT_SECTION {
            router.default = Some(writer);
        } else {
            router.by_target.push((target.clone(), writer));
        }
    }

    router
}

// -------- public init --------

/// Install the global subscriber from `cfg`.
///
/// Console output is human-readable; file output is JSON, one rotating file
/// per section that names one. Relative file paths are resolved against
/// `base_dir`. Calling this twice keeps the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    let router = build_router(cfg, base_dir);
    let routed: HashMap<&str, bool> = cfg
        .iter()
        .map(|(k, s)| (k.as_str(), !s.file.trim().is_empty()))
        .collect();
    let filters = build_filters(cfg, |target| {
        routed.get(target).copied().unwrap_or(false)
            && (target != DEFAULT_SECTION || router.default.is_some())
    });

    let console_layer = fmt::layer()
        .with_ansi(io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(filters.console);

    let file_layer = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(filters.file)
    });

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// =================== tests ===================
