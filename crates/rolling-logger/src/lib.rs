//! Rolling Logger
//!
//! A file logger backed by a circular buffer: the log file only ever holds the
//! most recent `max_lines` lines. `log` records are bridged into the `tracing`
//! subscriber, so libraries logging through either facade end up in the same file.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Lines kept in the log file unless configured otherwise
pub const DEFAULT_MAX_LINES: usize = 2000;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

struct Buffer {
    path: PathBuf,
    lines: VecDeque<String>,
    max_lines: usize,
    partial: String,
}

impl Buffer {
    fn push_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.partial.push_str(&String::from_utf8_lossy(bytes));

        let mut changed = false;
        while let Some(idx) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=idx).collect();
            self.lines.push_back(line.trim_end_matches(['\r', '\n']).to_string());
            while self.lines.len() > self.max_lines {
                self.lines.pop_front();
            }
            changed = true;
        }

        if changed {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&self) -> io::Result<()> {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(&self.path, out)
    }
}

/// Writer handed to the `tracing` formatter.
///
/// Cloning is cheap; all clones share one buffer.
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<Buffer>>,
}

impl RollingWriter {
    /// Open (or create) a log file, keeping the tail of any existing content
    pub fn open(path: impl Into<PathBuf>, max_lines: usize) -> io::Result<Self> {
        let path = path.into();
        let max_lines = max_lines.max(1);

        let mut lines: VecDeque<String> = match fs::read_to_string(&path) {
            Ok(existing) => existing.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => return Err(e),
        };
        while lines.len() > max_lines {
            lines.pop_front();
        }

        let buffer = Buffer {
            path,
            lines,
            max_lines,
            partial: String::new(),
        };
        buffer.persist()?;

        Ok(Self {
            inner: Arc::new(Mutex::new(buffer)),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(buffer) => buffer.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }

    /// Snapshot of the lines currently kept
    pub fn lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(buffer) => buffer.lines.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().lines.iter().cloned().collect(),
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        buffer.push_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Local wall-clock timestamps
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the global logger writing to `<log_dir>/<app_name>.log`
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with_capacity(log_dir, app_name, DEFAULT_MAX_LINES)
}

/// Same as [`init_logger`] with an explicit line capacity
pub fn init_logger_with_capacity(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    max_lines: usize,
) -> Result<(), String> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let writer = RollingWriter::open(log_dir.join(format!("{}.log", app_name)), max_lines)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    if LOGGER.set(writer.clone()).is_err() {
        return Err("Logger already initialized".to_string());
    }

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    Ok(())
}

/// Log an info line through the installed logger
pub fn info(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!("{}", message);
    Ok(())
}

/// Log an error line through the installed logger
pub fn error(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!("{}", message);
    Ok(())
}
