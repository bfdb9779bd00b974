//! Rolling Logger
//!
//! Installs a global `tracing` subscriber writing to a circular set of
//! size-capped files (`{app}.0.log` .. `{app}.{n-1}.log`). Records emitted
//! through the `log` facade are forwarded to the same subscriber.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

const LOG_TARGET: &str = "app";

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Rotate once the current file would exceed this size
    pub max_file_bytes: u64,
    /// Number of files in the circular set
    pub max_files: usize,
    pub level: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_files: 5,
            level: LevelFilter::INFO,
        }
    }
}

struct RollState {
    index: usize,
    file: File,
    written: u64,
}

struct Inner {
    dir: PathBuf,
    app_name: String,
    max_file_bytes: u64,
    max_files: usize,
    state: Mutex<RollState>,
}

impl Inner {
    fn path(&self, index: usize) -> PathBuf {
        log_path(&self.dir, &self.app_name, index)
    }

    fn write_bytes(&self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;

        if state.written > 0 && state.written + buf.len() as u64 > self.max_file_bytes {
            let next = (state.index + 1) % self.max_files;
            state.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(self.path(next))?;
            state.index = next;
            state.written = 0;
        }

        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        state.file.flush()
    }
}

/// Size-rotating file writer usable as a `tracing-subscriber` writer
#[derive(Clone)]
pub struct RollingFileWriter {
    inner: Arc<Inner>,
}

impl RollingFileWriter {
    /// Open the writer, resuming the most recently written file if any
    pub fn new(
        dir: impl AsRef<Path>,
        app_name: &str,
        max_file_bytes: u64,
        max_files: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let max_files = max_files.max(1);

        let app_name = app_name.to_string();
        let index = latest_index(&dir, &app_name, max_files);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path(&dir, &app_name, index))?;
        let written = file.metadata()?.len();

        let inner = Inner {
            dir,
            app_name,
            max_file_bytes: max_file_bytes.max(1),
            max_files,
            state: Mutex::new(RollState {
                index,
                file,
                written,
            }),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        let index = self.inner.state.lock().map(|s| s.index).unwrap_or(0);
        self.inner.path(index)
    }

    /// All files of the set that exist on disk
    pub fn existing_files(&self) -> Vec<PathBuf> {
        (0..self.inner.max_files)
            .map(|i| self.inner.path(i))
            .filter(|p| p.exists())
            .collect()
    }
}

fn log_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    dir.join(format!("{}.{}.log", app_name, index))
}

/// Index of the most recently modified file in the set
fn latest_index(dir: &Path, app_name: &str, max_files: usize) -> usize {
    (0..max_files)
        .filter_map(|i| {
            let modified = fs::metadata(log_path(dir, app_name, i))
                .and_then(|m| m.modified())
                .ok()?;
            Some((modified, i))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, i)| i)
        .unwrap_or(0)
}

/// Writer handed out per event
pub struct RollingWriterGuard {
    inner: Arc<Inner>,
}

impl Write for RollingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFileWriter {
    type Writer = RollingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriterGuard {
            inner: self.inner.clone(),
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the global logger with default settings
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<(), String> {
    let writer = RollingFileWriter::new(
        log_dir.as_ref(),
        app_name,
        config.max_file_bytes,
        config.max_files,
    )
    .map_err(|e| format!("failed to open log dir {}: {}", log_dir.as_ref().display(), e))?;
    let current = writer.current_path();

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_max_level(config.level)
        .try_init()
        .map_err(|e| format!("failed to install logger: {}", e))?;

    log::info!("{} logging to {}", app_name, current.display());
    Ok(())
}

/// Log a one-off info line
pub fn info(message: &str) -> Result<(), String> {
    tracing::info!(target: LOG_TARGET, "{}", message);
    Ok(())
}

/// Log a one-off error line
pub fn error(message: &str) -> Result<(), String> {
    tracing::error!(target: LOG_TARGET, "{}", message);
    Ok(())
}
