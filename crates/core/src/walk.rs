//! File walker. Discovers source files, runs drivers over each one, and writes
//! changed files back atomically.
//!
//! Files are independent: one file failing to read or write is recorded in the
//! [`BatchReport`] and the batch carries on.

use crate::drivers::{Driver, Outcome};
use crate::error::{Result, TransformError};
use crate::types::{SourceUnit, WalkConfig};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Collect files matching the extension filter using a parallel directory walk.
fn walk_files_parallel(
    project_root: &Path,
    scan_dirs: &[String],
    skip_dirs: &HashSet<String>,
    extensions: &HashSet<String>,
) -> Vec<PathBuf> {
    let results: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

    for scan_dir in scan_dirs {
        let dir = match scan_dir.as_str() {
            "" | "." => project_root.to_path_buf(),
            sub => project_root.join(sub),
        };
        if !dir.exists() {
            warn!(dir = %dir.display(), "Skipping missing scan dir");
            continue;
        }

        let skip = skip_dirs.clone();
        WalkBuilder::new(&dir)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .threads(rayon::current_num_threads().min(12))
            .filter_entry(move |entry| {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    let name = entry.file_name().to_string_lossy();
                    return !skip.contains(name.as_ref());
                }
                true
            })
            .build_parallel()
            .run(|| {
                Box::new(|entry| {
                    let entry = match entry {
                        Ok(e) => e,
                        Err(_) => return ignore::WalkState::Continue,
                    };
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        return ignore::WalkState::Continue;
                    }
                    let ext = entry.path().extension().and_then(|e| e.to_str()).unwrap_or("");
                    if extensions.contains(ext) {
                        push_path(&results, entry.path().to_path_buf());
                    }
                    ignore::WalkState::Continue
                })
            });
    }

    into_paths(results)
}

/// A walker thread that panicked poisons the list; the paths already in it are
/// still good, so keep collecting instead of dropping files from the batch.
fn push_path(results: &Mutex<Vec<PathBuf>>, path: PathBuf) {
    let mut files = results.lock().unwrap_or_else(|poisoned| {
        warn!("File list lock poisoned, recovering");
        poisoned.into_inner()
    });
    files.push(path);
}

fn into_paths(results: Mutex<Vec<PathBuf>>) -> Vec<PathBuf> {
    results.into_inner().unwrap_or_else(|poisoned| {
        warn!("File list lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Every file under the configured scan dirs with a configured extension, sorted.
pub fn discover_files(config: &WalkConfig) -> Vec<PathBuf> {
    let scan_dirs: Vec<String> = if config.scan_dirs.is_empty() {
        vec![".".to_string()]
    } else {
        config.scan_dirs.clone()
    };
    let mut files =
        walk_files_parallel(&config.root, &scan_dirs, &config.skip_dirs, &config.extensions);
    files.sort();
    files.dedup();
    files
}

// ---------------------------------------------------------------------------
// Reading and writing
// ---------------------------------------------------------------------------

pub fn read_source(path: &Path) -> Result<SourceUnit> {
    let bytes =
        fs::read(path).map_err(|source| TransformError::Read { path: path.to_path_buf(), source })?;
    let text = String::from_utf8(bytes)
        .map_err(|_| TransformError::Decode { path: path.to_path_buf(), encoding: "UTF-8" })?;
    Ok(SourceUnit::new(path, text))
}

/// Stage `contents` next to `path` and rename it over the original, so an
/// interrupted run never leaves a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let write_err = |source| TransformError::Write { path: path.to_path_buf(), source };

    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    staged.write_all(contents.as_bytes()).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    if let Ok(meta) = fs::metadata(path) {
        // Keep the original file's permission bits.
        if let Err(e) = fs::set_permissions(staged.path(), meta.permissions()) {
            debug!(path = %path.display(), error = %e, "Could not copy permissions");
        }
    }
    staged
        .persist(path)
        .map_err(|e| TransformError::Persist { path: path.to_path_buf(), source: e.error })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Batch processing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Transform in memory but leave files on disk untouched.
    pub dry_run: bool,
}

/// What happened to one file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    /// Names of the drivers that changed the file.
    pub changed_by: Vec<&'static str>,
}

impl FileResult {
    pub fn is_changed(&self) -> bool {
        !self.changed_by.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub path: String,
    pub error: String,
}

/// Aggregate result of one invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub scanned: usize,
    /// Files whose content changed (and was written unless dry-run), relative to root.
    pub changed: Vec<String>,
    /// Files changed per driver.
    pub per_driver: BTreeMap<String, usize>,
    pub failures: Vec<FailureEntry>,
    pub dry_run: bool,
}

impl BatchReport {
    pub fn files_changed(&self) -> usize {
        self.changed.len()
    }

    /// The human-readable summary line.
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "would change" } else { "changed" };
        let mut line = format!("{} of {} files {verb}", self.files_changed(), self.scanned);
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        line
    }
}

/// Run `drivers` in order over one file and write the result back if it changed.
pub fn process_file(path: &Path, drivers: &[&dyn Driver], options: BatchOptions) -> Result<FileResult> {
    let mut unit = read_source(path)?;
    let mut changed_by = Vec::new();

    for driver in drivers {
        match driver.apply(&mut unit) {
            Outcome::Changed => changed_by.push(driver.name()),
            Outcome::NotApplicable(reason) => {
                debug!(path = %path.display(), driver = driver.name(), reason, "Not applicable");
            }
        }
    }

    // Drivers can undo each other; only the net result counts.
    if !unit.is_changed() {
        changed_by.clear();
    } else if !options.dry_run {
        write_atomic(path, &unit.text)?;
    }
    Ok(FileResult { path: path.to_path_buf(), changed_by })
}

/// Discover files under `config` and process each one independently.
pub fn run_batch(config: &WalkConfig, drivers: &[&dyn Driver], options: BatchOptions) -> BatchReport {
    let files = discover_files(config);
    info!(root = %config.root.display(), files = files.len(), dry_run = options.dry_run, "Processing");
    run_files(&config.root, &files, drivers, options)
}

/// Process an explicit file list. Paths in the report are relative to `root`.
pub fn run_files(
    root: &Path,
    files: &[PathBuf],
    drivers: &[&dyn Driver],
    options: BatchOptions,
) -> BatchReport {
    let results: Vec<Result<FileResult>> =
        files.par_iter().map(|path| process_file(path, drivers, options)).collect();

    let rel = |p: &Path| p.strip_prefix(root).unwrap_or(p).to_string_lossy().replace('\\', "/");
    let mut report = BatchReport { scanned: files.len(), dry_run: options.dry_run, ..Default::default() };
    for driver in drivers {
        report.per_driver.insert(driver.name().to_string(), 0);
    }

    for result in results {
        match result {
            Ok(file) if file.is_changed() => {
                info!(path = %rel(&file.path), drivers = ?file.changed_by, "Transformed");
                for name in &file.changed_by {
                    *report.per_driver.entry(name.to_string()).or_default() += 1;
                }
                report.changed.push(rel(&file.path));
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = %rel(e.path()), error = %e, "File failed");
                report.failures.push(FailureEntry { path: rel(e.path()), error: e.to_string() });
            }
        }
    }

    info!(
        scanned = report.scanned,
        changed = report.files_changed(),
        failed = report.failures.len(),
        "Batch complete"
    );
    report
}
