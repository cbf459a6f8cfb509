//! Recursive tree mirroring
//!
//! Walks a source directory with an explicit worklist (no language-level
//! recursion, so arbitrarily deep trees cannot overflow the stack),
//! recreating its structure under a destination root and running every
//! regular file through the cipher.
//!
//! Failures are handled per entry: a file that cannot be transformed is
//! logged and skipped, a subdirectory that cannot be created is logged and
//! its whole subtree is skipped. Every entry's fate is recorded in a
//! [`MirrorReport`] so callers can tell whether the run was complete
//! without scraping console output.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, warn};

use crate::cipher::{AesEcb, CipherTransform, Mode};
use crate::error::{ErrorCategory, ErrorKind, FoldercryptError, Result};
use crate::file_ops::transform_file;
use crate::keysource::KeySource;

/// What happened to a single entry during the walk.
#[derive(Debug)]
pub enum MirrorOutcome {
    /// A regular file was transformed and written.
    FileDone { src: PathBuf, dst: PathBuf },
    /// A regular file could not be transformed; the walk continued.
    FileFailed {
        src: PathBuf,
        error: FoldercryptError,
    },
    /// A destination subdirectory could not be created (or a source
    /// directory could not be listed); its subtree was skipped.
    DirSkipped {
        dst: PathBuf,
        error: FoldercryptError,
    },
}

/// Accumulated per-entry outcomes of one walk.
#[derive(Debug, Default)]
pub struct MirrorReport {
    outcomes: Vec<MirrorOutcome>,
}

impl MirrorReport {
    /// True when every reachable entry was processed without failure.
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, MirrorOutcome::FileDone { .. }))
    }

    /// Number of files transformed successfully.
    pub fn files_done(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MirrorOutcome::FileDone { .. }))
            .count()
    }

    /// Outcomes that were not successes.
    pub fn failures(&self) -> impl Iterator<Item = &MirrorOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, MirrorOutcome::FileDone { .. }))
    }

    /// All recorded outcomes, one per reachable entry.
    pub fn outcomes(&self) -> &[MirrorOutcome] {
        &self.outcomes
    }

    fn file_done(&mut self, src: PathBuf, dst: PathBuf) {
        self.outcomes.push(MirrorOutcome::FileDone { src, dst });
    }

    fn file_failed(&mut self, src: PathBuf, error: FoldercryptError) {
        error!("failed to process {}: {}", src.display(), error);
        self.outcomes.push(MirrorOutcome::FileFailed { src, error });
    }

    fn dir_skipped(&mut self, dst: PathBuf, error: FoldercryptError) {
        warn!("skipping subtree {}: {}", dst.display(), error);
        self.outcomes.push(MirrorOutcome::DirSkipped { dst, error });
    }
}

/// Recursively mirror `src_dir` under `dst_dir`, ciphering every regular file.
///
/// `src_dir` must already be validated as an existing, non-empty directory
/// and `dst_dir` must exist and be writable; [`run`] enforces both. Entry
/// order within a directory is whatever the platform's directory listing
/// yields. Symlinks are followed via metadata, with no loop protection.
pub fn mirror_tree(
    src_dir: &Path,
    dst_dir: &Path,
    mode: Mode,
    cipher: &dyn CipherTransform,
) -> Result<MirrorReport> {
    let mut report = MirrorReport::default();
    let mut worklist: Vec<(PathBuf, PathBuf)> = vec![(src_dir.to_path_buf(), dst_dir.to_path_buf())];

    while let Some((src, dst)) = worklist.pop() {
        let entries = match fs::read_dir(&src) {
            Ok(entries) => entries,
            Err(e) => {
                report.dir_skipped(
                    dst,
                    FoldercryptError::with_kind_and_source(
                        ErrorCategory::Internal,
                        ErrorKind::Io,
                        format!("failed to list {}", src.display()),
                        e,
                    ),
                );
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.file_failed(
                        src.clone(),
                        FoldercryptError::with_kind_and_source(
                            ErrorCategory::Internal,
                            ErrorKind::Io,
                            format!("failed to read an entry of {}", src.display()),
                            e,
                        ),
                    );
                    continue;
                }
            };

            let entry_src = entry.path();
            let entry_dst = dst.join(entry.file_name());

            // Follows symlinks, so a link to a directory is walked into it.
            let is_dir = fs::metadata(&entry_src).map(|m| m.is_dir()).unwrap_or(false);

            if is_dir {
                match fs::create_dir(&entry_dst) {
                    Ok(()) => worklist.push((entry_src, entry_dst)),
                    Err(e) => report.dir_skipped(
                        entry_dst,
                        FoldercryptError::with_kind_and_source(
                            ErrorCategory::Internal,
                            ErrorKind::Io,
                            "failed to create destination subdirectory",
                            e,
                        ),
                    ),
                }
            } else {
                match transform_file(cipher, mode, &entry_src, &entry_dst) {
                    Ok(()) => report.file_done(entry_src, entry_dst),
                    Err(e) => report.file_failed(entry_src, e),
                }
            }
        }
    }

    Ok(report)
}

/// Delete a directory tree without recursing in the call stack.
///
/// Directories are collected top-down while files are unlinked, then the
/// directories themselves are removed bottom-up. Symlinks are unlinked,
/// never followed.
pub fn remove_dir_tree(root: &Path) -> Result<()> {
    let mut dirs = vec![root.to_path_buf()];
    let mut next = 0;

    while next < dirs.len() {
        let dir = dirs[next].clone();
        next += 1;

        for entry in fs::read_dir(&dir).map_err(|e| delete_error(&dir, e))? {
            let entry = entry.map_err(|e| delete_error(&dir, e))?;
            // file_type() does not follow symlinks: a link to a directory
            // is unlinked rather than descended into.
            let file_type = entry.file_type().map_err(|e| delete_error(&entry.path(), e))?;
            if file_type.is_dir() {
                dirs.push(entry.path());
            } else {
                fs::remove_file(entry.path()).map_err(|e| delete_error(&entry.path(), e))?;
            }
        }
    }

    for dir in dirs.iter().rev() {
        fs::remove_dir(dir).map_err(|e| delete_error(dir, e))?;
    }
    Ok(())
}

fn delete_error(path: &Path, err: std::io::Error) -> FoldercryptError {
    FoldercryptError::with_kind_and_source(
        ErrorCategory::Internal,
        ErrorKind::DestinationUnusable,
        format!("failed to delete {}", path.display()),
        err,
    )
}

/// Computes `<dst>/outputs_<suffix>/<basename(src)>`.
pub fn resolve_destination(src: &Path, dst: &Path, mode: Mode) -> Result<PathBuf> {
    let basename = source_basename(src)?;
    Ok(dst.join(format!("outputs{}", mode.suffix())).join(basename))
}

fn source_basename(src: &Path) -> Result<OsString> {
    if let Some(name) = src.file_name() {
        return Ok(name.to_os_string());
    }
    // Paths like "." have no final component until resolved.
    let canonical = fs::canonicalize(src).map_err(|e| {
        FoldercryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to resolve {}", src.display()),
            e,
        )
    })?;
    canonical
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| {
            FoldercryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::SourceNotDirectory,
                format!("source path {} has no base name", src.display()),
            )
        })
}

/// One full pipeline run: validate the source, reset the destination root,
/// build the cipher from the key, and walk the tree.
///
/// Per-entry failures do not fail the run; they are reported through the
/// returned [`MirrorReport`]. Everything up to the walk (bad arguments,
/// bad key size, unusable destination) is fatal.
pub fn run(
    mode: Mode,
    src: &Path,
    dst: &Path,
    key_source: &mut dyn KeySource,
) -> Result<MirrorReport> {
    let meta = match fs::metadata(src) {
        Ok(meta) => meta,
        Err(_) => {
            return Err(FoldercryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::SourceMissing,
                format!("source folder {} does not exist", src.display()),
            ));
        }
    };
    if !meta.is_dir() {
        return Err(FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::SourceNotDirectory,
            format!("{} is not a directory", src.display()),
        ));
    }
    let mut entries = fs::read_dir(src).map_err(|e| {
        FoldercryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to list {}", src.display()),
            e,
        )
    })?;
    if entries.next().is_none() {
        return Err(FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::SourceEmpty,
            format!("source folder {} is empty", src.display()),
        ));
    }

    let key = key_source.read_key()?;
    let cipher = AesEcb::new(&key)?;

    let out_root = resolve_destination(src, dst, mode)?;
    // A leftover at the resolved path is removed whatever it is: a tree
    // from a previous run, or a plain file or symlink in the way.
    match fs::symlink_metadata(&out_root) {
        Ok(meta) if meta.is_dir() => remove_dir_tree(&out_root)?,
        Ok(_) => fs::remove_file(&out_root).map_err(|e| delete_error(&out_root, e))?,
        Err(_) => {}
    }
    fs::create_dir_all(&out_root).map_err(|e| {
        FoldercryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DestinationUnusable,
            format!("failed to create output folder {}", out_root.display()),
            e,
        )
    })?;

    mirror_tree(src, &out_root, mode, &cipher)
}
