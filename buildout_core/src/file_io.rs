//! # Project Files
//!
//! `.bce` project files are pretty-printed JSON. Writes go through
//! [`update_project`], which serializes writers with a sidecar lock:
//!
//! - `<file>.bce.lock` holds an OS-level exclusive lock (fs2) plus a small
//!   JSON record of who holds it, so a refused writer can say by whom
//! - saves are written to `<file>.bce.tmp`, synced, then renamed over the
//!   target, so a crash never leaves a half-written project
//! - loads check the schema version before handing the project out
//!
//! ## Example
//!
//! ```rust,no_run
//! use buildout_core::file_io::update_project;
//! use buildout_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("acme.bce");
//! update_project(
//!     path,
//!     "jane",
//!     || Project::new("ACME HQ", "ACME Corp", "Jane Estimator"),
//!     |project| {
//!         project.meta.client = "ACME Holdings".into();
//!         Ok(())
//!     },
//! )
//! .unwrap();
//! ```

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CostError, CostResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of holder.
const STALE_LOCK_HOURS: i64 = 12;

/// Who holds a project lock. Stored as JSON in the `.lock` sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockHolder {
    pub user_id: String,
    /// `None` when the holder could not determine its host name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockHolder {
    fn current(user_id: impl Into<String>) -> Self {
        LockHolder {
            user_id: user_id.into(),
            host: host_name(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    fn is_stale(&self) -> bool {
        self.is_stale_seen_from(host_name().as_deref())
    }

    /// Too old, or held by a dead process on `our_host`.
    ///
    /// The pid is only checked when both host names are known and equal;
    /// an unnamed host may be any machine sharing the drive.
    fn is_stale_seen_from(&self, our_host: Option<&str>) -> bool {
        if Utc::now() - self.acquired_at > Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        match (self.host.as_deref(), our_host) {
            (Some(theirs), Some(ours)) if theirs == ours => !process_alive(self.pid),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}@{} (pid {})",
            self.user_id,
            self.host.as_deref().unwrap_or("unknown host"),
            self.pid
        )
    }
}

fn host_name() -> Option<String> {
    ["HOSTNAME", "HOST", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

// No cheap liveness check elsewhere; rely on the age limit
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive write access to a project file; released on drop.
#[derive(Debug)]
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    // Holding the handle keeps the OS lock
    _handle: File,
    pub holder: LockHolder,
}

impl FileLock {
    /// Take the lock for `path`.
    ///
    /// Fails with [`CostError::FileLocked`] while another live writer holds
    /// it. Stale locks are taken over with a warning.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CostResult<Self> {
        let lock_path = sidecar(path, "lock");

        if let Some(existing) = read_holder(&lock_path) {
            if !existing.is_stale() {
                return Err(CostError::file_locked(
                    path.display().to_string(),
                    existing.describe(),
                    existing.acquired_at.to_rfc3339(),
                ));
            }
            tracing::warn!(path = %path.display(), holder = %existing.describe(), "Taking over stale lock");
        }

        // Not truncated until the OS lock is ours; a refused writer must
        // leave the holder's record readable
        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;
        handle.try_lock_exclusive().map_err(|_| {
            let holder = read_holder(&lock_path).map_or_else(|| "another process".to_string(), |h| h.describe());
            CostError::file_locked(path.display().to_string(), holder, "unknown")
        })?;

        let holder = LockHolder::current(user_id);
        let record = serde_json::to_vec_pretty(&holder).map_err(CostError::serialization)?;
        handle.set_len(0).map_err(io_error("reset lock", &lock_path))?;
        handle.write_all(&record).map_err(io_error("write lock", &lock_path))?;
        handle.sync_all().map_err(io_error("sync lock", &lock_path))?;

        tracing::debug!(path = %path.display(), user = %holder.user_id, "Acquired project lock");
        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            holder,
        })
    }

    /// Current live holder of the lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockHolder> {
        read_holder(&sidecar(path, "lock")).filter(|holder| !holder.is_stale())
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            tracing::warn!(path = %self.lock_path.display(), error = %e, "Could not remove lock file");
        }
    }
}

/// `project.bce` -> `project.bce.<suffix>`
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(OsStr::new(suffix));
    PathBuf::from(name)
}

fn read_holder(lock_path: &Path) -> Option<LockHolder> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn io_error<'a>(operation: &'a str, path: &'a Path) -> impl FnOnce(std::io::Error) -> CostError + 'a {
    move |e| CostError::file_error(operation, path.display().to_string(), e.to_string())
}

/// Write a project atomically (temp file, fsync, rename).
pub fn save_project(project: &Project, path: &Path) -> CostResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(CostError::serialization)?;
    let tmp_path = sidecar(path, "tmp");

    let written = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .map_err(io_error("write temp file", &tmp_path))
        .and_then(|()| fs::rename(&tmp_path, path).map_err(io_error("replace", path)));

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written?;

    tracing::debug!(path = %path.display(), estimates = project.estimate_count(), "Saved project");
    Ok(())
}

/// Read a project file and check its schema version.
pub fn load_project(path: &Path) -> CostResult<Project> {
    let contents = fs::read_to_string(path).map_err(io_error("read", path))?;
    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| CostError::serialization(format!("{}: {}", path.display(), e)))?;
    check_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project for viewing, reporting who (if anyone) is editing it.
pub fn load_project_with_lock_check(path: &Path) -> CostResult<(Project, Option<LockHolder>)> {
    Ok((load_project(path)?, FileLock::check(path)))
}

/// Lock, load (or start with `fresh()` when the file does not exist yet),
/// apply `edit`, save, unlock.
///
/// Nothing is written when `edit` fails. Returns whatever `edit` returns.
pub fn update_project<T>(
    path: &Path,
    user_id: &str,
    fresh: impl FnOnce() -> Project,
    edit: impl FnOnce(&mut Project) -> CostResult<T>,
) -> CostResult<T> {
    let _lock = FileLock::acquire(path, user_id)?;
    let mut project = if path.exists() {
        load_project(path)?
    } else {
        tracing::info!(path = %path.display(), "Creating new project file");
        fresh()
    };
    let value = edit(&mut project)?;
    save_project(&project, path)?;
    Ok(value)
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().ok());
    Some((parts.next()??, parts.next()??))
}

/// Same major version required; while the major is 0, a file from a newer
/// minor version is refused too.
fn check_version(file_version: &str) -> CostResult<()> {
    let compatible = match (parse_version(file_version), parse_version(SCHEMA_VERSION)) {
        (Some((file_major, file_minor)), Some((major, minor))) => {
            file_major == major && !(major == 0 && file_minor > minor)
        }
        _ => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(CostError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bce(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join(format!("{}.bce", name))
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/jobs/acme.bce");
        assert_eq!(sidecar(path, "lock"), Path::new("/jobs/acme.bce.lock"));
        assert_eq!(sidecar(path, "tmp"), Path::new("/jobs/acme.bce.tmp"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "roundtrip");

        save_project(&Project::new("HQ Fit-Out", "Test Client", "Test Estimator"), &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.name, "HQ Fit-Out");
        assert_eq!(loaded.meta.client, "Test Client");
        assert_eq!(loaded.meta.prepared_by, "Test Estimator");
        assert!(!sidecar(&path, "tmp").exists());
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "lock");

        let lock = FileLock::acquire(&path, "jane").unwrap();
        assert_eq!(lock.holder.user_id, "jane");
        assert_eq!(lock.project_path(), path.as_path());
        assert_eq!(FileLock::check(&path).map(|h| h.user_id), Some("jane".to_string()));

        drop(lock);
        assert!(!sidecar(&path, "lock").exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_second_writer_refused() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "busy");

        let _held = FileLock::acquire(&path, "jane").unwrap();
        let err = FileLock::acquire(&path, "omar").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.to_string().contains("jane"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_stale_lock_taken_over() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "stale");
        let old = LockHolder {
            user_id: "gone".to_string(),
            host: Some("elsewhere".to_string()),
            pid: 1,
            acquired_at: Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1),
        };
        fs::write(sidecar(&path, "lock"), serde_json::to_string(&old).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_none());
        let lock = FileLock::acquire(&path, "jane").unwrap();
        assert_eq!(lock.holder.user_id, "jane");
    }

    fn recent_holder(host: Option<&str>, pid: u32) -> LockHolder {
        LockHolder {
            user_id: "omar".to_string(),
            host: host.map(str::to_string),
            pid,
            acquired_at: Utc::now() - Duration::minutes(1),
        }
    }

    #[test]
    fn test_unknown_host_lock_is_live() {
        // Another workstation without a host name; its pid means nothing here
        let remote = recent_holder(None, 4_000_000);
        assert!(!remote.is_stale_seen_from(None));
        assert!(!remote.is_stale_seen_from(Some("ws-1")));
        assert!(!recent_holder(Some("ws-2"), 4_000_000).is_stale_seen_from(Some("ws-1")));
        assert!(!recent_holder(Some("ws-1"), 4_000_000).is_stale_seen_from(None));
    }

    #[test]
    fn test_unknown_host_lock_refuses_writer() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "shared");
        fs::write(sidecar(&path, "lock"), serde_json::to_string(&recent_holder(None, 4_000_000)).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_some());
        let err = FileLock::acquire(&path, "jane").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.to_string().contains("omar"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_dead_pid_on_same_host_is_stale() {
        let ours = recent_holder(Some("ws-1"), std::process::id());
        assert!(!ours.is_stale_seen_from(Some("ws-1")));
        assert!(recent_holder(Some("ws-1"), 4_000_000).is_stale_seen_from(Some("ws-1")));
    }

    #[test]
    fn test_refused_writer_keeps_holder_record() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "contended");
        let lock_path = sidecar(&path, "lock");

        // Old record, but the OS lock is still held through another handle
        let mut old = recent_holder(Some("ws-9"), 4_000_000);
        old.acquired_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        fs::write(&lock_path, serde_json::to_string(&old).unwrap()).unwrap();
        let other = OpenOptions::new().read(true).write(true).open(&lock_path).unwrap();
        other.try_lock_exclusive().unwrap();

        let err = FileLock::acquire(&path, "jane").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.to_string().contains("omar"));
        assert_eq!(read_holder(&lock_path), Some(old));
    }

    #[test]
    fn test_version_check() {
        assert!(check_version(SCHEMA_VERSION).is_ok());
        assert!(check_version("0.1.7").is_ok());
        assert!(check_version("0.0.9").is_ok());
        assert!(check_version("0.2.0").is_err());
        assert!(check_version("1.0.0").is_err());
        assert!(check_version("garbage").is_err());
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();

        let missing = load_project(&bce(&dir, "missing")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");

        let path = bce(&dir, "broken");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_project(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_reports_lock_holder() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "viewer");
        save_project(&Project::new("Test", "Client", "Me"), &path).unwrap();

        let (_, holder) = load_project_with_lock_check(&path).unwrap();
        assert!(holder.is_none());

        let _lock = FileLock::acquire(&path, "jane").unwrap();
        let (project, holder) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(project.meta.name, "Test");
        assert_eq!(holder.unwrap().user_id, "jane");
    }

    #[test]
    fn test_update_project_creates_then_edits() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "update");

        let name = update_project(
            &path,
            "me",
            || Project::new("Fresh", "Client", "Me"),
            |project| Ok(project.meta.name.clone()),
        )
        .unwrap();
        assert_eq!(name, "Fresh");

        update_project(
            &path,
            "me",
            || Project::new("Unused", "", ""),
            |project| {
                project.meta.client = "Edited".to_string();
                Ok(())
            },
        )
        .unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.name, "Fresh");
        assert_eq!(loaded.meta.client, "Edited");
        assert!(!sidecar(&path, "lock").exists());
    }

    #[test]
    fn test_failed_edit_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = bce(&dir, "untouched");

        let err = update_project(
            &path,
            "me",
            || Project::new("Never", "", ""),
            |_| Err::<(), _>(CostError::estimate_not_found("x")),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "ESTIMATE_NOT_FOUND");
        assert!(!path.exists());
    }
}
