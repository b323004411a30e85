//! Archive extraction with destination path checks.

use flate2::read::GzDecoder;
use localscan_core::{ArchiveFormat, LocalScanError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::EntryType;
use tracing::debug;

/// Extract `archive` into `dest_dir` on a blocking thread
pub async fn extract(archive: &Path, dest_dir: &Path, format: ArchiveFormat) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || match format {
        ArchiveFormat::TarGz => extract_tar_gz(&archive, &dest_dir),
        ArchiveFormat::Zip => extract_zip(&archive, &dest_dir),
    })
    .await
    .map_err(|e| LocalScanError::Archive(format!("extraction task failed: {e}")))?
}

/// Unpack a gzip-compressed tarball.
///
/// Directories and regular files are created with mode 0755; pax and GNU
/// metadata headers are skipped; any other entry type aborts extraction.
pub fn extract_tar_gz(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| LocalScanError::io(archive, e))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    let entries = tarball.entries().map_err(archive_error)?;

    for entry in entries {
        let mut entry = entry.map_err(archive_error)?;
        let name = entry.path().map_err(archive_error)?.into_owned();
        let entry_type = entry.header().entry_type();

        match entry_type {
            EntryType::XGlobalHeader
            | EntryType::XHeader
            | EntryType::GNULongName
            | EntryType::GNULongLink => continue,
            EntryType::Directory => {
                let dest = resolve_entry(dest_dir, &name)?;
                fs::create_dir_all(&dest).map_err(|e| LocalScanError::io(&dest, e))?;
                set_executable(&dest)?;
            }
            EntryType::Regular | EntryType::Continuous => {
                let dest = resolve_entry(dest_dir, &name)?;
                write_file(&mut entry, &dest)?;
                set_executable(&dest)?;
            }
            other => {
                return Err(LocalScanError::UnsupportedArchiveEntry {
                    entry: name.display().to_string(),
                    kind: format!("{other:?}"),
                });
            }
        }
    }

    debug!(archive = %archive.display(), dest = %dest_dir.display(), "extracted tarball");
    Ok(())
}

/// Unpack a zip archive, rejecting entries that escape `dest_dir`
pub fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| LocalScanError::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(archive_error)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(archive_error)?;
        let dest = resolve_entry(dest_dir, Path::new(entry.name()))?;

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| LocalScanError::io(&dest, e))?;
            continue;
        }

        write_file(&mut entry, &dest)?;
        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode))
                .map_err(|e| LocalScanError::io(&dest, e))?;
        }
    }

    debug!(archive = %archive.display(), dest = %dest_dir.display(), "extracted zip");
    Ok(())
}

/// Destination of an archive entry, refusing anything outside `dest_dir`
pub fn resolve_entry(dest_dir: &Path, name: &Path) -> Result<PathBuf> {
    let root = clean_path(dest_dir);
    let dest = clean_path(&root.join(name));

    if dest.starts_with(&root) {
        Ok(dest)
    } else {
        Err(LocalScanError::IllegalArchivePath {
            path: dest.display().to_string(),
        })
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

fn write_file(reader: &mut impl io::Read, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| LocalScanError::io(parent, e))?;
    }
    let mut out = File::create(dest).map_err(|e| LocalScanError::io(dest, e))?;
    io::copy(reader, &mut out).map_err(|e| LocalScanError::io(dest, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| LocalScanError::io(path, e))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn archive_error(e: impl std::fmt::Display) -> LocalScanError {
    LocalScanError::Archive(e.to_string())
}
