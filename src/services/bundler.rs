//! Turns the workspace root object into a single staged archive.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// The staged archive one invocation uploads.
///
/// Exclusively owned by that invocation and removed exactly once at its end,
/// whatever the outcome.
#[derive(Debug)]
pub struct ArtifactBundle {
    path: PathBuf,
    temporary: bool,
}

impl ArtifactBundle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the staged file. Removal failure is logged, never surfaced;
    /// it must not override the pipeline result.
    pub fn remove(self) {
        if !self.temporary {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove staged bundle");
        }
    }
}

/// Stages the deployable bundle for `root`.
///
/// A regular file is assumed pre-packaged and copied verbatim; a directory
/// is zipped with `includes`/`excludes` filtering (an exclude match wins).
/// Runs before any network activity; every failure here is fatal.
pub fn bundle(
    root: &Path,
    includes: &str,
    excludes: &str,
    staging_dir: Option<&Path>,
) -> Result<ArtifactBundle> {
    let meta = fs::metadata(root)
        .with_context(|| format!("root object {} is not accessible", root.display()))?;

    let mut builder = tempfile::Builder::new();
    builder.prefix("eb-deploy-").suffix(".zip");
    let staged = match staging_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .context("could not create staging file")?;
    let (file, path) = staged
        .keep()
        .context("could not persist staging file")?;

    let result = if meta.is_file() {
        debug!(root = %root.display(), "root object is a file; copying as pre-packaged bundle");
        drop(file);
        fs::copy(root, &path).map(|_| ()).map_err(Into::into)
    } else {
        debug!(
            root = %root.display(),
            staged = %path.display(),
            includes,
            excludes,
            "zipping root object contents"
        );
        zip_directory(root, file, includes, excludes)
    };

    if let Err(e) = result {
        let _ = fs::remove_file(&path);
        return Err(e);
    }

    Ok(ArtifactBundle {
        path,
        temporary: true,
    })
}

fn zip_directory(root: &Path, file: File, includes: &str, excludes: &str) -> Result<()> {
    let include = glob_set(includes, true)?;
    let exclude = glob_set(excludes, false)?;

    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !include.is_match(&name) || exclude.is_match(&name) {
            continue;
        }
        writer.start_file(name.as_str(), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

/// Builds a matcher from a comma-separated glob list. An empty include list
/// means "everything"; an empty exclude list matches nothing.
fn glob_set(patterns: &str, match_all_when_empty: bool) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut any = false;
    for pattern in patterns.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        builder.add(Glob::new(pattern).with_context(|| format!("bad glob pattern: {pattern}"))?);
        any = true;
    }
    if !any && match_all_when_empty {
        builder.add(Glob::new("**")?);
    }
    Ok(builder.build()?)
}
