//! Collision-free path allocation for downloads and renames.
//!
//! A proposed path that is free is used as-is. A taken one gets a single
//! literal [`DISAMBIGUATING_SUFFIX`] before its extension. The suffixed
//! path is not checked again: a second collision on the same name is a
//! known limitation, not something resolved by searching `_3`, `_4`, ...

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Marker inserted before the extension when a proposed name is taken.
pub const DISAMBIGUATING_SUFFIX: &str = "_2";

/// Returns `proposed` if nothing exists there, otherwise its `_2` variant.
///
/// Example: `Verdienstabrechnung - Januar 2024.pdf` becomes
/// `Verdienstabrechnung - Januar 2024_2.pdf` when the former exists.
#[must_use]
pub fn allocate_unique_path(proposed: &Path) -> PathBuf {
    if proposed.exists() {
        with_disambiguating_suffix(proposed)
    } else {
        proposed.to_path_buf()
    }
}

/// Whether `path` already carries `proposed` or its `_2` variant.
///
/// A file an earlier pass disambiguated must not be moved again.
#[must_use]
pub fn carries_proposed_name(path: &Path, proposed: &Path) -> bool {
    path == proposed || path == with_disambiguating_suffix(proposed)
}

/// Inserts [`DISAMBIGUATING_SUFFIX`] between the file stem and extension.
fn with_disambiguating_suffix(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(OsString::from).unwrap_or_default();
    let mut name = stem;
    name.push(DISAMBIGUATING_SUFFIX);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Allocates target names for a sequence of renames in one directory.
///
/// On top of [`allocate_unique_path`], it remembers the names it handed out
/// and the files that were moved away. A dry run, which renames nothing,
/// therefore reaches the same decisions as a live run over the same files.
/// Unlike [`allocate_unique_path`] it never hands out a taken `_2` name.
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    reserved: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl FilenameAllocator {
    /// Creates an allocator with no reservations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is taken on disk or by an earlier allocation.
    #[must_use]
    pub fn is_taken(&self, path: &Path) -> bool {
        self.reserved.contains(path) || (path.exists() && !self.vacated.contains(path))
    }

    /// Returns the name to use for `proposed` and reserves it.
    ///
    /// Returns `None` when the `_2` variant is taken as well; nothing is
    /// reserved then and the caller must leave the file where it is.
    pub fn allocate(&mut self, proposed: &Path) -> Option<PathBuf> {
        let allocated = if self.is_taken(proposed) {
            let suffixed = with_disambiguating_suffix(proposed);
            if self.is_taken(&suffixed) {
                debug!(
                    proposed = %proposed.display(),
                    "proposed name and its suffixed variant are both taken"
                );
                return None;
            }
            debug!(
                proposed = %proposed.display(),
                allocated = %suffixed.display(),
                "proposed name taken; adding suffix"
            );
            suffixed
        } else {
            proposed.to_path_buf()
        };

        self.vacated.remove(&allocated);
        self.reserved.insert(allocated.clone());
        Some(allocated)
    }

    /// Records that `source` has been (or, in a dry run, would be) moved away.
    pub fn release(&mut self, source: &Path) {
        self.reserved.remove(source);
        self.vacated.insert(source.to_path_buf());
    }

    /// Gives back a reservation whose rename did not happen.
    pub fn unreserve(&mut self, allocated: &Path) {
        self.reserved.remove(allocated);
    }
}
