// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declaration drift reconciliation.
//!
//! When a data source's shape changes between runs the on-disk file must
//! follow: autotune attributes propagate via `tune`, an `oldname`
//! declaration moves the file, and anything ambiguous is left for the
//! operator. Decisions are planned as data first and applied second, so
//! the policy is testable without touching the engine.

use pulse_core::{DsType, FieldConfig, OldConfig};
use pulse_store::{rrd_file_path, RrdEngine, RrdStore};
use std::path::{Path, PathBuf};

/// Declaration attributes that propagate into an existing file.
const AUTOTUNE_ATTRS: [&str; 3] = ["type", "min", "max"];

/// Planned on-disk consequence of a declaration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftAction {
    /// Autotune attributes changed in place.
    Tune { path: PathBuf },
    /// `oldname` points at an existing file: move it, then tune.
    RenameAndTune { from: PathBuf, to: PathBuf },
    /// Both candidate files exist; changing either would lose data.
    ManualMerge { old_path: PathBuf, new_path: PathBuf },
    /// The declaration now points at a different file (e.g. a type
    /// change); history stays under the old name, a fresh file will be
    /// born on the next sample.
    Diverged { old_path: PathBuf, new_path: PathBuf },
}

fn autotune_differs(old: &FieldConfig, new: &FieldConfig) -> bool {
    AUTOTUNE_ATTRS.iter().any(|attr| {
        let old_value = old.get(*attr);
        let new_value = new.get(*attr);
        match (old_value, new_value) {
            (None, None) => false,
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    })
}

fn declared_type(config: &FieldConfig) -> DsType {
    config
        .get("type")
        .map(|t| DsType::parse(t))
        .unwrap_or_default()
}

/// Decide what (if anything) must happen on disk before samples for
/// `(service, field)` are written.
pub fn plan(
    dbdir: &Path,
    host_path: &str,
    service: &str,
    field: &str,
    new_config: &FieldConfig,
    old_config: &OldConfig,
    current_version: &str,
) -> Option<DriftAction> {
    let new_path = rrd_file_path(dbdir, host_path, service, field, declared_type(new_config));

    let oldname = new_config.get("oldname").map(String::as_str);
    let old_field = oldname.unwrap_or(field);
    let old_decl = old_config.field(service, old_field);
    let renamed = oldname.is_some() && old_decl.is_some();

    if let Some(old_decl) = old_decl {
        let old_path = rrd_file_path(dbdir, host_path, service, old_field, declared_type(old_decl));
        let differs = autotune_differs(old_decl, new_config);

        if renamed && old_path != new_path {
            return match (old_path.exists(), new_path.exists()) {
                (true, false) => Some(DriftAction::RenameAndTune {
                    from: old_path,
                    to: new_path,
                }),
                (true, true) => Some(DriftAction::ManualMerge { old_path, new_path }),
                // Old file already gone; the surviving file still gets
                // the new declaration's autotune attributes.
                (false, true) => Some(DriftAction::Tune { path: new_path }),
                (false, false) => None,
            };
        }
        if differs {
            return if old_path == new_path {
                Some(DriftAction::Tune { path: new_path })
            } else {
                Some(DriftAction::Diverged { old_path, new_path })
            };
        }
    }

    // Unchanged declaration: a software upgrade still gets one
    // precautionary tune so defaults that moved between versions land.
    let version_changed = old_config.version.as_deref() != Some(current_version);
    if version_changed && new_path.exists() {
        return Some(DriftAction::Tune { path: new_path });
    }
    None
}

/// Execute one planned action.
pub async fn apply<E: RrdEngine>(
    action: &DriftAction,
    store: &RrdStore<E>,
    new_config: &FieldConfig,
) {
    match action {
        DriftAction::Tune { path } => {
            store.tune(path, new_config).await;
        }
        DriftAction::RenameAndTune { from, to } => {
            tracing::info!(from = %from.display(), to = %to.display(), "renaming rrd file");
            match std::fs::rename(from, to) {
                Ok(()) => store.tune(to, new_config).await,
                Err(e) => {
                    tracing::error!(from = %from.display(), error = %e, "rename failed");
                }
            }
        }
        DriftAction::ManualMerge { old_path, new_path } => {
            tracing::warn!(
                old = %old_path.display(),
                new = %new_path.display(),
                "both files exist after a rename request, manual merge required"
            );
        }
        DriftAction::Diverged { old_path, new_path } => {
            tracing::info!(
                old = %old_path.display(),
                new = %new_path.display(),
                "declaration diverged, history stays under the old file"
            );
        }
    }
}

#[cfg(test)]
#[path = "drift_tests.rs"]
mod tests;
