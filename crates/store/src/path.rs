// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk rrd file naming.

use pulse_core::DsType;
use std::path::{Path, PathBuf};

/// Derive the rrd file path for one data source.
///
/// `;` and `:` in the host path become directory separators, `.` in
/// multigraph service names flattens to `-`, and the type's lower-cased
/// initial lands in the filename so a declared type change points at a
/// fresh file.
pub fn rrd_file_path(
    dbdir: &Path,
    host_path: &str,
    service: &str,
    field: &str,
    ds_type: DsType,
) -> PathBuf {
    let host_path = host_path.replace([';', ':'], "/");
    let service = service.replace('.', "-");
    dbdir.join(format!(
        "{host_path}-{service}-{field}-{}.rrd",
        ds_type.initial()
    ))
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
