//! Post-download renaming from identifiers to readable labels.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::dom;
use crate::error::Result;
use crate::extract::RenameMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    NoLabel,
    EmptyLabel,
    /// Another file already holds the destination name.
    Exists(String),
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renamed {
    Renamed { from: String, to: String },
    Unchanged(String),
    Failed { file: String, reason: Failure },
}

/// New base name for `key`: a label that already starts with a digit is used
/// as is, otherwise the digits of the key are prefixed as a reference code.
pub fn destination(key: &str, label: &str) -> Option<String> {
    let first = label.chars().next()?;
    if first.is_numeric() {
        return Some(label.to_string());
    }
    let code: String = key.chars().filter(|c| c.is_numeric()).collect();
    Some(format!("{code} {label}"))
}

/// Rename every file in `dir` whose identifier has a label. Failures are
/// reported per file and never stop the batch.
pub fn rename_all(dir: &Path, labels: &RenameMap) -> Result<Vec<Renamed>> {
    info!("Renaming files");
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut results = Vec::with_capacity(names.len());
    for file in names {
        let result = rename_one(dir, &file, labels);
        if let Renamed::Failed { file, reason } = &result {
            warn!("Rename failed for {}: {:?}", file, reason);
        }
        results.push(result);
    }
    Ok(results)
}

fn rename_one(dir: &Path, file: &str, labels: &RenameMap) -> Renamed {
    let key = dom::strip_extension(file);
    let ext = &file[key.len()..];
    let fail = |reason| Renamed::Failed {
        file: file.to_string(),
        reason,
    };

    let Some(label) = labels.get(key) else {
        return fail(Failure::NoLabel);
    };
    let Some(base) = destination(key, label) else {
        return fail(Failure::EmptyLabel);
    };
    let target = format!("{base}{ext}");
    if target == file {
        return Renamed::Unchanged(file.to_string());
    }

    let to = dir.join(&target);
    if to.exists() {
        return fail(Failure::Exists(target));
    }
    match fs::rename(dir.join(file), &to) {
        Ok(()) => Renamed::Renamed {
            from: file.to_string(),
            to: target,
        },
        Err(e) => fail(Failure::Io(e.to_string())),
    }
}
