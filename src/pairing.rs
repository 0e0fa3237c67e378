//! Pairing of left and right input files, and default output naming

use crate::error::{CsvDiffError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A left ("from") and right ("to") file to diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub left: PathBuf,
    pub right: PathBuf,
}

/// Result of pairing the two inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<FilePair>,
    /// Left files without a counterpart on the right
    pub unmatched: Vec<PathBuf>,
}

/// File selection for directory mode
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            include: vec![crate::DEFAULT_PATTERN.to_string()],
            exclude: Vec::new(),
        }
    }
}

impl FileFilter {
    pub fn accepts(&self, file_name: &str) -> bool {
        self.include.iter().any(|p| wildcard_match(p, file_name))
            && !self.exclude.iter().any(|p| wildcard_match(p, file_name))
    }
}

/// Pair two files, or the matching files of two directories
pub fn resolve_pairs(from: &Path, to: &Path, filter: &FileFilter) -> Result<Pairing> {
    match (from.is_dir(), to.is_dir()) {
        (false, false) => {
            for path in [from, to] {
                if !path.is_file() {
                    return Err(CsvDiffError::invalid_input(format!(
                        "Input file does not exist: {}",
                        path.display()
                    )));
                }
            }
            Ok(Pairing {
                pairs: vec![FilePair {
                    left: from.to_path_buf(),
                    right: to.to_path_buf(),
                }],
                unmatched: Vec::new(),
            })
        }
        (true, true) => pair_directories(from, to, filter),
        _ => Err(CsvDiffError::invalid_input(format!(
            "Cannot compare a file with a directory: {} and {}",
            from.display(),
            to.display()
        ))),
    }
}

fn pair_directories(from: &Path, to: &Path, filter: &FileFilter) -> Result<Pairing> {
    let mut pairing = Pairing::default();

    for entry in WalkDir::new(from)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !filter.accepts(&name) {
            log::debug!("Skipping {} (filtered)", entry.path().display());
            continue;
        }

        let right = to.join(entry.file_name());
        if right.is_file() {
            pairing.pairs.push(FilePair {
                left: entry.path().to_path_buf(),
                right,
            });
        } else {
            log::warn!("No counterpart for {} in {}", name, to.display());
            pairing.unmatched.push(entry.path().to_path_buf());
        }
    }

    if pairing.pairs.is_empty() {
        return Err(CsvDiffError::invalid_input(format!(
            "No matching files to compare in {} and {}",
            from.display(),
            to.display()
        )));
    }

    Ok(pairing)
}

/// Match a file name against a pattern with `*` and `?` wildcards
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            // Let the last star absorb one more character
            p = star + 1;
            n = matched + 1;
            backtrack = Some((star, n));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// `Diff_<left>_to_<right>.<ext>` beside the left input
pub fn default_output_path(from: &Path, to: &Path, extension: &str) -> PathBuf {
    let stem = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string())
    };
    let file_name = format!("Diff_{}_to_{}.{}", stem(from), stem(to), extension);

    match from.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
