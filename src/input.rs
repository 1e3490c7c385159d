//! Normalising paths typed or dragged into a terminal.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, JournalError, JournalResult};

/// Turn raw terminal input into an existing, canonical path.
///
/// Surrounding quotes are removed, shell backslash escapes are undone on Unix and a leading
/// `~` is expanded to the home directory.
pub fn normalize_input_path(raw: &str) -> JournalResult<PathBuf> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(JournalError::EmptyInput);
  }

  let unquoted = strip_matching_quotes(trimmed);
  let unescaped = if cfg!(windows) {
    unquoted.to_string()
  } else {
    unescape_posix(unquoted)
  };
  let path = expand_home(&unescaped);

  if !path.exists() {
    return Err(JournalError::InputNotFound(path));
  }
  path.canonicalize().at_path(&path)
}

/// Markdown file to build for an `update` target.
///
/// A folder resolves to `<folder>/<folder>.md` when present, otherwise to its alphabetically
/// first `.md` file.
pub fn resolve_markdown_path(path: &Path) -> JournalResult<PathBuf> {
  if path.is_file() {
    return Ok(path.to_path_buf());
  }
  if !path.is_dir() {
    return Err(JournalError::InputNotFound(path.to_path_buf()));
  }

  if let Some(name) = path.file_name() {
    let mut file_name = name.to_os_string();
    file_name.push(".md");
    let named = path.join(file_name);
    if named.is_file() {
      return Ok(named);
    }
  }

  let mut candidates: Vec<PathBuf> = fs::read_dir(path)
    .at_path(path)?
    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
    .filter(|candidate| {
      candidate.is_file() && candidate.extension().is_some_and(|ext| ext == "md")
    })
    .collect();
  candidates.sort();
  candidates
    .into_iter()
    .next()
    .ok_or_else(|| JournalError::NoMarkdownInFolder(path.to_path_buf()))
}

fn strip_matching_quotes(value: &str) -> &str {
  for quote in ['"', '\''] {
    if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
      return &value[1..value.len() - 1];
    }
  }
  value
}

/// Undo the backslash escaping shells apply to dragged paths (`My\ Notes` → `My Notes`).
fn unescape_posix(value: &str) -> String {
  let mut result = String::with_capacity(value.len());
  let mut chars = value.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(escaped) = chars.next() {
        result.push(escaped);
        continue;
      }
    }
    result.push(c);
  }
  result
}

fn expand_home(value: &str) -> PathBuf {
  let rest = match value.strip_prefix('~') {
    Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
    _ => return PathBuf::from(value),
  };
  match env::var_os("HOME") {
    Some(home) => PathBuf::from(home).join(rest),
    None => PathBuf::from(value),
  }
}
