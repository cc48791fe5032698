//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `cwd` and normalise it lexically.
///
/// `.` segments are dropped, `..` pops the previous segment and a trailing
/// separator is removed. The filesystem is never consulted, so symlinks are
/// left alone and the path does not need to exist.
pub fn absolutize(cwd: &Path, path: impl AsRef<Path>) -> PathBuf {
  let joined = cwd.join(path);
  let mut out = PathBuf::new();

  for component in joined.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
      Component::CurDir => {}
      Component::ParentDir => {
        if matches!(out.components().next_back(), Some(Component::Normal(_))) {
          out.pop();
        }
      }
      Component::Normal(segment) => out.push(segment),
    }
  }

  out
}

/// Lossy string form used when a path becomes part of a command line.
pub fn to_token(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// Quote `token` for a POSIX shell unless it is made only of characters the
/// shell passes through untouched.
pub fn shell_quote(token: &str) -> String {
  let plain = !token.is_empty()
    && token
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ',' | ':' | '@' | '%' | '='));
  if plain {
    return token.to_string();
  }
  format!("'{}'", token.replace('\'', r"'\''"))
}
