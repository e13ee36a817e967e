//! Scope matching for owned-scope path patterns.
//!
//! A pattern matches a workspace-relative POSIX path if the strings are
//! equal, if the pattern's glob form fully matches (`**` spans separators,
//! `*` does not), or if the pattern names a directory that prefixes the path.

use regex::Regex;

/// Normalizes a path to POSIX separators and strips a leading `./`.
#[must_use]
pub fn normalize_posix(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .strip_prefix("./")
        .map_or(unified.clone(), std::string::ToString::to_string)
}

/// Compiles a glob pattern into an anchored regex. `**` matches any substring
/// including `/`; `*` matches a run of non-separator characters; every other
/// regex metacharacter is escaped. Returns `None` when compilation fails.
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut source = String::with_capacity(pattern.len() * 2 + 4);
    source.push('^');

    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'*' {
            if bytes.get(i + 1) == Some(&b'*') {
                source.push_str(".*");
                i += 2;
            } else {
                source.push_str("[^/]*");
                i += 1;
            }
        } else {
            let ch = pattern[i..].chars().next()?;
            let mut buf = [0u8; 4];
            source.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            i += ch.len_utf8();
        }
    }

    source.push('$');
    Regex::new(&source).ok()
}

/// Tests whether `path` falls inside `pattern`.
#[must_use]
pub fn scope_match(path: &str, pattern: &str) -> bool {
    if path == pattern {
        return true;
    }

    if let Some(re) = glob_to_regex(pattern) {
        if re.is_match(path) {
            return true;
        }
    }

    // Directory-prefix fallback: `src/auth` owns everything under `src/auth/`.
    let dir = if pattern.ends_with('/') {
        pattern.to_string()
    } else {
        format!("{pattern}/")
    };
    path.starts_with(&dir)
}

/// Tests whether `path` matches any pattern in `owned_scope`.
#[must_use]
pub fn matches_any(path: &str, owned_scope: &[String]) -> bool {
    owned_scope.iter().any(|p| scope_match(path, p))
}
