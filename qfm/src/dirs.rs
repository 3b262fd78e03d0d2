use std::path::{Component, Path, PathBuf};

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Join a user-typed path onto `base`. Absolute input replaces `base`, and a
/// leading `~` is expanded.
pub fn resolve(base: &Path, input: &str) -> PathBuf {
    let expanded = shellexpand::tilde(input.trim());
    normalize(&base.join(expanded.as_ref()))
}

/// Final component of `path`, or the whole path for roots.
pub fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// The last two components of `path`, as shown at the head of the status line.
pub fn short_location(path: &Path) -> String {
    let mut parts: Vec<String> = path
        .components()
        .rev()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .take(2)
        .collect();
    parts.reverse();
    if parts.is_empty() {
        return "/".to_string();
    }
    parts.join("/")
}
