use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `path` using C++ `std::filesystem::path::lexically_normal()`
/// normalization algorithm.
///
/// This normalization process will traverse up the filesystem which does
/// not follow [`std::path::Path::normalize_lexically()`].
pub fn lexically_normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut iter = path.components().peekable();

    let root = match iter.peek() {
        None => return PathBuf::new(),
        Some(p @ Component::RootDir) | Some(p @ Component::Prefix(_)) => Some(*p),
        _ => None,
    };

    let mut normalized = PathBuf::new();

    while let Some(component) = iter.next() {
        match component {
            Component::CurDir => continue,
            Component::Normal(_) if iter.next_if_eq(&Component::ParentDir).is_some() => {
                continue;
            }
            Component::ParentDir => {
                if !normalized.pop() {
                    if let Some(root) = root {
                        normalized.push(root);
                    } else {
                        normalized.push(Component::ParentDir);
                    }
                }
            }
            o => {
                normalized.push(o);
            }
        }
    }

    if normalized.components().next().is_none() {
        normalized.push(Component::CurDir);
    }

    normalized
}

/// Makes `path` absolute relative to the current directory and normalizes it.
///
/// Does not touch the filesystem so the path does not need to exist.
pub fn absolute_normalized_path(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    std::path::absolute(path).map(lexically_normalize_path)
}

/// Returns the path of the `<stem>.<extension>` file inside of `dir`.
pub fn artifact_path(dir: impl AsRef<Path>, stem: &str, extension: &str) -> PathBuf {
    dir.as_ref().join(format!("{stem}.{extension}"))
}
