//! Lexical path helpers shared by specifier resolution and the workspace

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` without touching the filesystem.
///
/// `..` never climbs above a root, so `/a/../../b` is `/b`. Leading `..` of a
/// relative path is kept.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}
