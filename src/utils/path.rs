use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Replaces a leading `~` with the current user's home directory.
///
/// Paths naming another user (`~name/...`) and paths whose home cannot
/// be determined come back unchanged.
pub fn expandtilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let path_str = match path.to_str() {
        Some(s) => s,
        None => return path.to_path_buf(),
    };
    if !path_str.starts_with('~') {
        return path.to_path_buf();
    }
    let i = path_str.find(MAIN_SEPARATOR).unwrap_or(path_str.len());
    if i != 1 {
        return path.to_path_buf();
    }
    match env::var_os("HOME").map(PathBuf::from) {
        Some(mut home) => {
            if i < path_str.len() - 1 {
                home.push(&path_str[i + 1..]);
            }
            home
        }
        None => path.to_path_buf(),
    }
}
