use std::{
    borrow::Cow,
    env,
    path::{Path, PathBuf},
};

// ===============================================================================================
// Files
// ===============================================================================================
#[doc(hidden)]
pub fn get_test_resource_file_path(relative_resource_path: &str) -> Result<PathBuf, String> {
    match env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_path) => Ok(Path::new(&manifest_path).join(relative_resource_path)),
        Err(e) => Err(e.to_string()),
    }
}

/// Returns the text after the last dot of the final element of `path`. Matching is
/// case-sensitive and only the last extension is returned (`a.imp.json` -> `json`). Dot files
/// count as extensions too (`schemas/.json` -> `json`).
pub(crate) fn file_extension(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', std::path::MAIN_SEPARATOR]).next()?;
    name.rfind('.').map(|idx| &name[idx + 1..])
}

// ===============================================================================================
// Text
// ===============================================================================================
/// Converts bytes to a UTF-8 string, replacing invalid sequences only if there are any.
pub(crate) fn to_maybe_lossy_str(bytes: &[u8]) -> Cow<str> {
    match std::str::from_utf8(bytes) {
        Ok(valid_str) => Cow::Borrowed(valid_str),
        Err(_) => String::from_utf8_lossy(bytes),
    }
}
