use std::{
    fs::{read, read_dir},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    common::data::Imposter,
    server::persistence::Error::{DeserializationError, FileReadError},
};

const JSON_IMPOSTER_SUFFIX: &str = ".imp.json";
#[cfg(feature = "yaml")]
const YAML_IMPOSTER_SUFFIXES: [&str; 2] = [".imp.yaml", ".imp.yml"];

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read from imposter file: {0}")]
    FileReadError(String),
    #[error("cannot deserialize imposter file {0}: {1}")]
    DeserializationError(String, String),
}

/// Loads all imposters found in `dir` and its subdirectories.
///
/// Imposter files are recognised by their suffix (`.imp.json`, and `.imp.yaml`/`.imp.yml` if
/// the `yaml` feature is enabled). Each file contains a list of imposters. The base path of
/// every loaded imposter is set to the file it was read from. Files are visited in path order.
pub fn read_imposters<P: AsRef<Path>>(dir: P) -> Result<Vec<Imposter>, Error> {
    let mut files = Vec::new();
    collect_imposter_files(dir.as_ref(), &mut files)?;
    files.sort();

    let mut imposters = Vec::new();
    for file_path in files {
        tracing::info!(
            "Loading imposter file from '{}'",
            file_path.to_string_lossy()
        );

        let content = read(&file_path).map_err(|err| FileReadError(err.to_string()))?;
        let loaded = deserialize_imposters(&file_path, &content)?;

        imposters.extend(
            loaded
                .into_iter()
                .map(|imposter| imposter.with_base_path(&file_path)),
        );
    }

    Ok(imposters)
}

fn collect_imposter_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    let entries = read_dir(dir)
        .map_err(|err| FileReadError(format!("cannot list {}: {}", dir.display(), err)))?;

    for entry in entries {
        let path = entry.map_err(|err| FileReadError(err.to_string()))?.path();
        if path.is_dir() {
            collect_imposter_files(&path, files)?;
        } else if is_imposter_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_imposter_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    if name.ends_with(JSON_IMPOSTER_SUFFIX) {
        return true;
    }

    #[cfg(feature = "yaml")]
    if YAML_IMPOSTER_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return true;
    }

    false
}

fn deserialize_imposters(file_path: &Path, content: &[u8]) -> Result<Vec<Imposter>, Error> {
    let to_error = |err: String| DeserializationError(file_path.display().to_string(), err);

    let name = file_path.to_string_lossy();
    if name.ends_with(JSON_IMPOSTER_SUFFIX) {
        return serde_json::from_slice(content).map_err(|err| to_error(err.to_string()));
    }

    #[cfg(feature = "yaml")]
    if YAML_IMPOSTER_SUFFIXES.iter().any(|s| name.ends_with(s)) {
        return serde_yaml::from_slice(content).map_err(|err| to_error(err.to_string()));
    }

    Err(to_error("unsupported imposter file type".to_string()))
}

#[cfg(test)]
mod test {
    use super::{deserialize_imposters, is_imposter_file, Error};
    use std::path::Path;

    #[test]
    fn recognises_imposter_files() {
        assert!(is_imposter_file(Path::new("imposters/gophers.imp.json")));
        assert!(!is_imposter_file(Path::new("imposters/gophers.json")));
        assert!(!is_imposter_file(Path::new("imposters/schemas/gopher.xsd")));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn recognises_yaml_imposter_files() {
        assert!(is_imposter_file(Path::new("imposters/gophers.imp.yaml")));
        assert!(is_imposter_file(Path::new("imposters/gophers.imp.yml")));
    }

    #[test]
    fn deserializes_imposter_list() {
        let content = br#"[
            { "request": { "method": "GET", "endpoint": "/gophers" }, "response": { "status": 200 } },
            { "request": { "method": "POST", "endpoint": "/gophers", "schemaFile": "s.json" }, "response": { "status": 201 } }
        ]"#;

        let imposters = deserialize_imposters(Path::new("a.imp.json"), content).unwrap();

        assert_eq!(imposters.len(), 2);
        assert_eq!(imposters[1].request.schema_file.as_deref(), Some("s.json"));
    }

    #[test]
    fn reports_invalid_imposter_file() {
        let result = deserialize_imposters(Path::new("broken.imp.json"), b"{ not json");
        assert!(matches!(result, Err(Error::DeserializationError(file, _)) if file == "broken.imp.json"));
    }
}
