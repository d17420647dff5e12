use std::{fs, path::Path};

use serde_json::Value;

use crate::{common::util::to_maybe_lossy_str, server::matchers::schema::Error};

/// Validates a JSON request body against the JSON Schema stored in `schema_file`.
///
/// Only the first violation reported by the validator is returned.
pub(crate) fn validate(schema_file: &Path, body: &[u8]) -> Result<(), Error> {
    let schema = fs::read(schema_file)
        .map_err(|err| Error::SchemaFileReadError(schema_file.to_path_buf(), err))?;
    let schema: Value = serde_json::from_slice(&schema)
        .map_err(|err| Error::SchemaParseError(format!("{}: {}", schema_file.display(), err)))?;

    let validator = jsonschema::options()
        .should_validate_formats(true)
        .build(&schema)
        .map_err(|err| Error::SchemaParseError(format!("{}: {}", schema_file.display(), err)))?;

    let document: Value = serde_json::from_slice(body)
        .map_err(|err| Error::RequestBodyParseError(err.to_string()))?;

    tracing::trace!(
        "Validating request body '{}' against JSON schema {}",
        to_maybe_lossy_str(body),
        schema_file.display()
    );

    if let Some(violation) = validator.iter_errors(&document).next() {
        return Err(Error::SchemaViolation(violation.to_string()));
    }

    Ok(())
}
