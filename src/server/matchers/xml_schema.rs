use std::{fs, path::Path};

use libxml::{
    error::StructuredError,
    parser::{Parser, ParserOptions, XmlParseFailure},
    schemas::{SchemaParserContext, SchemaValidationContext},
};

use crate::{common::util::to_maybe_lossy_str, server::matchers::schema::Error};

/// Validates an XML request body against the XSD stored in `schema_file`.
///
/// The parsed document and the schema contexts are owned by this call and freed by their
/// destructors on every return path.
pub(crate) fn validate(schema_file: &Path, body: &[u8]) -> Result<(), Error> {
    let schema = fs::read(schema_file)
        .map_err(|err| Error::SchemaFileReadError(schema_file.to_path_buf(), err))?;

    let mut schema_parser = SchemaParserContext::from_buffer(&schema);
    let mut validation = SchemaValidationContext::from_parser(&mut schema_parser).map_err(|errs| {
        Error::SchemaParseError(format!("{}: {}", schema_file.display(), describe(&errs)))
    })?;

    let options = ParserOptions {
        recover: false,
        no_net: true,
        ..ParserOptions::default()
    };
    let (document, _warnings) = Parser::default()
        .parse_string_with_diagnostics(body, options)
        .map_err(|failure| match failure {
            XmlParseFailure::ParseFailed(diagnostics) if !diagnostics.is_empty() => {
                Error::RequestBodyParseError(describe(&diagnostics))
            }
            other => Error::RequestBodyParseError(other.to_string()),
        })?;

    tracing::trace!(
        "Validating request body '{}' against XML schema {}",
        to_maybe_lossy_str(body),
        schema_file.display()
    );

    validation
        .validate_document(&document)
        .map_err(|errs| Error::SchemaViolation(describe(&errs)))
}

fn describe(errors: &[StructuredError]) -> String {
    let err = match errors.first() {
        Some(err) => err,
        None => return "unknown error".to_string(),
    };

    let message = err.message.as_deref().map_or("unknown error", str::trim);
    match (err.line, err.col) {
        (Some(line), Some(col)) => format!("line {}, column {}: {}", line, col, message),
        (Some(line), None) => format!("line {}: {}", line, message),
        _ => message.to_string(),
    }
}
