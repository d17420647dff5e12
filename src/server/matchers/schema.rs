use std::{
    any::Any,
    io,
    panic::{catch_unwind, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use http::Request;
use thiserror::Error;

use crate::{
    common::{body::Body, util::file_extension},
    server::matchers::{json_schema, rewind::RewindGuard, xml_schema, RequestMatcher},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("the schema file {} not found", .0.display())]
    SchemaFileNotFound(PathBuf),
    #[error("unexpected empty body request")]
    EmptyRequestBody,
    #[error("error reading the schema file {}: {}", .0.display(), .1)]
    SchemaFileReadError(PathBuf, io::Error),
    #[error("error parsing the schema: {0}")]
    SchemaParseError(String),
    #[error("error parsing the request body: {0}")]
    RequestBodyParseError(String),
    #[error("request body does not match the schema: {0}")]
    SchemaViolation(String),
    #[error("unknown schema file extension: {0}")]
    UnsupportedSchemaExtension(String),
    #[error("error reading the request body: {0}")]
    BodyReadError(String),
    #[error("schema validation aborted: {0}")]
    ValidatorPanic(String),
}

/// Gives access to the schema a route declares for its request bodies.
pub trait SchemaSource {
    /// The schema file path exactly as declared on the route, if any.
    fn declared_schema_file(&self) -> Option<&str>;

    /// Resolves a declared file path to an absolute filesystem path.
    fn resolve_file_path(&self, path: &str) -> PathBuf;
}

impl<T: SchemaSource + ?Sized> SchemaSource for &T {
    fn declared_schema_file(&self) -> Option<&str> {
        (**self).declared_schema_file()
    }

    fn resolve_file_path(&self, path: &str) -> PathBuf {
        (**self).resolve_file_path(path)
    }
}

/// The validation engine a schema file is handled by, derived from its file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    JsonSchema,
    XmlSchema,
    Unsupported(String),
}

impl SchemaKind {
    pub fn from_path(path: &str) -> Self {
        match file_extension(path) {
            Some("json") => SchemaKind::JsonSchema,
            Some("xml") | Some("xsd") => SchemaKind::XmlSchema,
            Some(other) => SchemaKind::Unsupported(format!(".{}", other)),
            None => SchemaKind::Unsupported(String::new()),
        }
    }
}

/// Matches requests whose body conforms to the schema declared by a route.
///
/// Routes without a schema match every request. The request body is captured for the
/// validation and put back afterwards, so it can be read again by anything that runs later.
pub struct SchemaMatcher<S> {
    source: S,
}

impl<S: SchemaSource> SchemaMatcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Validates the request body against the declared schema.
    pub fn validate(&self, req: &mut Request<Body>) -> Result<(), Error> {
        let declared = match self.source.declared_schema_file() {
            None => return Ok(()),
            Some(declared) => declared,
        };

        match SchemaKind::from_path(declared) {
            SchemaKind::JsonSchema => self.validate_with(req, declared, json_schema::validate),
            SchemaKind::XmlSchema => self.validate_with(req, declared, xml_schema::validate),
            SchemaKind::Unsupported(ext) => Err(Error::UnsupportedSchemaExtension(ext)),
        }
    }

    fn validate_with(
        &self,
        req: &mut Request<Body>,
        declared: &str,
        validator: fn(&Path, &[u8]) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let schema_file = self.existing_schema_file(declared)?;
        let body = RewindGuard::capture(req.body_mut());
        let content = non_empty(body.bytes()?)?;
        validator(&schema_file, content)
    }

    fn existing_schema_file(&self, declared: &str) -> Result<PathBuf, Error> {
        let schema_file = self.source.resolve_file_path(declared);
        if !schema_file.exists() {
            return Err(Error::SchemaFileNotFound(schema_file));
        }
        Ok(schema_file)
    }
}

impl<S: SchemaSource> RequestMatcher for SchemaMatcher<S> {
    fn matches(&self, req: &mut Request<Body>) -> bool {
        let result = catch_unwind(AssertUnwindSafe(|| self.validate(req)))
            .unwrap_or_else(|panic| Err(Error::ValidatorPanic(panic_message(panic.as_ref()))));

        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    "Request {} {} does not match schema {:?}: {}",
                    req.method(),
                    req.uri().path(),
                    self.source.declared_schema_file().unwrap_or_default(),
                    err
                );
                false
            }
        }
    }
}

fn non_empty(body: &[u8]) -> Result<&[u8], Error> {
    if body.is_empty() {
        return Err(Error::EmptyRequestBody);
    }
    Ok(body)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        return msg.to_string();
    }
    if let Some(msg) = panic.downcast_ref::<String>() {
        return msg.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
mod test {
    use super::{Error, SchemaKind, SchemaMatcher, SchemaSource};
    use crate::{common::body::Body, server::matchers::RequestMatcher};
    use http::Request;
    use std::{
        cell::Cell,
        io::{self, Read},
        path::PathBuf,
    };

    struct StubSource {
        schema_file: Option<&'static str>,
        resolved: Cell<usize>,
    }

    impl StubSource {
        fn new(schema_file: Option<&'static str>) -> Self {
            Self {
                schema_file,
                resolved: Cell::new(0),
            }
        }
    }

    impl SchemaSource for StubSource {
        fn declared_schema_file(&self) -> Option<&str> {
            self.schema_file
        }

        fn resolve_file_path(&self, path: &str) -> PathBuf {
            self.resolved.set(self.resolved.get() + 1);
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
        }
    }

    struct PanickingReader;

    struct TruncatedReader {
        served: bool,
    }

    impl Read for TruncatedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.served = true;
            buf[..8].copy_from_slice(b"{\"id\":5}");
            Ok(8)
        }
    }

    fn truncated_request() -> Request<Body> {
        Request::post("/gophers")
            .body(Body::from_reader(TruncatedReader { served: false }))
            .unwrap()
    }

    impl Read for PanickingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("stream exploded")
        }
    }

    fn request(body: impl Into<Body>) -> Request<Body> {
        Request::post("/gophers").body(body.into()).unwrap()
    }

    fn body_of(req: &mut Request<Body>) -> String {
        let mut content = String::new();
        req.body_mut().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn schema_kind_from_extension() {
        assert_eq!(SchemaKind::from_path("a/b.json"), SchemaKind::JsonSchema);
        assert_eq!(SchemaKind::from_path("a/b.xsd"), SchemaKind::XmlSchema);
        assert_eq!(SchemaKind::from_path("a/b.xml"), SchemaKind::XmlSchema);
        assert_eq!(
            SchemaKind::from_path("a/b.JSON"),
            SchemaKind::Unsupported(".JSON".to_string())
        );
        assert_eq!(
            SchemaKind::from_path("a/b"),
            SchemaKind::Unsupported(String::new())
        );
        assert_eq!(SchemaKind::from_path("a/.json"), SchemaKind::JsonSchema);
        assert_eq!(
            SchemaKind::from_path("a/b."),
            SchemaKind::Unsupported(".".to_string())
        );
    }

    #[test]
    fn no_schema_always_matches() {
        let source = StubSource::new(None);
        let mut req = request("definitely not json");

        assert!(SchemaMatcher::new(&source).matches(&mut req));
        assert_eq!(body_of(&mut req), "definitely not json");
    }

    #[test]
    fn unsupported_extension_fails_without_file_access() {
        let source = StubSource::new(Some("tests/resources/schemas/gopher.yaml"));
        let mut req = request("{\"id\":5}");

        let result = SchemaMatcher::new(&source).validate(&mut req);

        assert!(matches!(result, Err(Error::UnsupportedSchemaExtension(ext)) if ext == ".yaml"));
        assert_eq!(source.resolved.get(), 0);
        assert_eq!(body_of(&mut req), "{\"id\":5}");
    }

    #[test]
    fn missing_schema_file_leaves_body_untouched() {
        let source = StubSource::new(Some("tests/resources/schemas/missing.json"));
        let mut req = request("{\"id\":5}");

        let result = SchemaMatcher::new(&source).validate(&mut req);

        assert!(matches!(result, Err(Error::SchemaFileNotFound(_))));
        assert_eq!(body_of(&mut req), "{\"id\":5}");
    }

    #[test]
    fn empty_body_is_rejected() {
        let source = StubSource::new(Some("tests/resources/schemas/gopher.json"));
        let mut req = request("");

        let result = SchemaMatcher::new(&source).validate(&mut req);

        assert!(matches!(result, Err(Error::EmptyRequestBody)));
    }

    #[test]
    fn body_read_error_is_a_failure_and_keeps_partial_content() {
        let source = StubSource::new(Some("tests/resources/schemas/id.json"));
        let matcher = SchemaMatcher::new(&source);

        let mut req = truncated_request();
        let result = matcher.validate(&mut req);
        assert!(matches!(result, Err(Error::BodyReadError(_))));
        assert_eq!(body_of(&mut req), "{\"id\":5}");

        let mut req = truncated_request();
        assert!(!matcher.matches(&mut req));
        assert_eq!(body_of(&mut req), "{\"id\":5}");
    }

    #[test]
    fn panicking_body_does_not_escape_matcher() {
        let source = StubSource::new(Some("tests/resources/schemas/gopher.json"));
        let mut req = Request::post("/gophers")
            .body(Body::from_reader(PanickingReader))
            .unwrap();

        assert!(!SchemaMatcher::new(&source).matches(&mut req));
        assert_eq!(body_of(&mut req), "");
    }
}
