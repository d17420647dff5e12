//! `schemock` decides whether an HTTP request sent to a mock server satisfies the body schema
//! declared by a mock route (an *imposter*).
//!
//! An imposter may reference a schema file next to its definition. Depending on the file
//! extension the request body is checked against
//!
//! * a **JSON Schema** (`.json`), or
//! * an **XML Schema Definition** (`.xsd` or `.xml`).
//!
//! Any other extension never matches. Imposters without a schema file accept every body.
//!
//! # Usage
//! Imposters are usually loaded from a directory of `*.imp.json` (or `*.imp.yaml`) files.
//! The [ImposterRouter](server/router/struct.ImposterRouter.html) then picks the imposter that
//! serves an incoming request:
//!
//! ```rust,no_run
//! use schemock::{Body, ImposterRouter};
//!
//! let router = ImposterRouter::from_dir("imposters").unwrap();
//!
//! let mut req = http::Request::post("/gophers")
//!     .body(Body::from(r#"{"name":"Zebediah","color":"Purple","age":55}"#))
//!     .unwrap();
//!
//! if let Some(imposter) = router.find(&mut req) {
//!     println!("serving status {}", imposter.response.status);
//! }
//! ```
//!
//! Request bodies are single-use streams. Matching reads the body, but always puts an
//! identical, unread body back into the request, so the same request can be evaluated against
//! many imposters and still be read by the handler that finally serves it.
//!
//! The [SchemaMatcher](server/matchers/schema/struct.SchemaMatcher.html) can also be used on its
//! own with any type implementing [SchemaSource](server/matchers/schema/trait.SchemaSource.html).
//! Validation failures are logged with `tracing` and reported as "no match".

pub mod common;
pub mod server;

pub use crate::common::{
    body::Body,
    data::{Imposter, ImposterRequest, ImposterResponse},
};
pub use crate::server::{
    buffer_request,
    matchers::{
        schema::{Error, SchemaKind, SchemaMatcher, SchemaSource},
        RequestMatcher,
    },
    persistence::read_imposters,
    router::ImposterRouter,
};
