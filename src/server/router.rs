use std::path::Path;

use http::Request;

use crate::{
    common::{body::Body, data::Imposter},
    server::{
        matchers::{
            schema::SchemaMatcher, HeaderMatcher, MethodMatcher, PathMatcher,
            QueryParameterMatcher, RequestMatcher,
        },
        persistence::{self, read_imposters},
    },
};

/// Finds the imposter that serves an incoming request.
///
/// Imposters are evaluated in the order they were added. For every candidate the method, path,
/// headers and query parameters are checked before the body is validated against the
/// candidate's schema, so schema files are only touched for routes that could otherwise serve
/// the request.
#[derive(Debug, Default)]
pub struct ImposterRouter {
    imposters: Vec<Imposter>,
}

impl ImposterRouter {
    pub fn new(imposters: Vec<Imposter>) -> Self {
        Self { imposters }
    }

    /// Creates a router from all imposter files found in `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, persistence::Error> {
        Ok(Self::new(read_imposters(dir)?))
    }

    pub fn add(&mut self, imposter: Imposter) {
        self.imposters.push(imposter);
    }

    pub fn imposters(&self) -> &[Imposter] {
        &self.imposters
    }

    /// Returns the first imposter that accepts the request. The request body can be read again
    /// afterwards, whether an imposter was found or not.
    pub fn find(&self, req: &mut Request<Body>) -> Option<&Imposter> {
        tracing::trace!("Routing incoming request: {} {}", req.method(), req.uri());

        let found = self.imposters.iter().find(|imposter| {
            let matchers: [&dyn RequestMatcher; 5] = [
                &MethodMatcher {
                    method: &imposter.request.method,
                },
                &PathMatcher {
                    endpoint: &imposter.request.endpoint,
                },
                &HeaderMatcher {
                    headers: imposter.request.headers.as_ref(),
                },
                &QueryParameterMatcher {
                    params: imposter.request.params.as_ref(),
                },
                &SchemaMatcher::new(*imposter),
            ];

            matchers.iter().all(|matcher| matcher.matches(req))
        });

        match found {
            Some(imposter) => tracing::debug!(
                "Request {} {} matched imposter for {} {}",
                req.method(),
                req.uri().path(),
                imposter.request.method,
                imposter.request.endpoint
            ),
            None => tracing::debug!(
                "No imposter matches request {} {}",
                req.method(),
                req.uri().path()
            ),
        }

        found
    }
}
