use std::collections::BTreeMap;

use http::Request;

use crate::common::body::Body;

pub(crate) mod json_schema;
pub(crate) mod rewind;
pub mod schema;
pub(crate) mod xml_schema;

/// A predicate consulted by the router to decide whether a request qualifies for a route.
///
/// Matchers receive the request mutably because some of them have to consume the body. Every
/// matcher must leave the request in a state where the next matcher (or the handler) can read
/// it again from the start. Matchers never fail: any problem means "no match".
pub trait RequestMatcher {
    fn matches(&self, req: &mut Request<Body>) -> bool;
}

// ************************************************************************************************
// MethodMatcher
// ************************************************************************************************
pub struct MethodMatcher<'a> {
    pub method: &'a str,
}

impl RequestMatcher for MethodMatcher<'_> {
    fn matches(&self, req: &mut Request<Body>) -> bool {
        req.method().as_str().eq_ignore_ascii_case(self.method)
    }
}

// ************************************************************************************************
// PathMatcher
// ************************************************************************************************
pub struct PathMatcher<'a> {
    pub endpoint: &'a str,
}

impl RequestMatcher for PathMatcher<'_> {
    fn matches(&self, req: &mut Request<Body>) -> bool {
        req.uri().path() == self.endpoint
    }
}

// ************************************************************************************************
// HeaderMatcher
// ************************************************************************************************
/// Requires every expected header to be present with exactly the expected value. Header names
/// are compared case-insensitively; a header sent more than once matches if any value does.
pub struct HeaderMatcher<'a> {
    pub headers: Option<&'a BTreeMap<String, String>>,
}

impl RequestMatcher for HeaderMatcher<'_> {
    fn matches(&self, req: &mut Request<Body>) -> bool {
        let expected = match self.headers {
            None => return true,
            Some(expected) => expected,
        };

        expected.iter().all(|(name, value)| {
            req.headers()
                .get_all(name.as_str())
                .iter()
                .any(|actual| actual.to_str().map_or(false, |actual| actual == value))
        })
    }
}

// ************************************************************************************************
// QueryParameterMatcher
// ************************************************************************************************
/// Requires every expected query parameter to be present with exactly the expected (decoded)
/// value.
pub struct QueryParameterMatcher<'a> {
    pub params: Option<&'a BTreeMap<String, String>>,
}

impl RequestMatcher for QueryParameterMatcher<'_> {
    fn matches(&self, req: &mut Request<Body>) -> bool {
        let expected = match self.params {
            None => return true,
            Some(expected) => expected,
        };

        let query = req.uri().query().unwrap_or_default();
        let actual: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        expected
            .iter()
            .all(|(key, value)| actual.iter().any(|(k, v)| k == key && v == value))
    }
}
