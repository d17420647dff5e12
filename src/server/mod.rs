use http::Request;
use http_body_util::BodyExt;

use crate::{common::body::Body, server::matchers::schema::Error};

pub mod matchers;
pub mod persistence;
pub mod router;

/// Collects the body of a request received by a hyper server into memory and returns an
/// otherwise identical request that can be handed to [`router::ImposterRouter::find`].
pub async fn buffer_request<B>(req: Request<B>) -> Result<Request<Body>, Error>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|err| Error::BodyReadError(err.to_string()))?
        .to_bytes();

    Ok(Request::from_parts(parts, Body::from(body)))
}
