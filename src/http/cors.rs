use vercel_runtime::{Body, Response, StatusCode};

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const MAX_AGE: &str = "86400";

/// Headers attached to every response, pre-flight included.
pub fn cors_headers(origin: &str) -> [(&'static str, &str); 4] {
    [
        ("Access-Control-Allow-Origin", origin),
        ("Access-Control-Allow-Methods", ALLOW_METHODS),
        ("Access-Control-Allow-Headers", ALLOW_HEADERS),
        ("Access-Control-Max-Age", MAX_AGE),
    ]
}

/// `204 No Content` answer to an `OPTIONS` pre-flight.
pub fn preflight(origin: &str) -> anyhow::Result<Response<Body>> {
    let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
    for (name, value) in cors_headers(origin) {
        builder = builder.header(name, value);
    }
    Ok(builder.body(Body::Empty)?)
}
