/// Browsers may call the JSON API from any origin. Only the headers a
/// `POST /api/v1/recommend` body needs are allowed.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type", "Accept"])
        .allow_methods(vec!["POST", "GET"])
}
