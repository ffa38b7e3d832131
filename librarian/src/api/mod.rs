use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::agents::LibrarianAgent;
use crate::config::Config;

mod recommend;

pub fn routes(
    librarian: Arc<LibrarianAgent>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    api.and(warp::path("recommend"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_librarian(librarian))
        .and(with_config(config))
        .and_then(recommend::handle_recommend)
}

fn with_librarian(
    librarian: Arc<LibrarianAgent>,
) -> impl Filter<Extract = (Arc<LibrarianAgent>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || librarian.clone())
}

fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || config.clone())
}
