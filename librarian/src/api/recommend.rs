use std::sync::Arc;

use tracing::{info, Instrument};
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::agents::LibrarianAgent;
use crate::config::Config;
use crate::error::LibrarianError;
use crate::models::RecommendRequest;

pub async fn handle_recommend(
    request: RecommendRequest,
    librarian: Arc<LibrarianAgent>,
    config: Arc<Config>,
) -> Result<impl Reply, Rejection> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("recommend_request", %request_id);

    async move {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(warp::reject::custom(LibrarianError::BadRequest(
                "query must not be empty".to_string(),
            )));
        }
        let k = config.top_k(request.top_k).map_err(warp::reject::custom)?;

        info!("Processing query: {}", query);
        let result = librarian
            .recommend(query, k)
            .await
            .map_err(warp::reject::custom)?;

        Ok(warp::reply::json(&result))
    }
    .instrument(span)
    .await
}
