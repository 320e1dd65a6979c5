use crate::services::{split_queries, CatalogSearch};
use actix_web::web::{Data, Query};
use actix_web::{HttpResponse, Responder};
use download_pipeline::{RequestId, Selection, SelectionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) request_id: RequestId,
    pub(crate) choices: Vec<String>,
}

pub(crate) async fn search(
    catalog_search: Data<Arc<dyn CatalogSearch>>,
    selection_store: Data<Arc<SelectionStore>>,
    params: Query<SearchParams>,
) -> impl Responder {
    let queries = split_queries(params.q.as_deref().unwrap_or_default());
    if queries.is_empty() {
        warn!("Search query parameter 'q' is missing");
        return HttpResponse::BadRequest().body("Missing query parameter 'q'");
    }

    let request_id = RequestId::new();
    let mut selection = Selection::default();

    for query in queries {
        let entities = match catalog_search.search(query).await {
            Ok(entities) => entities,
            Err(error) => {
                error!(%request_id, query, %error, "Catalog search failed");
                return HttpResponse::BadGateway().body("Catalog search failed");
            }
        };

        for entity in entities {
            if selection.insert(entity).is_none() {
                debug!(%request_id, query, "Skipping duplicate search result");
            }
        }
    }

    let choices = selection.labels().to_vec();
    selection_store.put(request_id, selection);

    info!(%request_id, choices = choices.len(), "Search completed");

    HttpResponse::Ok().json(SearchResponse {
        request_id,
        choices,
    })
}
