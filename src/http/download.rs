use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use download_pipeline::{CancellationToken, Expander, RequestId, SelectionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DownloadRequest {
    pub(crate) request_id: RequestId,
    pub(crate) choices: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DownloadResponse {
    pub(crate) request_id: RequestId,
    pub(crate) accepted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UnknownChoicesResponse {
    pub(crate) unknown_choices: Vec<String>,
}

pub(crate) async fn download(
    selection_store: Data<Arc<SelectionStore>>,
    expander: Data<Arc<Expander>>,
    shutdown: Data<CancellationToken>,
    request: Json<DownloadRequest>,
) -> impl Responder {
    let DownloadRequest {
        request_id,
        choices,
    } = request.into_inner();

    if choices.is_empty() {
        warn!(%request_id, "Download request without choices");
        return HttpResponse::BadRequest().body("No choices given");
    }

    let Some(selection) = selection_store.get(&request_id) else {
        warn!(%request_id, "Unknown or expired request id");
        return HttpResponse::BadRequest().body("Unknown or expired request id");
    };

    let mut entities = Vec::with_capacity(choices.len());
    let mut unknown_choices = vec![];
    for choice in choices {
        match selection.get(&choice) {
            Some(entity) => entities.push(entity.clone()),
            None => unknown_choices.push(choice),
        }
    }

    if !unknown_choices.is_empty() {
        warn!(%request_id, ?unknown_choices, "Download request with unknown choices");
        return HttpResponse::BadRequest().json(UnknownChoicesResponse { unknown_choices });
    }

    if shutdown.is_cancelled() {
        warn!(%request_id, "Download request rejected during shutdown");
        return HttpResponse::ServiceUnavailable().body("Service is shutting down");
    }

    selection_store.delete(&request_id);

    let accepted = entities.len();
    info!(%request_id, accepted, "Download request accepted");

    actix_rt::spawn({
        let expander = Arc::clone(expander.get_ref());
        let cancellation = shutdown.child_token();

        async move {
            let mut enqueued = 0;
            let mut failed = 0;

            for entity in entities {
                if cancellation.is_cancelled() {
                    warn!(%request_id, "Expansion cancelled by shutdown");
                    break;
                }

                let summary = expander.expand(&request_id, &entity, &cancellation).await;
                enqueued += summary.enqueued;
                failed += summary.failed;
            }

            info!(%request_id, enqueued, failed, "Download request expanded");
        }
    });

    HttpResponse::Accepted().json(DownloadResponse {
        request_id,
        accepted,
    })
}
