use crate::config::StoreConfig;
use crate::errors::{StoreError, BODY_READ_FAILED, TOO_LARGE};
use crate::models::ContentBody;
use crate::pipeline::{self, IncomingRequest, Operation, Outcome};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use log::{debug, info};
use std::any::Any;
use std::time::Instant;

/// Registers the store routes. Expects a `web::Data<StoreConfig>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{tail:.*}")
            .route(web::get().to(read_entry))
            .route(web::post().to(create_file))
            .route(web::put().to(modify_file))
            .route(web::delete().to(remove_file)),
    );
}

pub async fn read_entry(
    tail: web::Path<String>,
    config: web::Data<StoreConfig>,
) -> HttpResponse {
    let request = IncomingRequest {
        path: request_path(tail),
        ..IncomingRequest::default()
    };
    dispatch(Operation::Retrieve, config, request).await
}

pub async fn create_file(
    req: HttpRequest,
    tail: web::Path<String>,
    payload: web::Payload,
    config: web::Data<StoreConfig>,
) -> HttpResponse {
    with_body(Operation::Create, req, tail, payload, config).await
}

pub async fn modify_file(
    req: HttpRequest,
    tail: web::Path<String>,
    payload: web::Payload,
    config: web::Data<StoreConfig>,
) -> HttpResponse {
    with_body(Operation::Modify, req, tail, payload, config).await
}

pub async fn remove_file(
    tail: web::Path<String>,
    config: web::Data<StoreConfig>,
) -> HttpResponse {
    let request = IncomingRequest {
        path: request_path(tail),
        ..IncomingRequest::default()
    };
    dispatch(Operation::Remove, config, request).await
}

fn request_path(tail: web::Path<String>) -> String {
    format!("/{}", tail.into_inner())
}

async fn with_body(
    operation: Operation,
    req: HttpRequest,
    tail: web::Path<String>,
    payload: web::Payload,
    config: web::Data<StoreConfig>,
) -> HttpResponse {
    let (body, body_rejection) = match read_body(payload, config.max_body_bytes).await {
        Ok(body) => (body, None),
        Err(reason) => (Vec::new(), Some(reason)),
    };
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request = IncomingRequest {
        path: request_path(tail),
        content_type,
        body,
        body_rejection,
    };
    dispatch(operation, config, request).await
}

/// Reads the payload to the end, even past `limit`, so the connection is
/// always left clean. A rejection is handed to the pipeline, which raises it
/// only once the guards have passed.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<Vec<u8>, &'static str> {
    let mut body = Vec::new();
    let mut too_large = false;
    let mut read_failed = false;
    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(bytes) if !too_large => {
                if body.len() + bytes.len() > limit {
                    too_large = true;
                    body.clear();
                } else {
                    body.extend_from_slice(&bytes);
                }
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Payload read failed: {}", e);
                read_failed = true;
                break;
            }
        }
    }
    if read_failed {
        return Err(BODY_READ_FAILED);
    }
    if too_large {
        return Err(TOO_LARGE);
    }
    Ok(body)
}

/// Runs the pipeline off the async workers. A panic inside it becomes a 500.
async fn dispatch(
    operation: Operation,
    config: web::Data<StoreConfig>,
    request: IncomingRequest,
) -> HttpResponse {
    let start_time = Instant::now();
    let verbose = config.verbose_errors;
    let path = request.path.clone();
    let store = config.into_inner();

    let result = match tokio::task::spawn_blocking(move || pipeline::run(operation, &store, &request)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(StoreError::Unexpected(panic_message(e.into_panic()))),
        Err(e) => Err(StoreError::Unexpected(e.to_string())),
    };

    match result {
        Ok(outcome) => {
            info!("{:?} '{}' processed in {:.2?}.", operation, path, start_time.elapsed());
            match outcome {
                Outcome::Done => HttpResponse::Ok().json("Done"),
                Outcome::Content(content) => HttpResponse::Ok().json(ContentBody {
                    content: content.text,
                }),
                Outcome::Statistics(stats) => HttpResponse::Ok().json(stats),
            }
        }
        Err(e) => e.to_response(verbose),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panic: {}", msg)
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panic: {}", msg)
    } else {
        "panic".to_string()
    }
}
