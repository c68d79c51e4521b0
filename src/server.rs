use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse, HttpServer};
use futures_util::StreamExt as _;
use serde::Serialize;
use serde_json::json;
use std::io::Write;

use crate::config::Config;
use crate::errors::{LunarSegError, Result};
use crate::service::InferenceService;

/// Shared per-process state handed to every worker: the inference pipelines
/// (holding the read-only model) and the upload size cap.
pub struct AppState {
    pub service: InferenceService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: InferenceService, max_upload_bytes: usize) -> Self {
        Self {
            service,
            max_upload_bytes,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// All failures share the wire shape; only the log level distinguishes the
/// user-correctable classes from model failures, which may be systemic.
fn error_response(err: &LunarSegError) -> HttpResponse {
    match err {
        LunarSegError::Model { .. } => log::error!("inference failed: {}", err),
        _ => log::warn!("request rejected: {}", err),
    }
    HttpResponse::InternalServerError().json(ErrorBody {
        error: err.to_string(),
    })
}

/// Collect the uploaded image bytes from either a `multipart/form-data`
/// body (the `file` field) or a raw octet-stream body.
async fn read_upload(req: &HttpRequest, mut payload: web::Payload, limit: usize) -> Result<Vec<u8>> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if !is_multipart {
        let mut data = Vec::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(|e| LunarSegError::Validation {
                reason: format!("failed to read request body: {}", e),
            })?;
            push_limited(&mut data, &chunk, limit)?;
        }
        return Ok(data);
    }

    let mut multipart = Multipart::new(req.headers(), payload);
    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| LunarSegError::Validation {
            reason: format!("malformed multipart body: {}", e),
        })?;
        if field.name() != Some("file") {
            continue;
        }
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| LunarSegError::Validation {
                reason: format!("failed to read multipart upload: {}", e),
            })?;
            push_limited(&mut data, &chunk, limit)?;
        }
        return Ok(data);
    }

    Err(LunarSegError::Validation {
        reason: "no `file` field in multipart body".to_string(),
    })
}

fn push_limited(data: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<()> {
    if data.len() + chunk.len() > limit {
        return Err(LunarSegError::Validation {
            reason: format!("uploaded file exceeds the {} byte limit", limit),
        });
    }
    data.extend_from_slice(chunk);
    Ok(())
}

#[get("/")]
async fn health(_req: HttpRequest, _: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({"App": "Running"}))
}

#[post("/preprocess/")]
async fn preprocess_endpoint(
    req: HttpRequest,
    payload: web::Payload,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let bytes = match read_upload(&req, payload, app_state.max_upload_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => return error_response(&err),
    };

    let state = app_state.clone();
    match web::block(move || state.service.preprocess_png(&bytes)).await {
        Ok(Ok(png)) => HttpResponse::Ok().content_type("image/png").body(png),
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            log::error!("blocking task failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorBody {
                error: "internal error".to_string(),
            })
        }
    }
}

#[post("/segment/")]
async fn segment_endpoint(
    req: HttpRequest,
    payload: web::Payload,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let bytes = match read_upload(&req, payload, app_state.max_upload_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => return error_response(&err),
    };

    let state = app_state.clone();
    match web::block(move || state.service.segment_png(&bytes)).await {
        Ok(Ok(png)) => HttpResponse::Ok().content_type("image/png").body(png),
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            log::error!("blocking task failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorBody {
                error: "internal error".to_string(),
            })
        }
    }
}

/// Route table, shared between `startup` and the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(preprocess_endpoint)
        .service(segment_endpoint);
}

fn cors_from_allow_list(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials();
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

pub async fn startup(config: Config, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);
    let allowed_origins = config.allowed_origins.clone();

    println!("Starting server at {}:{}", config.host, config.port);

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(cors_from_allow_list(&allowed_origins))
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
