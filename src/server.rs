use crate::config::ServiceConfig;
use crate::error::PredictError;
use crate::io_struct::PredictResponse;
use crate::predict_state::PredictState;
use actix_cors::Cors;
use actix_web::{HttpRequest, HttpResponse, HttpServer, error, get, web};
use serde_json::Value;

// Undecodable bodies get the same structured failure as any other bad input.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("JSON payload error: {}", err);
    let message = match &err {
        error::JsonPayloadError::OverflowKnownLength { length, limit } => format!(
            "Payload too large: {} bytes exceeds limit of {} bytes",
            length, limit
        ),
        error::JsonPayloadError::Overflow { limit } => {
            format!("Payload exceeds limit of {} bytes", limit)
        }
        error::JsonPayloadError::ContentType => {
            "Request body must be JSON (Content-Type: application/json)".to_string()
        }
        _ => format!("Invalid JSON payload: {}", err),
    };
    PredictError::MalformedInput(message).into()
}

pub fn json_config(max_payload_size: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(json_error_handler)
}

/// Any origin, method and header; responses carry `Access-Control-Allow-Origin: *`.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .max_age(86400)
}

#[get("/health")]
pub async fn health(_req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[get("/model_info")]
pub async fn model_info(app_state: web::Data<PredictState>) -> HttpResponse {
    HttpResponse::Ok().json(app_state.model_info())
}

pub async fn predict(
    req: web::Json<Value>,
    app_state: web::Data<PredictState>,
) -> Result<HttpResponse, PredictError> {
    match app_state.predict(&req) {
        Ok(prediction) => {
            log::debug!(
                "Prediction: {} (malignancy probability {:.4})",
                prediction.diagnosis,
                prediction.malignancy_probability
            );
            Ok(HttpResponse::Ok().json(PredictResponse::from(prediction)))
        }
        Err(e) => {
            log::warn!("Prediction failed: {}", e);
            Err(e)
        }
    }
}

/// Registers the HTTP routes. `/predict` is a resource of its own so other
/// methods on it get 405 instead of falling through to 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(model_info)
        .service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn startup(config: ServiceConfig, predict_state: PredictState) -> std::io::Result<()> {
    let app_state = web::Data::new(predict_state);
    let max_payload_size = config.max_payload_size;

    log::info!("Starting server at {}:{}", config.host, config.port);
    log::info!(
        "Decision threshold: {}, missing features default to {}",
        config.threshold,
        config.missing_value
    );

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(cors())
            .app_data(app_state.clone())
            .app_data(json_config(max_payload_size))
            .configure(configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
