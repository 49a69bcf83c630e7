// hackhub-service/src/routes/email_routes.rs
//
// Public email functions. Both endpoints accept the same body and answer
// 200 with the provider payload or 500 with {"error": message}.
use crate::models::TeamEmailRequest;
use crate::services::email_service;
use crate::state::AppState;
use actix_web::{options, post, web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Access-Control-Allow-Origin", "*"))
        .append_header(("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS))
        .append_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .body("ok")
}

fn failure(function: &str, message: String) -> HttpResponse {
    error!("❌ {} failed: {}", function, message);
    HttpResponse::InternalServerError().json(json!({ "error": message }))
}

async fn dispatch(state: &AppState, function: &str, body: &[u8]) -> HttpResponse {
    let request: TeamEmailRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return failure(function, format!("Invalid request body: {}", e)),
    };

    info!("📧 {} requested for {} ({:?})", function, request.recipient_email, request.kind());

    match email_service::send_team_email(state.email.as_ref(), &state.config.email.from, &request).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => failure(function, e.to_string()),
    }
}

#[post("/functions/send-team-email")]
async fn send_team_email(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    dispatch(&state, "send-team-email", &body).await
}

#[options("/functions/send-team-email")]
async fn send_team_email_preflight() -> impl Responder {
    preflight()
}

#[post("/functions/send-application-email")]
async fn send_application_email(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    dispatch(&state, "send-application-email", &body).await
}

#[options("/functions/send-application-email")]
async fn send_application_email_preflight() -> impl Responder {
    preflight()
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(send_team_email)
        .service(send_team_email_preflight)
        .service(send_application_email)
        .service(send_application_email_preflight);
}
