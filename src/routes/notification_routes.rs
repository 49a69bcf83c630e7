use crate::models::ServiceError;
use crate::state::AppState;
use crate::utils::get_user_id_from_request;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

#[get("/notifications")]
async fn list_notifications(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let notifications = state.store.notifications_for_user(&user_id)?;

    info!("🔔 Found {} notifications for user: {}", notifications.len(), user_id);

    Ok(HttpResponse::Ok().json(notifications))
}

#[post("/notifications/{notification_id}/read")]
async fn mark_read(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let notification_id = path.into_inner();

    if !state.store.mark_notification_read(&notification_id, &user_id)? {
        return Err(ServiceError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "id": notification_id,
        "read": true
    })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_notifications).service(mark_read);
}
