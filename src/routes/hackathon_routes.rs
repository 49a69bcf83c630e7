use crate::models::{
    Application, ApplicationStatus, ApplyRequest, Hackathon, HackathonData, Notification,
    NotificationKind, ReviewRequest, ServiceError, TeamEmailRequest,
};
use crate::routes::team_routes::require_owner;
use crate::services::{email_service, membership};
use crate::state::AppState;
use crate::utils::get_user_id_from_request;
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info};
use uuid::Uuid;

fn find_hackathon(state: &AppState, hackathon_id: &str) -> Result<Hackathon, ServiceError> {
    match state.store.find_hackathon(hackathon_id)? {
        Some(hackathon) => Ok(hackathon),
        None => {
            error!("❌ Hackathon not found: {}", hackathon_id);
            Err(ServiceError::NotFound)
        }
    }
}

#[post("/hackathons")]
async fn create_hackathon(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<HackathonData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::BadRequest("Hackathon name cannot be empty".to_string()));
    }

    let hackathon = Hackathon {
        id: Uuid::new_v4().to_string(),
        name,
        organizer_id: user_id,
        created_at: Utc::now(),
    };
    state.store.save_hackathon(&hackathon)?;

    info!("✅ Hackathon created: {} by organizer: {}", hackathon.id, hackathon.organizer_id);
    Ok(HttpResponse::Ok().json(hackathon))
}

#[get("/hackathons/{hackathon_id}")]
async fn get_hackathon(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let hackathon = find_hackathon(&state, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(hackathon))
}

// Team leader applies for the hackathon
#[post("/hackathons/{hackathon_id}/applications")]
async fn apply(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ApplyRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let hackathon = find_hackathon(&state, &path.into_inner())?;
    let team = require_owner(&state, &data.team_id, &user_id)?;

    if team.hackathon_id != hackathon.id {
        return Err(ServiceError::BadRequest(
            "Team does not belong to this hackathon".to_string(),
        ));
    }
    if state.store.application_for_team(&team.id)?.is_some() {
        return Err(ServiceError::Conflict("This team has already applied".to_string()));
    }

    let application = Application {
        id: Uuid::new_v4().to_string(),
        hackathon_id: hackathon.id,
        team_id: team.id,
        status: ApplicationStatus::Pending,
        submitted_at: Utc::now(),
        reviewed_at: None,
        reviewed_by: None,
    };
    state.store.save_application(&application)?;

    info!("📨 Application {} submitted by team: {}", application.id, application.team_id);
    Ok(HttpResponse::Ok().json(application))
}

// Organizer only
#[get("/hackathons/{hackathon_id}/applications")]
async fn list_applications(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let hackathon = find_hackathon(&state, &path.into_inner())?;
    if hackathon.organizer_id != user_id {
        return Err(ServiceError::Forbidden);
    }

    let applications = state.store.applications_for_hackathon(&hackathon.id)?;
    info!("✅ Found {} applications for hackathon: {}", applications.len(), hackathon.id);
    Ok(HttpResponse::Ok().json(applications))
}

#[put("/applications/{application_id}")]
async fn review_application(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ReviewRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let application_id = path.into_inner();

    let application = match state.store.find_application(&application_id)? {
        Some(application) => application,
        None => return Err(ServiceError::NotFound),
    };
    let hackathon = find_hackathon(&state, &application.hackathon_id)?;
    if hackathon.organizer_id != user_id {
        error!("❌ Only the organizer can review applications of: {}", hackathon.id);
        return Err(ServiceError::Forbidden);
    }
    if application.status != ApplicationStatus::Pending {
        return Err(ServiceError::Conflict("Application was already reviewed".to_string()));
    }

    let status = if data.approved {
        ApplicationStatus::Approved
    } else {
        ApplicationStatus::Rejected
    };
    let application = state
        .store
        .update_application_status(&application.id, status, &user_id)?;

    info!("✅ Application {} reviewed: {:?}", application.id, status);

    let team = match state.store.find_team(&application.team_id)? {
        Some(team) => team,
        // Team deleted since applying; nobody left to tell
        None => return Ok(HttpResponse::Ok().json(application)),
    };

    state
        .notifier
        .notify(team.owner_id.as_deref(), |owner_id| {
            let message = if data.approved {
                format!("{} has been accepted to {}!", team.name, hackathon.name)
            } else {
                format!("{} was not accepted to {}.", team.name, hackathon.name)
            };
            Notification::new(owner_id, NotificationKind::ApplicationReviewed, "Application reviewed", &message)
                .with_meta("team_id", team.id.clone())
                .with_meta("hackathon_id", hackathon.id.clone())
                .with_meta("application_id", application.id.clone())
                .with_meta("approved", data.approved)
        })
        .await;

    for member in membership::members_with_profiles(&state.store, &team.id)?
        .into_iter()
        .filter(|m| m.member.accepted)
    {
        email_service::send_best_effort(
            state.email.as_ref(),
            &state.config.email.from,
            &TeamEmailRequest {
                recipient_email: member.member.email.clone(),
                recipient_name: member.display_name.clone(),
                team_name: team.name.clone(),
                hackathon_name: hackathon.name.clone(),
                approved: Some(data.approved),
                removed: None,
                removal_reason: None,
            },
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(application))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_hackathon)
        .service(get_hackathon)
        .service(apply)
        .service(list_applications)
        .service(review_application);
}
