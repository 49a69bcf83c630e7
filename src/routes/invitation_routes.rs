// hackhub-service/src/routes/invitation_routes.rs
use crate::models::{
    CreateInvitationRequest, InvitationResponse, Notification, NotificationKind, PendingInvitation,
    ServiceError, TeamEmailRequest, TeamMember,
};
use crate::routes::team_routes::{hackathon_name, has_team_in_hackathon, require_owner};
use crate::services::email_service;
use crate::state::AppState;
use crate::utils::{get_claims_from_request, get_user_id_from_request, get_username_from_email, is_valid_email};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::{error, info};

// Invite someone to a team by email
#[post("/teams/{team_id}/members")]
async fn create_invitation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();
    let email = data.email.trim().to_lowercase();

    info!("📧 Creating invitation to team: {} for email: {}", team_id, email);

    if !is_valid_email(&email) {
        return Err(ServiceError::BadRequest("Invalid email address".to_string()));
    }

    let (team, invitation) = {
        let _guard = state.locks.acquire(&team_id).await;
        let team = require_owner(&state, &team_id, &user_id)?;

        let already_listed = state
            .store
            .list_members(&team.id)?
            .iter()
            .any(|m| m.email.to_lowercase() == email);
        if already_listed {
            return Err(ServiceError::Conflict(
                "This email is already a member of or invited to the team".to_string(),
            ));
        }

        let invited_user = state.store.find_user_by_email(&email)?;
        let invitation = TeamMember::invited(&team.id, &email, invited_user.map(|u| u.id));
        state.store.insert_member(&invitation)?;
        state.views.invalidate(&team.id);
        (team, invitation)
    };

    info!("✅ Invitation created: {}", invitation.id);

    let hackathon = hackathon_name(&state, &team.hackathon_id);
    state
        .notifier
        .notify(invitation.user_id.as_deref(), |user_id| {
            Notification::new(
                user_id,
                NotificationKind::TeamInvite,
                "You've been invited to a team",
                &format!("You have been invited to join {} for {}.", team.name, hackathon),
            )
            .with_meta("team_id", team.id.clone())
            .with_meta("hackathon_id", team.hackathon_id.clone())
            .with_meta("member_id", invitation.id.clone())
        })
        .await;

    let recipient_name = match invitation.user_id.as_deref() {
        Some(id) => state.store.find_profile(id)?.map(|p| p.full_name),
        None => None,
    }
    .unwrap_or_else(|| get_username_from_email(&email));

    email_service::send_best_effort(
        state.email.as_ref(),
        &state.config.email.from,
        &TeamEmailRequest {
            recipient_email: email.clone(),
            recipient_name,
            team_name: team.name.clone(),
            hackathon_name: hackathon,
            approved: None,
            removed: None,
            removal_reason: None,
        },
    )
    .await;

    Ok(HttpResponse::Ok().json(invitation))
}

// Get pending invitations for the current user
#[get("/invitations")]
async fn get_user_invitations(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let claims = get_claims_from_request(&req)?;

    info!("📋 Fetching invitations for user: {}", claims.sub);

    let mut invitations = Vec::new();
    for member in state.store.pending_invitations_for_email(&claims.email)? {
        let team = state.store.find_team(&member.team_id)?;
        invitations.push(PendingInvitation::new(&member, team.as_ref()));
    }

    info!("✅ Found {} invitations for user", invitations.len());

    Ok(HttpResponse::Ok().json(invitations))
}

// Load an invitation and check it belongs to the caller
fn own_pending_invitation(
    state: &AppState,
    member_id: &str,
    email: &str,
) -> Result<TeamMember, ServiceError> {
    let invitation = match state.store.find_member(member_id)? {
        Some(member) => member,
        None => {
            error!("❌ Invitation not found: {}", member_id);
            return Err(ServiceError::NotFound);
        }
    };

    if invitation.email.to_lowercase() != email.to_lowercase() {
        error!("❌ Invitation is not for this user");
        return Err(ServiceError::Forbidden);
    }
    if invitation.accepted {
        return Err(ServiceError::BadRequest("Invitation is already accepted".to_string()));
    }
    Ok(invitation)
}

#[post("/invitations/{member_id}/accept")]
async fn accept_invitation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let claims = get_claims_from_request(&req)?;
    let member_id = path.into_inner();

    info!("🔄 User: {} accepting invitation: {}", claims.sub, member_id);

    let invitation = own_pending_invitation(&state, &member_id, &claims.email)?;
    let team = match state.store.find_team(&invitation.team_id)? {
        Some(team) => team,
        None => return Err(ServiceError::NotFound),
    };

    let _guard = state.locks.acquire(&team.id).await;
    // Re-read under the lock; the invitation may have been cancelled meanwhile
    let invitation = own_pending_invitation(&state, &invitation.id, &claims.email)?;
    if has_team_in_hackathon(&state, &team.hackathon_id, &claims.sub)? {
        return Err(ServiceError::Conflict(
            "You are already on a team for this hackathon".to_string(),
        ));
    }

    let accepted = state.store.accept_member(&invitation.id, &claims.sub);
    state.views.invalidate(&team.id);
    let accepted = accepted?;

    info!("✅ User: {} joined team: {}", claims.sub, team.id);

    Ok(HttpResponse::Ok().json(InvitationResponse {
        member_id: accepted.id,
        accepted: true,
        message: format!("You joined {}", team.name),
    }))
}

#[post("/invitations/{member_id}/decline")]
async fn decline_invitation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let claims = get_claims_from_request(&req)?;
    let member_id = path.into_inner();

    info!("🔄 User: {} declining invitation: {}", claims.sub, member_id);

    let invitation = own_pending_invitation(&state, &member_id, &claims.email)?;
    let _guard = state.locks.acquire(&invitation.team_id).await;
    let deleted = state.store.delete_member(&invitation.id);
    state.views.invalidate(&invitation.team_id);
    deleted?;

    Ok(HttpResponse::Ok().json(InvitationResponse {
        member_id: invitation.id,
        accepted: false,
        message: "Invitation declined".to_string(),
    }))
}

// Register all invitation routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_invitation)
        .service(get_user_invitations)
        .service(accept_invitation)
        .service(decline_invitation);
}
