use crate::models::{
    Notification, NotificationKind, RemoveMemberRequest, ServiceError, Team, TeamData, TeamEmailRequest,
    TeamMember, TeamRole, TransferLeadershipRequest,
};
use crate::services::email_service;
use crate::services::leadership_transfer::{LeadershipTransfer, TransferRequest};
use crate::services::membership;
use crate::state::AppState;
use crate::utils::get_user_id_from_request;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info, warn};
use serde_json::json;
use uuid::Uuid;

// Team detail, served from the view cache when possible
pub(crate) fn load_team(state: &AppState, team_id: &str) -> Result<Team, ServiceError> {
    if let Some(team) = state.views.team(team_id) {
        return Ok(team);
    }
    match state.store.find_team(team_id)? {
        Some(team) => {
            state.views.put_team(&team);
            Ok(team)
        }
        None => {
            error!("❌ Team not found: {}", team_id);
            Err(ServiceError::NotFound)
        }
    }
}

fn require_member(state: &AppState, team_id: &str, user_id: &str) -> Result<TeamMember, ServiceError> {
    match membership::accepted_membership(&state.store, team_id, user_id)? {
        Some(member) => Ok(member),
        None => {
            error!("❌ User: {} doesn't have access to team: {}", user_id, team_id);
            Err(ServiceError::Forbidden)
        }
    }
}

// Owner check always reads the store, never the cache
pub(crate) fn require_owner(state: &AppState, team_id: &str, user_id: &str) -> Result<Team, ServiceError> {
    let team = match state.store.find_team(team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };
    if !team.is_owned_by(user_id) {
        error!("❌ User: {} is not the leader of team: {}", user_id, team_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(team)
}

pub(crate) fn hackathon_name(state: &AppState, hackathon_id: &str) -> String {
    match state.store.find_hackathon(hackathon_id) {
        Ok(Some(hackathon)) => hackathon.name,
        _ => "the hackathon".to_string(),
    }
}

/// Whether the user already belongs to a team of this hackathon.
pub(crate) fn has_team_in_hackathon(
    state: &AppState,
    hackathon_id: &str,
    user_id: &str,
) -> Result<bool, ServiceError> {
    Ok(state
        .store
        .teams_for_user(user_id)?
        .iter()
        .any(|team| team.hackathon_id == hackathon_id))
}

// Create a new team in a hackathon, led by the caller
#[post("/hackathons/{hackathon_id}/teams")]
async fn create_team(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    team_data: web::Json<TeamData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let hackathon_id = path.into_inner();
    let name = team_data.name.trim().to_string();

    info!("📝 Creating new team: {} in hackathon: {} for user: {}", name, hackathon_id, user_id);

    if name.is_empty() {
        return Err(ServiceError::BadRequest("Team name cannot be empty".to_string()));
    }
    if state.store.find_hackathon(&hackathon_id)?.is_none() {
        error!("❌ Hackathon not found: {}", hackathon_id);
        return Err(ServiceError::NotFound);
    }
    if has_team_in_hackathon(&state, &hackathon_id, &user_id)? {
        return Err(ServiceError::Conflict(
            "You are already on a team for this hackathon".to_string(),
        ));
    }
    let user = state
        .store
        .find_user_by_id(&user_id)?
        .ok_or(ServiceError::Unauthorized)?;

    let team = Team {
        id: Uuid::new_v4().to_string(),
        name,
        hackathon_id,
        owner_id: Some(user_id.clone()),
        created_at: Utc::now(),
    };
    state.store.save_team(&team)?;
    state
        .store
        .insert_member(&TeamMember::founding_leader(&team.id, &user.id, &user.email))?;

    info!("✅ Team created successfully: {}", team.id);

    Ok(HttpResponse::Ok().json(team))
}

// Get all teams for the current user
#[get("/teams")]
async fn get_user_teams(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching teams for user: {}", user_id);

    let teams = state.store.teams_for_user(&user_id)?;

    info!("✅ Found {} teams for user: {}", teams.len(), user_id);

    Ok(HttpResponse::Ok().json(teams))
}

// Get a specific team by ID
#[get("/teams/{team_id}")]
async fn get_team(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🔍 Fetching team: {} for user: {}", team_id, user_id);

    require_member(&state, &team_id, &user_id)?;
    let team = load_team(&state, &team_id)?;

    Ok(HttpResponse::Ok().json(team))
}

// Get team members joined with their profiles
#[get("/teams/{team_id}/members")]
async fn get_team_members(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("📋 Fetching members for team: {}", team_id);

    require_member(&state, &team_id, &user_id)?;

    let members = match state.views.members(&team_id) {
        Some(members) => members,
        None => {
            let members = membership::members_with_profiles(&state.store, &team_id)?;
            state.views.put_members(&team_id, members)
        }
    };

    info!("✅ Found {} team members", members.len());

    Ok(HttpResponse::Ok().json(members.as_ref()))
}

// Members the leader can hand leadership to
#[get("/teams/{team_id}/leadership/candidates")]
async fn get_leadership_candidates(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    require_owner(&state, &team_id, &user_id)?;
    let candidates = LeadershipTransfer::from_state(&state).candidates(&team_id)?;

    info!("✅ Found {} leadership candidates for team: {}", candidates.len(), team_id);

    Ok(HttpResponse::Ok().json(candidates))
}

// Transfer team leadership to another accepted member
#[post("/teams/{team_id}/leadership")]
async fn transfer_leadership(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<TransferLeadershipRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("👑 Leadership transfer requested for team: {} by user: {}", team_id, user_id);

    let team = require_owner(&state, &team_id, &user_id)?;
    let request = TransferRequest {
        team_id: team.id.clone(),
        requested_by: user_id,
        hackathon_id: team.hackathon_id.clone(),
        member_id: body.into_inner().member_id,
    };

    let outcome = LeadershipTransfer::from_state(&state)
        .transfer(&request)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} is now the team leader", outcome.new_leader.display_name),
        "team_id": outcome.team_id,
        "new_leader": outcome.new_leader,
        "demoted": outcome.demoted,
        "notification": outcome.notification
    })))
}

// Remove a member from a team, or leave it
#[delete("/teams/{team_id}/members/{member_id}")]
async fn remove_team_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: Option<web::Json<RemoveMemberRequest>>,
) -> Result<HttpResponse, ServiceError> {
    let current_user_id = get_user_id_from_request(&req)?;
    let (team_id, member_id) = path.into_inner();
    let reason = body.and_then(|b| b.into_inner().reason);

    info!("🗑️ Removing member: {} from team: {}", member_id, team_id);

    let result = {
        let _guard = state.locks.acquire(&team_id).await;
        let result = remove_member_locked(&state, &team_id, &member_id, &current_user_id);
        state.views.invalidate(&team_id);
        result
    };
    let (team, member, is_self_removal) = result?;

    if !is_self_removal && member.accepted {
        let hackathon = hackathon_name(&state, &team.hackathon_id);
        state
            .notifier
            .notify(member.user_id.as_deref(), |user_id| {
                Notification::new(
                    user_id,
                    NotificationKind::MemberRemoved,
                    "Team membership update",
                    &format!("You have been removed from {}.", team.name),
                )
                .with_meta("team_id", team.id.clone())
                .with_meta("hackathon_id", team.hackathon_id.clone())
            })
            .await;

        let display_name = match member.user_id.as_deref() {
            Some(id) => membership::display_name(&member, state.store.find_profile(id)?.as_ref()),
            None => membership::display_name(&member, None),
        };
        email_service::send_best_effort(
            state.email.as_ref(),
            &state.config.email.from,
            &TeamEmailRequest {
                recipient_email: member.email.clone(),
                recipient_name: display_name,
                team_name: team.name.clone(),
                hackathon_name: hackathon,
                approved: None,
                removed: Some(true),
                removal_reason: reason,
            },
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Member removed from team successfully",
        "member_id": member.id,
        "team_id": team.id
    })))
}

fn remove_member_locked(
    state: &AppState,
    team_id: &str,
    member_id: &str,
    current_user_id: &str,
) -> Result<(Team, TeamMember, bool), ServiceError> {
    let team = match state.store.find_team(team_id)? {
        Some(team) => team,
        None => return Err(ServiceError::NotFound),
    };
    let member = match state.store.find_member(member_id)? {
        Some(member) if member.team_id == team_id => member,
        _ => {
            error!("❌ Member: {} not found in team: {}", member_id, team_id);
            return Err(ServiceError::NotFound);
        }
    };

    if member.role == TeamRole::Leader {
        return Err(ServiceError::BadRequest(
            "Cannot remove the team leader. Transfer leadership first".to_string(),
        ));
    }

    // Members can remove themselves, the leader can remove anyone
    let is_self_removal = member.user_id.as_deref() == Some(current_user_id);
    if !is_self_removal && !team.is_owned_by(current_user_id) {
        error!("❌ Only the team leader can remove other members");
        return Err(ServiceError::Forbidden);
    }

    state.store.delete_member(&member.id)?;
    info!("✅ Member: {} removed from team: {}", member.id, team.id);

    Ok((team, member, is_self_removal))
}

// Delete a team
#[delete("/teams/{team_id}")]
async fn delete_team(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🗑️ Deleting team: {}", team_id);

    let _guard = state.locks.acquire(&team_id).await;
    let team = require_owner(&state, &team_id, &user_id)?;

    let members = state.store.delete_team_members(&team.id);
    state.views.invalidate(&team.id);
    let members = members?;

    if let Err(err) = state.store.delete_team_applications(&team.id) {
        // Continue with deletion even if applications cannot be removed
        warn!("⚠️ Failed to delete applications of team {}: {}", team.id, err);
    }
    state.store.delete_team(&team.id)?;

    info!("✅ Team deleted: {} ({} member rows)", team.id, members);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Team deleted successfully",
        "team_id": team.id
    })))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(get_team)
        .service(get_team_members)
        .service(get_leadership_candidates)
        .service(transfer_leadership)
        .service(remove_team_member)
        .service(delete_team);
}
