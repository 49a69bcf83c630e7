use crate::models::{LoginResponse, Profile, ProfileUpdate, RegisterRequest, ServiceError, User, UserCredentials};
use crate::state::AppState;
use crate::utils::{get_claims_from_request, get_user_id_from_request, is_valid_email, jwt, password};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use uuid::Uuid;

// Register a new user
#[post("/auth/register")]
async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let body = body.into_inner();
    let email = body.email.trim().to_lowercase();
    info!("📝 Register request for email: {}", email);

    if !is_valid_email(&email) {
        return Err(ServiceError::BadRequest("Invalid email address".to_string()));
    }
    if body.password.len() < 8 {
        return Err(ServiceError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if the email already exists
    if state.store.find_user_by_email(&email)?.is_some() {
        error!("❌ Email already registered: {}", email);
        return Err(ServiceError::Conflict("Email already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        password_hash: password::hash_password(&body.password)?,
        created_at: Utc::now(),
    };
    state.store.save_user(&user)?;

    if let Some(full_name) = body.full_name.filter(|n| !n.trim().is_empty()) {
        state.store.save_profile(&Profile {
            user_id: user.id.clone(),
            full_name: full_name.trim().to_string(),
            avatar_url: None,
            updated_at: Utc::now(),
        })?;
    }

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

// Login and get JWT token
#[post("/auth/login")]
async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<UserCredentials>,
) -> Result<HttpResponse, ServiceError> {
    info!("🔑 Login request for email: {}", credentials.email);

    let user = match state.store.find_user_by_email(credentials.email.trim())? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(ServiceError::Unauthorized);
        }
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        error!("❌ Invalid password for user: {}", credentials.email);
        return Err(ServiceError::Unauthorized);
    }

    let token = jwt::generate_token(&user, &state.config.jwt_secret, state.config.token_ttl_days)?;

    info!("✅ User logged in successfully: {}", user.id);

    let response = LoginResponse {
        token: token.clone(),
        user_id: user.id,
        email: user.email,
    };

    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(response))
}

// Get current user info
#[get("/auth/me")]
async fn me(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    debug!("👤 Get user info request");
    let claims = get_claims_from_request(&req)?;

    let user = match state.store.find_user_by_id(&claims.sub)? {
        Some(user) => user,
        None => {
            error!("❌ Token refers to unknown user: {}", claims.sub);
            return Err(ServiceError::Unauthorized);
        }
    };
    let profile = state.store.find_profile(&user.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user.id,
        "email": user.email,
        "created_at": user.created_at,
        "profile": profile
    })))
}

#[put("/profile")]
async fn update_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let body = body.into_inner();

    if body.full_name.trim().is_empty() {
        return Err(ServiceError::BadRequest("Full name cannot be empty".to_string()));
    }

    let profile = Profile {
        user_id: user_id.clone(),
        full_name: body.full_name.trim().to_string(),
        avatar_url: body.avatar_url,
        updated_at: Utc::now(),
    };
    state.store.save_profile(&profile)?;

    // Display names are part of cached member views
    for team in state.store.teams_for_user(&user_id)? {
        state.views.invalidate(&team.id);
    }

    info!("✅ Profile updated for user: {}", user_id);
    Ok(HttpResponse::Ok().json(profile))
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(me)
        .service(update_profile);
}
