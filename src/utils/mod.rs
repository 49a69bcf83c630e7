use crate::models::{Claims, ServiceError, User};
use actix_web::{HttpMessage, HttpRequest};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;

pub mod fs_backend;
pub mod memory_backend;
pub mod store;
pub mod team_lock;
pub mod view_cache;

lazy_static::lazy_static! {
    static ref EMAIL_ADDRESS: Regex =
        Regex::new(r"^[^@\s<>]+@[^@\s<>]+\.[^@\s<>]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_ADDRESS.is_match(email.trim())
}

// "ada@example.com" -> "ada"
pub fn get_username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

// Get the authenticated user id attached by the auth middleware
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or(ServiceError::Unauthorized)
}

pub fn get_claims_from_request(req: &HttpRequest) -> Result<Claims, ServiceError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ServiceError::Unauthorized)
}

// JWT utility functions
pub mod jwt {
    use super::*;

    // Generate a new JWT token for a user
    pub fn generate_token(user: &User, secret: &str, ttl_days: i64) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::days(ttl_days))
            .ok_or(ServiceError::InternalServerError)?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Password utility functions
pub mod password {
    use super::*;

    pub fn hash_password(password: &str) -> Result<String, ServiceError> {
        hash(password, DEFAULT_COST).map_err(|_| ServiceError::InternalServerError)
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
        verify(password, hash).map_err(|_| ServiceError::InternalServerError)
    }
}

// Middleware for JWT authentication
//
// A request without an Authorization header passes through unauthenticated;
// handlers that need a user reject it via `get_user_id_from_request`.
// A header that is present but invalid is rejected here.
pub mod auth_middleware {
    use super::*;
    use crate::state::AppState;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::header;
    use actix_web::{error::ErrorUnauthorized, web, Error};
    use futures::future::{ok, Ready};
    use log::warn;
    use std::future::Future;
    use std::pin::Pin;

    pub struct Authentication;

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware { service })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
    }

    fn claims_for(req: &ServiceRequest, auth_str: &str) -> Option<Claims> {
        let state = req.app_data::<web::Data<AppState>>()?;
        let token = jwt::extract_token_from_header(auth_str).ok()?;
        jwt::decode_token(&token, &state.config.jwt_secret).ok()
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|value| value.to_str().map(str::to_owned));

            match auth_header {
                None => {}
                Some(Ok(auth_str)) => match claims_for(&req, &auth_str) {
                    Some(claims) => {
                        req.extensions_mut().insert(claims);
                    }
                    None => {
                        warn!("🔒 Rejected invalid bearer token on {}", req.path());
                        return Box::pin(async move { Err(ErrorUnauthorized("Unauthorized")) });
                    }
                },
                Some(Err(_)) => {
                    return Box::pin(async move { Err(ErrorUnauthorized("Unauthorized")) });
                }
            }

            let fut = self.service.call(req);
            Box::pin(async move { fut.await })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_with_the_same_secret_only() {
        let token = jwt::generate_token(&user(), "secret-a", 1).unwrap();
        let claims = jwt::decode_token(&token, "secret-a").unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ada@example.com");
        assert!(matches!(
            jwt::decode_token(&token, "secret-b"),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(jwt::extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(jwt::extract_token_from_header("Basic abc").is_err());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email(" grace.hopper@navy.mil "));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("<script>@x.io"));
    }

    #[test]
    fn username_is_local_part() {
        assert_eq!(get_username_from_email("ada@example.com"), "ada");
        assert_eq!(get_username_from_email("no-at-sign"), "no-at-sign");
    }
}
