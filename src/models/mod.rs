// hackhub-service/src/models/mod.rs
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod email;
pub use email::*;

pub mod hackathon;
pub use hackathon::*;

pub mod invitations;
pub use invitations::*;

pub mod notification;
pub use notification::*;

pub mod team;
pub use team::*;

// User models for authentication
#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

// Public profile, keyed by user id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub avatar_url: Option<String>,
}

// Custom error types
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Forbidden")]
    Forbidden,
    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),
    #[display(fmt = "Storage: {}", _0)]
    Storage(String),
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError => {
                HttpResponse::InternalServerError().json("Internal Server Error")
            }
            ServiceError::BadRequest(ref message) => HttpResponse::BadRequest().json(message),
            ServiceError::Unauthorized => HttpResponse::Unauthorized().json("Unauthorized"),
            ServiceError::NotFound => HttpResponse::NotFound().json("Not Found"),
            ServiceError::Forbidden => HttpResponse::Forbidden()
                .json("Forbidden: You don't have permission to access this resource"),
            ServiceError::Conflict(ref message) => HttpResponse::Conflict().json(message),
            // Raw store message is surfaced so the client can show it
            ServiceError::Storage(ref message) => {
                HttpResponse::InternalServerError().json(json!({ "error": message }))
            }
        }
    }
}
