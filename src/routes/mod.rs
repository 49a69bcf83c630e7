// src/routes/mod.rs
pub mod auth_routes;
pub mod email_routes;
pub mod hackathon_routes;
pub mod index_routes;
pub mod invitation_routes;
pub mod notification_routes;
pub mod team_routes;

use actix_web::web;

// Register every route group
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(index_routes::init_routes)
        .configure(auth_routes::init_routes)
        .configure(hackathon_routes::init_routes)
        .configure(team_routes::init_routes)
        .configure(invitation_routes::init_routes)
        .configure(notification_routes::init_routes)
        .configure(email_routes::init_routes);
}
