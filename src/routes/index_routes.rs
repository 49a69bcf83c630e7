use actix_web::{get, web, HttpResponse, Responder};

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Welcome to HackHub!\nTeams, leadership transfer, applications and notifications for hackathons.")
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index);
}
