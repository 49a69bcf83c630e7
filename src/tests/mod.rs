// Builds the full app around a test state
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(crate::utils::auth_middleware::Authentication)
                .wrap(actix_cors::Cors::permissive())
                .configure(crate::routes::configure),
        )
        .await
    };
}

mod support;

mod team_route_tests;
