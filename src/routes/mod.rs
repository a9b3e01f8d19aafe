// Route exports
pub mod matches;
pub mod scores;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(scores::configure)
            .configure(matches::configure),
    );
}
