mod chain;
mod health;
pub mod models;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_status)
            // Registered before the keyed lookup so "next" is not
            // captured as a hash.
            .service(chain::get_next_block)
            .service(chain::get_block)
            .service(chain::submit_block),
    );
}
