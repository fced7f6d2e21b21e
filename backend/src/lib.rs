pub mod catchers;
pub mod clock;
pub mod config;
pub mod cors;
pub mod error;
pub mod queries;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;
pub use shared::{models::*, error::*, validation::*};
pub use shared::tally::{tally, format_share, Tally};

use rocket::{catchers, routes, Build, Rocket};
use crate::{catchers::*, cors::CORS, routes::*};

/// Assembles the HTTP service around an already configured state.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let cors = CORS::new(state.config.allowed_origin.clone());

    rocket::build()
        .attach(cors)
        .manage(state)
        .mount(
            "/api/v1",
            routes![
                create_poll,
                get_poll,
                cast_vote,
                poll_options,
                poll_results,
                poll_ballots,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                unprocessable_entity,
                internal_error
            ],
        )
}

#[cfg(test)]
mod tests;
