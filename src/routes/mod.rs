pub mod auth;
pub mod health;
pub mod todos;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::{json_error_handler, path_error_handler};
use crate::state::AppState;

/// Registers state, extractor configuration and every route.
///
/// `/auth/register`, `/auth/login` and `/health` are public; `/auth/me` and the
/// whole `/todos` scope sit behind the bearer-token gate.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let gate = AuthMiddleware::new(state.tokens.clone());

        cfg.app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(health::health)
            .service(
                web::scope("/auth")
                    .service(auth::register)
                    .service(auth::login)
                    .service(
                        web::resource("/me")
                            .wrap(gate.clone())
                            .route(web::get().to(auth::me)),
                    ),
            )
            .service(
                web::scope("/todos")
                    .wrap(gate)
                    .service(todos::list_todos)
                    .service(todos::create_todo)
                    .service(todos::get_todo)
                    .service(todos::update_todo)
                    .service(todos::delete_todo),
            );
    }
}
