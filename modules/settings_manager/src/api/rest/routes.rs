//! Route registration

use super::auth::{gate, Gate, RequestAuthorizer};
use super::handlers::{self, RestState};
use crate::config::Config;
use crate::domain::SettingsManager;
use axum::{
    middleware,
    routing::{delete, get},
    Extension, Router,
};
use std::sync::Arc;

/// Register all REST routes behind the request gate
pub fn register_routes(
    router: Router,
    manager: SettingsManager,
    config: Arc<Config>,
    authorizer: Arc<dyn RequestAuthorizer>,
) -> Router {
    let gate_state = Gate {
        enabled: config.enable_api,
        authorizer,
    };
    let state = Arc::new(RestState { manager, config });

    let settings = Router::new()
        .route("/settings", get(handlers::list_settings))
        .route(
            "/settings/{key}",
            get(handlers::get_setting)
                .put(handlers::upsert_setting)
                .patch(handlers::upsert_setting)
                .post(handlers::upsert_setting)
                .delete(handlers::delete_setting),
        )
        .route("/settings-cache/clear", delete(handlers::clear_cache))
        .layer(Extension(state))
        .route_layer(middleware::from_fn_with_state(gate_state, gate));

    router.merge(settings)
}
