use crate::handlers::{self, audit, auth, organizations, tasks};
use crate::middleware::auth::require_principal;
use crate::state::AppState;
use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// The full REST surface.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/organizations", get(organizations::list_organizations))
        .route(
            "/organizations/accessible",
            get(organizations::accessible_organizations),
        )
        .route("/organizations/{id}", get(organizations::get_organization))
        .route("/audit-log", get(audit::audit_log))
        .route_layer(middleware::from_fn(require_principal));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .merge(protected)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
