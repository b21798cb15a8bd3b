use crate::{
    AppState,
    auth::{
        AccessGuard, DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS, PermissionGate,
        require_permission,
    },
    handlers,
};
use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post},
};

/// Protected Router Module
///
/// Each route sits behind its own `require_permission` layer, so a token is
/// checked against exactly the permission that route needs. Routes sharing a
/// path (`/drinks` here and in the public router) are merged by method.
pub fn protected_routes(guard: AccessGuard) -> Router<AppState> {
    Router::new()
        // GET /drinks-detail
        // Full recipes, including ingredient names.
        .merge(gated(&guard, "/drinks-detail", GET_DRINKS_DETAIL, get(handlers::get_drinks_detail)))
        // POST /drinks
        .merge(gated(&guard, "/drinks", POST_DRINKS, post(handlers::create_drink)))
        // PATCH /drinks/{id}
        .merge(gated(&guard, "/drinks/{id}", PATCH_DRINKS, patch(handlers::update_drink)))
        // DELETE /drinks/{id}
        .merge(gated(&guard, "/drinks/{id}", DELETE_DRINKS, delete(handlers::delete_drink)))
}

fn gated(
    guard: &AccessGuard,
    path: &str,
    permission: &'static str,
    method_router: MethodRouter<AppState>,
) -> Router<AppState> {
    Router::new()
        .route(path, method_router)
        .route_layer(middleware::from_fn_with_state(
            PermissionGate::new(guard.clone(), permission),
            require_permission,
        ))
}
