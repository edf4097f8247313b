//! REST adapter.
//!
//! Thin translation between JSON over HTTP and the user service. The acting
//! user of protected routes is read from the `x-user-id` header.
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use usermanager_usecase::UserService;

mod actor;
mod dto;
mod error;
mod handlers;

pub use actor::{Actor, ACTOR_HEADER};
pub use dto::{
    CreateUserRequest, ListUsersQuery, LoginRequest, UpdateUserRequest, UserResponse,
    UsersResponse, VoteRequest, VoteResponse,
};
pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<UserService>,
}

impl AppState {
    pub fn new(service: Arc<UserService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route("/users/vote", post(handlers::vote))
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
