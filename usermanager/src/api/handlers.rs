use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{ensure_role_assignable, Permission, Role, UserId};
use usermanager_usecase::VoteOutcome;

use super::dto::{
    CreateUserRequest, ListUsersQuery, LoginRequest, UpdateUserRequest, UserResponse,
    UsersResponse, VoteRequest, VoteResponse,
};
use super::{Actor, ApiError, ApiResult, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.service.create_user(request.into_user()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> ApiResult<Json<UsersResponse>> {
    let query = PaginationQuery::from_params(&params.page, &params.size, &params.order_by)?;
    let users = state.service.get_users_by_pagination_query(&query).await?;
    Ok(Json(users.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .service
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;
    Ok(Json(user.into()))
}

/// Updates a profile. Acting on another account requires the update
/// permission, and only admins may grant the admin role.
pub async fn update_user(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(user_id): Path<UserId>,
    Json(mut request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    if actor.user_id != user_id {
        actor.can(Permission::Update)?;
    }

    let mut user = state
        .service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;

    request.apply_profile(&mut user);
    if let Some(role) = request.role.as_deref() {
        let role: Role = role.parse()?;
        ensure_role_assignable(actor.role, role)?;
        user.role = role;
    }

    state.service.check_user_by_nickname(&user).await?;
    let updated = state.service.update_user(user).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(user_id): Path<UserId>,
) -> ApiResult<StatusCode> {
    if actor.user_id != user_id {
        actor.can(Permission::Delete)?;
    }
    state.service.delete_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Casts, changes or withdraws (`vote: 0`) the actor's vote on `user_id`.
pub async fn vote(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(request): Json<VoteRequest>,
) -> ApiResult<(StatusCode, Json<VoteResponse>)> {
    let outcome = state
        .service
        .vote_for_user(actor.user_id, request.user_id, request.vote)
        .await?;

    let status = match outcome {
        VoteOutcome::Created { .. } => StatusCode::CREATED,
        VoteOutcome::NothingToWithdraw => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "vote_not_exist",
                "vote does not exist",
            ));
        }
        _ => StatusCode::OK,
    };
    Ok((status, Json(outcome.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .service
        .authenticate(&request.nickname, &request.password)
        .await?;
    Ok(Json(user.into()))
}
