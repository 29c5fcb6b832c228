//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, DomainError},
    middleware::{AuthUser, auth_middleware, require_admin},
    models::{
        ClassDetailResponse, ClassStatus, CreateClassRequest, CreateSessionRequest,
        EnrollRequest, ReviewRequest, WaitlistAddRequest, WaitlistStatus, WaitlistStatusRequest,
    },
    notify,
    state::AppState,
};

/// Query parameters for the class list
#[derive(Debug, Deserialize)]
pub struct ClassListQuery {
    pub status: Option<ClassStatus>,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/api/enrollments/my", get(get_my_enrollments))
        .route(
            "/api/enrollments/:class_id",
            post(enroll).delete(cancel_enrollment),
        )
        .route(
            "/api/classes/:class_id/waitlist",
            post(join_waitlist).delete(leave_waitlist),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    let admin_routes = Router::new()
        .route("/api/enrollments", get(get_all_enrollments))
        .route("/api/admin/enrollments/pending", get(get_pending_enrollments))
        .route(
            "/api/admin/enrollments/:enrollment_id/approve",
            put(approve_enrollment),
        )
        .route(
            "/api/admin/enrollments/:enrollment_id/reject",
            put(reject_enrollment),
        )
        .route("/api/admin/classes", post(create_class))
        .route("/api/admin/classes/:class_id/sessions", post(create_session))
        .route(
            "/api/admin/classes/:class_id/waitlist",
            get(get_waitlist).post(admin_add_to_waitlist),
        )
        .route(
            "/api/admin/classes/:class_id/waitlist/:waitlist_id",
            put(update_waitlist_status).delete(remove_waitlist_entry),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/classes", get(get_classes))
        .route("/api/classes/:class_id", get(get_class))
        .merge(user_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "enrollment-api"
    }))
}

/// List classes, optionally filtered by status
pub async fn get_classes(
    State(state): State<AppState>,
    Query(query): Query<ClassListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = state.class_repository.get_all(query.status).await?;

    Ok(Json(classes))
}

/// Get a class with its scheduled sessions
pub async fn get_class(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let class = state
        .class_repository
        .get_by_id(class_id)
        .await?
        .ok_or(DomainError::ClassNotFound)?;

    let sessions = state
        .class_repository
        .get_sessions_for_class(class_id)
        .await?;

    Ok(Json(ClassDetailResponse { class, sessions }))
}

/// Create a new class
pub async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    if payload.capacity < 0 {
        return Err(ApiError::BadRequest(
            "Capacity must not be negative".to_string(),
        ));
    }

    let class = state.class_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(class)))
}

/// Create a new session for a class
pub async fn create_session(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(end_date) = payload.end_date {
        if end_date < payload.session_date {
            return Err(ApiError::BadRequest(
                "End date must not be before the session date".to_string(),
            ));
        }
    }

    let session = state
        .class_repository
        .create_session(class_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Enroll the caller in a class session
pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<Uuid>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (enrollment, class, session) = state
        .enrollment_repository
        .enroll(user.id, class_id, payload.session_id, payload.payment_status)
        .await?;

    // Best-effort; a notification failure never fails the enrollment.
    notify::send_enrollment_confirmation(user.id, &class, &session);

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Cancel the caller's enrollment in a class
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .enrollment_repository
        .cancel(user.id, class_id)
        .await?;

    Ok(Json(json!({"message": "Enrollment cancelled successfully"})))
}

/// List the caller's enrollments
pub async fn get_my_enrollments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = state.enrollment_repository.get_by_user(user.id).await?;

    Ok(Json(enrollments))
}

/// List all enrollments
pub async fn get_all_enrollments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = state.enrollment_repository.get_all().await?;

    Ok(Json(enrollments))
}

/// List pending enrollments in review-queue order
pub async fn get_pending_enrollments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = state.enrollment_repository.get_pending().await?;

    Ok(Json(enrollments))
}

/// Approve a pending enrollment
pub async fn approve_enrollment(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(enrollment_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = state
        .enrollment_repository
        .approve(enrollment_id, admin.id, payload.notes.as_deref())
        .await?;

    Ok(Json(enrollment))
}

/// Reject a pending enrollment
pub async fn reject_enrollment(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(enrollment_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = state
        .enrollment_repository
        .reject(enrollment_id, admin.id, payload.notes.as_deref())
        .await?;

    Ok(Json(enrollment))
}

/// Join a class's waitlist as the caller
pub async fn join_waitlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.waitlist_repository.join(class_id, user.id).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Leave a class's waitlist as the caller
pub async fn leave_waitlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.waitlist_repository.leave(class_id, user.id).await?;

    Ok(Json(json!({"message": "Left the waitlist"})))
}

/// Get a class's waitlist ordered by position
pub async fn get_waitlist(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.waitlist_repository.get_for_class(class_id).await?;

    Ok(Json(entries))
}

/// Add a named user to a class's waitlist
pub async fn admin_add_to_waitlist(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(payload): Json<WaitlistAddRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.waitlist_repository.user_exists(payload.user_id).await? {
        return Err(DomainError::UserNotFound.into());
    }

    let entry = state
        .waitlist_repository
        .join(class_id, payload.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Change a waitlist entry's status
pub async fn update_waitlist_status(
    State(state): State<AppState>,
    Path((class_id, waitlist_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<WaitlistStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate against the closed status set before touching the database.
    let status: WaitlistStatus = payload.status.parse()?;

    if !status.is_updatable() {
        return Err(DomainError::InvalidWaitlistStatus {
            status: payload.status.clone(),
        }
        .into());
    }

    let entry = state
        .waitlist_repository
        .update_status(class_id, waitlist_id, status)
        .await?;

    Ok(Json(entry))
}

/// Remove a waitlist entry entirely
pub async fn remove_waitlist_entry(
    State(state): State<AppState>,
    Path((class_id, waitlist_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .waitlist_repository
        .remove(class_id, waitlist_id)
        .await?;

    Ok(Json(json!({"message": "Waitlist entry removed"})))
}
