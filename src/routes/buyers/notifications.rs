use anyhow::Context;
use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aliases::DieselError,
    api::identity::CurrentUser,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
    models::UserNotificationEntity,
    schema::user_notifications,
};

/// Buyer notification feed (order status changes pushed by shops).
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/buyers/notifications",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_my_notifications))
            .routes(utoipa_axum::routes!(mark_seen))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

/// Fetch the authenticated buyer's notifications, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Notifications"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my notifications", body = StdResponse<Vec<UserNotificationEntity>, String>)
    )
)]
async fn get_my_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let notifications: Vec<UserNotificationEntity> = user_notifications::table
        .filter(user_notifications::user_id.eq(user.id))
        .order_by(user_notifications::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get notifications")?;

    Ok(StdResponse {
        data: Some(notifications),
        message: Some("Get my notifications successfully"),
    })
}

/// Mark one of the buyer's notifications as seen.
#[utoipa::path(
    patch,
    path = "/{id}/seen",
    tags = ["Notifications"],
    security(("bearerAuth" = [])),
    params(
        ("id" = i32, Path, description = "Notification ID to mark as seen")
    ),
    responses(
        (status = 200, description = "Notification marked as seen", body = StdResponse<UserNotificationEntity, String>)
    )
)]
async fn mark_seen(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated: QueryResult<UserNotificationEntity> = diesel::update(
        user_notifications::table
            .find(id)
            .filter(user_notifications::user_id.eq(user.id)),
    )
    .set(user_notifications::seen.eq(true))
    .returning(UserNotificationEntity::as_returning())
    .get_result(conn)
    .await;

    match updated {
        Ok(notification) => Ok(StdResponse {
            data: Some(notification),
            message: Some("Notification marked as seen"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}
