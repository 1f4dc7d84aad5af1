use anyhow::Context;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aliases::DieselError,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
    models::ShopNotificationEntity,
    schema::shop_notifications,
};

/// Seller notification feed (new orders, buyer cancellations).
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/shops/{shop_id}/notifications",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_shop_notifications))
            .routes(utoipa_axum::routes!(mark_seen))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

/// Fetch a shop's notifications, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Shop Notifications"],
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = i32, Path, description = "Shop whose notifications to list")
    ),
    responses(
        (status = 200, description = "List shop notifications", body = StdResponse<Vec<ShopNotificationEntity>, String>)
    )
)]
async fn get_shop_notifications(
    Path(shop_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let notifications: Vec<ShopNotificationEntity> = shop_notifications::table
        .filter(shop_notifications::shop_id.eq(shop_id))
        .order_by(shop_notifications::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get shop notifications")?;

    Ok(StdResponse {
        data: Some(notifications),
        message: Some("Get shop notifications successfully"),
    })
}

/// Mark one of a shop's notifications as seen.
#[utoipa::path(
    patch,
    path = "/{id}/seen",
    tags = ["Shop Notifications"],
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = i32, Path, description = "Shop the notification belongs to"),
        ("id" = i32, Path, description = "Notification ID to mark as seen")
    ),
    responses(
        (status = 200, description = "Notification marked as seen", body = StdResponse<ShopNotificationEntity, String>)
    )
)]
async fn mark_seen(
    Path((shop_id, id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated: QueryResult<ShopNotificationEntity> = diesel::update(
        shop_notifications::table
            .find(id)
            .filter(shop_notifications::shop_id.eq(shop_id)),
    )
    .set(shop_notifications::seen.eq(true))
    .returning(ShopNotificationEntity::as_returning())
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
