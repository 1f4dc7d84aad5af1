use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aliases::DieselError,
    api::identity::CurrentUser,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    checkout::status::{OrderState, StatusAction},
    middleware,
    models::{CreateShopNotificationEntity, OrderEntity, OrderStatusEntity},
    schema::{order_statuses, orders, shop_notifications},
};

/// Buyer-facing order routes: history and cancellation.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/buyers/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_my_orders))
            .routes(utoipa_axum::routes!(get_order))
            .routes(utoipa_axum::routes!(cancel_order))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

#[derive(Serialize, ToSchema)]
struct GetOrderRes {
    pub order: OrderEntity,
    pub status: OrderStatusEntity,
}

/// Fetch all orders belonging to the authenticated buyer.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my orders", body = StdResponse<Vec<GetOrderRes>, String>)
    )
)]
async fn get_my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<(OrderEntity, OrderStatusEntity)> = orders::table
        .inner_join(order_statuses::table)
        .filter(orders::user_id.eq(user.id))
        .order_by(orders::created_at.desc())
        .select((OrderEntity::as_select(), OrderStatusEntity::as_select()))
        .get_results(conn)
        .await
        .context("Failed to get my orders")?;

    let orders_with_status: Vec<GetOrderRes> = rows
        .into_iter()
        .map(|(order, status)| GetOrderRes { order, status })
        .collect();

    Ok(StdResponse {
        data: Some(orders_with_status),
        message: Some("Get my orders successfully"),
    })
}

/// Fetch a specific order belonging to the authenticated buyer.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<GetOrderRes, String>)
    )
)]
async fn get_order(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let row: QueryResult<(OrderEntity, OrderStatusEntity)> = orders::table
        .inner_join(order_statuses::table)
        .filter(orders::id.eq(id))
        .filter(orders::user_id.eq(user.id))
        .select((OrderEntity::as_select(), OrderStatusEntity::as_select()))
        .get_result(conn)
        .await;

    match row {
        Ok((order, status)) => Ok(StdResponse {
            data: Some(GetOrderRes { order, status }),
            message: Some("Get order successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

#[derive(Deserialize, ToSchema)]
struct CancelOrderReq {
    pub reason: Option<String>,
}

/// Cancel one of the buyer's orders. Allowed only while the order is pending
/// or paid; received and already-cancelled orders are terminal.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID to cancel")
    ),
    request_body = CancelOrderReq,
    responses(
        (status = 200, description = "Cancelled order successfully", body = StdResponse<OrderStatusEntity, String>)
    )
)]
async fn cancel_order(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CancelOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let row: QueryResult<(OrderEntity, OrderStatusEntity)> = orders::table
        .inner_join(order_statuses::table)
        .filter(orders::id.eq(id))
        .filter(orders::user_id.eq(user.id))
        .select((OrderEntity::as_select(), OrderStatusEntity::as_select()))
        .get_result(conn)
        .await;

    let (order, status) = match row {
        Ok(row) => row,
        Err(DieselError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Other(err.into())),
    };

    OrderState::from_flags(status.paid, status.received, status.cancelled)
        .apply(StatusAction::Cancel)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let reason = body.reason.unwrap_or("No reason provided".to_string());

    let cancelled = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let cancelled: OrderStatusEntity =
                    diesel::update(order_statuses::table.find(status.id))
                        .set((
                            order_statuses::cancelled.eq(true),
                            order_statuses::cancelled_at.eq(diesel::dsl::now),
                            order_statuses::cancel_reason.eq(reason),
                        ))
                        .returning(OrderStatusEntity::as_returning())
                        .get_result(conn)
                        .await
                        .context("Failed to cancel order status")?;

                diesel::insert_into(shop_notifications::table)
                    .values(CreateShopNotificationEntity {
                        shop_id: order.shop_id,
                        order_id: order.id,
                        message: format!("Order #{} has been cancelled by the buyer.", order.id),
                        seen: false,
                    })
                    .execute(conn)
                    .await
                    .context("Failed to create shop notification")?;

                Ok::<OrderStatusEntity, anyhow::Error>(cancelled)
            })
        })
        .await
        .context("Transaction failed")?;

    Ok(StdResponse {
        data: Some(cancelled),
        message: Some("Cancelled order successfully"),
    })
}
