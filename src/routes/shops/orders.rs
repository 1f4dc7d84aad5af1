use anyhow::Context;
use axum::{
    Json,
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
    app_error::{AppError, StdResponse},
    app_state::AppState,
    checkout::status::{OrderState, StatusAction},
    middleware,
    models::{CreateUserNotificationEntity, OrderEntity, OrderStatusEntity},
    schema::{order_statuses, orders, user_notifications},
};

/// Shop-side order routes: listing and status transitions on the shared order
/// lifecycle (pay at pickup, hand over, cancel).
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/shops/{shop_id}/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_shop_orders))
            .routes(utoipa_axum::routes!(update_order_status))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

#[derive(Serialize, ToSchema)]
struct ShopOrderRes {
    pub order: OrderEntity,
    pub status: OrderStatusEntity,
}

/// Fetch all orders placed with a shop, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Shop Orders"],
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = i32, Path, description = "Shop whose orders to list")
    ),
    responses(
        (status = 200, description = "List shop orders", body = StdResponse<Vec<ShopOrderRes>, String>)
    )
)]
async fn get_shop_orders(
    Path(shop_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<(OrderEntity, OrderStatusEntity)> = orders::table
        .inner_join(order_statuses::table)
        .filter(orders::shop_id.eq(shop_id))
        .order_by(orders::created_at.desc())
        .select((OrderEntity::as_select(), OrderStatusEntity::as_select()))
        .get_results(conn)
        .await
        .context("Failed to get shop orders")?;

    let shop_orders: Vec<ShopOrderRes> = rows
        .into_iter()
        .map(|(order, status)| ShopOrderRes { order, status })
        .collect();

    Ok(StdResponse {
        data: Some(shop_orders),
        message: Some("Get shop orders successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateOrderStatusReq {
    pub action: StatusAction,
    pub reason: Option<String>,
}

fn buyer_message(action: StatusAction) -> &'static str {
    match action {
        StatusAction::Pay => "Your order has been marked as paid.",
        StatusAction::Receive => "Your order has been marked as received.",
        StatusAction::Cancel => "Your order has been cancelled.",
    }
}

/// Apply a lifecycle action to an order. Transitions are validated against the
/// status machine; the buyer is notified of the change.
#[utoipa::path(
    patch,
    path = "/{order_id}/status",
    tags = ["Shop Orders"],
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = i32, Path, description = "Shop the order belongs to"),
        ("order_id" = i32, Path, description = "Order to transition")
    ),
    request_body = UpdateOrderStatusReq,
    responses(
        (status = 200, description = "Order status updated", body = StdResponse<OrderStatusEntity, String>)
    )
)]
async fn update_order_status(
    Path((shop_id, order_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let row: QueryResult<(OrderEntity, OrderStatusEntity)> = orders::table
        .inner_join(order_statuses::table)
        .filter(orders::id.eq(order_id))
        .filter(orders::shop_id.eq(shop_id))
        .select((OrderEntity::as_select(), OrderStatusEntity::as_select()))
        .get_result(conn)
        .await;

    let (order, status) = match row {
        Ok(row) => row,
        Err(DieselError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Other(err.into())),
    };

    OrderState::from_flags(status.paid, status.received, status.cancelled)
        .apply(body.action)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let action = body.action;
    let reason = body.reason.unwrap_or("No reason provided".to_string());

    let updated = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let updated: OrderStatusEntity = match action {
                    StatusAction::Pay => {
                        diesel::update(order_statuses::table.find(status.id))
                            .set(order_statuses::paid.eq(true))
                            .returning(OrderStatusEntity::as_returning())
                            .get_result(conn)
                            .await
                            .context("Failed to mark order as paid")?
                    }
                    StatusAction::Receive => {
                        diesel::update(order_statuses::table.find(status.id))
                            .set((
                                order_statuses::received.eq(true),
                                order_statuses::received_at.eq(diesel::dsl::now),
                            ))
                            .returning(OrderStatusEntity::as_returning())
                            .get_result(conn)
                            .await
                            .context("Failed to mark order as received")?
                    }
                    StatusAction::Cancel => {
                        diesel::update(order_statuses::table.find(status.id))
                            .set((
                                order_statuses::cancelled.eq(true),
                                order_statuses::cancelled_at.eq(diesel::dsl::now),
                                order_statuses::cancel_reason.eq(reason),
                            ))
                            .returning(OrderStatusEntity::as_returning())
                            .get_result(conn)
                            .await
                            .context("Failed to cancel order")?
                    }
                };

                diesel::insert_into(user_notifications::table)
                    .values(CreateUserNotificationEntity {
                        user_id: order.user_id,
                        order_id: order.id,
                        message: buyer_message(action).to_string(),
                        seen: false,
                    })
                    .execute(conn)
                    .await
                    .context("Failed to create buyer notification")?;

                Ok::<OrderStatusEntity, anyhow::Error>(updated)
            })
        })
        .await
        .context("Transaction failed")?;

    Ok(StdResponse {
        data: Some(updated),
        message: Some("Order status updated successfully"),
    })
}
