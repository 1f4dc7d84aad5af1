use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Extension,
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    api::{self, identity::CurrentUser},
    app_error::{AppError, StdResponse},
    app_state::AppState,
    checkout::{
        CheckoutError, commit,
        commit::GroupPlan,
        payment::{self, PaymentMethod},
        pricing::{self, ShopGroup},
        receipt::{extract_transaction_details, unusable},
    },
    config, middleware,
    models::{
        CartOrderEntity, CreateOrderEntity, CreateOrderStatusEntity, CreatePaymentEntity,
        CreateReceiptEntity, CreateShopNotificationEntity, OrderEntity, OrderStatusEntity,
    },
    routes::buyers::{load_cart_lines, membership_by_shop},
    schema::{cart_orders, order_statuses, orders, payments, receipts, shop_notifications},
};

// Receipt images are allowed up to 5MB; leave headroom for the payload part.
const MAX_CHECKOUT_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/buyers/checkout",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(checkout))
            .layer(DefaultBodyLimit::max(MAX_CHECKOUT_BODY_BYTES))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

#[derive(Deserialize, ToSchema)]
struct CheckoutReq {
    /// Cart line IDs included in this checkout batch.
    pub cart_ids: Vec<i32>,
    /// One payment method per shop; it applies to all of that shop's lines.
    pub selections: Vec<ShopSelection>,
}

#[derive(Deserialize, ToSchema)]
struct ShopSelection {
    pub shop_id: i32,
    pub method: PaymentMethod,
}

/// Per-shop outcome of a checkout batch. Groups commit independently; one
/// shop's failure never rolls back another shop's success.
#[derive(Serialize, ToSchema)]
struct GroupResult {
    pub shop_id: i32,
    pub success: bool,
    pub order_ids: Vec<i32>,
    pub error: Option<String>,
    pub missing_fields: Option<Vec<String>>,
}

enum GroupFailure {
    Validation(CheckoutError),
    Processing(anyhow::Error),
}

/// Convert the buyer's selected cart lines into orders, one shop group at a
/// time. Multipart body: a `payload` JSON part plus one `receipt-{shop_id}`
/// image part per shop paying online.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Checkout"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Checkout processed; inspect per-shop results", body = StdResponse<Vec<GroupResult>, String>)
    )
)]
async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut payload: Option<CheckoutReq> = None;
    let mut receipt_files: HashMap<i32, Vec<u8>> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "payload" {
            let text = field
                .text()
                .await
                .map_err(|err| AppError::BadRequest(format!("Unreadable payload: {err}")))?;
            payload = Some(
                serde_json::from_str(&text)
                    .map_err(|err| AppError::BadRequest(format!("Invalid payload: {err}")))?,
            );
        } else if let Some(shop_id) = name
            .strip_prefix("receipt-")
            .and_then(|raw| raw.parse::<i32>().ok())
        {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::BadRequest(format!("Unreadable receipt: {err}")))?;
            receipt_files.insert(shop_id, bytes.to_vec());
        }
    }

    let payload = payload.ok_or(AppError::BadRequest("Missing checkout payload".into()))?;
    if payload.cart_ids.is_empty() {
        return Err(AppError::BadRequest("No cart lines selected".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<CartOrderEntity> = cart_orders::table
        .filter(cart_orders::user_id.eq(user.id))
        .filter(cart_orders::id.eq_any(&payload.cart_ids))
        .order_by(cart_orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get cart lines")?;

    if rows.is_empty() {
        return Err(AppError::NotFound);
    }

    let lines = load_cart_lines(conn, &rows).await?;

    let mut shop_ids: Vec<i32> = Vec::new();
    for line in &lines {
        if !shop_ids.contains(&line.shop_id) {
            shop_ids.push(line.shop_id);
        }
    }

    // Membership is re-fetched at commit time so the frozen order price never
    // reflects stale state from earlier in the session.
    let membership = membership_by_shop(conn, &user.email, &shop_ids).await?;
    let groups = pricing::group_by_shop(&lines, &membership);

    let mut results: Vec<GroupResult> = Vec::with_capacity(groups.len());
    for group in &groups {
        let outcome = commit_group(
            &state,
            conn,
            &user,
            group,
            &payload.selections,
            &receipt_files,
        )
        .await;

        results.push(match outcome {
            Ok(order_ids) => GroupResult {
                shop_id: group.shop_id,
                success: true,
                order_ids,
                error: None,
                missing_fields: None,
            },
            Err(failure) => group_failure_result(group.shop_id, failure),
        });
    }

    Ok(StdResponse {
        data: Some(results),
        message: Some("Checkout processed"),
    })
}

fn group_failure_result(shop_id: i32, failure: GroupFailure) -> GroupResult {
    match failure {
        GroupFailure::Validation(err) => {
            let missing_fields = match &err {
                CheckoutError::MissingFields(fields) => {
                    Some(fields.iter().map(|f| f.to_string()).collect())
                }
                _ => None,
            };
            GroupResult {
                shop_id,
                success: false,
                order_ids: Vec::new(),
                error: Some(err.to_string()),
                missing_fields,
            }
        }
        GroupFailure::Processing(err) => {
            tracing::error!("Checkout for shop {} failed: {err:#}", shop_id);
            GroupResult {
                shop_id,
                success: false,
                order_ids: Vec::new(),
                error: Some("Order processing failed, please contact support".into()),
                missing_fields: None,
            }
        }
    }
}

/// Runs one shop group through validation and, on success, commits it. OCR and
/// the blob upload happen before the database transaction; a failure inside
/// the transaction therefore leaves at worst an orphan blob, never a
/// half-committed order.
async fn commit_group(
    state: &AppState,
    conn: &mut crate::db::DbConn<'_>,
    user: &CurrentUser,
    group: &ShopGroup,
    selections: &[ShopSelection],
    receipt_files: &HashMap<i32, Vec<u8>>,
) -> Result<Vec<i32>, GroupFailure> {
    let selection = selections
        .iter()
        .find(|s| s.shop_id == group.shop_id)
        .ok_or(GroupFailure::Validation(CheckoutError::NoMethodSelected))?;

    let offer = payment::offered_methods(group);
    if !offer.supports(selection.method) {
        return Err(GroupFailure::Validation(CheckoutError::MethodNotOffered));
    }

    let (plan, picture_url) = match selection.method {
        PaymentMethod::InPerson => (commit::plan_in_person(group), None),
        PaymentMethod::Online => {
            let image = receipt_files
                .get(&group.shop_id)
                .ok_or(GroupFailure::Validation(CheckoutError::MissingReceipt))?;

            let text = match api::ocr::recognize(
                state.http_client.clone(),
                image.clone(),
                config::ocr_timeout(),
            )
            .await
            {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!("OCR failed for shop {}: {err:#}", group.shop_id);
                    return Err(GroupFailure::Validation(unusable()));
                }
            };

            let details = extract_transaction_details(&text);
            let plan = commit::plan_online(group, &details).map_err(GroupFailure::Validation)?;

            let bucket = config::receipt_bucket();
            let key = format!("payment_{}_{}", group.shop_id, Uuid::new_v4());
            api::storage::upload(state.http_client.clone(), &bucket, &key, image.clone())
                .await
                .map_err(GroupFailure::Processing)?;

            (plan, Some(api::storage::public_url(&bucket, &key)))
        }
    };

    persist_group(conn, user.id, plan, picture_url)
        .await
        .map_err(GroupFailure::Processing)
}

/// All durable writes for one group run in a single transaction, in commit
/// order: status, order, payment, receipt, cart deletion, notification.
async fn persist_group(
    conn: &mut crate::db::DbConn<'_>,
    user_id: Uuid,
    plan: GroupPlan,
    picture_url: Option<String>,
) -> anyhow::Result<Vec<i32>> {
    conn.transaction(move |conn| {
        Box::pin(async move {
            let mut order_ids = Vec::with_capacity(plan.orders.len());

            for draft in &plan.orders {
                let status: OrderStatusEntity = diesel::insert_into(order_statuses::table)
                    .values(CreateOrderStatusEntity { paid: draft.paid })
                    .returning(OrderStatusEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create order status")?;

                let order: OrderEntity = diesel::insert_into(orders::table)
                    .values(CreateOrderEntity {
                        user_id,
                        shop_id: plan.shop_id,
                        merch_id: draft.merch_id,
                        variant_id: draft.variant_id,
                        quantity: draft.quantity,
                        price: draft.price,
                        online_payment: draft.online_payment,
                        physical_payment: draft.physical_payment,
                        status_id: status.id,
                    })
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create order")?;

                if let Some(url) = &picture_url {
                    diesel::insert_into(payments::table)
                        .values(CreatePaymentEntity {
                            order_id: order.id,
                            picture_url: url.clone(),
                        })
                        .execute(conn)
                        .await
                        .context("Failed to create payment")?;
                }

                if let Some(verified) = &plan.verified {
                    diesel::insert_into(receipts::table)
                        .values(CreateReceiptEntity {
                            order_id: order.id,
                            mobile_number: verified.mobile_number.clone(),
                            amount: verified.amount,
                            reference_number: verified.reference_number.clone(),
                        })
                        .execute(conn)
                        .await
                        .context("Failed to create receipt")?;
                }

                diesel::delete(cart_orders::table.find(draft.cart_id))
                    .execute(conn)
                    .await
                    .context("Failed to remove cart line")?;

                diesel::insert_into(shop_notifications::table)
                    .values(CreateShopNotificationEntity {
                        shop_id: plan.shop_id,
                        order_id: order.id,
                        message: commit::NEW_ORDER_MESSAGE.to_string(),
                        seen: false,
                    })
                    .execute(conn)
                    .await
                    .context("Failed to create shop notification")?;

                order_ids.push(order.id);
            }

            Ok::<Vec<i32>, anyhow::Error>(order_ids)
        })
    })
    .await
    .context("Transaction failed")
}
