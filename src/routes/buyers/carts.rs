use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    aliases::DieselError,
    api::identity::CurrentUser,
    app_error::{AppError, StdResponse},
    app_state::AppState,
    checkout::{
        payment::{self, MethodOffer},
        pricing::{self, PricedLine},
    },
    middleware,
    models::{CartOrderEntity, CreateCartOrderEntity, MerchandiseEntity, ShopEntity, VariantEntity},
    routes::buyers::{load_cart_lines, membership_by_shop},
    schema::{cart_orders, merchandises, shops, variants},
};

/// Buyer-facing cart routes (CRUD + grouped, membership-aware read side).
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/buyers/cart",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_my_cart))
            .routes(utoipa_axum::routes!(add_to_cart))
            .routes(utoipa_axum::routes!(update_cart_line))
            .routes(utoipa_axum::routes!(delete_cart_line))
            .route_layer(axum::middleware::from_fn(middleware::buyers_authorization)),
    )
}

#[derive(Serialize, ToSchema)]
struct ShopGroupRes {
    pub shop: ShopEntity,
    pub is_member: bool,
    pub lines: Vec<PricedLine>,
    pub total_price: f32,
    pub display_total: String,
    pub offered_methods: MethodOffer,
}

/// Fetch the authenticated buyer's cart, grouped per shop with totals priced
/// against their current membership status.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Get my cart successfully", body = StdResponse<Vec<ShopGroupRes>, String>)
    )
)]
async fn get_my_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<CartOrderEntity> = cart_orders::table
        .filter(cart_orders::user_id.eq(user.id))
        .order_by(cart_orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get cart lines")?;

    let lines = load_cart_lines(conn, &rows).await?;

    let mut shop_ids: Vec<i32> = Vec::new();
    for line in &lines {
        if !shop_ids.contains(&line.shop_id) {
            shop_ids.push(line.shop_id);
        }
    }

    let membership = membership_by_shop(conn, &user.email, &shop_ids).await?;
    let groups = pricing::group_by_shop(&lines, &membership);

    let shop_rows: Vec<ShopEntity> = shops::table
        .filter(shops::id.eq_any(&shop_ids))
        .get_results(conn)
        .await
        .context("Failed to get shops")?;

    let grouped: Vec<ShopGroupRes> = groups
        .into_iter()
        .filter_map(|group| {
            let Some(shop) = shop_rows.iter().find(|s| s.id == group.shop_id) else {
                tracing::warn!("Cart references unknown shop {}; dropping group", group.shop_id);
                return None;
            };
            Some(ShopGroupRes {
                shop: shop.clone(),
                is_member: group.is_member,
                display_total: pricing::format_php(group.total_price),
                offered_methods: payment::offered_methods(&group),
                total_price: group.total_price,
                lines: group.lines,
            })
        })
        .collect();

    Ok(StdResponse {
        data: Some(grouped),
        message: Some("Get my cart successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct AddToCartReq {
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
}

/// Add a variant to the buyer's cart; adding the same variant again
/// accumulates its quantity.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    request_body = AddToCartReq,
    responses(
        (status = 200, description = "Added to cart successfully", body = StdResponse<CartOrderEntity, String>)
    )
)]
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<AddToCartReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let merch: QueryResult<MerchandiseEntity> = merchandises::table
        .find(body.merch_id)
        .get_result(conn)
        .await;

    let merch = match merch {
        Ok(merch) => merch,
        Err(DieselError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Other(err.into())),
    };

    let variant: VariantEntity = variants::table
        .find(body.variant_id)
        .get_result(conn)
        .await
        .map_err(|_| AppError::NotFound)?;

    if variant.merch_id != merch.id {
        return Err(AppError::BadRequest(
            "Variant does not belong to this merchandise".into(),
        ));
    }

    let cart_line: CartOrderEntity = diesel::insert_into(cart_orders::table)
        .values(CreateCartOrderEntity {
            user_id: user.id,
            shop_id: merch.shop_id,
            merch_id: merch.id,
            variant_id: variant.id,
            quantity: body.quantity,
        })
        .on_conflict((cart_orders::user_id, cart_orders::variant_id))
        .do_update()
        .set(cart_orders::quantity.eq(cart_orders::quantity + body.quantity))
        .returning(CartOrderEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to add to cart")?;

    Ok(StdResponse {
        data: Some(cart_line),
        message: Some("Added to cart successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateCartLineReq {
    pub quantity: i32,
}

/// Change the quantity of one of the buyer's cart lines.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    params(
        ("id" = i32, Path, description = "Cart line ID to update")
    ),
    request_body = UpdateCartLineReq,
    responses(
        (status = 200, description = "Updated cart line successfully", body = StdResponse<CartOrderEntity, String>)
    )
)]
async fn update_cart_line(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<UpdateCartLineReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be positive".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated: QueryResult<CartOrderEntity> = diesel::update(
        cart_orders::table
            .find(id)
            .filter(cart_orders::user_id.eq(user.id)),
    )
    .set(cart_orders::quantity.eq(body.quantity))
    .returning(CartOrderEntity::as_returning())
    .get_result(conn)
    .await;

    match updated {
        Ok(cart_line) => Ok(StdResponse {
            data: Some(cart_line),
            message: Some("Updated cart line successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}

/// Remove a cart line belonging to the authenticated buyer.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    params(
        ("id" = i32, Path, description = "Cart line ID to remove")
    ),
    responses(
        (status = 200, description = "Removed cart line successfully", body = StdResponse<CartOrderEntity, String>)
    )
)]
async fn delete_cart_line(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let deleted: QueryResult<CartOrderEntity> = diesel::delete(cart_orders::table)
        .filter(cart_orders::id.eq(id))
        .filter(cart_orders::user_id.eq(user.id))
        .returning(CartOrderEntity::as_returning())
        .get_result(conn)
        .await;

    match deleted {
        Ok(cart_line) => Ok(StdResponse {
            data: Some(cart_line),
            message: Some("Removed cart line successfully"),
        }),
        Err(DieselError::NotFound) => Err(AppError::NotFound),
        Err(err) => Err(AppError::Other(err.into())),
    }
}
