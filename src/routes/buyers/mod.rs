use std::collections::HashMap;

use anyhow::{Context, Result};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::{
    checkout::pricing::{CartLine, VariantPrice},
    db::DbConn,
    models::{CartOrderEntity, MembershipEntity, MerchandiseEntity, VariantEntity},
    schema::{memberships, merchandises, variants},
};

pub mod carts;
pub mod checkout;
pub mod notifications;
pub mod orders;

/// Resolves cart rows into pricing-ready lines by embedding each merchandise's
/// payment flags and variant list. Rows pointing at vanished merchandise are
/// dropped rather than failing the whole cart.
pub async fn load_cart_lines(
    conn: &mut DbConn<'_>,
    rows: &[CartOrderEntity],
) -> Result<Vec<CartLine>> {
    let merch_ids: Vec<i32> = rows.iter().map(|row| row.merch_id).collect();

    let merch_rows: Vec<MerchandiseEntity> = merchandises::table
        .filter(merchandises::id.eq_any(&merch_ids))
        .get_results(conn)
        .await
        .context("Failed to get merchandises")?;

    let variant_rows: Vec<VariantEntity> = variants::table
        .filter(variants::merch_id.eq_any(&merch_ids))
        .get_results(conn)
        .await
        .context("Failed to get variants")?;

    let mut variants_by_merch: HashMap<i32, Vec<VariantPrice>> = HashMap::new();
    for variant in variant_rows {
        variants_by_merch
            .entry(variant.merch_id)
            .or_default()
            .push(VariantPrice {
                id: variant.id,
                name: variant.name,
                original_price: variant.original_price,
                membership_price: variant.membership_price,
            });
    }

    let merch_by_id: HashMap<i32, MerchandiseEntity> =
        merch_rows.into_iter().map(|m| (m.id, m)).collect();

    let lines = rows
        .iter()
        .filter_map(|row| {
            let Some(merch) = merch_by_id.get(&row.merch_id) else {
                tracing::warn!(
                    "Cart line {} references unknown merchandise {}; dropping",
                    row.id,
                    row.merch_id
                );
                return None;
            };
            Some(CartLine {
                cart_id: row.id,
                shop_id: row.shop_id,
                merch_id: merch.id,
                merch_name: merch.name.clone(),
                online_payment: merch.online_payment,
                physical_payment: merch.physical_payment,
                variant_id: row.variant_id,
                quantity: row.quantity,
                variants: variants_by_merch.get(&merch.id).cloned().unwrap_or_default(),
            })
        })
        .collect();

    Ok(lines)
}

/// Membership discount applies iff a membership record exists for the buyer's
/// email and the shop. Always fetched fresh so commits never act on stale
/// membership state.
pub async fn membership_by_shop(
    conn: &mut DbConn<'_>,
    email: &str,
    shop_ids: &[i32],
) -> Result<HashMap<i32, bool>> {
    let membership_rows: Vec<MembershipEntity> = memberships::table
        .filter(memberships::email.eq(email))
        .filter(memberships::shop_id.eq_any(shop_ids))
        .get_results(conn)
        .await
        .context("Failed to get memberships")?;

    Ok(shop_ids
        .iter()
        .map(|shop_id| {
            let is_member = membership_rows.iter().any(|m| m.shop_id == *shop_id);
            (*shop_id, is_member)
        })
        .collect())
}
