use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

/// One buyer cart line with its merchandise's variant list embedded, ready for
/// membership-aware pricing.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub cart_id: i32,
    pub shop_id: i32,
    pub merch_id: i32,
    pub merch_name: String,
    pub online_payment: bool,
    pub physical_payment: bool,
    pub variant_id: i32,
    pub quantity: i32,
    pub variants: Vec<VariantPrice>,
}

#[derive(Debug, Clone)]
pub struct VariantPrice {
    pub id: i32,
    pub name: String,
    pub original_price: f32,
    pub membership_price: Option<f32>,
}

/// A cart line with its unit price resolved and its line total frozen.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PricedLine {
    pub cart_id: i32,
    pub merch_id: i32,
    pub merch_name: String,
    pub variant_id: i32,
    pub variant_name: String,
    pub quantity: i32,
    pub unit_price: f32,
    pub line_total: f32,
    pub online_payment: bool,
    pub physical_payment: bool,
}

/// Per-shop checkout aggregate. Totals are per shop only; cross-shop totals are
/// never combined since checkout commits one shop at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopGroup {
    pub shop_id: i32,
    pub is_member: bool,
    pub lines: Vec<PricedLine>,
    pub total_price: f32,
}

/// Members pay the membership price when the variant has one; everyone else
/// (and variants without a discount tier) pay the original price.
pub fn unit_price(variant: &VariantPrice, is_member: bool) -> f32 {
    if is_member {
        variant.membership_price.unwrap_or(variant.original_price)
    } else {
        variant.original_price
    }
}

/// Groups cart lines by shop, preserving the insertion order of first-seen
/// shops. A line whose variant no longer exists on its merchandise is dropped
/// from the group and contributes nothing to the total.
pub fn group_by_shop(lines: &[CartLine], membership_by_shop: &HashMap<i32, bool>) -> Vec<ShopGroup> {
    let mut groups: Vec<ShopGroup> = Vec::new();

    for line in lines {
        let is_member = membership_by_shop
            .get(&line.shop_id)
            .copied()
            .unwrap_or(false);

        let idx = match groups.iter().position(|group| group.shop_id == line.shop_id) {
            Some(idx) => idx,
            None => {
                groups.push(ShopGroup {
                    shop_id: line.shop_id,
                    is_member,
                    lines: Vec::new(),
                    total_price: 0.0,
                });
                groups.len() - 1
            }
        };

        let Some(variant) = line.variants.iter().find(|v| v.id == line.variant_id) else {
            tracing::warn!(
                "Cart line {} references unknown variant {}; excluded from totals",
                line.cart_id,
                line.variant_id
            );
            continue;
        };

        let unit_price = unit_price(variant, is_member);
        let line_total = unit_price * line.quantity as f32;

        let group = &mut groups[idx];
        group.lines.push(PricedLine {
            cart_id: line.cart_id,
            merch_id: line.merch_id,
            merch_name: line.merch_name.clone(),
            variant_id: line.variant_id,
            variant_name: variant.name.clone(),
            quantity: line.quantity,
            unit_price,
            line_total,
            online_payment: line.online_payment,
            physical_payment: line.physical_payment,
        });
        group.total_price += line_total;
    }

    groups
}

/// Philippine peso display formatting: zero decimal places, thousands
/// separators. Stored amounts stay plain numerics.
pub fn format_php(amount: f32) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-\u{20b1}{}", grouped)
    } else {
        format!("\u{20b1}{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i32, original: f32, membership: Option<f32>) -> VariantPrice {
        VariantPrice {
            id,
            name: format!("Variant {}", id),
            original_price: original,
            membership_price: membership,
        }
    }

    fn line(cart_id: i32, shop_id: i32, variant_id: i32, quantity: i32, variants: Vec<VariantPrice>) -> CartLine {
        CartLine {
            cart_id,
            shop_id,
            merch_id: 100 + cart_id,
            merch_name: format!("Merch {}", cart_id),
            online_payment: true,
            physical_payment: true,
            variant_id,
            quantity,
            variants,
        }
    }

    #[test]
    fn totals_are_per_shop_and_membership_aware() {
        let lines = vec![
            line(1, 10, 1, 2, vec![variant(1, 250.0, Some(200.0))]),
            line(2, 20, 2, 1, vec![variant(2, 500.0, Some(450.0))]),
            line(3, 10, 3, 3, vec![variant(3, 100.0, None)]),
        ];
        let memberships = HashMap::from([(10, true), (20, false)]);

        let groups = group_by_shop(&lines, &memberships);

        assert_eq!(groups.len(), 2);
        // Member of shop 10: 2 * 200 + 3 * 100 (no discount tier on variant 3).
        assert_eq!(groups[0].shop_id, 10);
        assert_eq!(groups[0].total_price, 700.0);
        // Not a member of shop 20: original price applies.
        assert_eq!(groups[1].shop_id, 20);
        assert_eq!(groups[1].total_price, 500.0);
    }

    #[test]
    fn group_order_follows_first_seen_shop() {
        let lines = vec![
            line(1, 30, 1, 1, vec![variant(1, 50.0, None)]),
            line(2, 10, 2, 1, vec![variant(2, 60.0, None)]),
            line(3, 30, 3, 1, vec![variant(3, 70.0, None)]),
        ];
        let groups = group_by_shop(&lines, &HashMap::new());

        let shop_ids: Vec<i32> = groups.iter().map(|g| g.shop_id).collect();
        assert_eq!(shop_ids, vec![30, 10]);
        assert_eq!(groups[0].lines.len(), 2);
    }

    #[test]
    fn unknown_variant_contributes_zero() {
        let lines = vec![
            line(1, 10, 99, 5, vec![variant(1, 250.0, None)]),
            line(2, 10, 1, 1, vec![variant(1, 250.0, None)]),
        ];
        let groups = group_by_shop(&lines, &HashMap::new());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lines.len(), 1);
        assert_eq!(groups[0].total_price, 250.0);
    }

    #[test]
    fn non_member_ignores_membership_price() {
        let v = variant(1, 300.0, Some(250.0));
        assert_eq!(unit_price(&v, false), 300.0);
        assert_eq!(unit_price(&v, true), 250.0);
    }

    #[test]
    fn php_formatting_has_no_decimals() {
        assert_eq!(format_php(750.0), "\u{20b1}750");
        assert_eq!(format_php(1500.4), "\u{20b1}1,500");
        assert_eq!(format_php(1234567.0), "\u{20b1}1,234,567");
        assert_eq!(format_php(0.0), "\u{20b1}0");
    }
}
