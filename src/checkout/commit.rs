use super::{
    CheckoutError,
    payment::PaymentMethod,
    pricing::ShopGroup,
    receipt::{TransactionDetails, VerifiedReceipt, validate_receipt},
};

pub const NEW_ORDER_MESSAGE: &str = "You have a new order!";

/// One order-to-be for a single cart line, with its price frozen at plan time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub cart_id: i32,
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
    pub price: f32,
    pub online_payment: bool,
    pub physical_payment: bool,
    pub paid: bool,
}

/// Everything a shop group commit writes, computed up front so the durable
/// writes can run as one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub shop_id: i32,
    pub total_price: f32,
    pub orders: Vec<OrderDraft>,
    pub verified: Option<VerifiedReceipt>,
}

fn drafts(group: &ShopGroup, method: PaymentMethod) -> Vec<OrderDraft> {
    group
        .lines
        .iter()
        .map(|line| OrderDraft {
            cart_id: line.cart_id,
            merch_id: line.merch_id,
            variant_id: line.variant_id,
            quantity: line.quantity,
            price: line.line_total,
            online_payment: method == PaymentMethod::Online,
            physical_payment: method == PaymentMethod::InPerson,
            paid: method == PaymentMethod::Online,
        })
        .collect()
}

/// In-person orders start unpaid; payment is confirmed at pickup by the shop.
pub fn plan_in_person(group: &ShopGroup) -> GroupPlan {
    GroupPlan {
        shop_id: group.shop_id,
        total_price: group.total_price,
        orders: drafts(group, PaymentMethod::InPerson),
        verified: None,
    }
}

/// Online orders commit only after the receipt passes the validation gate
/// against this group's total; they start paid.
pub fn plan_online(
    group: &ShopGroup,
    details: &TransactionDetails,
) -> Result<GroupPlan, CheckoutError> {
    let verified = validate_receipt(details, group.total_price)?;
    Ok(GroupPlan {
        shop_id: group.shop_id,
        total_price: group.total_price,
        orders: drafts(group, PaymentMethod::Online),
        verified: Some(verified),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::pricing::PricedLine;

    fn group(shop_id: i32, lines: Vec<(i32, i32, f32)>) -> ShopGroup {
        let lines: Vec<PricedLine> = lines
            .into_iter()
            .map(|(cart_id, quantity, unit_price)| PricedLine {
                cart_id,
                merch_id: cart_id * 10,
                merch_name: "Lanyard".into(),
                variant_id: cart_id * 100,
                variant_name: "Green".into(),
                quantity,
                unit_price,
                line_total: unit_price * quantity as f32,
                online_payment: true,
                physical_payment: true,
            })
            .collect();
        let total_price = lines.iter().map(|l| l.line_total).sum();
        ShopGroup {
            shop_id,
            is_member: false,
            lines,
            total_price,
        }
    }

    fn paid_details(amount: &str) -> TransactionDetails {
        TransactionDetails {
            mobile_number: Some("+63 917 123 4567".into()),
            amount: Some(amount.into()),
            reference_number: Some("1234 567 890123".into()),
            date: Some("Feb 03, 2025".into()),
        }
    }

    #[test]
    fn in_person_plan_creates_unpaid_orders_without_receipt() {
        let plan = plan_in_person(&group(1, vec![(1, 2, 150.0)]));

        assert_eq!(plan.orders.len(), 1);
        let order = &plan.orders[0];
        assert!(order.physical_payment);
        assert!(!order.online_payment);
        assert!(!order.paid);
        assert_eq!(order.price, 300.0);
        assert!(plan.verified.is_none());
    }

    #[test]
    fn online_plan_creates_paid_orders_with_verified_receipt() {
        let plan = plan_online(&group(1, vec![(1, 1, 400.0), (2, 2, 50.0)]), &paid_details("500.00"))
            .unwrap();

        assert_eq!(plan.orders.len(), 2);
        for order in &plan.orders {
            assert!(order.online_payment);
            assert!(!order.physical_payment);
            assert!(order.paid);
        }
        assert_eq!(plan.orders[0].price, 400.0);
        assert_eq!(plan.orders[1].price, 100.0);
        let verified = plan.verified.unwrap();
        assert_eq!(verified.amount, 500.0);
        assert_eq!(verified.mobile_number, "+63 917 123 4567");
    }

    #[test]
    fn online_plan_rejects_underpayment_before_any_draft_is_made() {
        let err = plan_online(&group(1, vec![(1, 1, 750.0)]), &paid_details("500.00")).unwrap_err();
        assert_eq!(err, CheckoutError::InsufficientPayment { minimum: 750.0 });
    }

    #[test]
    fn group_failures_are_independent() {
        let groups = vec![group(1, vec![(1, 1, 750.0)]), group(2, vec![(2, 1, 200.0)])];
        let details = paid_details("500.00");

        let outcomes: Vec<Result<GroupPlan, CheckoutError>> = groups
            .iter()
            .map(|g| plan_online(g, &details))
            .collect();

        assert!(outcomes[0].is_err());
        let plan = outcomes[1].as_ref().unwrap();
        assert_eq!(plan.shop_id, 2);
        assert_eq!(plan.orders.len(), 1);
    }
}
