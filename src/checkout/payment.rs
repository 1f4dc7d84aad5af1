use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pricing::ShopGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    InPerson,
    Online,
}

/// Which payment methods a shop group can offer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MethodOffer {
    pub in_person: bool,
    pub online: bool,
}

impl MethodOffer {
    pub fn supports(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::InPerson => self.in_person,
            PaymentMethod::Online => self.online,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.in_person && !self.online
    }
}

/// A method is offered only when every line's merchandise supports it. A group
/// mixing incompatible merchandise can end up with no offer, in which case
/// checkout for that shop cannot complete.
pub fn offered_methods(group: &ShopGroup) -> MethodOffer {
    if group.lines.is_empty() {
        return MethodOffer {
            in_person: false,
            online: false,
        };
    }
    MethodOffer {
        in_person: group.lines.iter().all(|line| line.physical_payment),
        online: group.lines.iter().all(|line| line.online_payment),
    }
}

/// Per-shop payment selection state during a checkout session. One selection
/// applies to every cart line under the shop.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PaymentSelection {
    #[default]
    NoneSelected,
    InPerson,
    Online {
        receipt: Option<Vec<u8>>,
    },
}

impl PaymentSelection {
    /// Direct user action. Switching away from online discards any captured
    /// receipt; re-selecting online requires a fresh upload.
    pub fn select(self, method: PaymentMethod) -> Self {
        match (self, method) {
            (PaymentSelection::Online { receipt }, PaymentMethod::Online) => {
                PaymentSelection::Online { receipt }
            }
            (_, PaymentMethod::Online) => PaymentSelection::Online { receipt: None },
            (_, PaymentMethod::InPerson) => PaymentSelection::InPerson,
        }
    }

    pub fn attach_receipt(self, bytes: Vec<u8>) -> Self {
        match self {
            PaymentSelection::Online { .. } => PaymentSelection::Online {
                receipt: Some(bytes),
            },
            other => other,
        }
    }

    /// Submit gate for one group: a method is chosen, and online has a receipt.
    pub fn ready(&self) -> bool {
        match self {
            PaymentSelection::NoneSelected => false,
            PaymentSelection::InPerson => true,
            PaymentSelection::Online { receipt } => receipt.is_some(),
        }
    }
}

/// The batch may only be submitted once every included group is ready.
pub fn batch_ready<'a, I>(selections: I) -> bool
where
    I: IntoIterator<Item = &'a PaymentSelection>,
{
    selections.into_iter().all(PaymentSelection::ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::pricing::PricedLine;

    fn priced_line(online: bool, physical: bool) -> PricedLine {
        PricedLine {
            cart_id: 1,
            merch_id: 1,
            merch_name: "Org Shirt".into(),
            variant_id: 1,
            variant_name: "M".into(),
            quantity: 1,
            unit_price: 100.0,
            line_total: 100.0,
            online_payment: online,
            physical_payment: physical,
        }
    }

    fn group(lines: Vec<PricedLine>) -> ShopGroup {
        let total_price = lines.iter().map(|l| l.line_total).sum();
        ShopGroup {
            shop_id: 1,
            is_member: false,
            lines,
            total_price,
        }
    }

    #[test]
    fn method_offered_only_when_all_lines_support_it() {
        let mixed = group(vec![priced_line(true, true), priced_line(false, true)]);
        let offer = offered_methods(&mixed);
        assert!(offer.in_person);
        assert!(!offer.online);
        assert!(offer.supports(PaymentMethod::InPerson));
        assert!(!offer.supports(PaymentMethod::Online));
    }

    #[test]
    fn incompatible_group_offers_nothing() {
        let incompatible = group(vec![priced_line(true, false), priced_line(false, true)]);
        assert!(offered_methods(&incompatible).is_empty());
    }

    #[test]
    fn empty_group_offers_nothing() {
        assert!(offered_methods(&group(vec![])).is_empty());
    }

    #[test]
    fn switching_away_from_online_discards_receipt() {
        let selection = PaymentSelection::default()
            .select(PaymentMethod::Online)
            .attach_receipt(vec![1, 2, 3]);
        assert!(selection.ready());

        let selection = selection.select(PaymentMethod::InPerson);
        assert_eq!(selection, PaymentSelection::InPerson);

        // Re-selecting online requires a fresh upload.
        let selection = selection.select(PaymentMethod::Online);
        assert_eq!(selection, PaymentSelection::Online { receipt: None });
        assert!(!selection.ready());
    }

    #[test]
    fn reselecting_online_keeps_captured_receipt() {
        let selection = PaymentSelection::default()
            .select(PaymentMethod::Online)
            .attach_receipt(vec![7])
            .select(PaymentMethod::Online);
        assert!(selection.ready());
    }

    #[test]
    fn receipt_is_not_captured_without_online_selection() {
        let selection = PaymentSelection::default().attach_receipt(vec![1]);
        assert_eq!(selection, PaymentSelection::NoneSelected);
    }

    #[test]
    fn batch_gating_requires_every_group_ready() {
        let ready = PaymentSelection::InPerson;
        let not_ready = PaymentSelection::Online { receipt: None };
        assert!(!batch_ready([&ready, &not_ready]));
        assert!(batch_ready([&ready]));
        assert!(!batch_ready([&PaymentSelection::NoneSelected]));
    }
}
