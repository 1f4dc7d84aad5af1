use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle of an order after commit. Shop staff drive Pay/Receive/Cancel;
/// verified online orders are created directly in `Paid` since the receipt
/// already proves payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Pending,
    Paid,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StatusAction {
    Pay,
    Receive,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("An order cannot be marked received before it is paid")]
    ReceivedBeforePaid,
    #[error("The order is already received or cancelled")]
    Terminal,
    #[error("The order is already in that state")]
    Redundant,
}

impl OrderState {
    /// Effective state from the persisted boolean columns. Cancellation wins
    /// over everything else.
    pub fn from_flags(paid: bool, received: bool, cancelled: bool) -> Self {
        if cancelled {
            OrderState::Cancelled
        } else if received {
            OrderState::Received
        } else if paid {
            OrderState::Paid
        } else {
            OrderState::Pending
        }
    }

    pub fn apply(self, action: StatusAction) -> Result<OrderState, StatusError> {
        match (self, action) {
            (OrderState::Received | OrderState::Cancelled, _) => Err(StatusError::Terminal),
            (OrderState::Pending, StatusAction::Pay) => Ok(OrderState::Paid),
            (OrderState::Paid, StatusAction::Pay) => Err(StatusError::Redundant),
            (OrderState::Pending, StatusAction::Receive) => Err(StatusError::ReceivedBeforePaid),
            (OrderState::Paid, StatusAction::Receive) => Ok(OrderState::Received),
            (OrderState::Pending | OrderState::Paid, StatusAction::Cancel) => {
                Ok(OrderState::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_requires_paid_first() {
        assert_eq!(
            OrderState::Pending.apply(StatusAction::Receive),
            Err(StatusError::ReceivedBeforePaid)
        );
        assert_eq!(
            OrderState::Pending
                .apply(StatusAction::Pay)
                .and_then(|s| s.apply(StatusAction::Receive)),
            Ok(OrderState::Received)
        );
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for action in [StatusAction::Pay, StatusAction::Receive, StatusAction::Cancel] {
            assert_eq!(OrderState::Received.apply(action), Err(StatusError::Terminal));
            assert_eq!(OrderState::Cancelled.apply(action), Err(StatusError::Terminal));
        }
    }

    #[test]
    fn cancel_allowed_from_pending_and_paid_only() {
        assert_eq!(
            OrderState::Pending.apply(StatusAction::Cancel),
            Ok(OrderState::Cancelled)
        );
        assert_eq!(
            OrderState::Paid.apply(StatusAction::Cancel),
            Ok(OrderState::Cancelled)
        );
    }

    #[test]
    fn flags_resolve_with_cancellation_winning() {
        assert_eq!(OrderState::from_flags(false, false, false), OrderState::Pending);
        assert_eq!(OrderState::from_flags(true, false, false), OrderState::Paid);
        assert_eq!(OrderState::from_flags(true, true, false), OrderState::Received);
        assert_eq!(OrderState::from_flags(true, true, true), OrderState::Cancelled);
    }
}
