//! External money movements into and out of a client portfolio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::client::merge_opt;
use super::{ClientId, Date};

/// Direction of an external flow, from the portfolio's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Money added by the client.
    Contribution,
    /// Money taken out by the client.
    Withdrawal,
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::Contribution => write!(f, "Contribution"),
            FlowDirection::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

/// A dated external cashflow.
///
/// Positive amounts are contributions, negative amounts are withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowEvent {
    /// Owning client.
    pub client_id: ClientId,
    /// Value date.
    pub date: Date,
    /// Signed amount.
    pub amount: Decimal,
    /// Source label (SIP, Redemption, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Source transaction id, when the export carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl CashflowEvent {
    /// Creates an unlabeled cashflow.
    pub fn new(client_id: ClientId, date: Date, amount: Decimal) -> Self {
        Self {
            client_id,
            date,
            amount,
            label: None,
            transaction_id: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the source transaction id.
    #[must_use]
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    /// Contribution or withdrawal, by sign.
    #[must_use]
    pub fn direction(&self) -> FlowDirection {
        if self.amount.is_sign_negative() {
            FlowDirection::Withdrawal
        } else {
            FlowDirection::Contribution
        }
    }

    /// Ledger ordering key: date plus label.
    ///
    /// Not unique; several transactions may share a date and label.
    #[must_use]
    pub fn key(&self) -> (Date, Option<&str>) {
        (self.date, self.label.as_deref())
    }

    /// Field-level merge: date and amount come from `incoming`, the label
    /// and transaction id only when present.
    pub fn merge_from(&mut self, incoming: CashflowEvent) {
        self.date = incoming.date;
        self.amount = incoming.amount;
        merge_opt(&mut self.label, incoming.label);
        merge_opt(&mut self.transaction_id, incoming.transaction_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_direction_by_sign() {
        let d = Date::from_ymd(2024, 1, 1).unwrap();
        let sip = CashflowEvent::new(ClientId::new("C001"), d, dec!(5000)).with_label("SIP");
        let redemption = CashflowEvent::new(ClientId::new("C001"), d, dec!(-2000));
        assert_eq!(sip.direction(), FlowDirection::Contribution);
        assert_eq!(redemption.direction(), FlowDirection::Withdrawal);
        assert_eq!(sip.key(), (d, Some("SIP")));
    }

    #[test]
    fn test_merge_keeps_stored_label() {
        let d = Date::from_ymd(2024, 1, 1).unwrap();
        let mut stored = CashflowEvent::new(ClientId::new("C001"), d, dec!(100))
            .with_label("SIP")
            .with_transaction_id("T1");
        stored.merge_from(CashflowEvent::new(ClientId::new("C001"), d.add_days(1), dec!(150)));
        assert_eq!(stored.amount, dec!(150));
        assert_eq!(stored.date, d.add_days(1));
        assert_eq!(stored.label.as_deref(), Some("SIP"));
        assert_eq!(stored.transaction_id.as_deref(), Some("T1"));
    }
}
