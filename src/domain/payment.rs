//! Payment settlement math

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment lifecycle of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No payment received yet
    Pending,
    /// Paid in part; `remaining` tracks what is still owed
    Partial,
    /// Settled in full; no further payments accepted
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of applying one payment against an outstanding amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Amount still owed after this payment (never negative)
    pub remaining: Decimal,
    /// Cash returned when the payment exceeded the outstanding amount
    pub change: Decimal,
    pub status: PaymentStatus,
}

/// Apply a payment of `amount_paid` against `outstanding`.
///
/// Overpayment is returned as change rather than carried forward as credit;
/// anything short of the outstanding amount leaves the bill partial.
pub fn settle(outstanding: Decimal, amount_paid: Decimal) -> Settlement {
    let new_remaining = outstanding - amount_paid;

    if new_remaining <= Decimal::ZERO {
        Settlement {
            remaining: Decimal::ZERO,
            change: new_remaining.abs(),
            status: PaymentStatus::Paid,
        }
    } else {
        Settlement {
            remaining: new_remaining,
            change: Decimal::ZERO,
            status: PaymentStatus::Partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn exact_payment_settles_with_no_change() {
        let s = settle(dec!(63000), dec!(63000));
        assert_eq!(s.status, PaymentStatus::Paid);
        assert_eq!(s.remaining, dec!(0));
        assert_eq!(s.change, dec!(0));
    }

    #[test]
    fn underpayment_leaves_partial_remaining() {
        let s = settle(dec!(63000), dec!(40000));
        assert_eq!(s.status, PaymentStatus::Partial);
        assert_eq!(s.remaining, dec!(23000));
        assert_eq!(s.change, dec!(0));
    }

    #[test]
    fn overpayment_returns_change_not_negative_remaining() {
        let s = settle(dec!(23000), dec!(30000));
        assert_eq!(s.status, PaymentStatus::Paid);
        assert_eq!(s.remaining, dec!(0));
        assert_eq!(s.change, dec!(7000));
    }

    #[test]
    fn payment_status_round_trips_through_strings() {
        for status in [PaymentStatus::Pending, PaymentStatus::Partial, PaymentStatus::Paid] {
            assert_eq!(PaymentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::from_str("refunded"), None);
    }
}
