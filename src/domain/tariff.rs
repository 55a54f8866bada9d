//! Tiered water tariff and charge calculation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tariff component a bill line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeKind {
    /// Fixed monthly administration fee, independent of usage
    AdminFee,
    /// Usage at or below the K1 limit
    K1,
    /// Usage above the K1 limit
    K2,
}

impl ChargeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminFee => "ADMIN_FEE",
            Self::K1 => "K1",
            Self::K2 => "K2",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ADMIN_FEE" => Some(Self::AdminFee),
            "K1" => Some(Self::K1),
            "K2" => Some(Self::K2),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current tariff parameters, read from the settings store at billing time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRates {
    /// Price per m³ at or below `limit_k1`
    pub rate_k1: Decimal,
    /// Price per m³ above `limit_k1`
    pub rate_k2: Decimal,
    /// K1 usage limit in m³
    pub limit_k1: i64,
    /// Fixed monthly admin fee
    pub admin_fee: Decimal,
}

/// One line of an itemized charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeLine {
    pub kind: ChargeKind,
    /// Usage billed on this line in m³ (0 for the admin fee)
    pub usage: i64,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Itemized charge for one billing period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    pub items: Vec<ChargeLine>,
    pub total: Decimal,
}

/// Calculate the itemized charge for `usage` m³ under the given rates.
///
/// Usage up to `limit_k1` is billed at the K1 rate, anything above it at the
/// K2 rate, plus the fixed admin fee. Pure and deterministic; callers reject
/// negative usage before invoking.
pub fn calculate_charges(usage: i64, rates: &TariffRates) -> ChargeBreakdown {
    let k1_usage = usage.min(rates.limit_k1);
    let k2_usage = (usage - rates.limit_k1).max(0);

    let k1_amount = Decimal::from(k1_usage) * rates.rate_k1;
    let k2_amount = Decimal::from(k2_usage) * rates.rate_k2;
    let total = rates.admin_fee + k1_amount + k2_amount;

    ChargeBreakdown {
        items: vec![
            ChargeLine {
                kind: ChargeKind::AdminFee,
                usage: 0,
                rate: rates.admin_fee,
                amount: rates.admin_fee,
            },
            ChargeLine {
                kind: ChargeKind::K1,
                usage: k1_usage,
                rate: rates.rate_k1,
                amount: k1_amount,
            },
            ChargeLine {
                kind: ChargeKind::K2,
                usage: k2_usage,
                rate: rates.rate_k2,
                amount: k2_amount,
            },
        ],
        total,
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_rates() -> TariffRates {
        TariffRates {
            rate_k1: dec!(1200),
            rate_k2: dec!(3000),
            limit_k1: 40,
            admin_fee: dec!(3000),
        }
    }

    fn line(b: &ChargeBreakdown, kind: ChargeKind) -> ChargeLine {
        b.items.iter().find(|l| l.kind == kind).unwrap().clone()
    }

    #[test]
    fn usage_above_limit_splits_into_both_tiers() {
        // 45 m³ → K1: 40 * 1200 = 48000, K2: 5 * 3000 = 15000, total 66000
        let b = calculate_charges(45, &sample_rates());
        assert_eq!(line(&b, ChargeKind::K1).usage, 40);
        assert_eq!(line(&b, ChargeKind::K1).amount, dec!(48000));
        assert_eq!(line(&b, ChargeKind::K2).usage, 5);
        assert_eq!(line(&b, ChargeKind::K2).amount, dec!(15000));
        assert_eq!(b.total, dec!(66000));
    }

    #[test]
    fn usage_below_limit_bills_k1_only() {
        let b = calculate_charges(10, &sample_rates());
        assert_eq!(line(&b, ChargeKind::K1).usage, 10);
        assert_eq!(line(&b, ChargeKind::K2).usage, 0);
        assert_eq!(line(&b, ChargeKind::K2).amount, dec!(0));
        assert_eq!(b.total, dec!(3000) + dec!(12000));
    }

    #[test]
    fn zero_usage_still_charges_admin_fee() {
        let b = calculate_charges(0, &sample_rates());
        assert_eq!(b.total, dec!(3000));
        assert_eq!(line(&b, ChargeKind::AdminFee).usage, 0);
        assert_eq!(line(&b, ChargeKind::AdminFee).amount, dec!(3000));
    }

    #[test]
    fn tier_usages_always_sum_to_input() {
        let rates = sample_rates();
        for usage in [0, 1, 39, 40, 41, 100, 1000] {
            let b = calculate_charges(usage, &rates);
            let k1 = line(&b, ChargeKind::K1);
            let k2 = line(&b, ChargeKind::K2);
            assert_eq!(k1.usage + k2.usage, usage);
            assert_eq!(
                b.total,
                rates.admin_fee
                    + Decimal::from(k1.usage) * rates.rate_k1
                    + Decimal::from(k2.usage) * rates.rate_k2
            );
        }
    }

    #[test]
    fn charge_kind_round_trips_through_strings() {
        for kind in [ChargeKind::AdminFee, ChargeKind::K1, ChargeKind::K2] {
            assert_eq!(ChargeKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ChargeKind::from_str("K3"), None);
    }
}
