use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coupon as reported by the payment processor.
#[derive(Debug, Clone, Deserialize)]
pub struct Coupon {
    pub id: String,
    #[serde(default)]
    pub valid: bool,
    pub percent_off: Option<f64>,
    /// Minor currency units.
    pub amount_off: Option<i64>,
    pub currency: Option<String>,
}

/// Customer-facing code wrapping a coupon.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionCode {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub active: bool,
    pub coupon: Coupon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percent,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Discount {
    pub kind: DiscountKind,
    #[schema(value_type = String)]
    pub value: Decimal,
}

impl Discount {
    pub fn percent(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Percent,
            value,
        }
    }

    pub fn amount(value: Decimal) -> Self {
        Self {
            kind: DiscountKind::Amount,
            value,
        }
    }
}

/// Discount granted by a promotion code, if the processor still accepts it.
pub fn discount_from_promotion(promo: &PromotionCode) -> Option<Discount> {
    if !promo.active || !promo.coupon.valid {
        return None;
    }
    let coupon = &promo.coupon;
    if let Some(percent) = coupon.percent_off {
        return Decimal::try_from(percent)
            .ok()
            .filter(|p| *p > Decimal::ZERO && *p <= Decimal::ONE_HUNDRED)
            .map(Discount::percent);
    }
    coupon
        .amount_off
        .filter(|amount| *amount > 0)
        .map(|amount| Discount::amount(Decimal::new(amount, 2)))
}

/// Price after discount, never below zero, rounded to cents.
pub fn apply_discount(price: Decimal, discount: &Discount) -> Decimal {
    let reduced = match discount.kind {
        DiscountKind::Percent => price - (price * discount.value / Decimal::ONE_HUNDRED),
        DiscountKind::Amount => price - discount.value,
    };
    reduced.max(Decimal::ZERO).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(active: bool, valid: bool, percent: Option<f64>, amount: Option<i64>) -> PromotionCode {
        PromotionCode {
            id: "promo_1".into(),
            code: "SPRING".into(),
            active,
            coupon: Coupon {
                id: "co_1".into(),
                valid,
                percent_off: percent,
                amount_off: amount,
                currency: Some("usd".into()),
            },
        }
    }

    #[test]
    fn percent_discount_reduces_price() {
        let discount = discount_from_promotion(&promo(true, true, Some(25.0), None)).unwrap();
        assert_eq!(discount, Discount::percent(Decimal::new(25, 0)));
        assert_eq!(apply_discount(Decimal::new(1900, 2), &discount), Decimal::new(1425, 2));
    }

    #[test]
    fn amount_discount_never_goes_negative() {
        let discount = discount_from_promotion(&promo(true, true, None, Some(5000))).unwrap();
        assert_eq!(discount, Discount::amount(Decimal::new(5000, 2)));
        assert_eq!(apply_discount(Decimal::new(1900, 2), &discount), Decimal::ZERO);
        assert_eq!(
            apply_discount(Decimal::new(19000, 2), &discount),
            Decimal::new(14000, 2)
        );
    }

    #[test]
    fn inactive_or_invalid_codes_grant_nothing() {
        assert!(discount_from_promotion(&promo(false, true, Some(10.0), None)).is_none());
        assert!(discount_from_promotion(&promo(true, false, Some(10.0), None)).is_none());
        assert!(discount_from_promotion(&promo(true, true, None, None)).is_none());
        assert!(discount_from_promotion(&promo(true, true, Some(150.0), None)).is_none());
    }
}
