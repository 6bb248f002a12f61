//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 가격과 금액은 모두 `Decimal`로 다루어 배분 과정의 현금 보존이 정확히 성립합니다.

use rust_decimal::{Decimal, RoundingStrategy};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 현금/평가금액 타입.
pub type Money = Decimal;

/// 정수 단위 수량 타입 (소수점 주식 미지원).
pub type Units = u64;

/// 퍼센트 타입 (12.5 = 12.5%).
pub type Percent = Decimal;

/// Decimal 표시를 위한 확장 트레이트.
pub trait DecimalExt {
    /// 이미 100을 곱한 값을 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percent_string(&self) -> String;

    /// 천 단위 구분자와 소수점 두 자리로 금액 문자열을 만듭니다 (예: "1,234.50").
    fn to_money_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 먼 쪽으로).
    fn round_money(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_percent_string(&self) -> String {
        format!("{:.2}%", self.round_money(2))
    }

    fn to_money_string(&self) -> String {
        let rounded = self.round_money(2);
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{}{}.{}", sign, grouped, frac_part)
    }

    fn round_money(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Decimal에 정수 수량을 곱합니다 (Decimal 범위를 넘으면 None).
pub fn times_units(price: Price, units: Units) -> Option<Money> {
    price.checked_mul(Decimal::from(units))
}
