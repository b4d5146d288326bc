//! Conversão string decimal ↔ montante atômico.
//! Política: dígitos fracionários além de `decimals` são **truncados** (nunca
//! arredondados); parte fracionária ausente vale zero.

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::ensure_decimals;
use super::types::{pow10, Atomic, MAX_DECIMALS};
use crate::amm_err;

fn invalid(amount: &str) -> AmmError {
    amm_err!(AmmErrorCode::InvalidAmount, amount => amount)
}

fn digits_to_u128(digits: &str) -> Result<u128, AmmError> {
    let mut acc: u128 = 0;
    for b in digits.bytes() {
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(b - b'0')))
            .ok_or_else(|| AmmError::new(AmmErrorCode::OverflowNumeric))?;
    }
    Ok(acc)
}

/// Converte `"123.456"` em unidades atômicas com `decimals` casas.
pub fn to_atomic(amount: &str, decimals: u8) -> Result<Atomic, AmmError> {
    ensure_decimals(decimals)?;

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid(amount));
    }

    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let int_value = digits_to_u128(int_part)?;
    let mut frac_value = digits_to_u128(kept)?;
    // completa com zeros à direita até `decimals`
    frac_value *= pow10(decimals - kept.len() as u8);

    int_value
        .checked_mul(pow10(decimals))
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| amm_err!(AmmErrorCode::OverflowNumeric, amount => amount))
}

/// Converte unidades atômicas em string decimal mínima (`"1.5"`, `"2"`).
///
/// Pré-condição: `decimals <= MAX_DECIMALS` (garantido por [`TokenMeta`]).
/// Em debug a violação aborta; em release o valor é limitado a 18.
///
/// [`TokenMeta`]: crate::amm::pool::TokenMeta
pub fn from_atomic(amount: Atomic, decimals: u8) -> String {
    debug_assert!(decimals <= MAX_DECIMALS, "decimals {decimals} > {MAX_DECIMALS}");
    let decimals = decimals.min(MAX_DECIMALS);
    let scale = pow10(decimals);
    let int_part = amount / scale;
    let frac_part = amount % scale;
    if frac_part == 0 {
        return int_part.to_string();
    }
    let frac = format!("{:0width$}", frac_part, width = decimals as usize);
    format!("{}.{}", int_part, frac.trim_end_matches('0'))
}

/// Variante com sinal: reconstrói o `-` para valores negativos.
pub fn from_atomic_signed(amount: i128, decimals: u8) -> String {
    let magnitude = from_atomic(amount.unsigned_abs(), decimals);
    if amount < 0 { format!("-{magnitude}") } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_to_atomic_basic() {
        assert_eq!(to_atomic("1", 6).unwrap(), 1_000_000);
        assert_eq!(to_atomic("1.5", 6).unwrap(), 1_500_000);
        assert_eq!(to_atomic("0.000001", 6).unwrap(), 1);
        assert_eq!(to_atomic("42", 0).unwrap(), 42);
        assert_eq!(to_atomic(".5", 2).unwrap(), 50);
        assert_eq!(to_atomic("5.", 2).unwrap(), 500);
    }

    #[test]
    fn t_to_atomic_truncates_never_rounds() {
        assert_eq!(to_atomic("1.9999999", 6).unwrap(), 1_999_999);
        assert_eq!(to_atomic("0.0000009", 6).unwrap(), 0);
    }

    #[test]
    fn t_to_atomic_rejects_garbage() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "+1", " 1", "1e5", "1,5", "NaN"] {
            let err = to_atomic(bad, 6).unwrap_err();
            assert_eq!(err.code, AmmErrorCode::InvalidAmount, "input {bad:?}");
        }
    }

    #[test]
    fn t_to_atomic_limits() {
        assert_eq!(to_atomic("1", 19).unwrap_err().code, AmmErrorCode::InvalidParameter);
        let too_big = "340282366920938463463374607431768211456"; // u128::MAX + 1
        assert_eq!(to_atomic(too_big, 0).unwrap_err().code, AmmErrorCode::OverflowNumeric);
        assert_eq!(to_atomic("340282366920938463464", 18).unwrap_err().code, AmmErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_from_atomic_strips_zeros() {
        assert_eq!(from_atomic(1_500_000, 6), "1.5");
        assert_eq!(from_atomic(1_000_000, 6), "1");
        assert_eq!(from_atomic(1, 6), "0.000001");
        assert_eq!(from_atomic(0, 6), "0");
        assert_eq!(from_atomic(123, 0), "123");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "decimals 19 > 18")]
    fn t_from_atomic_rejects_decimals_above_max() {
        let _ = from_atomic(1, 19);
    }

    #[test]
    fn t_from_atomic_signed() {
        assert_eq!(from_atomic_signed(-1_500_000, 6), "-1.5");
        assert_eq!(from_atomic_signed(0, 6), "0");
        assert_eq!(from_atomic_signed(i128::MIN, 0), "-170141183460469231731687303715884105728");
    }

    #[test]
    fn t_roundtrip_atomic() {
        for (x, d) in [(0u128, 0u8), (1, 18), (123_456_789, 6), (u128::MAX, 18), (10, 1)] {
            assert_eq!(to_atomic(&from_atomic(x, d), d).unwrap(), x);
        }
    }
}
