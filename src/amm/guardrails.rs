//! Validações de fronteira e helpers numéricos seguros.
//! Objetivo: entradas seguras e divisões/multiplicações sem estouro.

use super::errors::{AmmError, AmmErrorCode};
use super::types::{Atomic, Bps, BPS_SCALE, MAX_DECIMALS, U256};
use crate::amm_err;

#[inline]
pub fn ensure_nonzero(amount: Atomic) -> Result<(), AmmError> {
    if amount == 0 {
        Err(amm_err!(AmmErrorCode::InvalidAmount, amount => 0))
    } else {
        Ok(())
    }
}

#[inline]
pub fn ensure_reserves(reserve_a: Atomic, reserve_b: Atomic) -> Result<(), AmmError> {
    if reserve_a == 0 || reserve_b == 0 {
        return Err(amm_err!(AmmErrorCode::ZeroReserves, reserve_a => reserve_a, reserve_b => reserve_b));
    }
    Ok(())
}

#[inline]
pub fn ensure_fee_bps(fee_bps: Bps) -> Result<(), AmmError> {
    if fee_bps > BPS_SCALE {
        return Err(amm_err!(AmmErrorCode::InvalidParameter, param => format!("fee_bps={fee_bps}")));
    }
    Ok(())
}

#[inline]
pub fn ensure_decimals(decimals: u8) -> Result<(), AmmError> {
    if decimals > MAX_DECIMALS {
        return Err(amm_err!(AmmErrorCode::InvalidParameter, param => format!("decimals={decimals}")));
    }
    Ok(())
}

#[inline]
pub fn checked_add(a: Atomic, b: Atomic) -> Result<Atomic, AmmError> {
    a.checked_add(b).ok_or_else(|| AmmError::new(AmmErrorCode::OverflowNumeric))
}

#[inline]
pub fn checked_sub(a: Atomic, b: Atomic) -> Result<Atomic, AmmError> {
    a.checked_sub(b).ok_or_else(|| AmmError::new(AmmErrorCode::OverflowNumeric))
}

#[inline]
pub fn mul_u128_to_u256(a: Atomic, b: Atomic) -> U256 {
    U256::from(a) * U256::from(b)
}

/// `floor(a * b / d)` em 256 bits. `d` deve ser > 0.
#[inline]
pub fn mul_div_floor(a: Atomic, b: Atomic, d: Atomic) -> U256 {
    mul_u128_to_u256(a, b) / U256::from(d)
}

#[inline]
pub fn ceil_div_u256(n: U256, d: U256) -> U256 {
    // (n + d - 1) / d, assumindo d>0
    (n + (d - U256::from(1u8))) / d
}

#[inline]
pub fn u256_to_u128_checked(v: U256) -> Result<Atomic, AmmError> {
    if v > U256::from(u128::MAX) {
        Err(AmmError::new(AmmErrorCode::OverflowNumeric))
    } else {
        Ok(v.as_u128())
    }
}

/// Saturação para `u64` (usada por heurísticas, nunca em montantes).
#[inline]
pub fn u256_to_u64_saturating(v: U256) -> u64 {
    if v > U256::from(u64::MAX) { u64::MAX } else { v.as_u64() }
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_ensure_nonzero() {
        assert!(ensure_nonzero(1).is_ok());
        assert_eq!(ensure_nonzero(0).unwrap_err().code, AmmErrorCode::InvalidAmount);
    }

    #[test]
    fn t_ensure_reserves() {
        assert!(ensure_reserves(1, 1).is_ok());
        assert_eq!(ensure_reserves(0, 1).unwrap_err().code, AmmErrorCode::ZeroReserves);
        assert_eq!(ensure_reserves(1, 0).unwrap_err().code, AmmErrorCode::ZeroReserves);
    }

    #[test]
    fn t_ensure_fee_and_decimals() {
        assert!(ensure_fee_bps(0).is_ok());
        assert!(ensure_fee_bps(10_000).is_ok());
        assert_eq!(ensure_fee_bps(10_001).unwrap_err().code, AmmErrorCode::InvalidParameter);
        assert!(ensure_decimals(18).is_ok());
        assert_eq!(ensure_decimals(19).unwrap_err().code, AmmErrorCode::InvalidParameter);
    }

    #[test]
    fn t_checked_add_sub_over_under_flow() {
        assert_eq!(checked_add(1, 2).unwrap(), 3);
        assert_eq!(checked_add(u128::MAX, 1).unwrap_err().code, AmmErrorCode::OverflowNumeric);
        assert_eq!(checked_sub(5, 3).unwrap(), 2);
        assert_eq!(checked_sub(0, 1).unwrap_err().code, AmmErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_ceil_div_and_downcasts() {
        assert_eq!(ceil_div_u256(U256::from(7u8), U256::from(2u8)), U256::from(4u8));
        assert_eq!(ceil_div_u256(U256::from(8u8), U256::from(2u8)), U256::from(4u8));
        assert_eq!(mul_div_floor(u128::MAX, 2, 4), U256::from(u128::MAX / 2));
        assert!(u256_to_u128_checked(U256::from(u128::MAX) + U256::from(1u8)).is_err());
        assert_eq!(u256_to_u64_saturating(U256::from(u128::MAX)), u64::MAX);
    }
}
