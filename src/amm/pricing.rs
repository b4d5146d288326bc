//! Utilitários para roteadores/UI: spot price, impacto de preço e saída mínima.
//! Preços e impacto são **racionais exatos** (`BigRational`); nada de float.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::{ensure_nonzero, ensure_reserves};
use super::swap::get_amount_out;
use super::types::{Atomic, Bps, U256, BPS_SCALE};
use crate::amm_bail;

#[inline]
fn q(n: Atomic, d: Atomic) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

// --------- Spot price ---------
/// Preço à vista do input em unidades do output: **p = reserve_out / reserve_in**.
pub fn spot_price(reserve_in: Atomic, reserve_out: Atomic) -> Result<BigRational, AmmError> {
    ensure_reserves(reserve_in, reserve_out)?;
    Ok(q(reserve_out, reserve_in))
}

/// Preço efetivo da troca (com taxa): **p_exec = out / amount_in**.
pub fn execution_price(amount_in: Atomic, reserve_in: Atomic, reserve_out: Atomic, fee_bps: Bps) -> Result<BigRational, AmmError> {
    ensure_reserves(reserve_in, reserve_out)?;
    ensure_nonzero(amount_in)?;
    let out = get_amount_out(amount_in, reserve_in, reserve_out, fee_bps);
    Ok(q(out, amount_in))
}

// --------- Impacto de preço ---------
/// Impacto percentual no spot: `|(p1 - p0) / p0| * 100`, onde `p1` vem do
/// output **sem taxa** aplicado às reservas.
pub fn price_impact_pct(amount_in: Atomic, reserve_in: Atomic, reserve_out: Atomic) -> Result<BigRational, AmmError> {
    let price = spot_price(reserve_in, reserve_out)?;
    if amount_in == 0 {
        return Ok(BigRational::zero());
    }
    let out = get_amount_out(amount_in, reserve_in, reserve_out, 0);
    let new_in = BigInt::from(reserve_in) + BigInt::from(amount_in);
    let new_out = BigInt::from(reserve_out - out);
    let new_price = BigRational::new(new_out, new_in);

    let rel = (new_price - &price) / price;
    Ok(rel.abs() * BigRational::from_integer(BigInt::from(100u8)))
}

// --------- Proteção de saída mínima ---------
/// `min_out = floor(amount_out * (10000 - tol) / 10000)`; `tol` acima de 100% satura.
pub fn min_out_with_slippage(amount_out: Atomic, slippage_bps: Bps) -> Atomic {
    let keep = BPS_SCALE - slippage_bps.min(BPS_SCALE);
    (U256::from(amount_out) * U256::from(keep) / U256::from(BPS_SCALE)).as_u128()
}

/// Falha com `BelowMinimumOutput` quando `amount_out < min_out`.
pub fn ensure_min_output(amount_out: Atomic, min_out: Atomic) -> Result<(), AmmError> {
    if amount_out < min_out {
        amm_bail!(AmmErrorCode::BelowMinimumOutput, amount_out => amount_out, min_out => min_out);
    }
    Ok(())
}
