//! Referência de alta precisão ("goldens") em **BigUint/BigRational** para o
//! CPMM (x·y=k) com taxa sobre o **input**.
//!
//! 1. Valores **contínuos** (sem quantização) de swap e de input necessário.
//! 2. Réplica da **política de arredondamento** do core (net floor, out floor,
//!    inversa ceil sem taxa) em BigUint, como oráculo independente do `U256`.
//! 3. Desvio do invariante `Δk/k` do core discreto.
//!
//! Não entra no caminho de produção; usado por testes e benches.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::{ensure_fee_bps, ensure_nonzero, ensure_reserves};
use super::swap;
use super::types::{Atomic, Bps, BPS_SCALE};
use crate::amm_err;

#[inline]
fn bu(v: Atomic) -> BigUint { BigUint::from(v) }

#[inline]
fn q(n: Atomic, d: Atomic) -> BigRational { BigRational::new(BigInt::from(n), BigInt::from(d)) }

fn to_atomic(v: &BigUint) -> Result<Atomic, AmmError> {
    v.to_u128().ok_or_else(|| amm_err!(AmmErrorCode::OverflowNumeric, value => v))
}

fn rat_floor(r: &BigRational) -> Result<Atomic, AmmError> {
    let f = r.floor().to_integer();
    f.to_u128().ok_or_else(|| amm_err!(AmmErrorCode::OverflowNumeric, value => f))
}

fn rat_ceil(r: &BigRational) -> Result<Atomic, AmmError> {
    let c = r.ceil().to_integer();
    c.to_u128().ok_or_else(|| amm_err!(AmmErrorCode::OverflowNumeric, value => c))
}

fn k_big(x: Atomic, y: Atomic) -> BigUint { bu(x) * bu(y) }

fn check_pool(x: Atomic, y: Atomic, fee_bps: Bps) -> Result<(), AmmError> {
    ensure_reserves(x, y)?;
    ensure_fee_bps(fee_bps)
}

// -------------------------
// Contínuo (sem quantização)
// -------------------------
/// `out = y - x*y / (x + dx*(1 - fee))`, racional exato.
pub fn continuous_amount_out(x: Atomic, y: Atomic, dx: Atomic, fee_bps: Bps) -> Result<BigRational, AmmError> {
    check_pool(x, y, fee_bps)?;
    ensure_nonzero(dx)?;
    let keep = q(Atomic::from(BPS_SCALE - fee_bps), Atomic::from(BPS_SCALE));
    let dx_net = q(dx, 1) * keep;
    let x1 = q(x, 1) + dx_net;
    let y_star = q(x, 1) * q(y, 1) / x1;
    Ok(q(y, 1) - y_star)
}

/// Input contínuo para receber `dy`, **sem taxa**: `x*dy / (y - dy)`.
pub fn continuous_amount_in(x: Atomic, y: Atomic, dy: Atomic) -> Result<BigRational, AmmError> {
    ensure_reserves(x, y)?;
    if dy >= y {
        return Err(amm_err!(AmmErrorCode::ExceedsReserves, desired_out => dy, reserve_out => y));
    }
    Ok(q(x, 1) * q(dy, 1) / q(y - dy, 1))
}

// -------------------------
// Política (réplica do core em BigUint)
// -------------------------
/// `net = floor(dx*(10000-fee)/10000)`; `out = floor(net*y/(x+net))`.
pub fn policy_amount_out(x: Atomic, y: Atomic, dx: Atomic, fee_bps: Bps) -> Result<Atomic, AmmError> {
    check_pool(x, y, fee_bps)?;
    ensure_nonzero(dx)?;
    let scale = BigUint::from(BPS_SCALE);
    let net = bu(dx) * BigUint::from(BPS_SCALE - fee_bps) / &scale;
    if net.is_zero() {
        return Ok(0);
    }
    let (out, _) = (&net * bu(y)).div_rem(&(bu(x) + &net));
    to_atomic(&out)
}

/// `ceil(x*dy/(y-dy))`, menor input que atinge `dy` na fórmula sem taxa.
pub fn policy_amount_in(x: Atomic, y: Atomic, dy: Atomic) -> Result<Atomic, AmmError> {
    ensure_reserves(x, y)?;
    if dy >= y {
        return Err(amm_err!(AmmErrorCode::ExceedsReserves, desired_out => dy, reserve_out => y));
    }
    let num = bu(x) * bu(dy);
    let den = bu(y - dy);
    let (quot, rem) = num.div_rem(&den);
    let dx = if rem.is_zero() { quot } else { quot + BigUint::one() };
    to_atomic(&dx)
}

// -------------------------
// Goldens
// -------------------------
#[derive(Debug, Clone)]
pub struct RefOut {
    pub out_core: Atomic,
    pub out_policy: Atomic,
    pub out_cont_floor: Atomic,
    pub out_cont: BigRational,
    /// `(k1 - k0) / k0` do core; negativo indica quebra do invariante.
    pub dk_over_k_core: BigRational,
}

#[derive(Debug, Clone)]
pub struct RefIn {
    pub in_core: Atomic,
    pub in_policy: Atomic,
    pub in_cont_ceil: Atomic,
    pub in_cont: BigRational,
}

/// `Δk/k` assinado após o swap do core: `x1 = x + dx` (taxa fica no pool), `y1 = y - out`.
pub fn dk_over_k(x: Atomic, y: Atomic, dx: Atomic, out: Atomic) -> BigRational {
    let k0 = k_big(x, y);
    let k1 = (bu(x) + bu(dx)) * (bu(y) - bu(out.min(y)));
    let k0_i = BigInt::from(k0.clone());
    BigRational::new(BigInt::from(k1) - &k0_i, k0_i)
}

/// Compara o core com a referência (swap X→Y).
pub fn golden_amount_out(x: Atomic, y: Atomic, dx: Atomic, fee_bps: Bps) -> Result<RefOut, AmmError> {
    let out_policy = policy_amount_out(x, y, dx, fee_bps)?;
    let out_core = swap::get_amount_out(dx, x, y, fee_bps);
    let out_cont = continuous_amount_out(x, y, dx, fee_bps)?;
    let out_cont_floor = rat_floor(&out_cont)?;
    let dk_over_k_core = dk_over_k(x, y, dx, out_core);
    Ok(RefOut { out_core, out_policy, out_cont_floor, out_cont, dk_over_k_core })
}

/// Compara o core com a referência (input para alvo `dy`, sem taxa).
pub fn golden_amount_in(x: Atomic, y: Atomic, dy: Atomic) -> Result<RefIn, AmmError> {
    let in_core = swap::get_required_input(dy, x, y)?;
    let in_policy = policy_amount_in(x, y, dy)?;
    let in_cont = continuous_amount_in(x, y, dy)?;
    let in_cont_ceil = rat_ceil(&in_cont)?;
    Ok(RefIn { in_core, in_policy, in_cont_ceil, in_cont })
}
