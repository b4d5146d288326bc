//! Funções puras de swap (CPMM x·y=k) em unidades atômicas.
//! - get_amount_out: taxa sobre o input, duas divisões floor
//! - get_required_input: inversa da fórmula **sem taxa** (aproximação documentada)

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::{ceil_div_u256, ensure_reserves, mul_u128_to_u256, u256_to_u128_checked};
use super::types::{Atomic, Bps, U256, BPS_SCALE};
use crate::amm_err;

/// Input líquido após a taxa: `floor(amount_in * (10000 - fee) / 10000)`.
/// Taxa acima de 10000 é tratada como 10000.
#[inline]
pub fn net_input(amount_in: Atomic, fee_bps: Bps) -> Atomic {
    let keep = BPS_SCALE.saturating_sub(fee_bps);
    // resultado <= amount_in, cabe em u128
    (U256::from(amount_in) * U256::from(keep) / U256::from(BPS_SCALE)).as_u128()
}

/// Calcula o `amount_out` ao enviar `amount_in` contra `(reserve_in, reserve_out)`.
/// Política de arredondamento:
/// - net_in: floor
/// - out = floor(net_in * reserve_out / (reserve_in + net_in))
/// Retorna 0 se qualquer operando for 0.
pub fn get_amount_out(amount_in: Atomic, reserve_in: Atomic, reserve_out: Atomic, fee_bps: Bps) -> Atomic {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return 0;
    }
    let net_in = net_input(amount_in, fee_bps);
    if net_in == 0 {
        return 0;
    }
    let num = mul_u128_to_u256(net_in, reserve_out);
    let den = U256::from(reserve_in) + U256::from(net_in);
    // out < reserve_out sempre, cabe em u128
    (num / den).as_u128()
}

/// Input necessário para receber `desired_out`, invertendo a fórmula **sem taxa**:
/// `ceil(reserve_in * desired_out / (reserve_out - desired_out))`.
///
/// Não inclui a taxa do pool; chamadores que precisam de exatidão com taxa
/// devem conferir com [`get_amount_out`].
pub fn get_required_input(desired_out: Atomic, reserve_in: Atomic, reserve_out: Atomic) -> Result<Atomic, AmmError> {
    ensure_reserves(reserve_in, reserve_out)?;
    if desired_out >= reserve_out {
        return Err(amm_err!(
            AmmErrorCode::ExceedsReserves,
            desired_out => desired_out,
            reserve_out => reserve_out
        ));
    }
    if desired_out == 0 {
        return Ok(0);
    }
    let num = mul_u128_to_u256(reserve_in, desired_out);
    let den = U256::from(reserve_out - desired_out);
    u256_to_u128_checked(ceil_div_u256(num, den))
}
