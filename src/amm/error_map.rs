//! Mapeamento entre condições de domínio e códigos de erro do core.
use crate::amm::error_catalog::AmmErrorCode;
use crate::amm::types::{Bps, BPS_SCALE};

/// Determina o código de erro de uma cotação a partir dos inputs brutos,
/// sem calcular a cotação. `reserves` já orientadas (in, out).
///
/// Limites de reserva (input vs reserva, dreno) ficam com o `liquidity_guard`.
/// Input que vira 0 após a taxa não é erro: a cotação sai com `amount_out = 0`.
pub fn from_quote_inputs(amount_in: u128, reserves: (u128, u128), fee_bps: Bps) -> Option<AmmErrorCode> {
    if fee_bps > BPS_SCALE {
        return Some(AmmErrorCode::InvalidParameter);
    }
    if amount_in == 0 {
        return Some(AmmErrorCode::InvalidAmount);
    }
    if reserves.0 == 0 || reserves.1 == 0 {
        return Some(AmmErrorCode::ZeroReserves);
    }
    None
}
