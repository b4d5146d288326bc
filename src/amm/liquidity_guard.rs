//! Checagens pré-trade contra drenagem do pool e inputs "fat-finger".
//!
//! Ordem das checagens:
//! 1. pool vazio
//! 2. `amount_in > MAX_INPUT_RESERVE_MULTIPLE × reserve_in`
//! 3. `amount_out >= DRAIN_CEILING_BPS/10000 × reserve_out` (com taxa)

use core::fmt;

use super::errors::{AmmError, AmmErrorCode};
use super::pool::{PoolSnapshot, SwapDirection};
use super::swap::get_amount_out;
use super::types::{Atomic, Bps, Reserves, U256, BPS_SCALE};
use crate::amm_err;

/// Input máximo aceito como múltiplo da reserva de entrada (anti fat-finger).
pub const MAX_INPUT_RESERVE_MULTIPLE: u32 = 10;
/// Teto da saída em bps da reserva de saída: preserva piso de 1%.
pub const DRAIN_CEILING_BPS: Bps = 9_900;

/// Limiares ajustáveis do guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardConfig {
    pub max_input_multiple: u32,
    pub drain_ceiling_bps: Bps,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { max_input_multiple: MAX_INPUT_RESERVE_MULTIPLE, drain_ceiling_bps: DRAIN_CEILING_BPS }
    }
}

/// Motivo de rejeição.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiquidityRejection {
    PoolEmpty,
    ExceedsAvailableReserves,
    WouldDrainPool,
}

impl LiquidityRejection {
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::PoolEmpty => "pool empty",
            Self::ExceedsAvailableReserves => "exceeds available reserves",
            Self::WouldDrainPool => "would drain pool",
        }
    }

    pub const fn code(&self) -> AmmErrorCode {
        match self {
            Self::PoolEmpty => AmmErrorCode::ZeroReserves,
            Self::ExceedsAvailableReserves => AmmErrorCode::ExceedsReserves,
            Self::WouldDrainPool => AmmErrorCode::PoolDrainRejected,
        }
    }
}

impl fmt::Display for LiquidityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Resultado da checagem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquidityCheck {
    Valid,
    Invalid(LiquidityRejection),
}

impl LiquidityCheck {
    pub fn is_valid(&self) -> bool { matches!(self, Self::Valid) }

    /// Converte a rejeição no erro tipado do catálogo.
    pub fn into_result(self) -> Result<(), AmmError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(r) => Err(amm_err!(r.code(), reason => r.reason())),
        }
    }
}

/// Checa `amount_in` no sentido `direction` com os limiares padrão.
pub fn check_liquidity(amount_in: Atomic, direction: SwapDirection, pool: &PoolSnapshot) -> LiquidityCheck {
    check_liquidity_with(&GuardConfig::default(), amount_in, direction, pool)
}

pub fn check_liquidity_with(
    config: &GuardConfig,
    amount_in: Atomic,
    direction: SwapDirection,
    pool: &PoolSnapshot,
) -> LiquidityCheck {
    let check = check_reserves(config, amount_in, pool.oriented(direction), pool.swap_fee_bps());
    if let LiquidityCheck::Invalid(rejection) = check {
        tracing::debug!(
            amount_in = %amount_in,
            ?direction,
            reason = rejection.reason(),
            "liquidity check rejected trade"
        );
    }
    check
}

/// Núcleo da checagem sobre reservas já orientadas.
pub fn check_reserves(config: &GuardConfig, amount_in: Atomic, reserves: Reserves, fee_bps: Bps) -> LiquidityCheck {
    if reserves.is_empty() {
        return LiquidityCheck::Invalid(LiquidityRejection::PoolEmpty);
    }

    let cap = U256::from(reserves.reserve_in) * U256::from(config.max_input_multiple);
    if U256::from(amount_in) > cap {
        return LiquidityCheck::Invalid(LiquidityRejection::ExceedsAvailableReserves);
    }

    // out >= ceiling/10000 * reserve_out  <=>  out*10000 >= ceiling*reserve_out
    let amount_out = get_amount_out(amount_in, reserves.reserve_in, reserves.reserve_out, fee_bps);
    let lhs = U256::from(amount_out) * U256::from(BPS_SCALE);
    let rhs = U256::from(reserves.reserve_out) * U256::from(config.drain_ceiling_bps);
    if lhs >= rhs {
        return LiquidityCheck::Invalid(LiquidityRejection::WouldDrainPool);
    }
    LiquidityCheck::Valid
}
