//! Cotação completa de swap sobre um [`PoolSnapshot`].
//!
//! Fluxo: sentido do par → classificação dos inputs → guard de liquidez →
//! `get_amount_out` → impacto de preço.

use num_rational::BigRational;

use super::error_map::from_quote_inputs;
use super::errors::{AmmError, AmmErrorCode};
use super::liquidity_guard::{check_reserves, GuardConfig};
use super::pool::{PoolSnapshot, SwapDirection, TokenId, TokenMeta};
use super::pricing::{min_out_with_slippage, price_impact_pct};
use super::swap::{get_amount_out, net_input};
use super::types::{Atomic, Bps, Reserves, BPS_SCALE, U256};
use crate::{amm_bail, amm_err};

/// Resultado efêmero de uma cotação; nunca persistido.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub amount_in: Atomic,
    pub amount_out: Atomic,
    /// Impacto no spot (%), racional exato.
    pub price_impact_pct: BigRational,
    /// Parte do input retida como taxa: `amount_in - net_in`.
    pub fee_atomic: Atomic,
    /// Fração da taxa devida ao protocolo: `floor(amount_in * protocol_bps / 10000)`.
    pub protocol_fee_atomic: Atomic,
    pub route: Vec<TokenId>,
    pub direction: SwapDirection,
    /// Reservas (in, out) usadas no cálculo.
    pub reserves: Reserves,
}

impl Quote {
    /// Saída mínima aceitável com a tolerância informada.
    pub fn min_out(&self, slippage_bps: Bps) -> Atomic {
        min_out_with_slippage(self.amount_out, slippage_bps)
    }
}

/// Cotação tipada: erros do catálogo em vez de `None`.
pub fn try_swap_quote(
    pool: &PoolSnapshot,
    token_in: &TokenMeta,
    token_out: &TokenMeta,
    amount_in: Atomic,
) -> Result<Quote, AmmError> {
    try_swap_quote_with(&GuardConfig::default(), pool, token_in, token_out, amount_in)
}

pub fn try_swap_quote_with(
    config: &GuardConfig,
    pool: &PoolSnapshot,
    token_in: &TokenMeta,
    token_out: &TokenMeta,
    amount_in: Atomic,
) -> Result<Quote, AmmError> {
    let direction = pool.direction(token_in.id(), token_out.id())?;
    let reserves = pool.oriented(direction);
    let fee_bps = pool.swap_fee_bps();

    if let Some(code) = from_quote_inputs(amount_in, (reserves.reserve_in, reserves.reserve_out), fee_bps) {
        amm_bail!(
            code,
            amount => amount_in,
            reserve_in => reserves.reserve_in,
            reserve_out => reserves.reserve_out
        );
    }
    check_reserves(config, amount_in, reserves, fee_bps)
        .into_result()
        .map_err(|err| err.with_context("amount", amount_in))?;

    let amount_out = get_amount_out(amount_in, reserves.reserve_in, reserves.reserve_out, fee_bps);
    let price_impact_pct = price_impact_pct(amount_in, reserves.reserve_in, reserves.reserve_out)?;
    let fee_atomic = amount_in - net_input(amount_in, fee_bps);
    // protocol_bps <= swap_fee_bps ⇒ protocol_fee <= amount_in
    let protocol_fee_atomic =
        (U256::from(amount_in) * U256::from(pool.protocol_fee_bps()) / U256::from(BPS_SCALE)).as_u128();

    Ok(Quote {
        amount_in,
        amount_out,
        price_impact_pct,
        fee_atomic,
        protocol_fee_atomic,
        route: vec![token_in.id().clone(), token_out.id().clone()],
        direction,
        reserves,
    })
}

/// Cotação para a UI: `None` em pool vazio, input zero ou rejeição do guard.
/// Input que a taxa zera ainda cota, com `amount_out = 0`.
pub fn get_swap_quote(
    pool: &PoolSnapshot,
    token_in: &TokenMeta,
    token_out: &TokenMeta,
    amount_in: Atomic,
) -> Option<Quote> {
    match try_swap_quote(pool, token_in, token_out, amount_in) {
        Ok(quote) => Some(quote),
        Err(err) => {
            tracing::debug!(
                code = err.code().code(),
                token_in = %token_in.id(),
                token_out = %token_out.id(),
                amount_in = %amount_in,
                "quote unavailable"
            );
            None
        }
    }
}

/// Checa a saída de uma cotação contra a tolerância do usuário.
pub fn ensure_within_slippage(quote: &Quote, executed_out: Atomic, slippage_bps: Bps) -> Result<(), AmmError> {
    let min_out = quote.min_out(slippage_bps);
    if executed_out < min_out {
        return Err(amm_err!(
            AmmErrorCode::BelowMinimumOutput,
            amount_out => executed_out,
            min_out => min_out
        ));
    }
    Ok(())
}
