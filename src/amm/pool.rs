//! Registros de fronteira: metadados de token e snapshot de reservas.
//!
//! Validados uma única vez na construção; as funções matemáticas confiam
//! neles sem revalidar.

use core::fmt;

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::{ensure_decimals, ensure_fee_bps};
use super::types::{Atomic, Bps, Reserves};
use crate::amm_err;

/// Identificador on-chain de um token.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadados fornecidos pelo catálogo de tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenMeta {
    id: TokenId,
    decimals: u8,
    symbol: String,
}

impl TokenMeta {
    /// Falha com `InvalidParameter` se `decimals > 18`.
    pub fn new(id: impl Into<String>, decimals: u8, symbol: impl Into<String>) -> Result<Self, AmmError> {
        ensure_decimals(decimals)?;
        Ok(Self { id: TokenId::new(id), decimals, symbol: symbol.into() })
    }

    pub fn id(&self) -> &TokenId { &self.id }
    pub fn decimals(&self) -> u8 { self.decimals }
    pub fn symbol(&self) -> &str { &self.symbol }
}

/// Sentido da troca relativo à ordem canônica (token1, token2) do pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    Token1ToToken2,
    Token2ToToken1,
}

impl SwapDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Token1ToToken2 => Self::Token2ToToken1,
            Self::Token2ToToken1 => Self::Token1ToToken2,
        }
    }
}

/// Snapshot de reservas lido pelo colaborador on-chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    token1: TokenId,
    token2: TokenId,
    reserve1: Atomic,
    reserve2: Atomic,
    swap_fee_bps: Bps,
    protocol_fee_bps: Bps,
}

impl PoolSnapshot {
    /// Valida taxas (`protocol <= swap <= 10000`) e tokens distintos.
    pub fn new(
        token1: TokenId,
        token2: TokenId,
        reserve1: Atomic,
        reserve2: Atomic,
        swap_fee_bps: Bps,
        protocol_fee_bps: Bps,
    ) -> Result<Self, AmmError> {
        if token1 == token2 {
            return Err(amm_err!(AmmErrorCode::InvalidParameter, param => format!("token1 == token2 ({token1})")));
        }
        ensure_fee_bps(swap_fee_bps)?;
        if protocol_fee_bps > swap_fee_bps {
            return Err(amm_err!(
                AmmErrorCode::InvalidParameter,
                param => format!("protocol_fee_bps={protocol_fee_bps} > swap_fee_bps={swap_fee_bps}")
            ));
        }
        Ok(Self { token1, token2, reserve1, reserve2, swap_fee_bps, protocol_fee_bps })
    }

    pub fn token1(&self) -> &TokenId { &self.token1 }
    pub fn token2(&self) -> &TokenId { &self.token2 }
    pub fn reserve1(&self) -> Atomic { self.reserve1 }
    pub fn reserve2(&self) -> Atomic { self.reserve2 }
    pub fn swap_fee_bps(&self) -> Bps { self.swap_fee_bps }
    pub fn protocol_fee_bps(&self) -> Bps { self.protocol_fee_bps }

    /// Resolve o sentido da troca; `InvalidParameter` se o par não é deste pool.
    pub fn direction(&self, token_in: &TokenId, token_out: &TokenId) -> Result<SwapDirection, AmmError> {
        if *token_in == self.token1 && *token_out == self.token2 {
            Ok(SwapDirection::Token1ToToken2)
        } else if *token_in == self.token2 && *token_out == self.token1 {
            Ok(SwapDirection::Token2ToToken1)
        } else {
            Err(amm_err!(AmmErrorCode::InvalidParameter, param => format!("par {token_in}/{token_out} fora do pool")))
        }
    }

    /// Reservas orientadas (in, out) para o sentido informado.
    pub fn oriented(&self, direction: SwapDirection) -> Reserves {
        match direction {
            SwapDirection::Token1ToToken2 => Reserves::new(self.reserve1, self.reserve2),
            SwapDirection::Token2ToToken1 => Reserves::new(self.reserve2, self.reserve1),
        }
    }

    /// Token recebido pelo pool no sentido informado.
    pub fn token_in(&self, direction: SwapDirection) -> &TokenId {
        match direction {
            SwapDirection::Token1ToToken2 => &self.token1,
            SwapDirection::Token2ToToken1 => &self.token2,
        }
    }

    pub fn token_out(&self, direction: SwapDirection) -> &TokenId {
        self.token_in(direction.reversed())
    }
}
