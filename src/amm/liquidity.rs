//! Liquidez (CPMM): mint de LP, depósito ótimo, resgate e validação de proporção.
//! Políticas:
//! - mint inicial: **floor(sqrt(a1*a2))** via Newton inteiro
//! - mint proporcional: **min** dos dois floors (não dilui quem já está no pool)
//! - resgate: **floor** por lado, soma nunca excede as reservas

use super::errors::{AmmError, AmmErrorCode};
use super::guardrails::{ensure_nonzero, ensure_reserves, mul_div_floor, mul_u128_to_u256, u256_to_u128_checked};
use super::types::{Atomic, U256, BPS_SCALE};
use crate::amm_err;

/// Proporção máxima maior:menor aceita no depósito inicial.
pub const DEFAULT_MAX_POOL_RATIO: u128 = 100_000;

/// `floor(sqrt(n))` por Newton: chute inicial `>= sqrt(n)`, decresce monotonamente.
pub fn isqrt_u256(n: U256) -> U256 {
    if n.is_zero() { return U256::zero(); }
    // 2^ceil(bits/2) >= sqrt(n)
    let mut x = U256::one() << ((n.bits() + 1) / 2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x { return x; }
        x = y;
    }
}

/// LP a mintar para um depósito `(amount1, amount2)`.
/// `total_supply == 0` ⇒ primeiro depósito: `isqrt(amount1 * amount2)`.
pub fn mint_lp(
    amount1: Atomic,
    amount2: Atomic,
    reserve1: Atomic,
    reserve2: Atomic,
    total_supply: Atomic,
) -> Result<Atomic, AmmError> {
    ensure_nonzero(amount1)?;
    ensure_nonzero(amount2)?;

    if total_supply == 0 {
        let root = isqrt_u256(mul_u128_to_u256(amount1, amount2));
        // sqrt(u128 * u128) < 2^128
        return u256_to_u128_checked(root);
    }

    ensure_reserves(reserve1, reserve2)?;
    let by1 = mul_div_floor(amount1, total_supply, reserve1);
    let by2 = mul_div_floor(amount2, total_supply, reserve2);
    let mint = if by1 < by2 { by1 } else { by2 };
    u256_to_u128_checked(mint)
}

/// Quantidade do lado 2 que preserva a proporção atual: `floor(amount1 * reserve2 / reserve1)`.
pub fn optimal_deposit(amount1: Atomic, reserve1: Atomic, reserve2: Atomic) -> Result<Atomic, AmmError> {
    ensure_reserves(reserve1, reserve2)?;
    u256_to_u128_checked(mul_div_floor(amount1, reserve2, reserve1))
}

/// Resgate proporcional: `(floor(lp * r1 / S), floor(lp * r2 / S))`.
pub fn redeem(
    lp_tokens: Atomic,
    total_supply: Atomic,
    reserve1: Atomic,
    reserve2: Atomic,
) -> Result<(Atomic, Atomic), AmmError> {
    if total_supply == 0 {
        return Err(amm_err!(AmmErrorCode::ZeroReserves, total_supply => 0));
    }
    if lp_tokens > total_supply {
        return Err(amm_err!(
            AmmErrorCode::ExceedsReserves,
            lp_tokens => lp_tokens,
            total_supply => total_supply
        ));
    }
    // lp <= S ⇒ cada lado <= reserva, cabe em u128
    let out1 = mul_div_floor(lp_tokens, reserve1, total_supply).as_u128();
    let out2 = mul_div_floor(lp_tokens, reserve2, total_supply).as_u128();
    Ok((out1, out2))
}

/// `false` se `maior > max_ratio * menor` ou se algum lado é zero.
pub fn validate_pool_ratio(amount1: Atomic, amount2: Atomic, max_ratio: u128) -> bool {
    if amount1 == 0 || amount2 == 0 {
        return false;
    }
    let (larger, smaller) = if amount1 >= amount2 { (amount1, amount2) } else { (amount2, amount1) };
    U256::from(larger) <= mul_u128_to_u256(smaller, max_ratio)
}

/// Igual a [`validate_pool_ratio`], mas com erro tipado.
pub fn ensure_pool_ratio(amount1: Atomic, amount2: Atomic, max_ratio: u128) -> Result<(), AmmError> {
    if validate_pool_ratio(amount1, amount2, max_ratio) {
        Ok(())
    } else {
        Err(amm_err!(
            AmmErrorCode::RatioOutOfBounds,
            amount1 => amount1,
            amount2 => amount2,
            max_ratio => max_ratio
        ))
    }
}

/// Posição de um provedor de liquidez.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LPShare {
    pub lp_tokens: Atomic,
    pub total_supply: Atomic,
}

impl LPShare {
    pub fn new(lp_tokens: Atomic, total_supply: Atomic) -> Self { Self { lp_tokens, total_supply } }

    /// Montantes resgatáveis contra as reservas informadas.
    pub fn redeemable(&self, reserve1: Atomic, reserve2: Atomic) -> Result<(Atomic, Atomic), AmmError> {
        redeem(self.lp_tokens, self.total_supply, reserve1, reserve2)
    }

    /// Participação no pool em bps (floor); 0 para supply vazio.
    pub fn share_bps(&self) -> u32 {
        if self.total_supply == 0 { return 0; }
        let bps = mul_div_floor(self.lp_tokens.min(self.total_supply), u128::from(BPS_SCALE), self.total_supply);
        bps.as_u32()
    }
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_isqrt_exact_and_floor() {
        assert_eq!(isqrt_u256(U256::zero()), U256::zero());
        assert_eq!(isqrt_u256(U256::one()), U256::one());
        assert_eq!(isqrt_u256(U256::from(15u8)), U256::from(3u8));
        assert_eq!(isqrt_u256(U256::from(16u8)), U256::from(4u8));
        let max_sq = mul_u128_to_u256(u128::MAX, u128::MAX);
        assert_eq!(isqrt_u256(max_sq), U256::from(u128::MAX));
        assert_eq!(isqrt_u256(max_sq - U256::one()), U256::from(u128::MAX - 1));
    }

    #[test]
    fn t_first_mint_is_sqrt() {
        assert_eq!(mint_lp(1_000_000, 1_000_000, 0, 0, 0).unwrap(), 1_000_000);
        assert_eq!(mint_lp(2, 8, 0, 0, 0).unwrap(), 4);
        assert_eq!(mint_lp(3, 5, 0, 0, 0).unwrap(), 3); // floor(sqrt(15))
    }

    #[test]
    fn t_mint_zero_amount_rejected() {
        assert_eq!(mint_lp(0, 1, 0, 0, 0).unwrap_err().code, AmmErrorCode::InvalidAmount);
        assert_eq!(mint_lp(1, 0, 10, 10, 10).unwrap_err().code, AmmErrorCode::InvalidAmount);
    }

    #[test]
    fn t_mint_proportional_takes_min() {
        let (r1, r2, s) = (1_000_000u128, 1_000_000u128, 1_000_000u128);
        assert_eq!(mint_lp(100_000, 100_000, r1, r2, s).unwrap(), 100_000);
        // lado 2 limita
        assert_eq!(mint_lp(200_000, 100_000, r1, r2, s).unwrap(), 100_000);
        // lado 1 limita
        assert_eq!(mint_lp(50_000, 100_000, r1, r2, s).unwrap(), 50_000);
    }

    #[test]
    fn t_mint_floor_can_be_zero() {
        assert_eq!(mint_lp(1, 1, 1_000_000, 1_000_000, 100).unwrap(), 0);
        assert_eq!(mint_lp(1, 1, 0, 10, 100).unwrap_err().code, AmmErrorCode::ZeroReserves);
    }

    #[test]
    fn t_optimal_deposit_keeps_ratio() {
        assert_eq!(optimal_deposit(100, 1_000, 3_000).unwrap(), 300);
        assert_eq!(optimal_deposit(1, 3, 1).unwrap(), 0);
        assert_eq!(optimal_deposit(1, 0, 1).unwrap_err().code, AmmErrorCode::ZeroReserves);
    }

    #[test]
    fn t_redeem_floor() {
        let (o1, o2) = redeem(1, 3, 10, 20).unwrap();
        assert_eq!((o1, o2), (3, 6));
        assert_eq!(redeem(3, 3, 10, 20).unwrap(), (10, 20));
        assert_eq!(redeem(4, 3, 10, 20).unwrap_err().code, AmmErrorCode::ExceedsReserves);
        assert_eq!(redeem(1, 0, 10, 20).unwrap_err().code, AmmErrorCode::ZeroReserves);
    }

    #[test]
    fn t_redeem_all_holders_never_exceeds_reserves() {
        let holders = [1u128, 2, 3, 5, 7, 11, 13];
        let supply: u128 = holders.iter().sum();
        let (r1, r2) = (1_000_003u128, 999_999u128);
        let (mut s1, mut s2) = (0u128, 0u128);
        for lp in holders {
            let (a, b) = redeem(lp, supply, r1, r2).unwrap();
            s1 += a;
            s2 += b;
        }
        assert!(s1 <= r1 && s2 <= r2);
    }

    #[test]
    fn t_pool_ratio() {
        assert!(validate_pool_ratio(1_000, 1_000, DEFAULT_MAX_POOL_RATIO));
        assert!(!validate_pool_ratio(1, 1_000_001, DEFAULT_MAX_POOL_RATIO));
        assert!(validate_pool_ratio(1, 100_000, DEFAULT_MAX_POOL_RATIO));
        assert!(!validate_pool_ratio(100_001, 1, DEFAULT_MAX_POOL_RATIO));
        assert!(!validate_pool_ratio(0, 1, DEFAULT_MAX_POOL_RATIO));
        let err = ensure_pool_ratio(1, 1_000_001, DEFAULT_MAX_POOL_RATIO).unwrap_err();
        assert_eq!(err.code, AmmErrorCode::RatioOutOfBounds);
    }

    #[test]
    fn t_lp_share() {
        let share = LPShare::new(250, 1_000);
        assert_eq!(share.share_bps(), 2_500);
        assert_eq!(share.redeemable(4_000, 8_000).unwrap(), (1_000, 2_000));
        assert_eq!(LPShare::new(1, 0).share_bps(), 0);
    }
}
