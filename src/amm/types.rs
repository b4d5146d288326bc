//! Tipos básicos do core (unidades atômicas) + U256 para intermediários.
//! Nenhum ponto flutuante entra aqui: montantes são `u128` e todo produto
//! intermediário é feito em 256 bits.

use uint::construct_uint;
construct_uint! {
    /// Inteiro de 256 bits para contas intermediárias seguras.
    pub struct U256(4);
}

pub type Atomic = u128; // menor unidade indivisível do token
pub type Bps = u32;     // 0..=10_000

pub const BPS_SCALE: Bps = 10_000;  // 100%
pub const MAX_DECIMALS: u8 = 18;

/// `10^decimals` como `u128`. Chamador garante `decimals <= MAX_DECIMALS`.
#[inline]
pub const fn pow10(decimals: u8) -> u128 {
    10u128.pow(decimals as u32)
}

/// Reservas orientadas para uma troca: `reserve_in` recebe o input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reserves { pub reserve_in: Atomic, pub reserve_out: Atomic }
impl Reserves {
    pub fn new(reserve_in: Atomic, reserve_out: Atomic) -> Self { Self { reserve_in, reserve_out } }

    pub fn is_empty(&self) -> bool { self.reserve_in == 0 || self.reserve_out == 0 }
}
