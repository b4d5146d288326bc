//! Catálogo imutável de erros do core de cotação.
use core::fmt;

/// Código de erro do core.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AmmErrorCode {
    /// Montante ausente, malformado ou zero onde não é aceito.
    InvalidAmount,
    /// Pool sem liquidez em pelo menos um dos lados.
    ZeroReserves,
    /// Pedido maior do que o pool consegue entregar.
    ExceedsReserves,
    /// Troca esvaziaria o pool além do piso de reserva.
    PoolDrainRejected,
    /// Proporção do depósito inicial fora do limite.
    RatioOutOfBounds,
    /// Saída abaixo do mínimo protegido por slippage.
    BelowMinimumOutput,
    /// Overflow ou underflow em cálculos numéricos.
    OverflowNumeric,
    /// Parâmetro de fronteira inválido (decimais, taxas, tokens).
    InvalidParameter,
}

impl AmmErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "AMM-0001",
            Self::ZeroReserves => "AMM-0002",
            Self::ExceedsReserves => "AMM-0003",
            Self::PoolDrainRejected => "AMM-0004",
            Self::RatioOutOfBounds => "AMM-0005",
            Self::BelowMinimumOutput => "AMM-0006",
            Self::OverflowNumeric => "AMM-0007",
            Self::InvalidParameter => "AMM-0008",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "Quantidade inválida",
            Self::ZeroReserves => "Reserva zerada",
            Self::ExceedsReserves => "Reservas insuficientes",
            Self::PoolDrainRejected => "Drenagem do pool recusada",
            Self::RatioOutOfBounds => "Proporção fora do limite",
            Self::BelowMinimumOutput => "Saída abaixo do mínimo",
            Self::OverflowNumeric => "Overflow numérico",
            Self::InvalidParameter => "Parâmetro inválido",
        }
    }

    /// Mensagem base em português (aceita placeholders `{chave}`).
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "amount inválido: {amount}",
            Self::ZeroReserves => "pool sem liquidez",
            Self::ExceedsReserves => "pedido excede as reservas disponíveis",
            Self::PoolDrainRejected => "troca esvaziaria o pool",
            Self::RatioOutOfBounds => "proporção do depósito excede {max_ratio}:1",
            Self::BelowMinimumOutput => "saída {amount_out} abaixo do mínimo {min_out}",
            Self::OverflowNumeric => "overflow/underflow numérico",
            Self::InvalidParameter => "parâmetro inválido: {param}",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [AmmErrorCode] {
        const ALL: &[AmmErrorCode] = &[
            AmmErrorCode::InvalidAmount,
            AmmErrorCode::ZeroReserves,
            AmmErrorCode::ExceedsReserves,
            AmmErrorCode::PoolDrainRejected,
            AmmErrorCode::RatioOutOfBounds,
            AmmErrorCode::BelowMinimumOutput,
            AmmErrorCode::OverflowNumeric,
            AmmErrorCode::InvalidParameter,
        ];
        ALL
    }
}

impl fmt::Display for AmmErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: AmmErrorCode) -> &'static str {
    code.message_pt()
}
