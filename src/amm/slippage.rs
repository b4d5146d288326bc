//! Tolerância de slippage adaptativa (heurística) a partir dos dados da cotação.
//!
//! [`recommend`] é puro: mesmos inputs, mesma saída. Aplicar a recomendação à
//! operação ativa é decisão do chamador, via [`SlippageSetting::apply`].
//!
//! Passos (todos inteiros/racionais):
//! 1. `dynamic = max(floor, ceil(impacto% * 100) + buffer)`
//! 2. `severity = max(share_in, share_out)` em bps; `dynamic *= 1 + min(3, severity/400)` (ceil)
//! 3. sobretaxa por faixa de severidade
//! 4. sobretaxa por tamanho absoluto do input (unidades inteiras)
//! 5. sobretaxa por profundidade da reserva de saída (unidades inteiras)
//! 6. sobretaxa por impacto grande
//! 7. clamp em `[global_min, global_max]` respeitando o piso do par

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};

use super::errors::AmmError;
use super::guardrails::{ensure_decimals, mul_div_floor, u256_to_u64_saturating};
use super::pool::TokenId;
use super::quote::Quote;
use super::types::{pow10, Atomic, Bps, BPS_SCALE, MAX_DECIMALS, U256};

pub const DEFAULT_SLIPPAGE_BPS: Bps = 50;
pub const GLOBAL_MIN_SLIPPAGE_BPS: Bps = 10;
pub const GLOBAL_MAX_SLIPPAGE_BPS: Bps = 3_000;

pub const IMPACT_BUFFER_BPS: u64 = 50;
/// Severidade (bps) que soma +1 ao multiplicador.
pub const SEVERITY_STEP_BPS: u64 = 400;
/// Multiplicador extra máximo (1 + 3 = 4×).
pub const MAX_SEVERITY_MULTIPLIER: u64 = 3;
pub const SEVERITY_HIGH_BPS: u64 = 800;
pub const SEVERITY_HIGH_SURCHARGE_BPS: u64 = 400;
pub const SEVERITY_MID_BPS: u64 = 400;
pub const SEVERITY_MID_SURCHARGE_BPS: u64 = 200;
pub const PER_WHOLE_UNIT_SURCHARGE_BPS: u64 = 40;
pub const LARGE_TRADE_UNITS: u128 = 5;
pub const LARGE_TRADE_SURCHARGE_BPS: u64 = 250;
/// Faixas de profundidade `(reserva_out < unidades, sobretaxa)`, da mais rasa à mais funda.
pub const DEPTH_TIERS: [(u128, u64); 3] = [(250, 350), (500, 250), (1_000, 150)];
/// Faixas de impacto `(impacto% > limite, sobretaxa)`, do maior limite ao menor.
pub const IMPACT_TIERS: [(u32, u64); 2] = [(10, 400), (5, 250)];

/// Constantes ajustáveis do advisor; `Default` usa as constantes do módulo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlippagePolicy {
    pub buffer_bps: u64,
    pub severity_step_bps: u64,
    pub max_severity_multiplier: u64,
    pub severity_high_bps: u64,
    pub severity_high_surcharge_bps: u64,
    pub severity_mid_bps: u64,
    pub severity_mid_surcharge_bps: u64,
    pub per_whole_unit_surcharge_bps: u64,
    pub large_trade_units: u128,
    pub large_trade_surcharge_bps: u64,
    pub depth_tiers: Vec<(u128, u64)>,
    pub impact_tiers: Vec<(u32, u64)>,
    pub global_min_bps: Bps,
    pub global_max_bps: Bps,
}

impl Default for SlippagePolicy {
    fn default() -> Self {
        Self {
            buffer_bps: IMPACT_BUFFER_BPS,
            severity_step_bps: SEVERITY_STEP_BPS,
            max_severity_multiplier: MAX_SEVERITY_MULTIPLIER,
            severity_high_bps: SEVERITY_HIGH_BPS,
            severity_high_surcharge_bps: SEVERITY_HIGH_SURCHARGE_BPS,
            severity_mid_bps: SEVERITY_MID_BPS,
            severity_mid_surcharge_bps: SEVERITY_MID_SURCHARGE_BPS,
            per_whole_unit_surcharge_bps: PER_WHOLE_UNIT_SURCHARGE_BPS,
            large_trade_units: LARGE_TRADE_UNITS,
            large_trade_surcharge_bps: LARGE_TRADE_SURCHARGE_BPS,
            depth_tiers: DEPTH_TIERS.to_vec(),
            impact_tiers: IMPACT_TIERS.to_vec(),
            global_min_bps: GLOBAL_MIN_SLIPPAGE_BPS,
            global_max_bps: GLOBAL_MAX_SLIPPAGE_BPS,
        }
    }
}

impl SlippagePolicy {
    /// Clamp de um valor em bps para `[global_min, global_max]`.
    pub fn clamp(&self, bps: u64) -> Bps {
        let lo = u64::from(self.global_min_bps);
        let hi = u64::from(self.global_max_bps).max(lo);
        bps.clamp(lo, hi) as Bps
    }
}

/// Dados da cotação consumidos pelo advisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlippageInputs {
    pub price_impact_pct: BigRational,
    pub amount_in: Atomic,
    pub amount_out: Atomic,
    pub reserve_in: Atomic,
    pub reserve_out: Atomic,
    pub input_decimals: u8,
    pub output_decimals: u8,
    pub pair_floor_bps: Option<Bps>,
}

impl SlippageInputs {
    /// Monta os inputs a partir de uma [`Quote`] e dos decimais dos tokens.
    pub fn from_quote(quote: &Quote, input_decimals: u8, output_decimals: u8, pair_floor_bps: Option<Bps>) -> Result<Self, AmmError> {
        ensure_decimals(input_decimals)?;
        ensure_decimals(output_decimals)?;
        Ok(Self {
            price_impact_pct: quote.price_impact_pct.clone(),
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            reserve_in: quote.reserves.reserve_in,
            reserve_out: quote.reserves.reserve_out,
            input_decimals,
            output_decimals,
            pair_floor_bps,
        })
    }
}

/// Recomendação com o detalhamento usado para chegar nela.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recommendation {
    pub tolerance_bps: Bps,
    pub impact_bps: u64,
    pub severity_bps: u64,
    /// Valor antes do clamp final.
    pub raw_bps: u64,
}

#[inline]
fn share_bps(amount: Atomic, reserve: Atomic) -> u64 {
    if reserve == 0 {
        return u64::MAX;
    }
    u256_to_u64_saturating(mul_div_floor(amount, u128::from(BPS_SCALE), reserve))
}

/// Unidades inteiras de `amount`. `decimals <= MAX_DECIMALS` é pré-condição
/// ([`SlippageInputs::from_quote`] valida); em release o excesso é limitado a 18.
#[inline]
fn whole_units(amount: Atomic, decimals: u8) -> u128 {
    debug_assert!(decimals <= MAX_DECIMALS, "decimals {decimals} > {MAX_DECIMALS}");
    amount / pow10(decimals.min(MAX_DECIMALS))
}

fn pct_gt(pct: &BigRational, limit: u32) -> bool {
    *pct > BigRational::from_integer(BigInt::from(limit))
}

/// Recomenda a tolerância (bps) com a política padrão.
pub fn recommend(inputs: &SlippageInputs) -> Recommendation {
    recommend_with(&SlippagePolicy::default(), inputs)
}

pub fn recommend_with(policy: &SlippagePolicy, inputs: &SlippageInputs) -> Recommendation {
    let floor = u64::from(inputs.pair_floor_bps.unwrap_or(0));
    let pct = inputs.price_impact_pct.abs();

    // 1) impacto + buffer
    let impact_bps = (&pct * BigRational::from_integer(BigInt::from(100u8)))
        .ceil()
        .to_integer()
        .to_u64()
        .unwrap_or(u64::MAX);
    let mut dynamic = floor.max(impact_bps.saturating_add(policy.buffer_bps));

    // 2) multiplicador de severidade: ceil(dynamic * (step + min(sev, cap*step)) / step)
    let severity = share_bps(inputs.amount_in, inputs.reserve_in).max(share_bps(inputs.amount_out, inputs.reserve_out));
    let step = policy.severity_step_bps.max(1);
    let extra = severity.min(policy.max_severity_multiplier.saturating_mul(step));
    let scaled = U256::from(dynamic) * U256::from(step.saturating_add(extra));
    dynamic = u256_to_u64_saturating((scaled + U256::from(step - 1)) / U256::from(step));

    // 3) faixas de severidade
    if severity > policy.severity_high_bps {
        dynamic = dynamic.saturating_add(policy.severity_high_surcharge_bps);
    } else if severity > policy.severity_mid_bps {
        dynamic = dynamic.saturating_add(policy.severity_mid_surcharge_bps);
    }

    // 4) tamanho absoluto do input
    let units_in = whole_units(inputs.amount_in, inputs.input_decimals);
    if units_in >= 1 {
        let per_unit = u64::try_from(units_in).unwrap_or(u64::MAX);
        dynamic = dynamic.saturating_add(per_unit.saturating_mul(policy.per_whole_unit_surcharge_bps));
    }
    if units_in >= policy.large_trade_units {
        dynamic = dynamic.saturating_add(policy.large_trade_surcharge_bps);
    }

    // 5) profundidade da reserva de saída
    let depth_units = whole_units(inputs.reserve_out, inputs.output_decimals);
    if let Some((_, surcharge)) = policy.depth_tiers.iter().find(|(limit, _)| depth_units < *limit) {
        dynamic = dynamic.saturating_add(*surcharge);
    }

    // 6) impacto grande
    if let Some((_, surcharge)) = policy.impact_tiers.iter().find(|(limit, _)| pct_gt(&pct, *limit)) {
        dynamic = dynamic.saturating_add(*surcharge);
    }

    // 7) piso do par + clamp global
    let raw = dynamic.max(floor);
    let tolerance_bps = policy.clamp(raw);
    tracing::trace!(impact_bps, severity, units_in, depth_units, raw, tolerance_bps, "slippage recommendation");

    Recommendation { tolerance_bps, impact_bps, severity_bps: severity, raw_bps: raw }
}

/// Origem da tolerância ativa.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlippageSource {
    Default,
    Manual,
    Adaptive,
}

/// Tolerância ativa do chamador. Só muda por chamada explícita.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlippageSetting {
    tolerance_bps: Bps,
    source: SlippageSource,
}

impl Default for SlippageSetting {
    fn default() -> Self {
        Self { tolerance_bps: DEFAULT_SLIPPAGE_BPS, source: SlippageSource::Default }
    }
}

impl SlippageSetting {
    pub fn tolerance_bps(&self) -> Bps { self.tolerance_bps }
    pub fn source(&self) -> SlippageSource { self.source }

    /// Aplica uma recomendação. Retorna a tolerância anterior.
    pub fn apply(&mut self, recommendation: &Recommendation) -> Bps {
        let previous = self.tolerance_bps;
        self.tolerance_bps = recommendation.tolerance_bps;
        self.source = SlippageSource::Adaptive;
        previous
    }

    /// Valor digitado pelo usuário, com clamp da política.
    pub fn set_manual(&mut self, bps: Bps, policy: &SlippagePolicy) -> Bps {
        let previous = self.tolerance_bps;
        self.tolerance_bps = policy.clamp(u64::from(bps));
        self.source = SlippageSource::Manual;
        previous
    }
}

/// Pisos de slippage por par (ordem dos tokens irrelevante).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairFloorTable {
    floors: BTreeMap<(TokenId, TokenId), Bps>,
}

impl PairFloorTable {
    pub fn new() -> Self { Self::default() }

    fn key(a: &TokenId, b: &TokenId) -> (TokenId, TokenId) {
        if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) }
    }

    pub fn set(&mut self, a: &TokenId, b: &TokenId, floor_bps: Bps) -> Option<Bps> {
        self.floors.insert(Self::key(a, b), floor_bps)
    }

    pub fn get(&self, a: &TokenId, b: &TokenId) -> Option<Bps> {
        self.floors.get(&Self::key(a, b)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    /// Trade pequeno num pool fundo: nenhuma sobretaxa dispara.
    fn calm() -> SlippageInputs {
        SlippageInputs {
            price_impact_pct: rat(1, 10), // 0,1%
            amount_in: 500_000,           // 0.5 unidade (6 casas)
            amount_out: 490_000,
            reserve_in: 1_000_000_000_000,   // 1e6 unidades
            reserve_out: 1_000_000_000_000,
            input_decimals: 6,
            output_decimals: 6,
            pair_floor_bps: None,
        }
    }

    #[test]
    fn t_calm_trade_is_impact_plus_buffer() {
        let rec = recommend(&calm());
        assert_eq!(rec.impact_bps, 10);
        assert_eq!(rec.severity_bps, 0);
        assert_eq!(rec.tolerance_bps, 60);
    }

    #[test]
    fn t_deterministic() {
        let a = recommend(&calm());
        let b = recommend(&calm());
        assert_eq!(a, b);
    }

    #[test]
    fn t_impact_is_ceiled() {
        let mut i = calm();
        i.price_impact_pct = rat(1, 1_000); // 0,001% ⇒ 0,1 bps ⇒ ceil 1
        assert_eq!(recommend(&i).impact_bps, 1);
        assert_eq!(recommend(&i).tolerance_bps, 51);
    }

    #[test]
    fn t_severity_multiplier_and_tier() {
        let mut i = calm();
        // share_in = 500 bps ⇒ mult = 1 + 500/400 = 2.25; faixa média (+200)
        i.reserve_in = 10_000_000; // 10 unidades
        i.amount_in = 500_000;
        let rec = recommend(&i);
        assert_eq!(rec.severity_bps, 500);
        // ceil(60 * 2.25) = 135; +200 = 335
        assert_eq!(rec.tolerance_bps, 335);
    }

    #[test]
    fn t_severity_multiplier_caps_at_four() {
        let mut i = calm();
        i.reserve_in = 1_000_000; // share_in = 5000 bps
        let rec = recommend(&i);
        assert_eq!(rec.severity_bps, 5_000);
        // ceil(60*4) = 240; +400 (alta)
        assert_eq!(rec.tolerance_bps, 640);
    }

    #[test]
    fn t_absolute_size_surcharges() {
        let mut i = calm();
        i.amount_in = 2_000_000; // 2 unidades, share ainda 0
        assert_eq!(recommend(&i).tolerance_bps, 60 + 80);
        i.amount_in = 5_000_000; // 5 unidades ⇒ 200 + 250
        assert_eq!(recommend(&i).tolerance_bps, 60 + 200 + 250);
    }

    #[test]
    fn t_depth_tiers() {
        let mut i = calm();
        i.amount_out = 10_000; // mantém share_out em 0 bps
        i.reserve_out = 249_000_000; // 249 unidades
        assert_eq!(recommend(&i).tolerance_bps, 60 + 350);
        i.reserve_out = 499_000_000;
        assert_eq!(recommend(&i).tolerance_bps, 60 + 250);
        i.reserve_out = 999_000_000;
        assert_eq!(recommend(&i).tolerance_bps, 60 + 150);
        i.reserve_out = 1_000_000_000;
        assert_eq!(recommend(&i).tolerance_bps, 60);
    }

    #[test]
    fn t_large_impact_tiers() {
        let mut i = calm();
        i.price_impact_pct = rat(6, 1); // 600 + 50 = 650, +250
        assert_eq!(recommend(&i).tolerance_bps, 900);
        i.price_impact_pct = rat(11, 1); // 1100 + 50 = 1150, +400
        assert_eq!(recommend(&i).tolerance_bps, 1_550);
        i.price_impact_pct = rat(5, 1); // exatamente 5% não soma
        assert_eq!(recommend(&i).tolerance_bps, 550);
    }

    #[test]
    fn t_impact_tiers_are_exclusive_at_ten_pct() {
        let mut i = calm();
        i.price_impact_pct = rat(10, 1); // 1000 + 50, ainda na faixa de 5%: +250
        assert_eq!(recommend(&i).tolerance_bps, 1_300);
        i.price_impact_pct = rat(1_001, 100); // 1001 + 50, só +400 (sem os +250)
        assert_eq!(recommend(&i).tolerance_bps, 1_451);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "decimals 19 > 18")]
    fn t_whole_units_rejects_decimals_above_max() {
        let mut i = calm();
        i.input_decimals = 19;
        let _ = recommend(&i);
    }

    #[test]
    fn t_pair_floor_and_global_clamp() {
        let mut i = calm();
        i.pair_floor_bps = Some(300);
        assert_eq!(recommend(&i).tolerance_bps, 300);
        i.pair_floor_bps = None;
        i.price_impact_pct = rat(90, 1);
        let rec = recommend(&i);
        assert!(rec.raw_bps > u64::from(GLOBAL_MAX_SLIPPAGE_BPS));
        assert_eq!(rec.tolerance_bps, GLOBAL_MAX_SLIPPAGE_BPS);

        let mut policy = SlippagePolicy::default();
        policy.buffer_bps = 0;
        i.price_impact_pct = rat(0, 1);
        assert_eq!(recommend_with(&policy, &i).tolerance_bps, GLOBAL_MIN_SLIPPAGE_BPS);
    }

    #[test]
    fn t_recommend_never_mutates_setting() {
        let setting = SlippageSetting::default();
        let _ = recommend(&calm());
        assert_eq!(setting.tolerance_bps(), DEFAULT_SLIPPAGE_BPS);
        assert_eq!(setting.source(), SlippageSource::Default);
    }

    #[test]
    fn t_apply_is_explicit() {
        let mut setting = SlippageSetting::default();
        let rec = recommend(&calm());
        let prev = setting.apply(&rec);
        assert_eq!(prev, DEFAULT_SLIPPAGE_BPS);
        assert_eq!(setting.tolerance_bps(), 60);
        assert_eq!(setting.source(), SlippageSource::Adaptive);

        let policy = SlippagePolicy::default();
        setting.set_manual(1, &policy);
        assert_eq!(setting.tolerance_bps(), GLOBAL_MIN_SLIPPAGE_BPS);
        assert_eq!(setting.source(), SlippageSource::Manual);
    }

    #[test]
    fn t_pair_floor_table_is_symmetric() {
        let (a, b) = (TokenId::new("a"), TokenId::new("b"));
        let mut table = PairFloorTable::new();
        assert_eq!(table.set(&b, &a, 120), None);
        assert_eq!(table.get(&a, &b), Some(120));
        assert_eq!(table.get(&b, &a), Some(120));
        assert_eq!(table.get(&a, &TokenId::new("c")), None);
    }
}
