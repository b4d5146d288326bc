use anyhow::Result;
use std::time::{Duration, Instant};

use quote_engine_core::amm::fixed_point::{from_atomic, to_atomic};
use quote_engine_core::amm::pool::{PoolSnapshot, TokenMeta};
use quote_engine_core::amm::quote::try_swap_quote;
use quote_engine_core::amm::slippage::{recommend, PairFloorTable, SlippageInputs, SlippageSetting};
use quote_engine_core::amm::types::Atomic;
use quote_engine_core::telemetry::{self, QuoteOutcome};

const REFRESHES: u32 = 5;
const REFRESH_EVERY: Duration = Duration::from_millis(200);

/// Snapshot simulado do colaborador on-chain: o pool ganha WETH e perde USDC a cada leitura.
fn read_snapshot(weth: &TokenMeta, usdc: &TokenMeta, tick: u32) -> Result<PoolSnapshot> {
    let drift = Atomic::from(tick) * 2;
    let reserve_weth = to_atomic("1200", weth.decimals())? + to_atomic(&drift.to_string(), weth.decimals())?;
    let reserve_usdc = to_atomic("3000000", usdc.decimals())? - to_atomic(&(drift * 2_500).to_string(), usdc.decimals())?;
    Ok(PoolSnapshot::new(weth.id().clone(), usdc.id().clone(), reserve_weth, reserve_usdc, 30, 5)?)
}

fn main() -> Result<()> {
    // fora do runtime: o exportador usa cliente HTTP bloqueante
    let tel = telemetry::init("quote-engine-core")?;

    let weth = TokenMeta::new("weth", 18, "WETH")?;
    let usdc = TokenMeta::new("usdc", 6, "USDC")?;
    let mut floors = PairFloorTable::new();
    floors.set(weth.id(), usdc.id(), 30);

    let amount_in = to_atomic("2.5", weth.decimals())?;
    let mut setting = SlippageSetting::default();

    let rt = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    rt.block_on(async {
        let mut ticker = tokio::time::interval(REFRESH_EVERY);
        for tick in 0..REFRESHES {
            ticker.tick().await;
            let span = telemetry::make_info_span("quote", tick, "quote_demo");
            let _guard = span.enter();

            let pool = read_snapshot(&weth, &usdc, tick)?;
            let t0 = Instant::now();
            let quote = try_swap_quote(&pool, &weth, &usdc, amount_in);
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

            let quote = match quote {
                Ok(q) => {
                    tel.record_quote(elapsed_ms, QuoteOutcome::Quoted);
                    q
                }
                Err(err) => {
                    tel.record_quote(elapsed_ms, QuoteOutcome::Rejected(err.code().code()));
                    tracing::warn!(error = %err, "quote rejected");
                    continue;
                }
            };

            let floor = floors.get(weth.id(), usdc.id());
            let inputs = SlippageInputs::from_quote(&quote, weth.decimals(), usdc.decimals(), floor)?;
            let rec = recommend(&inputs);
            // o demo aceita a recomendação; numa UI seria ação do usuário
            setting.apply(&rec);

            tracing::info!(
                amount_out = %from_atomic(quote.amount_out, usdc.decimals()),
                min_out = %from_atomic(quote.min_out(setting.tolerance_bps()), usdc.decimals()),
                impact_pct = %quote.price_impact_pct,
                slippage_bps = setting.tolerance_bps(),
                "quote refreshed"
            );
        }
        Ok::<(), anyhow::Error>(())
    })?;

    tel.shutdown()
}
