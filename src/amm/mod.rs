pub mod types;
pub mod errors;        // shim: reexports da API unificada de erro
pub mod guardrails;
pub mod fixed_point;
pub mod pool;
pub mod swap;
pub mod pricing;
pub mod liquidity_guard;
pub mod liquidity;
pub mod slippage;
pub mod quote;
pub mod ref_golden;

// erros unificados
pub mod error_catalog;
pub mod error;
pub mod error_map;
