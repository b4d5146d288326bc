use quote_engine_core::amm::error::AmmError;
use quote_engine_core::amm::error_catalog::AmmErrorCode;
use quote_engine_core::amm::fixed_point::to_atomic;

#[test]
fn no_newlines_or_tabs() {
    let err = AmmError::new(AmmErrorCode::ZeroReserves).with_context("origem", "linha1\nlinha2\ttab");
    let user = err.to_user_string();
    assert!(!user.contains('\n'));
    assert!(!user.contains('\t'));
}

#[test]
fn truncate_long_context_values() {
    let long_value = "a".repeat(1024);
    let err = AmmError::new(AmmErrorCode::InvalidAmount).with_context("amount", long_value);
    let user = err.to_user_string();
    assert!(user.len() < 512);
}

#[test]
fn missing_context_leaves_placeholder() {
    let err = AmmError::new(AmmErrorCode::InvalidAmount);
    assert_eq!(err.to_user_string(), "[AMM-0001] amount inválido: {amount}");
    let err = AmmError::new(AmmErrorCode::InvalidAmount).with_context("desconhecido", 1);
    assert_eq!(err.to_user_string(), "[AMM-0001] amount inválido: {amount}");
}

#[test]
fn converter_errors_render_the_offending_input() {
    let err = to_atomic("1.2.3", 6).unwrap_err();
    assert_eq!(err.code(), AmmErrorCode::InvalidAmount);
    assert_eq!(err.to_user_string(), "[AMM-0001] amount inválido: 1.2.3");
    let err = to_atomic("1", 19).unwrap_err();
    assert!(err.to_user_string().starts_with("[AMM-0008]"));
}
