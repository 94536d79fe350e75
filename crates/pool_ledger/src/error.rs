use amm_model::AmmError;
use thiserror::Error;

use crate::bank::TransferError;

/// Every failure aborts the whole operation with no observable mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    #[error("pool has a zero-side reserve")]
    InsufficientLiquidity,

    #[error("slippage exceeded: output {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded { amount_out: u128, min_amount_out: u128 },

    #[error("caller is not the pool admin")]
    Unauthorized,

    #[error("asset transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("pool is paused")]
    Paused,

    #[error("pool is not paused")]
    NotPaused,

    #[error("null or duplicate address")]
    InvalidAddress,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero share supply")]
    DivisionByZero,
}

impl LedgerError {
    /// Stable snake_case name of the variant, for scripts and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "invalid_amount",
            LedgerError::InsufficientShares { .. } => "insufficient_shares",
            LedgerError::InsufficientLiquidity => "insufficient_liquidity",
            LedgerError::SlippageExceeded { .. } => "slippage_exceeded",
            LedgerError::Unauthorized => "unauthorized",
            LedgerError::TransferFailed(_) => "transfer_failed",
            LedgerError::Paused => "paused",
            LedgerError::NotPaused => "not_paused",
            LedgerError::InvalidAddress => "invalid_address",
            LedgerError::Overflow => "overflow",
            LedgerError::DivisionByZero => "division_by_zero",
        }
    }
}

impl From<AmmError> for LedgerError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::InvalidAmount => LedgerError::InvalidAmount,
            AmmError::InsufficientLiquidity => LedgerError::InsufficientLiquidity,
            AmmError::Overflow => LedgerError::Overflow,
            AmmError::DivisionByZero => LedgerError::DivisionByZero,
        }
    }
}

pub type Result<T> = core::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_errors_map_one_to_one() {
        assert_eq!(LedgerError::from(AmmError::Overflow), LedgerError::Overflow);
        assert_eq!(LedgerError::from(AmmError::DivisionByZero).kind(), "division_by_zero");
        assert_eq!(
            LedgerError::from(AmmError::InsufficientLiquidity).kind(),
            "insufficient_liquidity"
        );
    }

    #[test]
    fn test_transfer_error_message_is_kept() {
        let err = LedgerError::from(TransferError::Overflow {
            asset: crate::testing::token_a(),
            owner: crate::testing::alice(),
        });
        assert_eq!(err.kind(), "transfer_failed");
        assert!(err.to_string().starts_with("asset transfer failed: "));
    }
}
