//! Engine error taxonomy

use crate::symbols::SymbolId;

/// Errors surfaced by the spin engine.
///
/// Configuration problems are fatal at construction time and prevent the
/// engine from being built. Per-spin conditions (`InsufficientBalance`,
/// `AlreadySpinning`) are expected and leave state untouched so the caller
/// can render a specific message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A symbol id was referenced that is not registered in the catalog.
    /// This is a data-integrity bug, never a recoverable condition.
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(SymbolId),

    /// The player cannot cover the total bet. The spin is rejected and
    /// state is left unchanged.
    #[error("insufficient balance: bet requires {required:.2}, have {available:.2}")]
    InsufficientBalance { required: f64, available: f64 },

    /// A spin is already in flight; the transition is a rejected no-op.
    #[error("spin already in progress")]
    AlreadySpinning,

    /// An admin-only transition was attempted with admin mode off.
    #[error("admin mode required")]
    AdminRequired,

    /// The engine configuration failed validation at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EngineError {
    /// Shorthand for configuration validation failures.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
