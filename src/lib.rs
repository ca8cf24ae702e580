//! # slot-engine — Deterministic Slot Machine Outcome Engine
//!
//! An in-process library that turns a bet into a settled spin: weighted
//! random grid generation, payline evaluation, payout calculation, and the
//! session state machine (balance, free spins, progressive jackpot pool).
//!
//! ## Features
//!
//! - **Weighted Grids**: Every cell drawn independently from catalog weights
//! - **Payline Evaluation**: Left-anchored runs with wild substitution
//! - **Progressive Jackpot**: Bet-fed pool with an activation threshold
//! - **Free Spins & Bonus**: Scatter tiers and bonus-count triggers
//! - **Deterministic Replay**: Seedable RNG, pure evaluation
//! - **Admin/Test Hooks**: Forced wins stamped and excluded from stats
//!
//! ## Architecture
//!
//! ```text
//! SlotEngine
//!     │
//!     ├── EngineConfig (grid, paylines, payout curve, economy)
//!     ├── SymbolCatalog (closed symbol set, draw weights)
//!     ├── PayTable (grid → SpinResult, pure)
//!     └── GameState (balance, free spins, jackpot pool)
//!           │
//!           v
//!     spin() → SpinResult + Settlement → SettlementSink
//! ```
//!
//! ## Example
//!
//! ```
//! use slot_engine::SlotEngine;
//!
//! let mut engine = SlotEngine::standard()?;
//! engine.seed(42);
//! let result = engine.spin()?;
//! assert_eq!(result.grid.rows(), 3);
//! # Ok::<(), slot_engine::EngineError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod shared;
pub mod spin;
pub mod state;
pub mod symbols;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use shared::*;
pub use spin::*;
pub use state::*;
pub use symbols::*;
