//! Spin result value types

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::symbols::SymbolId;

/// Win type requested through the admin/test force-win path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedWin {
    /// Three of a low-value symbol on the first payline
    Regular,
    /// A full row of the highest-value regular symbol
    Big,
    /// The jackpot symbol across the whole first payline
    Jackpot,
}

/// Where a grid came from. Forced grids are only reachable in admin/test
/// mode and are excluded from session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridProvenance {
    Random,
    Forced(ForcedWin),
}

impl GridProvenance {
    pub fn is_forced(&self) -> bool {
        matches!(self, GridProvenance::Forced(_))
    }
}

/// A win on a single evaluated payline. Ephemeral; lives only inside the
/// `SpinResult` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinLine {
    /// Payline index (0-based)
    pub line_index: u8,
    /// Effective paying symbol (first non-wild of the run)
    pub symbol: SymbolId,
    /// Length of the matching run from the left
    pub run_length: u8,
    /// Grid positions of the matched symbols, as (row, col)
    pub positions: Vec<(u8, u8)>,
    /// Win amount attributed to this line, house edge already applied
    pub win_amount: f64,
}

/// Complete outcome of one settled spin. Immutable value, fully
/// deterministic given (grid, bet-per-line, active lines, configuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// The grid this result was evaluated from
    pub grid: Grid,
    /// Per-line wins, in payline order
    pub win_lines: Vec<WinLine>,
    /// Sum of all line wins. Jackpot is resolved against the pool at
    /// settlement and never contributes here.
    pub total_win: f64,
    /// Jackpot detected, by full payline or grid-wide count
    pub is_jackpot: bool,
    /// Free spins granted by scatter count
    pub is_free_spins: bool,
    /// Number of free spins granted
    pub free_spins_count: u32,
    /// Bonus round triggered by bonus symbol count
    pub is_bonus: bool,
    /// Random draw or forced admin/test grid
    pub provenance: GridProvenance,
}

impl SpinResult {
    /// Check if this spin won anything through the paytable.
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }
}
