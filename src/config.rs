//! Engine configuration: grid shape, paylines, payout curve, economy knobs
//!
//! Everything here is consumed at engine construction and never mutated at
//! runtime. `EngineConfig::validate` fails fast so a misconfigured engine
//! can never be used.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::symbols::{SymbolCatalog, SymbolKind};

/// Grid specification (rows × columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of visible rows
    pub rows: u8,
    /// Number of columns (reels)
    pub cols: u8,
}

impl GridSpec {
    /// Standard 3×5 grid
    pub fn standard_3x5() -> Self {
        Self { rows: 3, cols: 5 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_3x5()
    }
}

/// A payline: one row index per column, defining a path through the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based, evaluation order)
    pub index: u8,
    /// Row position for each column
    pub rows: Vec<u8>,
}

impl Payline {
    /// Create a straight line (same row across all columns)
    pub fn straight(index: u8, row: u8, cols: u8) -> Self {
        Self {
            index,
            rows: vec![row; cols as usize],
        }
    }
}

/// The classic 20 payline patterns for a 3×5 grid, ordered by significance.
/// Index 0 is always evaluated first when fewer lines are active.
pub fn standard_20_paylines() -> Vec<Payline> {
    vec![
        Payline::straight(0, 0, 5),
        Payline::straight(1, 1, 5),
        Payline::straight(2, 2, 5),
        // V shapes
        Payline { index: 3, rows: vec![0, 1, 2, 1, 0] },
        Payline { index: 4, rows: vec![2, 1, 0, 1, 2] },
        // Diagonals
        Payline { index: 5, rows: vec![0, 0, 1, 2, 2] },
        Payline { index: 6, rows: vec![2, 2, 1, 0, 0] },
        // U shapes
        Payline { index: 7, rows: vec![1, 0, 0, 0, 1] },
        Payline { index: 8, rows: vec![1, 2, 2, 2, 1] },
        // Shallow V shapes
        Payline { index: 9, rows: vec![0, 1, 1, 1, 0] },
        Payline { index: 10, rows: vec![2, 1, 1, 1, 2] },
        // Steps
        Payline { index: 11, rows: vec![0, 0, 0, 1, 2] },
        Payline { index: 12, rows: vec![2, 2, 2, 1, 0] },
        Payline { index: 13, rows: vec![0, 1, 2, 2, 2] },
        Payline { index: 14, rows: vec![2, 1, 0, 0, 0] },
        // W and M shapes
        Payline { index: 15, rows: vec![1, 1, 0, 1, 1] },
        Payline { index: 16, rows: vec![1, 1, 2, 1, 1] },
        // Zigzags
        Payline { index: 17, rows: vec![0, 2, 0, 2, 0] },
        Payline { index: 18, rows: vec![2, 0, 2, 0, 2] },
        Payline { index: 19, rows: vec![1, 0, 1, 0, 1] },
    ]
}

/// One step of the payout curve: runs of at least `min_run` pay `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutStep {
    pub min_run: u8,
    pub multiplier: f64,
}

/// Monotonically increasing step function from run length to multiplier.
/// Game-balance data, not engine logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutCurve {
    steps: Vec<PayoutStep>,
}

impl PayoutCurve {
    /// Build a curve from explicit steps. Steps must be sorted and
    /// monotone; that is checked by `EngineConfig::validate`.
    pub fn new(steps: Vec<PayoutStep>) -> Self {
        Self { steps }
    }

    /// Standard curve: 3 → 3×, 4 → 10×, 5 → 50×
    pub fn standard() -> Self {
        Self::new(vec![
            PayoutStep { min_run: 3, multiplier: 3.0 },
            PayoutStep { min_run: 4, multiplier: 10.0 },
            PayoutStep { min_run: 5, multiplier: 50.0 },
        ])
    }

    /// Multiplier for a run length. Runs below the first step pay nothing.
    pub fn multiplier_for(&self, run_length: u8) -> f64 {
        self.steps
            .iter()
            .rev()
            .find(|s| run_length >= s.min_run)
            .map(|s| s.multiplier)
            .unwrap_or(0.0)
    }

    /// Shortest run length that pays anything.
    pub fn min_paying_run(&self) -> u8 {
        self.steps.first().map(|s| s.min_run).unwrap_or(u8::MAX)
    }

    pub fn steps(&self) -> &[PayoutStep] {
        &self.steps
    }
}

impl Default for PayoutCurve {
    fn default() -> Self {
        Self::standard()
    }
}

/// A scatter free-spin tier: at least `min_count` scatters anywhere in the
/// grid grant `spins` free spins. Only the highest matching tier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSpinTier {
    pub min_count: u8,
    pub spins: u32,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Game name, for display and logs
    pub name: String,
    /// Grid shape
    pub grid: GridSpec,
    /// Payline table, ordered by significance
    pub paylines: Vec<Payline>,
    /// Symbol catalog
    pub symbols: SymbolCatalog,
    /// Run-length payout curve
    pub payout_curve: PayoutCurve,
    /// Fixed multiplier of bet-per-line for an all-wild line
    pub all_wild_multiplier: f64,
    /// House edge in [0, 1): every non-jackpot win is scaled once by
    /// `1.0 - house_edge`. Jackpot payouts are never discounted.
    pub house_edge: f64,
    /// Jackpot symbols anywhere in the grid at or above this count trigger
    /// the jackpot, independent of paylines
    pub jackpot_symbol_count: u8,
    /// Bonus symbols anywhere in the grid at or above this count raise the
    /// bonus flag
    pub bonus_symbol_count: u8,
    /// Scatter free-spin tiers, ascending by `min_count`
    pub scatter_tiers: Vec<FreeSpinTier>,
    /// Fraction of every paid bet added to the jackpot pool
    pub jackpot_contribution: f64,
    /// Pool value at which the jackpot becomes active
    pub jackpot_threshold: f64,
    /// Bet-per-line bounds
    pub min_bet: f64,
    pub max_bet: f64,
    /// Active payline bounds
    pub min_lines: u8,
    pub max_lines: u8,
    /// Session defaults
    pub starting_balance: f64,
    pub default_bet: f64,
    pub default_lines: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "Classic Fruit".into(),
            grid: GridSpec::default(),
            paylines: standard_20_paylines(),
            symbols: SymbolCatalog::standard(),
            payout_curve: PayoutCurve::standard(),
            all_wild_multiplier: 5000.0,
            house_edge: 0.0,
            jackpot_symbol_count: 5,
            bonus_symbol_count: 3,
            scatter_tiers: vec![
                FreeSpinTier { min_count: 3, spins: 10 },
                FreeSpinTier { min_count: 5, spins: 25 },
            ],
            jackpot_contribution: 0.05,
            jackpot_threshold: 100.0,
            min_bet: 0.5,
            max_bet: 10.0,
            min_lines: 1,
            max_lines: 8,
            starting_balance: 100.0,
            default_bet: 1.0,
            default_lines: 3,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration. Called once at engine construction;
    /// any failure here is fatal and prevents the engine from being used.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(EngineError::config("grid must have at least one row and column"));
        }
        if self.symbols.all().is_empty() {
            return Err(EngineError::config("symbol catalog is empty"));
        }
        if self.symbols.total_weight() <= 0.0 {
            return Err(EngineError::config("total draw weight must be positive"));
        }
        if self.symbols.all().iter().any(|s| s.draw_weight < 0.0) {
            return Err(EngineError::config("draw weights must be non-negative"));
        }
        if self.symbols.all().iter().any(|s| s.display_value < 0.0) {
            return Err(EngineError::config("display values must be non-negative"));
        }
        if self.paylines.is_empty() {
            return Err(EngineError::config("payline table is empty"));
        }
        for line in &self.paylines {
            if line.rows.len() != self.grid.cols as usize {
                return Err(EngineError::config(format!(
                    "payline {} has {} entries, grid has {} columns",
                    line.index,
                    line.rows.len(),
                    self.grid.cols
                )));
            }
            if line.rows.iter().any(|&r| r >= self.grid.rows) {
                return Err(EngineError::config(format!(
                    "payline {} references a row outside the grid",
                    line.index
                )));
            }
        }
        let steps = self.payout_curve.steps();
        if steps.is_empty() {
            return Err(EngineError::config("payout curve has no steps"));
        }
        for pair in steps.windows(2) {
            if pair[1].min_run <= pair[0].min_run || pair[1].multiplier <= pair[0].multiplier {
                return Err(EngineError::config("payout curve must be strictly increasing"));
            }
        }
        if !(0.0..1.0).contains(&self.house_edge) {
            return Err(EngineError::config("house edge must be in [0, 1)"));
        }
        if self.all_wild_multiplier <= 0.0 {
            return Err(EngineError::config("all-wild multiplier must be positive"));
        }
        for pair in self.scatter_tiers.windows(2) {
            if pair[1].min_count <= pair[0].min_count || pair[1].spins <= pair[0].spins {
                return Err(EngineError::config("scatter tiers must be ascending"));
            }
        }
        if !(0.0..1.0).contains(&self.jackpot_contribution) {
            return Err(EngineError::config("jackpot contribution must be in [0, 1)"));
        }
        if self.jackpot_threshold < 0.0 {
            return Err(EngineError::config("jackpot threshold must be non-negative"));
        }
        if self.min_bet <= 0.0 || self.max_bet < self.min_bet {
            return Err(EngineError::config("bet bounds must satisfy 0 < min <= max"));
        }
        if self.min_lines == 0 || self.max_lines < self.min_lines {
            return Err(EngineError::config("line bounds must satisfy 1 <= min <= max"));
        }
        if self.max_lines as usize > self.paylines.len() {
            return Err(EngineError::config(format!(
                "max_lines {} exceeds the {} configured paylines",
                self.max_lines,
                self.paylines.len()
            )));
        }
        if self.starting_balance < 0.0 {
            return Err(EngineError::config("starting balance must be non-negative"));
        }
        if !(self.min_bet..=self.max_bet).contains(&self.default_bet) {
            return Err(EngineError::config("default bet outside bet bounds"));
        }
        if !(self.min_lines..=self.max_lines).contains(&self.default_lines) {
            return Err(EngineError::config("default lines outside line bounds"));
        }
        // The special symbols the evaluator and forced generator rely on.
        for kind in [SymbolKind::Wild, SymbolKind::Scatter, SymbolKind::Jackpot] {
            if self.symbols.find_kind(kind).is_none() {
                return Err(EngineError::config(format!(
                    "catalog is missing a {kind:?} symbol"
                )));
            }
        }
        if self.symbols.regular_ids().is_empty() {
            return Err(EngineError::config("catalog has no regular symbols"));
        }
        Ok(())
    }
}
