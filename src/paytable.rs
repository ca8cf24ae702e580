//! Payline evaluation and win calculation
//!
//! `PayTable::evaluate` is the algorithmic core of the engine: a pure
//! function from (grid, bet-per-line, active lines) to a `SpinResult`.
//! No randomness, no side effects; identical inputs yield identical
//! results.

use crate::config::{EngineConfig, FreeSpinTier, Payline, PayoutCurve};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::spin::{GridProvenance, SpinResult, WinLine};
use crate::symbols::{SymbolCatalog, SymbolId, SymbolKind};

/// Outcome of a single payline.
enum LineOutcome {
    Nothing,
    /// Every symbol on the line is the jackpot symbol. Resolved against
    /// the pool at settlement, not the payout table.
    Jackpot,
    Win(WinLine),
}

/// The evaluator: payline table, payout curve, and the economy knobs that
/// apply per line. Built once from configuration.
#[derive(Debug, Clone)]
pub struct PayTable {
    catalog: SymbolCatalog,
    paylines: Vec<Payline>,
    curve: PayoutCurve,
    all_wild_multiplier: f64,
    house_edge: f64,
    jackpot_symbol_count: u8,
    bonus_symbol_count: u8,
    scatter_tiers: Vec<FreeSpinTier>,
    scatter_id: SymbolId,
    jackpot_id: SymbolId,
    bonus_id: Option<SymbolId>,
}

impl PayTable {
    /// Build the evaluator from a validated configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let scatter_id = config
            .symbols
            .find_kind(SymbolKind::Scatter)
            .ok_or_else(|| EngineError::config("catalog is missing a scatter symbol"))?;
        let jackpot_id = config
            .symbols
            .find_kind(SymbolKind::Jackpot)
            .ok_or_else(|| EngineError::config("catalog is missing a jackpot symbol"))?;
        Ok(Self {
            catalog: config.symbols.clone(),
            paylines: config.paylines.clone(),
            curve: config.payout_curve.clone(),
            all_wild_multiplier: config.all_wild_multiplier,
            house_edge: config.house_edge,
            jackpot_symbol_count: config.jackpot_symbol_count,
            bonus_symbol_count: config.bonus_symbol_count,
            scatter_tiers: config.scatter_tiers.clone(),
            scatter_id,
            jackpot_id,
            bonus_id: config.symbols.find_kind(SymbolKind::Bonus),
        })
    }

    /// Number of configured paylines.
    pub fn payline_count(&self) -> usize {
        self.paylines.len()
    }

    /// Evaluate a grid against the first `active_lines` paylines.
    ///
    /// Deterministic: the result depends only on the inputs and this
    /// table's configuration. The returned provenance is `Random`; callers
    /// of the forced path restamp it.
    pub fn evaluate(
        &self,
        grid: &Grid,
        bet_per_line: f64,
        active_lines: u8,
    ) -> Result<SpinResult, EngineError> {
        let mut win_lines = Vec::new();
        let mut total_win = 0.0;
        let mut is_jackpot = false;

        let active = (active_lines as usize).min(self.paylines.len());
        for payline in &self.paylines[..active] {
            if payline.rows.len() != grid.cols() as usize
                || payline.rows.iter().any(|&r| r >= grid.rows())
            {
                return Err(EngineError::config(format!(
                    "payline {} does not fit a {}x{} grid",
                    payline.index,
                    grid.rows(),
                    grid.cols()
                )));
            }
            match self.evaluate_line(grid, payline, bet_per_line)? {
                LineOutcome::Nothing => {}
                LineOutcome::Jackpot => is_jackpot = true,
                LineOutcome::Win(line) => {
                    total_win += line.win_amount;
                    win_lines.push(line);
                }
            }
        }

        // Grid-wide triggers are independent of the active line count.
        let free_spins_count = self.scatter_free_spins(grid);
        if grid.count_of(self.jackpot_id) >= self.jackpot_symbol_count as usize {
            is_jackpot = true;
        }
        let is_bonus = self
            .bonus_id
            .is_some_and(|id| grid.count_of(id) >= self.bonus_symbol_count as usize);

        Ok(SpinResult {
            grid: grid.clone(),
            win_lines,
            total_win,
            is_jackpot,
            is_free_spins: free_spins_count > 0,
            free_spins_count,
            is_bonus,
            provenance: GridProvenance::Random,
        })
    }

    fn evaluate_line(
        &self,
        grid: &Grid,
        payline: &Payline,
        bet_per_line: f64,
    ) -> Result<LineOutcome, EngineError> {
        let cols = grid.cols();
        let line: Vec<SymbolId> = (0..cols).map(|c| grid.at(payline.rows[c as usize], c)).collect();

        // Full jackpot line: distinct from a numeric win, resolved against
        // the pool.
        if line.iter().all(|&s| s == self.jackpot_id) {
            return Ok(LineOutcome::Jackpot);
        }

        let is_wild = |id: SymbolId| -> Result<bool, EngineError> {
            Ok(self.catalog.get(id)?.kind == SymbolKind::Wild)
        };

        // All-wild line: best guaranteed non-jackpot outcome, fixed
        // multiplier of the bet.
        let mut all_wild = true;
        for &s in &line {
            if !is_wild(s)? {
                all_wild = false;
                break;
            }
        }
        if all_wild {
            let win_amount = bet_per_line * self.all_wild_multiplier * (1.0 - self.house_edge);
            let positions = (0..cols).map(|c| (payline.rows[c as usize], c)).collect();
            return Ok(LineOutcome::Win(WinLine {
                line_index: payline.index,
                symbol: line[0],
                run_length: cols,
                positions,
                win_amount,
            }));
        }

        // The first symbol anchors the run. Wilds match in both directions:
        // a wild in the run matches the anchor, and a wild anchor matches
        // every later symbol. The paying value comes from the first
        // non-wild symbol in the run.
        let anchor_is_wild = is_wild(line[0])?;
        let mut anchor = line[0];
        for &s in &line {
            if !is_wild(s)? {
                anchor = s;
                break;
            }
        }

        let mut run_length = 0u8;
        let mut positions = Vec::new();
        for (col, &s) in line.iter().enumerate() {
            if anchor_is_wild || s == anchor || is_wild(s)? {
                run_length += 1;
                positions.push((payline.rows[col], col as u8));
            } else {
                break;
            }
        }

        let multiplier = self.curve.multiplier_for(run_length);
        if multiplier <= 0.0 {
            return Ok(LineOutcome::Nothing);
        }
        let value = self.catalog.get(anchor)?.display_value;
        let win_amount = bet_per_line * value * multiplier * (1.0 - self.house_edge);
        if win_amount <= 0.0 {
            return Ok(LineOutcome::Nothing);
        }

        positions.truncate(run_length as usize);
        Ok(LineOutcome::Win(WinLine {
            line_index: payline.index,
            symbol: anchor,
            run_length,
            positions,
            win_amount,
        }))
    }

    /// Scatter count anywhere in the grid, mapped through the configured
    /// tiers. Only the highest matching tier applies.
    fn scatter_free_spins(&self, grid: &Grid) -> u32 {
        let count = grid.count_of(self.scatter_id) as u8;
        self.scatter_tiers
            .iter()
            .rev()
            .find(|tier| count >= tier.min_count)
            .map(|tier| tier.spins)
            .unwrap_or(0)
    }
}
