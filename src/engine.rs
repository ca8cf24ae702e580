//! The engine: one struct owning configuration, RNG, state, and statistics
//!
//! `SlotEngine::spin` runs the whole cycle synchronously: debit, grid
//! generation, payline evaluation, settlement, statistics, sink
//! notification. The RNG is owned and seedable, so a seeded engine replays
//! an identical sequence of spins.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grid::{generate_forced_grid, generate_grid};
use crate::paytable::PayTable;
use crate::spin::{ForcedWin, GridProvenance, SpinResult};
use crate::state::{GameState, Settlement};

/// Observer for settled spins. Notification is fire-and-forget: the engine
/// calls it after its own state is final, and nothing the sink does can
/// change the outcome.
pub trait SettlementSink: Send {
    fn on_settlement(&mut self, result: &SpinResult, settlement: &Settlement);
}

/// Aggregate counters over the random spins of one session. Forced
/// admin/test spins are excluded so the numbers stay meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub wins: u64,
    pub jackpots: u64,
    pub free_spins_granted: u64,
    pub total_bet: f64,
    pub total_won: f64,
    pub biggest_win: f64,
}

impl SessionStats {
    /// Return-to-player: total winnings over total stakes.
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_won / self.total_bet
        } else {
            0.0
        }
    }

    /// Fraction of spins with any paytable win.
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            self.wins as f64 / self.spins as f64
        } else {
            0.0
        }
    }

    fn record(&mut self, total_bet: f64, result: &SpinResult, settlement: &Settlement) {
        self.spins += 1;
        self.total_bet += total_bet;
        let won = settlement.total_win + settlement.jackpot_payout.unwrap_or(0.0);
        self.total_won += won;
        if result.is_win() {
            self.wins += 1;
        }
        if settlement.jackpot_payout.is_some() {
            self.jackpots += 1;
        }
        self.free_spins_granted += result.free_spins_count as u64;
        if won > self.biggest_win {
            self.biggest_win = won;
        }
    }
}

/// A complete slot machine: caller-owned, no globals. Construct as many as
/// you like; each carries its own RNG and session.
pub struct SlotEngine {
    config: EngineConfig,
    paytable: PayTable,
    rng: StdRng,
    state: GameState,
    stats: SessionStats,
    sink: Option<Box<dyn SettlementSink>>,
}

impl std::fmt::Debug for SlotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotEngine")
            .field("config", &self.config.name)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SlotEngine {
    /// Build an engine from a configuration. Validation failures are fatal
    /// here so an invalid engine never exists.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let paytable = PayTable::from_config(&config)?;
        let state = GameState::new(&config);
        info!("engine ready: {}, {}x{} grid, {} paylines",
            config.name, config.grid.rows, config.grid.cols, config.paylines.len());
        Ok(Self {
            config,
            paytable,
            rng: StdRng::from_entropy(),
            state,
            stats: SessionStats::default(),
            sink: None,
        })
    }

    /// Engine with the default configuration.
    pub fn standard() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default())
    }

    /// Reseed the RNG. Two engines with equal configurations and seeds
    /// produce identical spin sequences.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Attach a settlement observer, replacing any previous one.
    pub fn set_sink(&mut self, sink: Box<dyn SettlementSink>) {
        self.sink = Some(sink);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Run one complete spin: debit, generate, evaluate, settle.
    ///
    /// In test mode an armed forced win replaces the random grid for
    /// exactly one spin and the result is stamped as forced; forced spins
    /// do not count toward session statistics.
    pub fn spin(&mut self) -> Result<SpinResult, EngineError> {
        let ticket = self.state.start_spin(&self.config)?;
        let total_bet = ticket.total_bet();

        let forced = if self.state.test_mode() {
            self.state.take_forced_win()
        } else {
            None
        };

        let grid = match self.generate(forced) {
            Ok(grid) => grid,
            Err(err) => {
                self.state.abort_spin(ticket);
                return Err(err);
            }
        };
        let mut result = match self.paytable.evaluate(
            &grid,
            self.state.bet_per_line(),
            self.state.active_lines(),
        ) {
            Ok(result) => result,
            Err(err) => {
                self.state.abort_spin(ticket);
                return Err(err);
            }
        };
        if let Some(win) = forced {
            result.provenance = GridProvenance::Forced(win);
        }

        let settlement = self.state.settle_spin(&result, ticket, &self.config);
        if !result.provenance.is_forced() {
            self.stats.record(total_bet, &result, &settlement);
        }
        debug!(
            "spin settled: win {:.2}, balance {:.2}, pool {:.2}",
            settlement.total_win,
            settlement.balance,
            self.state.jackpot_pool()
        );
        if let Some(sink) = self.sink.as_mut() {
            sink.on_settlement(&result, &settlement);
        }
        Ok(result)
    }

    fn generate(&mut self, forced: Option<ForcedWin>) -> Result<crate::grid::Grid, EngineError> {
        match forced {
            Some(win) => {
                generate_forced_grid(win, &self.config.symbols, self.config.grid, &mut self.rng)
            }
            None => generate_grid(&self.config.symbols, self.config.grid, &mut self.rng),
        }
    }

    /// One tick of auto-play: spin if auto-play is on and the session can
    /// afford it, otherwise switch auto-play off. `Ok(None)` means no spin
    /// happened.
    pub fn auto_play_tick(&mut self) -> Result<Option<SpinResult>, EngineError> {
        if !self.state.auto_play() {
            return Ok(None);
        }
        let affordable =
            self.state.free_spins() > 0 || self.state.balance() >= self.state.total_bet();
        if !affordable {
            self.state.set_auto_play(false);
            info!("auto-play stopped, balance below stake");
            return Ok(None);
        }
        self.spin().map(Some)
    }

    /// Set the bet per line, clamped to configured bounds.
    pub fn update_bet(&mut self, bet: f64) -> Result<f64, EngineError> {
        self.state.update_bet(bet, &self.config)
    }

    /// Set the active line count, clamped to configured bounds.
    pub fn update_lines(&mut self, lines: u8) -> Result<u8, EngineError> {
        self.state.update_lines(lines, &self.config)
    }

    pub fn toggle_auto_play(&mut self) -> bool {
        self.state.toggle_auto_play()
    }

    pub fn set_admin_mode(&mut self, enabled: bool) {
        self.state.set_admin_mode(enabled);
    }

    pub fn set_test_mode(&mut self, enabled: bool) -> Result<(), EngineError> {
        self.state.set_test_mode(enabled)
    }

    pub fn set_forced_win(&mut self, win: Option<ForcedWin>) -> Result<(), EngineError> {
        self.state.set_forced_win(win)
    }

    pub fn set_balance(&mut self, balance: f64) -> Result<(), EngineError> {
        self.state.set_balance(balance)
    }

    pub fn set_jackpot_pool(&mut self, pool: f64) -> Result<(), EngineError> {
        self.state.set_jackpot_pool(pool)
    }

    pub fn set_free_spins(&mut self, spins: u32) -> Result<(), EngineError> {
        self.state.set_free_spins(spins)
    }

    /// Reset the session and its statistics. The jackpot pool and
    /// admin/test modes survive, as in `GameState::reset`.
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.stats = SessionStats::default();
    }

    /// Serialize the configuration as pretty JSON.
    pub fn export_config(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.config)
            .map_err(|e| EngineError::config(format!("config serialization failed: {e}")))
    }

    /// Parse and validate a configuration from JSON.
    pub fn import_config(json: &str) -> Result<EngineConfig, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("config parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seeded_engine(seed: u64) -> SlotEngine {
        let mut engine = SlotEngine::standard().unwrap();
        engine.seed(seed);
        engine
    }

    #[test]
    fn test_seeded_engines_replay_identically() {
        let mut a = seeded_engine(99);
        let mut b = seeded_engine(99);
        for _ in 0..50 {
            assert_eq!(a.spin().unwrap(), b.spin().unwrap());
            assert_eq!(a.state().balance(), b.state().balance());
        }
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_spin_accounting() {
        let mut engine = seeded_engine(5);
        for _ in 0..20 {
            let balance = engine.state().balance();
            let free_spins = engine.state().free_spins();
            let stake = if free_spins > 0 { 0.0 } else { engine.state().total_bet() };
            let result = engine.spin().unwrap();
            // Pool starts at zero and the threshold is never reached in a
            // handful of default spins, so no jackpot payout can interfere.
            assert_relative_eq!(
                engine.state().balance(),
                (balance - stake) + result.total_win,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_forced_jackpot_spin() {
        let mut engine = seeded_engine(11);
        engine.set_admin_mode(true);
        engine.set_test_mode(true).unwrap();
        engine.set_jackpot_pool(500.0).unwrap();
        engine.set_forced_win(Some(ForcedWin::Jackpot)).unwrap();

        let balance = engine.state().balance();
        let result = engine.spin().unwrap();
        assert!(result.is_jackpot);
        assert_eq!(result.provenance, GridProvenance::Forced(ForcedWin::Jackpot));
        assert_eq!(engine.state().jackpot_pool(), 0.0);
        assert!(engine.state().balance() > balance);
        // Forced spins never count toward statistics.
        assert_eq!(engine.stats().spins, 0);
    }

    #[test]
    fn test_forced_win_consumed_once() {
        let mut engine = seeded_engine(12);
        engine.set_admin_mode(true);
        engine.set_test_mode(true).unwrap();
        engine.set_forced_win(Some(ForcedWin::Big)).unwrap();

        let first = engine.spin().unwrap();
        assert!(first.provenance.is_forced());
        let second = engine.spin().unwrap();
        assert_eq!(second.provenance, GridProvenance::Random);
    }

    #[test]
    fn test_forced_win_ignored_outside_test_mode() {
        let mut engine = seeded_engine(13);
        engine.set_admin_mode(true);
        engine.set_forced_win(Some(ForcedWin::Big)).unwrap();
        let result = engine.spin().unwrap();
        assert_eq!(result.provenance, GridProvenance::Random);
    }

    #[test]
    fn test_forced_big_pays_top_row() {
        let mut engine = seeded_engine(14);
        engine.set_admin_mode(true);
        engine.set_test_mode(true).unwrap();
        engine.set_forced_win(Some(ForcedWin::Big)).unwrap();
        let result = engine.spin().unwrap();
        // Full row of the top regular symbol on payline 0.
        assert!(result.win_lines.iter().any(|l| l.line_index == 0 && l.run_length == 5));
        assert!(result.total_win > 0.0);
    }

    #[test]
    fn test_auto_play_stops_when_unaffordable() {
        let mut engine = seeded_engine(7);
        engine.set_admin_mode(true);
        engine.set_balance(1.0).unwrap();
        engine.toggle_auto_play();

        // Bet 1 x 3 lines = 3 > balance 1: the tick spins nothing and
        // switches auto-play off instead of erroring.
        let tick = engine.auto_play_tick().unwrap();
        assert!(tick.is_none());
        assert!(!engine.state().auto_play());
    }

    #[test]
    fn test_auto_play_tick_spins_when_on() {
        let mut engine = seeded_engine(8);
        assert!(engine.auto_play_tick().unwrap().is_none());
        engine.toggle_auto_play();
        assert!(engine.auto_play_tick().unwrap().is_some());
        assert_eq!(engine.stats().spins, 1);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut engine = seeded_engine(21);
        engine.set_admin_mode(true);
        engine.set_balance(10_000.0).unwrap();
        for _ in 0..200 {
            engine.spin().unwrap();
        }
        let stats = engine.stats();
        assert_eq!(stats.spins, 200);
        assert!(stats.total_bet > 0.0);
        assert!(stats.rtp() >= 0.0);
        assert!(stats.hit_rate() <= 1.0);
        assert!(stats.biggest_win >= 0.0);
    }

    #[test]
    fn test_reset_clears_stats() {
        let mut engine = seeded_engine(30);
        engine.spin().unwrap();
        assert_eq!(engine.stats().spins, 1);
        engine.reset();
        assert_eq!(engine.stats(), &SessionStats::default());
        assert_eq!(engine.state().balance(), engine.config().starting_balance);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let engine = SlotEngine::standard().unwrap();
        let json = engine.export_config().unwrap();
        let config = SlotEngine::import_config(&json).unwrap();
        assert_eq!(&config, engine.config());
    }

    #[test]
    fn test_import_rejects_invalid_config() {
        let engine = SlotEngine::standard().unwrap();
        let json = engine.export_config().unwrap().replace("\"min_bet\": 0.5", "\"min_bet\": 50.0");
        assert!(SlotEngine::import_config(&json).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.max_lines = 99;
        assert!(SlotEngine::new(config).is_err());
    }

    struct Recorder {
        settled: std::sync::Arc<parking_lot::Mutex<Vec<Settlement>>>,
    }

    impl SettlementSink for Recorder {
        fn on_settlement(&mut self, _result: &SpinResult, settlement: &Settlement) {
            self.settled.lock().push(settlement.clone());
        }
    }

    #[test]
    fn test_sink_sees_every_settlement() {
        let settled = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut engine = seeded_engine(17);
        engine.set_sink(Box::new(Recorder { settled: settled.clone() }));
        for _ in 0..5 {
            engine.spin().unwrap();
        }
        assert_eq!(settled.lock().len(), 5);
    }
}
