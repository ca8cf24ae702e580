//! Session state machine: balance, bets, free spins, jackpot pool
//!
//! `GameState` is a plain value owned by its engine; nothing here is global.
//! The spin lifecycle is enforced with a move-only `SpinTicket`: `start_spin`
//! debits the bet and hands out a ticket, `settle_spin` consumes it. A ticket
//! cannot be settled twice and a second spin cannot start while one is open.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::spin::{ForcedWin, SpinResult};

/// Proof that a spin was started and its bet accounted for. Consumed by
/// `settle_spin`; dropping it without settling leaves the state spinning,
/// which `abort_spin` exists to undo.
#[derive(Debug)]
#[must_use = "a started spin must be settled or aborted"]
pub struct SpinTicket {
    pub(crate) free_spin: bool,
    pub(crate) total_bet: f64,
    pub(crate) pool_contribution: f64,
}

impl SpinTicket {
    /// Whether this spin consumed a banked free spin instead of balance.
    pub fn is_free_spin(&self) -> bool {
        self.free_spin
    }

    /// The amount debited when the spin started. Zero for free spins.
    pub fn total_bet(&self) -> f64 {
        self.total_bet
    }
}

/// What settlement did to the state, for logging and sink notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Line wins credited to the balance. Zero when the jackpot paid
    /// instead, since the pool pays alone.
    pub total_win: f64,
    /// Jackpot pool payout, if the jackpot was active and hit
    pub jackpot_payout: Option<f64>,
    /// Free spins banked by this spin
    pub free_spins_granted: u32,
    /// Balance after settlement
    pub balance: f64,
}

/// Mutable session state. All transitions go through the methods below;
/// fields are read-only outside this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    balance: f64,
    bet_per_line: f64,
    active_lines: u8,
    free_spins: u32,
    jackpot_pool: f64,
    last_win: f64,
    last_result: Option<SpinResult>,
    auto_play: bool,
    is_spinning: bool,
    admin_mode: bool,
    test_mode: bool,
    forced_win: Option<ForcedWin>,
}

impl GameState {
    /// Fresh session from configuration defaults.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            balance: config.starting_balance,
            bet_per_line: config.default_bet,
            active_lines: config.default_lines,
            free_spins: 0,
            jackpot_pool: 0.0,
            last_win: 0.0,
            last_result: None,
            auto_play: false,
            is_spinning: false,
            admin_mode: false,
            test_mode: false,
            forced_win: None,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn bet_per_line(&self) -> f64 {
        self.bet_per_line
    }

    pub fn active_lines(&self) -> u8 {
        self.active_lines
    }

    /// Total stake of one paid spin at the current bet and line count.
    pub fn total_bet(&self) -> f64 {
        self.bet_per_line * self.active_lines as f64
    }

    pub fn free_spins(&self) -> u32 {
        self.free_spins
    }

    /// Whether the next spin would consume a banked free spin.
    pub fn in_free_spin_mode(&self) -> bool {
        self.free_spins > 0
    }

    /// Amount credited by the most recent settlement, jackpot included.
    pub fn last_win(&self) -> f64 {
        self.last_win
    }

    /// The most recently settled result, if any spin has completed.
    pub fn last_result(&self) -> Option<&SpinResult> {
        self.last_result.as_ref()
    }

    pub fn jackpot_pool(&self) -> f64 {
        self.jackpot_pool
    }

    /// The jackpot only pays once the pool has reached the configured
    /// threshold.
    pub fn jackpot_active(&self, config: &EngineConfig) -> bool {
        self.jackpot_pool >= config.jackpot_threshold
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    pub fn admin_mode(&self) -> bool {
        self.admin_mode
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn forced_win(&self) -> Option<ForcedWin> {
        self.forced_win
    }

    /// Begin a spin: debit the stake (or consume nothing for a banked free
    /// spin) and feed the jackpot pool. Fails without touching any state.
    pub fn start_spin(&mut self, config: &EngineConfig) -> Result<SpinTicket, EngineError> {
        if self.is_spinning {
            return Err(EngineError::AlreadySpinning);
        }
        if self.free_spins > 0 {
            debug!(
                "starting free spin, {} banked, balance {:.2}",
                self.free_spins, self.balance
            );
            self.last_win = 0.0;
            self.is_spinning = true;
            return Ok(SpinTicket {
                free_spin: true,
                total_bet: 0.0,
                pool_contribution: 0.0,
            });
        }
        let total_bet = self.total_bet();
        if self.balance < total_bet {
            return Err(EngineError::InsufficientBalance {
                required: total_bet,
                available: self.balance,
            });
        }
        let pool_contribution = total_bet * config.jackpot_contribution;
        self.balance -= total_bet;
        self.jackpot_pool += pool_contribution;
        self.last_win = 0.0;
        self.is_spinning = true;
        debug!(
            "starting spin, stake {:.2}, balance {:.2}, pool {:.2}",
            total_bet, self.balance, self.jackpot_pool
        );
        Ok(SpinTicket {
            free_spin: false,
            total_bet,
            pool_contribution,
        })
    }

    /// Settle a started spin: resolve the jackpot against the pool or
    /// credit line wins, bank granted free spins, and consume one banked
    /// free spin if the ticket was free.
    ///
    /// Jackpot settlement is exclusive: when the pool pays, it pays alone
    /// and line wins from the same grid do not credit.
    pub fn settle_spin(
        &mut self,
        result: &SpinResult,
        ticket: SpinTicket,
        config: &EngineConfig,
    ) -> Settlement {
        self.is_spinning = false;
        if ticket.free_spin {
            self.free_spins = self.free_spins.saturating_sub(1);
        }

        let mut jackpot_payout = None;
        let mut credited_win = 0.0;
        if result.is_jackpot && self.jackpot_active(config) {
            let payout = self.jackpot_pool;
            self.jackpot_pool = 0.0;
            self.balance += payout;
            self.last_win = payout;
            jackpot_payout = Some(payout);
            info!("jackpot hit, pool payout {payout:.2}");
        } else {
            if result.is_jackpot {
                // Pool below threshold: the symbols landed but the jackpot
                // is not live. Line wins still pay; the pool is untouched.
                warn!(
                    "jackpot symbols landed with pool {:.2} below threshold {:.2}, no payout",
                    self.jackpot_pool, config.jackpot_threshold
                );
            }
            credited_win = result.total_win;
            self.balance += credited_win;
            self.last_win = credited_win;
        }

        if result.free_spins_count > 0 {
            self.free_spins += result.free_spins_count;
            info!("{} free spins banked, now {}", result.free_spins_count, self.free_spins);
        }

        self.last_result = Some(result.clone());

        Settlement {
            total_win: credited_win,
            jackpot_payout,
            free_spins_granted: result.free_spins_count,
            balance: self.balance,
        }
    }

    /// Undo a started spin after a downstream failure: refund the stake and
    /// the pool contribution, release the spinning flag.
    pub(crate) fn abort_spin(&mut self, ticket: SpinTicket) {
        self.is_spinning = false;
        self.balance += ticket.total_bet;
        self.jackpot_pool -= ticket.pool_contribution;
    }

    /// Set the bet per line, clamped to the configured bounds. Rejected
    /// mid-spin. Returns the effective value.
    pub fn update_bet(&mut self, bet: f64, config: &EngineConfig) -> Result<f64, EngineError> {
        if self.is_spinning {
            return Err(EngineError::AlreadySpinning);
        }
        self.bet_per_line = bet.clamp(config.min_bet, config.max_bet);
        Ok(self.bet_per_line)
    }

    /// Set the active line count, clamped to the configured bounds.
    /// Rejected mid-spin. Returns the effective value.
    pub fn update_lines(&mut self, lines: u8, config: &EngineConfig) -> Result<u8, EngineError> {
        if self.is_spinning {
            return Err(EngineError::AlreadySpinning);
        }
        self.active_lines = lines.clamp(config.min_lines, config.max_lines);
        Ok(self.active_lines)
    }

    /// Toggle auto-play and return the new value.
    pub fn toggle_auto_play(&mut self) -> bool {
        self.auto_play = !self.auto_play;
        self.auto_play
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.auto_play = enabled;
    }

    /// Enable or disable admin mode. Gating is the caller's concern; the
    /// engine exposes this directly because it is an in-process library.
    pub fn set_admin_mode(&mut self, enabled: bool) {
        self.admin_mode = enabled;
        if !enabled {
            // Leaving admin mode must not leave test hooks armed.
            self.test_mode = false;
            self.forced_win = None;
        }
    }

    /// Enable or disable test mode. Admin only.
    pub fn set_test_mode(&mut self, enabled: bool) -> Result<(), EngineError> {
        if !self.admin_mode {
            return Err(EngineError::AdminRequired);
        }
        self.test_mode = enabled;
        if !enabled {
            self.forced_win = None;
        }
        Ok(())
    }

    /// Arm or clear a forced win for the next spin. Admin only, and only
    /// honored while test mode is on.
    pub fn set_forced_win(&mut self, win: Option<ForcedWin>) -> Result<(), EngineError> {
        if !self.admin_mode {
            return Err(EngineError::AdminRequired);
        }
        self.forced_win = win;
        Ok(())
    }

    /// Overwrite the balance. Admin only.
    pub fn set_balance(&mut self, balance: f64) -> Result<(), EngineError> {
        if !self.admin_mode {
            return Err(EngineError::AdminRequired);
        }
        self.balance = balance.max(0.0);
        Ok(())
    }

    /// Overwrite the jackpot pool. Admin only.
    pub fn set_jackpot_pool(&mut self, pool: f64) -> Result<(), EngineError> {
        if !self.admin_mode {
            return Err(EngineError::AdminRequired);
        }
        self.jackpot_pool = pool.max(0.0);
        Ok(())
    }

    /// Overwrite the banked free spins. Admin only.
    pub fn set_free_spins(&mut self, spins: u32) -> Result<(), EngineError> {
        if !self.admin_mode {
            return Err(EngineError::AdminRequired);
        }
        self.free_spins = spins;
        Ok(())
    }

    /// Take the armed forced win, leaving it cleared. One forced grid per
    /// arming.
    pub(crate) fn take_forced_win(&mut self) -> Option<ForcedWin> {
        self.forced_win.take()
    }

    /// Reset the session to configuration defaults. The jackpot pool,
    /// admin mode, and test mode survive; the pool belongs to the machine,
    /// not the session.
    pub fn reset(&mut self, config: &EngineConfig) {
        self.balance = config.starting_balance;
        self.bet_per_line = config.default_bet;
        self.active_lines = config.default_lines;
        self.free_spins = 0;
        self.last_win = 0.0;
        self.last_result = None;
        self.auto_play = false;
        self.is_spinning = false;
        self.forced_win = None;
        debug!("session reset, balance {:.2}", self.balance);
    }
}
