//! Symbol catalog: the closed set of reel symbols and their draw weights

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Closed enumeration of every symbol the engine knows about.
///
/// Low-pay card ranks, high-pay fruit, and the four specials. There is no
/// string-keyed lookup anywhere: a symbol id that exists at compile time
/// either has a catalog entry or the catalog is misconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolId {
    // High-pay fruit (Cherry lowest, Melon highest)
    Cherry,
    Lemon,
    Orange,
    Plum,
    Grape,
    Melon,
    // Low-pay card ranks
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    // Specials
    Wild,
    Scatter,
    Bonus,
    Jackpot,
}

impl SymbolId {
    /// Every symbol id in catalog order.
    pub const ALL: [SymbolId; 15] = [
        SymbolId::Cherry,
        SymbolId::Lemon,
        SymbolId::Orange,
        SymbolId::Plum,
        SymbolId::Grape,
        SymbolId::Melon,
        SymbolId::Ten,
        SymbolId::Jack,
        SymbolId::Queen,
        SymbolId::King,
        SymbolId::Ace,
        SymbolId::Wild,
        SymbolId::Scatter,
        SymbolId::Bonus,
        SymbolId::Jackpot,
    ];

    /// Display name for UI and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SymbolId::Cherry => "Cherry",
            SymbolId::Lemon => "Lemon",
            SymbolId::Orange => "Orange",
            SymbolId::Plum => "Plum",
            SymbolId::Grape => "Grape",
            SymbolId::Melon => "Melon",
            SymbolId::Ten => "Ten",
            SymbolId::Jack => "Jack",
            SymbolId::Queen => "Queen",
            SymbolId::King => "King",
            SymbolId::Ace => "Ace",
            SymbolId::Wild => "Wild",
            SymbolId::Scatter => "Scatter",
            SymbolId::Bonus => "Bonus",
            SymbolId::Jackpot => "Jackpot",
        }
    }
}

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular,
    /// Substitutes for any regular symbol when extending a run
    Wild,
    /// Triggers free spins by count, position-independent
    Scatter,
    /// Triggers the bonus round by count
    Bonus,
    /// Pays the progressive pool, never the paytable
    Jackpot,
}

/// A symbol definition: immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol id
    pub id: SymbolId,
    /// Classification
    pub kind: SymbolKind,
    /// Payout weight, multiplied by bet and the payout curve on a win
    pub display_value: f64,
    /// Relative probability mass for the weighted draw
    pub draw_weight: f64,
}

impl Symbol {
    /// Create a regular paying symbol
    pub fn regular(id: SymbolId, display_value: f64, draw_weight: f64) -> Self {
        Self {
            id,
            kind: SymbolKind::Regular,
            display_value,
            draw_weight,
        }
    }

    /// Create a special symbol
    pub fn special(id: SymbolId, kind: SymbolKind, display_value: f64, draw_weight: f64) -> Self {
        Self {
            id,
            kind,
            display_value,
            draw_weight,
        }
    }

    /// Check if this is a special symbol (wild, scatter, bonus, jackpot)
    pub fn is_special(&self) -> bool {
        !matches!(self.kind, SymbolKind::Regular)
    }
}

/// Ordered symbol table used for lookup and weighted sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
}

impl SymbolCatalog {
    /// Build a catalog from an explicit symbol list. Order is preserved and
    /// governs the cumulative-weight sampling order.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// The standard catalog: six fruit, five card ranks, four specials.
    pub fn standard() -> Self {
        Self::new(vec![
            Symbol::regular(SymbolId::Cherry, 5.0, 20.0),
            Symbol::regular(SymbolId::Lemon, 6.0, 18.0),
            Symbol::regular(SymbolId::Orange, 7.0, 16.0),
            Symbol::regular(SymbolId::Plum, 8.0, 14.0),
            Symbol::regular(SymbolId::Grape, 9.0, 12.0),
            Symbol::regular(SymbolId::Melon, 10.0, 10.0),
            Symbol::regular(SymbolId::Ten, 2.0, 15.0),
            Symbol::regular(SymbolId::Jack, 2.0, 15.0),
            Symbol::regular(SymbolId::Queen, 2.0, 15.0),
            Symbol::regular(SymbolId::King, 2.0, 15.0),
            Symbol::regular(SymbolId::Ace, 2.0, 15.0),
            Symbol::special(SymbolId::Wild, SymbolKind::Wild, 20.0, 4.0),
            Symbol::special(SymbolId::Scatter, SymbolKind::Scatter, 0.0, 3.0),
            Symbol::special(SymbolId::Bonus, SymbolKind::Bonus, 0.0, 1.0),
            Symbol::special(SymbolId::Jackpot, SymbolKind::Jackpot, 0.0, 0.5),
        ])
    }

    /// Look up a symbol by id. A missing id is a data-integrity bug and is
    /// surfaced as `UnknownSymbol`, never silently substituted.
    pub fn get(&self, id: SymbolId) -> Result<&Symbol, EngineError> {
        self.symbols
            .iter()
            .find(|s| s.id == id)
            .ok_or(EngineError::UnknownSymbol(id))
    }

    /// All symbols in stable catalog order.
    pub fn all(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Sum of all draw weights.
    pub fn total_weight(&self) -> f64 {
        self.symbols.iter().map(|s| s.draw_weight).sum()
    }

    /// Check whether an id is registered.
    pub fn contains(&self, id: SymbolId) -> bool {
        self.symbols.iter().any(|s| s.id == id)
    }

    /// Ids of all regular paying symbols, catalog order.
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .map(|s| s.id)
            .collect()
    }

    /// The lowest-paying regular symbol (used for forced regular wins).
    pub fn lowest_regular(&self) -> Option<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .min_by(|a, b| a.display_value.total_cmp(&b.display_value))
            .map(|s| s.id)
    }

    /// The highest-paying regular symbol (used for forced big wins).
    pub fn highest_regular(&self) -> Option<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .max_by(|a, b| a.display_value.total_cmp(&b.display_value))
            .map(|s| s.id)
    }

    /// First symbol of a given kind, if present.
    pub fn find_kind(&self, kind: SymbolKind) -> Option<SymbolId> {
        self.symbols.iter().find(|s| s.kind == kind).map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_lookup() {
        let catalog = SymbolCatalog::standard();
        let melon = catalog.get(SymbolId::Melon).unwrap();
        assert_eq!(melon.display_value, 10.0);
        assert_eq!(melon.kind, SymbolKind::Regular);
        assert!(catalog.get(SymbolId::Wild).unwrap().is_special());
    }

    #[test]
    fn test_unknown_symbol_surfaces() {
        // A catalog missing the jackpot symbol must fail loudly on lookup.
        let catalog = SymbolCatalog::new(vec![Symbol::regular(SymbolId::Cherry, 5.0, 1.0)]);
        assert_eq!(
            catalog.get(SymbolId::Jackpot),
            Err(EngineError::UnknownSymbol(SymbolId::Jackpot))
        );
    }

    #[test]
    fn test_total_weight() {
        let catalog = SymbolCatalog::standard();
        assert!((catalog.total_weight() - 173.5).abs() < 1e-9);
    }

    #[test]
    fn test_value_extremes() {
        let catalog = SymbolCatalog::standard();
        assert_eq!(catalog.highest_regular(), Some(SymbolId::Melon));
        // Ties on 2.0 resolve to the first card rank in catalog order.
        assert_eq!(catalog.lowest_regular(), Some(SymbolId::Ten));
    }
}
