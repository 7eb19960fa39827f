//! crates/fal_core/src/selection.rs
//!
//! The shuffle/selection engine for card readings. A `Spread` owns the
//! available pool and the drawn set for one in-memory reading session; the
//! two are always disjoint and together equal the full catalog.

use crate::catalog;
use crate::domain::{Card, CardMeaning, DrawnCard, ReadingKind};
use rand::Rng;

/// Fixed tarot position labels, in draw order.
pub const TAROT_POSITIONS: [&str; 3] = ["Geçmiş", "Şimdiki Zaman", "Gelecek"];

/// Fixed Katina (Kelth Cross) position labels, in draw order.
pub const KATINA_POSITIONS: [&str; 10] = [
    "Hayat Kartı (Merkezin Kartı)",
    "Artı Kartı",
    "Risk Kartı",
    "Geçmiş Kartı",
    "Taç Kartı",
    "Gelecek Kartı",
    "Durum Kartı",
    "Evrenin Kartı",
    "İstek ve Beklentilerin Kartı",
    "Sonuç Kartı",
];

/// Per-draw probability of a Katina card coming up reversed.
pub const KATINA_REVERSAL_PROBABILITY: f64 = 0.12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("the spread already holds its full set of cards")]
    LimitExceeded,
    #[error("card '{0}' is not available in the pool")]
    DuplicateSelection(String),
    #[error("no drawn card at index {0}")]
    InvalidIndex(usize),
}

/// One reading's worth of selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct Spread {
    kind: ReadingKind,
    pool: Vec<Card>,
    drawn: Vec<DrawnCard>,
    /// For each drawn card, the pool slot it was taken from, so removal can
    /// put it back where it came from.
    slots: Vec<usize>,
}

impl Spread {
    /// A fresh tarot spread over the full 78-card deck.
    pub fn tarot() -> Self {
        Self::with_pool(ReadingKind::Tarot, catalog::tarot_catalog())
    }

    /// A fresh Katina spread over the full 65-card deck.
    pub fn katina() -> Self {
        Self::with_pool(ReadingKind::Katina, catalog::katina_catalog())
    }

    /// A spread over an arbitrary pool. Useful for tests.
    pub fn with_pool(kind: ReadingKind, pool: Vec<Card>) -> Self {
        Self {
            kind,
            pool,
            drawn: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn kind(&self) -> ReadingKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.kind.card_capacity()
    }

    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    pub fn drawn(&self) -> &[DrawnCard] {
        &self.drawn
    }

    pub fn is_complete(&self) -> bool {
        self.drawn.len() == self.capacity()
    }

    fn position_labels(&self) -> &'static [&'static str] {
        match self.kind {
            ReadingKind::Tarot => &TAROT_POSITIONS,
            ReadingKind::Katina => &KATINA_POSITIONS,
            ReadingKind::Dream => &[],
        }
    }

    /// Uniformly permutes the pool in place with an unbiased Fisher-Yates
    /// walk: for each index i from the last down to 1, swap with a uniform
    /// j in [0, i].
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.pool.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.pool.swap(i, j);
        }
    }

    /// Draws the named card from the pool, sampling the reversal flag for
    /// Katina spreads. Fails without touching state when the spread is full
    /// or the card has already been drawn.
    pub fn select<R: Rng>(&mut self, name: &str, rng: &mut R) -> Result<(), SelectionError> {
        let reversed =
            self.kind == ReadingKind::Katina && rng.gen_bool(KATINA_REVERSAL_PROBABILITY);
        self.take(name, reversed)
    }

    /// Draws the named card with an orientation already decided by the
    /// caller. The flag is ignored outside Katina spreads.
    pub fn select_prechosen(&mut self, name: &str, reversed: bool) -> Result<(), SelectionError> {
        self.take(name, reversed && self.kind == ReadingKind::Katina)
    }

    fn take(&mut self, name: &str, reversed: bool) -> Result<(), SelectionError> {
        if self.drawn.len() >= self.capacity() {
            return Err(SelectionError::LimitExceeded);
        }
        let slot = self
            .pool
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SelectionError::DuplicateSelection(name.to_string()))?;
        let card = self.pool.remove(slot);
        let position = self.position_labels()[self.drawn.len()];
        self.drawn.push(DrawnCard {
            card,
            position,
            reversed,
            meaning: None,
        });
        self.slots.push(slot);
        Ok(())
    }

    /// Returns the drawn card at `index` to the pool slot it came from,
    /// clearing its reversed flag, and re-labels the remaining drawn cards.
    pub fn remove(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.drawn.len() {
            return Err(SelectionError::InvalidIndex(index));
        }
        let drawn = self.drawn.remove(index);
        let slot = self.slots.remove(index);
        self.pool.insert(slot.min(self.pool.len()), drawn.card);
        let labels = self.position_labels();
        for (i, dc) in self.drawn.iter_mut().enumerate() {
            dc.position = labels[i];
        }
        Ok(())
    }

    /// Returns every drawn card to the pool, clearing reversed flags.
    pub fn reset(&mut self) {
        while !self.drawn.is_empty() {
            let last = self.drawn.len() - 1;
            // Cannot fail: the index is in range.
            let _ = self.remove(last);
        }
    }

    /// Attaches meaning texts to the drawn cards via a lookup keyed by card
    /// name. Cards without an entry keep `None` and degrade in the prompt.
    pub fn annotate_meanings<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<CardMeaning>,
    {
        for dc in &mut self.drawn {
            dc.meaning = lookup(&dc.card.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn tiny_pool(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card {
                name: format!("card-{i}"),
                suit: None,
                image: format!("/images/test/{i}.png"),
            })
            .collect()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [1usize, 2, 10, 78] {
            let mut spread = Spread::with_pool(ReadingKind::Tarot, tiny_pool(n));
            let before: HashSet<String> =
                spread.pool().iter().map(|c| c.name.clone()).collect();
            spread.shuffle(&mut rng);
            assert_eq!(spread.pool().len(), n);
            let after: HashSet<String> =
                spread.pool().iter().map(|c| c.name.clone()).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn shuffle_positions_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 10;
        let trials = 2000;
        let mut counts = vec![0u32; n];
        for _ in 0..trials {
            let mut spread = Spread::with_pool(ReadingKind::Tarot, tiny_pool(n));
            spread.shuffle(&mut rng);
            let pos = spread
                .pool()
                .iter()
                .position(|c| c.name == "card-0")
                .unwrap();
            counts[pos] += 1;
        }
        // Expected 200 per slot; allow a generous statistical margin.
        for (pos, &count) in counts.iter().enumerate() {
            assert!(
                (120..=280).contains(&count),
                "position {pos} hit {count} times out of {trials}"
            );
        }
    }

    #[test]
    fn select_then_remove_round_trips() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut spread = Spread::tarot();
        spread.shuffle(&mut rng);
        let snapshot = spread.clone();
        let picked = spread.pool()[5].name.clone();

        spread.select(&picked, &mut rng).unwrap();
        assert_eq!(spread.drawn().len(), 1);
        assert_eq!(spread.drawn()[0].position, "Geçmiş");
        assert_eq!(spread.pool().len(), 77);

        spread.remove(0).unwrap();
        assert_eq!(spread, snapshot);
    }

    #[test]
    fn katina_removal_clears_the_reversed_flag() {
        let mut spread = Spread::katina();
        let name = spread.pool()[0].name.clone();
        spread.select_prechosen(&name, true).unwrap();
        assert!(spread.drawn()[0].reversed);
        spread.remove(0).unwrap();
        let back = spread.pool().iter().find(|c| c.name == name);
        assert!(back.is_some());
        assert!(spread.drawn().is_empty());
    }

    #[test]
    fn overdraw_fails_and_leaves_state_unchanged() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut spread = Spread::tarot();
        for i in 0..3 {
            let name = spread.pool()[i].name.clone();
            spread.select(&name, &mut rng).unwrap();
        }
        assert!(spread.is_complete());
        let snapshot = spread.clone();
        let fourth = spread.pool()[0].name.clone();
        assert_eq!(
            spread.select(&fourth, &mut rng),
            Err(SelectionError::LimitExceeded)
        );
        assert_eq!(spread, snapshot);

        let mut katina = Spread::katina();
        for i in 0..10 {
            let name = katina.pool()[i].name.clone();
            katina.select(&name, &mut rng).unwrap();
        }
        let eleventh = katina.pool()[0].name.clone();
        assert_eq!(
            katina.select(&eleventh, &mut rng),
            Err(SelectionError::LimitExceeded)
        );
    }

    #[test]
    fn drawing_the_same_card_twice_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut spread = Spread::tarot();
        let name = spread.pool()[0].name.clone();
        spread.select(&name, &mut rng).unwrap();
        assert_eq!(
            spread.select(&name, &mut rng),
            Err(SelectionError::DuplicateSelection(name))
        );
    }

    #[test]
    fn removal_relabels_and_compacts() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut spread = Spread::tarot();
        let names: Vec<String> = spread.pool()[..3].iter().map(|c| c.name.clone()).collect();
        for name in &names {
            spread.select(name, &mut rng).unwrap();
        }
        spread.remove(0).unwrap();
        assert_eq!(spread.drawn().len(), 2);
        assert_eq!(spread.drawn()[0].card.name, names[1]);
        assert_eq!(spread.drawn()[0].position, "Geçmiş");
        assert_eq!(spread.drawn()[1].position, "Şimdiki Zaman");
    }

    #[test]
    fn reset_restores_the_full_pool() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut spread = Spread::katina();
        let snapshot = spread.clone();
        for i in [0usize, 4, 8] {
            let name = spread.pool()[i].name.clone();
            spread.select(&name, &mut rng).unwrap();
        }
        spread.reset();
        assert_eq!(spread, snapshot);
        assert_eq!(spread.pool().len(), 65);
    }

    #[test]
    fn katina_positions_follow_the_fixed_order() {
        let mut spread = Spread::katina();
        let names: Vec<String> = spread.pool()[..10].iter().map(|c| c.name.clone()).collect();
        for name in &names {
            spread.select_prechosen(name, false).unwrap();
        }
        for (dc, expected) in spread.drawn().iter().zip(KATINA_POSITIONS) {
            assert_eq!(dc.position, expected);
        }
    }
}
