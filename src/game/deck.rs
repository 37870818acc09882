use super::party::Party;
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::iter::repeat;

/// Number of liberal policy cards in the full deck.
pub const NUM_LIBERAL_POLICIES: usize = 6;
/// Number of fascist policy cards in the full deck.
pub const NUM_FASCIST_POLICIES: usize = 11;
/// Total number of policy cards in the game.
pub const DECK_SIZE: usize = NUM_LIBERAL_POLICIES + NUM_FASCIST_POLICIES;

/// The policy draw pile. The top of the deck is the end of the vector.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct PolicyDeck {
    deck: Vec<Party>,
}

impl PolicyDeck {
    /// Creates a deck with the given cards, bottom first.
    pub fn new(deck: Vec<Party>) -> Self {
        Self { deck }
    }

    /// Creates a full deck in uniformly random order.
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        Self::rebuilt(0, 0, rng)
    }

    /// Shuffles every policy not yet enacted into a fresh deck.
    fn rebuilt(lib_enacted: usize, fas_enacted: usize, rng: &mut impl Rng) -> Self {
        let mut deck = Vec::with_capacity(DECK_SIZE);
        deck.extend(repeat(Party::Liberal).take(NUM_LIBERAL_POLICIES - lib_enacted));
        deck.extend(repeat(Party::Fascist).take(NUM_FASCIST_POLICIES - fas_enacted));
        deck.shuffle(rng);
        Self { deck }
    }

    /// Removes `n` cards from the top, rebuilding the deck from all unenacted
    /// policies first if fewer than `n` remain. Returns the cards in draw
    /// order along with the deck they leave behind.
    pub fn draw(
        &self,
        lib_enacted: usize,
        fas_enacted: usize,
        n: usize,
        rng: &mut impl Rng,
    ) -> (Vec<Party>, PolicyDeck) {
        let mut new_deck = if self.len() < n {
            Self::rebuilt(lib_enacted, fas_enacted, rng)
        } else {
            self.clone()
        };
        let drawn = (0..n).map(|_| new_deck.deck.pop().unwrap()).collect();
        (drawn, new_deck)
    }

    /// Like [`PolicyDeck::draw`], except the cards are reinstalled on top in
    /// their original order.
    pub fn peek(
        &self,
        lib_enacted: usize,
        fas_enacted: usize,
        n: usize,
        rng: &mut impl Rng,
    ) -> (Vec<Party>, PolicyDeck) {
        let (cards, mut new_deck) = self.draw(lib_enacted, fas_enacted, n, rng);
        new_deck.deck.extend(cards.iter().rev());
        (cards, new_deck)
    }

    /// The number of cards of the given party in the draw pile.
    pub fn count(&self, party: Party) -> usize {
        self.deck.iter().filter(|p| **p == party).count()
    }

    /// The number of cards in the draw pile.
    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    /// The cards in the draw pile, bottom first.
    pub fn cards(&self) -> &[Party] {
        &self.deck
    }
}
