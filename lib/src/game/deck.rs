use crate::primitives::*;
use crate::util::*;
use rand::seq::SliceRandom;

/// Where a round's deck comes from. Dealing pops from the back, so the
/// front of the returned vector ends up as the kitty.
pub trait TDeckSource {
    fn deck(&mut self, n_decks: usize) -> Vec<ECard>;
}

#[derive(Debug, new)]
pub struct SShuffledDeckSource<Rng: rand::Rng> {
    rng: Rng,
}

impl<Rng: rand::Rng> TDeckSource for SShuffledDeckSource<Rng> {
    fn deck(&mut self, n_decks: usize) -> Vec<ECard> {
        let mut veccard = deck_cards(n_decks);
        veccard.shuffle(&mut self.rng);
        veccard
    }
}

/// Replays a predetermined deck. Intended for tests and replays.
#[derive(Debug, Clone, new)]
pub struct SStackedDeckSource {
    veccard: Vec<ECard>,
}

impl TDeckSource for SStackedDeckSource {
    fn deck(&mut self, n_decks: usize) -> Vec<ECard> {
        debug_verify_eq!(self.veccard.len(), n_decks*54);
        self.veccard.clone()
    }
}
