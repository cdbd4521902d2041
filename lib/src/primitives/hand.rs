use crate::primitives::card::*;
use crate::util::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A player's hand. Cards are kept as a plain vector since Tractor hands are
/// multisets (multiple physical decks).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SHand {
    veccard: Vec<ECard>,
}

impl SHand {
    pub fn new_from_vec(veccard: Vec<ECard>) -> SHand {
        SHand{veccard}
    }

    pub fn cards(&self) -> &[ECard] {
        &self.veccard
    }

    pub fn len(&self) -> usize {
        self.veccard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.veccard.is_empty()
    }

    pub fn count(&self, card: ECard) -> usize {
        self.veccard.iter().filter(|&&card_hand| card_hand==card).count()
    }

    pub fn add_card(&mut self, card: ECard) {
        self.veccard.push(card);
    }

    /// Removes one copy of each card in `slccard`, multiset-wise.
    /// Fails without modifying the hand if any copy is missing.
    pub fn remove_cards(&mut self, slccard: &[ECard]) -> Result<(), Error> {
        if !self.contains_all(slccard) {
            bail!("Cards not in hand: {}", slccard.iter().join(" "));
        }
        for &card in slccard {
            let i_card = unwrap!(self.veccard.iter().position(|&card_hand| card_hand==card));
            self.veccard.swap_remove(i_card);
        }
        Ok(())
    }

    /// Multiset containment: each card of `slccard` must occur in the hand
    /// at least as often as in `slccard`.
    pub fn contains_all(&self, slccard: &[ECard]) -> bool {
        slccard.iter().unique().all(|&card| {
            self.count(card) >= slccard.iter().filter(|&&card_other| card_other==card).count()
        })
    }

    pub fn cards_of_suit(&self, trumporsuit: VTrumpOrSuit, declared: SDeclaredCard) -> Vec<ECard> {
        self.veccard.iter()
            .copied()
            .filter(|&card| trump_or_suit(card, declared)==trumporsuit)
            .collect()
    }

    pub fn sort(&mut self, declared: SDeclaredCard) {
        sort_cards(&mut self.veccard, declared);
    }
}
