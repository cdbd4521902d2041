use crate::primitives::*;
use crate::rules::matcher::{SCardCounts, SMatcher, VMatch};
use crate::rules::play::SPlay;
use crate::util::*;

/// The distinct cards a player may still add to a partial selection without
/// making a legal completion impossible. Drives incremental selection UIs;
/// the authoritative check remains the play validation itself.
pub fn selectable_cards(
    hand: &SHand,
    slccard_selected: &[ECard],
    oslcplay_lead: Option<&[SPlay]>,
    declared: SDeclaredCard,
    b_wraparound: bool,
) -> Vec<ECard> {
    let cardcounts_selected = SCardCounts::new_from_cards(slccard_selected.iter().copied());
    let fn_remaining = |card: ECard| hand.count(card).saturating_sub(cardcounts_selected.count(card));
    let slcplay_lead = match oslcplay_lead {
        None => {
            // leading: anything goes until the first pick fixes the suit
            let veccard = match slccard_selected.first() {
                None => hand.cards().to_vec(),
                Some(&card_fst) => hand.cards_of_suit(trump_or_suit(card_fst, declared), declared),
            };
            return dedup_sorted(
                veccard.into_iter().filter(|&card| 0 < fn_remaining(card)),
                declared,
            );
        },
        Some(slcplay_lead) => slcplay_lead,
    };
    let n_trick_size: usize = slcplay_lead.iter().map(|play| play.size()).sum();
    if slccard_selected.len() >= n_trick_size {
        return Vec::new();
    }
    let trumporsuit_lead = match slcplay_lead.first() {
        Some(play) => play.trump_or_suit(declared),
        None => return Vec::new(),
    };
    let veccard_suited = hand.cards_of_suit(trumporsuit_lead, declared);
    if veccard_suited.len() > n_trick_size {
        // the whole submission must be suited here, so an off-suit pick
        // cannot be completed
        if slccard_selected.iter().any(|&card| trump_or_suit(card, declared) != trumporsuit_lead) {
            return Vec::new();
        }
        let matcher = SMatcher::new_from_hand(&veccard_suited, declared, b_wraparound);
        let mut veccard_out = Vec::new();
        for vecmatch in matcher.possibilities(slcplay_lead) {
            // assign the selection to the concrete melds first; every excess
            // selected card uses up one placeholder
            let mut cardcounts_concrete = SCardCounts::new();
            let mut n_placeholders = 0;
            for match_ in &vecmatch {
                match match_ {
                    VMatch::Placeholder => n_placeholders += 1,
                    VMatch::Play(play) => {
                        for card in unwrap!(play.expand(declared, b_wraparound)) {
                            cardcounts_concrete.add(card, 1);
                        }
                    },
                }
            }
            let n_excess: usize = cardcounts_selected.cards_with_counts()
                .map(|(card, n_selected)| n_selected.saturating_sub(cardcounts_concrete.count(card)))
                .sum();
            if n_excess > n_placeholders {
                continue; // selection incompatible with this possibility
            }
            for (card, n_concrete) in cardcounts_concrete.cards_with_counts() {
                if cardcounts_selected.count(card) < n_concrete {
                    veccard_out.push(card);
                }
            }
            if n_excess < n_placeholders {
                veccard_out.extend(
                    veccard_suited.iter().copied().filter(|&card| 0 < fn_remaining(card))
                );
            }
        }
        dedup_sorted(veccard_out.into_iter(), declared)
    } else {
        // short suit: all suited cards must go, filler covers the shortfall
        let n_shortfall = n_trick_size - veccard_suited.len();
        let n_selected_offsuit = slccard_selected.iter()
            .filter(|&&card| trump_or_suit(card, declared) != trumporsuit_lead)
            .count();
        let mut veccard_out: Vec<ECard> = veccard_suited.iter()
            .copied()
            .filter(|&card| 0 < fn_remaining(card))
            .collect();
        if n_selected_offsuit < n_shortfall {
            veccard_out.extend(
                hand.cards().iter()
                    .copied()
                    .filter(|&card| trump_or_suit(card, declared) != trumporsuit_lead)
                    .filter(|&card| 0 < fn_remaining(card))
            );
        }
        dedup_sorted(veccard_out.into_iter(), declared)
    }
}

fn dedup_sorted(itcard: impl Iterator<Item=ECard>, declared: SDeclaredCard) -> Vec<ECard> {
    let mut veccard: Vec<ECard> = itcard.collect();
    sort_cards(&mut veccard, declared);
    veccard.dedup();
    veccard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(str_card: &str) -> ECard {
        unwrap!(str_card.parse())
    }
    fn cards(slcstr: &[&str]) -> Vec<ECard> {
        slcstr.iter().map(|str_card| card(str_card)).collect()
    }
    fn declared(str_card: &str) -> SDeclaredCard {
        unwrap!(SDeclaredCard::from_card(card(str_card)))
    }
    fn play(str_card: &str, n_multiplicity: usize, n_length: usize) -> SPlay {
        unwrap!(SPlay::new(card(str_card), n_multiplicity, n_length))
    }

    #[test]
    fn test_leading() {
        let declared = declared("2S");
        let hand = SHand::new_from_vec(cards(&["3C", "3C", "7H", "SJ"]));
        assert_eq!(
            selectable_cards(&hand, &[], None, declared, true),
            cards(&["7H", "3C", "SJ"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["3C"]), None, declared, true),
            cards(&["3C"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["7H"]), None, declared, true),
            Vec::<ECard>::new(),
        );
    }

    #[test]
    fn test_following_long_suit_must_keep_pair() {
        let declared = declared("2S");
        let hand = SHand::new_from_vec(cards(&["3C", "3C", "4C", "9H"]));
        let lead = [play("7C", 2, 1)];
        // three clubs against a two-card lead: the pair must be served
        assert_eq!(
            selectable_cards(&hand, &[], Some(&lead), declared, true),
            cards(&["3C"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["3C"]), Some(&lead), declared, true),
            cards(&["3C"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["3C", "3C"]), Some(&lead), declared, true),
            Vec::<ECard>::new(),
        );
    }

    #[test]
    fn test_following_long_suit_placeholders() {
        let declared = declared("2S");
        let hand = SHand::new_from_vec(cards(&["3C", "4C", "5C"]));
        let lead = [play("7C", 2, 1)];
        // no pair available: any two clubs
        assert_eq!(
            selectable_cards(&hand, &[], Some(&lead), declared, true),
            cards(&["3C", "4C", "5C"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["4C"]), Some(&lead), declared, true),
            cards(&["3C", "5C"]),
        );
    }

    #[test]
    fn test_following_long_suit_mixed_shape() {
        let declared = declared("2S");
        let hand = SHand::new_from_vec(cards(&["3C", "3C", "4C", "5C", "6C"]));
        let lead = [play("9C", 2, 1), play("QC", 1, 1)];
        // selecting into the placeholder keeps everything else open
        assert_eq!(
            selectable_cards(&hand, &cards(&["3C"]), Some(&lead), declared, true),
            cards(&["3C", "4C", "5C", "6C"]),
        );
        // the placeholder is used up, only the pair remains
        assert_eq!(
            selectable_cards(&hand, &cards(&["4C"]), Some(&lead), declared, true),
            cards(&["3C"]),
        );
    }

    #[test]
    fn test_following_short_suit() {
        let declared = declared("2S");
        let hand = SHand::new_from_vec(cards(&["7C", "8H", "9D"]));
        let lead = [play("4C", 2, 1)];
        assert_eq!(
            selectable_cards(&hand, &[], Some(&lead), declared, true),
            cards(&["8H", "9D", "7C"]),
        );
        // filler quota reached: only the suited card remains
        assert_eq!(
            selectable_cards(&hand, &cards(&["8H"]), Some(&lead), declared, true),
            cards(&["7C"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["7C"]), Some(&lead), declared, true),
            cards(&["8H", "9D"]),
        );
        assert_eq!(
            selectable_cards(&hand, &cards(&["7C", "8H"]), Some(&lead), declared, true),
            Vec::<ECard>::new(),
        );
    }
}
