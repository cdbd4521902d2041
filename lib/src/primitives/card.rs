use crate::util::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp::Ordering, fmt, str::FromStr};

plain_enum_mod!(modesuit, derive(Hash,), map_derive(), ESuit {
    Spades, Hearts, Diamonds, Clubs,
});

impl ESuit {
    pub fn letter(self) -> char {
        match self {
            ESuit::Spades => 'S',
            ESuit::Hearts => 'H',
            ESuit::Diamonds => 'D',
            ESuit::Clubs => 'C',
        }
    }
    fn from_letter(ch_suit: char) -> Option<ESuit> {
        ESuit::values().find(|esuit| esuit.letter()==ch_suit)
    }
}

impl fmt::Display for ESuit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

plain_enum_mod!(moderank, derive(Hash,), map_derive(), ERank {
    Two, Three, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
});

impl ERank {
    pub fn text(self) -> &'static str {
        match self {
            ERank::Two => "2",
            ERank::Three => "3",
            ERank::Four => "4",
            ERank::Five => "5",
            ERank::Six => "6",
            ERank::Seven => "7",
            ERank::Eight => "8",
            ERank::Nine => "9",
            ERank::Ten => "10",
            ERank::Jack => "J",
            ERank::Queen => "Q",
            ERank::King => "K",
            ERank::Ace => "A",
        }
    }
    fn from_text(str_rank: &str) -> Option<ERank> {
        ERank::values().find(|erank| erank.text()==str_rank)
    }
}

impl fmt::Display for ERank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl Serialize for ERank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

impl<'de> Deserialize<'de> for ERank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let str_rank = String::deserialize(deserializer)?;
        ERank::from_text(&str_rank)
            .ok_or_else(|| de::Error::custom(format!("Invalid rank: {}", str_rank)))
    }
}

plain_enum_mod!(modejoker, derive(Hash,), map_derive(), EJoker {
    Small, Big,
});

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum ECard {
    Suited(ERank, ESuit),
    Joker(EJoker),
}

impl ECard {
    pub fn new(erank: ERank, esuit: ESuit) -> ECard {
        ECard::Suited(erank, esuit)
    }

    // Position within the rank sequence 2..A, small joker, big joker.
    // Only meaningful for comparisons within one raw suit.
    pub fn rank_index(self) -> usize {
        match self {
            ECard::Suited(erank, _esuit) => erank.to_usize(),
            ECard::Joker(EJoker::Small) => ERank::SIZE,
            ECard::Joker(EJoker::Big) => ERank::SIZE+1,
        }
    }
}

impl fmt::Display for ECard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ECard::Suited(erank, esuit) => write!(f, "{}{}", erank, esuit),
            ECard::Joker(EJoker::Small) => write!(f, "SJ"),
            ECard::Joker(EJoker::Big) => write!(f, "BJ"),
        }
    }
}

impl fmt::Debug for ECard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for ECard {
    type Err = &'static str;
    fn from_str(str_card: &str) -> Result<Self, Self::Err> {
        match str_card {
            "SJ" => return Ok(ECard::Joker(EJoker::Small)),
            "BJ" => return Ok(ECard::Joker(EJoker::Big)),
            _ => {},
        }
        let (str_rank, str_suit) = str_card.split_at(str_card.len().checked_sub(1).ok_or("Empty card string")?);
        let erank = ERank::from_text(str_rank).ok_or("Invalid rank")?;
        let esuit = str_suit.chars().next()
            .and_then(ESuit::from_letter)
            .ok_or("Invalid suit")?;
        Ok(ECard::Suited(erank, esuit))
    }
}

impl Serialize for ECard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ECard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let str_card = String::deserialize(deserializer)?;
        str_card.parse().map_err(de::Error::custom)
    }
}

pub fn points_card(card: ECard) -> isize {
    match card {
        ECard::Suited(ERank::Five, _esuit) => 5,
        ECard::Suited(ERank::Ten, _esuit) | ECard::Suited(ERank::King, _esuit) => 10,
        _ => 0,
    }
}

/// The card that fixes trump rank and trump suit for a round. Jokers cannot
/// be declared, so this is always a suited card.
#[derive(Copy, Clone, PartialEq, Eq, Hash, new)]
pub struct SDeclaredCard {
    pub erank: ERank,
    pub esuit: ESuit,
}

impl SDeclaredCard {
    pub fn from_card(card: ECard) -> Option<SDeclaredCard> {
        match card {
            ECard::Suited(erank, esuit) => Some(SDeclaredCard::new(erank, esuit)),
            ECard::Joker(_ejoker) => None,
        }
    }
    pub fn card(self) -> ECard {
        ECard::Suited(self.erank, self.esuit)
    }
}

impl fmt::Display for SDeclaredCard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.card())
    }
}

impl fmt::Debug for SDeclaredCard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.card())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum VTrumpOrSuit {
    Trump,
    Suit(ESuit),
}

pub fn trump_or_suit(card: ECard, declared: SDeclaredCard) -> VTrumpOrSuit {
    match card {
        ECard::Joker(_ejoker) => VTrumpOrSuit::Trump,
        ECard::Suited(erank, esuit) => {
            if esuit==declared.esuit || erank==declared.erank {
                VTrumpOrSuit::Trump
            } else {
                VTrumpOrSuit::Suit(esuit)
            }
        },
    }
}

// Strength layer within trump: big joker, small joker, the declared card
// itself, declared-rank cards of the other suits, then the declared suit
// by rank.
fn trump_level(card: ECard, declared: SDeclaredCard) -> Option<usize> {
    match card {
        ECard::Joker(EJoker::Big) => Some(4),
        ECard::Joker(EJoker::Small) => Some(3),
        ECard::Suited(erank, esuit) => {
            if erank==declared.erank {
                Some(if esuit==declared.esuit {2} else {1})
            } else if esuit==declared.esuit {
                Some(0)
            } else {
                None
            }
        },
    }
}

/// Compares two cards, `None` meaning they are incomparable (their suits
/// differ for legality purposes). Without a declared card only same-raw-suit
/// cards compare.
pub fn compare_cards(card_fst: ECard, card_snd: ECard, odeclared: Option<SDeclaredCard>) -> Option<Ordering> {
    if let Some(declared) = odeclared {
        match (trump_level(card_fst, declared), trump_level(card_snd, declared)) {
            (Some(n_level_fst), Some(n_level_snd)) => Some(
                n_level_fst.cmp(&n_level_snd).then_with(|| {
                    if n_level_fst==0 {
                        card_fst.rank_index().cmp(&card_snd.rank_index())
                    } else {
                        // declared-rank cards of different plain suits tie
                        Ordering::Equal
                    }
                })
            ),
            (Some(_), None) | (None, Some(_)) => None,
            (None, None) => compare_cards(card_fst, card_snd, /*odeclared*/None),
        }
    } else {
        match (card_fst, card_snd) {
            (ECard::Suited(_, esuit_fst), ECard::Suited(_, esuit_snd)) if esuit_fst==esuit_snd =>
                Some(card_fst.rank_index().cmp(&card_snd.rank_index())),
            (ECard::Joker(_), ECard::Joker(_)) =>
                Some(card_fst.rank_index().cmp(&card_snd.rank_index())),
            (_, _) => None,
        }
    }
}

/// The next card in a tractor chain, or `None` at the chain's end.
/// `b_wrap` permits the Ace wraparound and must only be passed for a
/// chain's first step.
pub fn next_in_chain(card: ECard, declared: SDeclaredCard, b_wrap: bool) -> Option<ECard> {
    match card {
        ECard::Joker(EJoker::Small) => Some(ECard::Joker(EJoker::Big)),
        ECard::Joker(EJoker::Big) => None,
        ECard::Suited(erank, esuit) => {
            if card==declared.card() {
                return Some(ECard::Joker(EJoker::Small));
            }
            if erank==declared.erank {
                return None; // no tractors across the declared rank of other suits
            }
            if erank==ERank::Ace {
                return if_then_some!(b_wrap, ECard::Suited(
                    if declared.erank==ERank::Two {ERank::Three} else {ERank::Two},
                    esuit,
                ));
            }
            if erank==ERank::King && declared.erank==ERank::Ace {
                return None;
            }
            let erank_next = unwrap!(ERank::checked_from_usize(erank.to_usize()+1));
            Some(ECard::Suited(
                if erank_next==declared.erank {
                    unwrap!(ERank::checked_from_usize(erank.to_usize()+2))
                } else {
                    erank_next
                },
                esuit,
            ))
        },
    }
}

/// Walks `n_steps` chain steps from `card`. Wraparound, if enabled at all,
/// only applies on the very first step.
pub fn chain_successor(card: ECard, declared: SDeclaredCard, b_wraparound: bool, n_steps: usize) -> Option<ECard> {
    let mut card_cur = card;
    for i_step in 0..n_steps {
        card_cur = next_in_chain(card_cur, declared, /*b_wrap*/b_wraparound && i_step==0)?;
    }
    Some(card_cur)
}

// Sort key grouping plain suits first, trump last, ascending in strength
// within each group.
pub fn sort_key(card: ECard, declared: SDeclaredCard) -> (usize, usize, usize) {
    match trump_level(card, declared) {
        None => {
            let esuit = match card {
                ECard::Suited(_erank, esuit) => esuit,
                ECard::Joker(_ejoker) => unreachable!("jokers are trump"),
            };
            (esuit.to_usize(), 0, card.rank_index())
        },
        Some(n_level) => (ESuit::SIZE, n_level, card.rank_index()),
    }
}

pub fn sort_cards(slccard: &mut [ECard], declared: SDeclaredCard) {
    slccard.sort_unstable_by_key(|&card| sort_key(card, declared));
}

/// All cards of `n_decks` physical decks, in canonical (unshuffled) order.
pub fn deck_cards(n_decks: usize) -> Vec<ECard> {
    let mut veccard = Vec::with_capacity(n_decks*54);
    for _i_deck in 0..n_decks {
        for esuit in ESuit::values() {
            for erank in ERank::values() {
                veccard.push(ECard::Suited(erank, esuit));
            }
        }
        veccard.push(ECard::Joker(EJoker::Small));
        veccard.push(ECard::Joker(EJoker::Big));
    }
    veccard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(str_card: &str) -> ECard {
        unwrap!(str_card.parse())
    }

    #[test]
    fn test_parse_display_roundtrip() {
        for card in deck_cards(1) {
            assert_eq!(card, unwrap!(card.to_string().parse::<ECard>()));
        }
        assert_eq!(card("10S"), ECard::new(ERank::Ten, ESuit::Spades));
        assert_eq!(card("SJ"), ECard::Joker(EJoker::Small));
        assert!("".parse::<ECard>().is_err());
        assert!("11S".parse::<ECard>().is_err());
        assert!("3X".parse::<ECard>().is_err());
    }

    #[test]
    fn test_rank_serialization() {
        assert_eq!(unwrap!(serde_json::to_string(&ERank::Ten)), r#""10""#);
        assert_eq!(unwrap!(serde_json::to_string(&ERank::Ace)), r#""A""#);
        for erank in ERank::values() {
            assert_eq!(
                unwrap!(serde_json::from_str::<ERank>(&unwrap!(serde_json::to_string(&erank)))),
                erank,
            );
        }
        assert!(serde_json::from_str::<ERank>(r#""1""#).is_err());
    }

    #[test]
    fn test_points() {
        assert_eq!(points_card(card("5H")), 5);
        assert_eq!(points_card(card("10D")), 10);
        assert_eq!(points_card(card("KS")), 10);
        assert_eq!(points_card(card("AC")), 0);
        assert_eq!(points_card(card("BJ")), 0);
        assert_eq!(deck_cards(1).into_iter().map(points_card).sum::<isize>(), 100);
    }

    #[test]
    fn test_trump_or_suit() {
        let declared = unwrap!(SDeclaredCard::from_card(card("2C")));
        assert_eq!(trump_or_suit(card("3S"), declared), VTrumpOrSuit::Suit(ESuit::Spades));
        assert_eq!(trump_or_suit(card("3C"), declared), VTrumpOrSuit::Trump);
        assert_eq!(trump_or_suit(card("2S"), declared), VTrumpOrSuit::Trump);
        assert_eq!(trump_or_suit(card("SJ"), declared), VTrumpOrSuit::Trump);
        assert_eq!(trump_or_suit(card("BJ"), declared), VTrumpOrSuit::Trump);
    }

    #[test]
    fn test_next_in_chain() {
        let next = |str_card, str_declared, b_wrap| {
            next_in_chain(card(str_card), unwrap!(SDeclaredCard::from_card(card(str_declared))), b_wrap)
        };
        assert_eq!(next("SJ", "2S", false), Some(card("BJ")));
        assert_eq!(next("BJ", "2S", false), None);
        assert_eq!(next("2S", "2S", false), Some(card("SJ"))); // declared card chains into jokers
        assert_eq!(next("2H", "2S", false), None); // declared rank of another suit
        assert_eq!(next("2S", "3S", false), Some(card("4S"))); // skips declared rank
        assert_eq!(next("QS", "2C", false), Some(card("KS")));
        assert_eq!(next("KS", "2C", false), Some(card("AS")));
        assert_eq!(next("KS", "AC", false), None);
        assert_eq!(next("AH", "4S", false), None);
        assert_eq!(next("AH", "4S", true), Some(card("2H")));
        assert_eq!(next("AH", "2S", true), Some(card("3H"))); // wraparound skips declared rank
        assert_eq!(next("AS", "2S", true), Some(card("3S")));
    }

    #[test]
    fn test_chain_successor_wraps_only_first_step() {
        let declared = unwrap!(SDeclaredCard::from_card(card("4S")));
        assert_eq!(chain_successor(card("AH"), declared, /*b_wraparound*/true, 3), Some(card("5H")));
        assert_eq!(chain_successor(card("KH"), declared, /*b_wraparound*/true, 2), None);
    }

    #[test]
    fn test_compare_cards() {
        let declared = unwrap!(SDeclaredCard::from_card(card("2S")));
        let cmp = |str_fst, str_snd| compare_cards(card(str_fst), card(str_snd), Some(declared));
        assert_eq!(cmp("BJ", "SJ"), Some(Ordering::Greater));
        assert_eq!(cmp("SJ", "2S"), Some(Ordering::Greater));
        assert_eq!(cmp("2S", "2H"), Some(Ordering::Greater));
        assert_eq!(cmp("2H", "2D"), Some(Ordering::Equal));
        assert_eq!(cmp("2H", "AS"), Some(Ordering::Greater));
        assert_eq!(cmp("AS", "3S"), Some(Ordering::Greater));
        assert_eq!(cmp("AH", "KH"), Some(Ordering::Greater));
        assert_eq!(cmp("AH", "2H"), None); // 2H is trump, AH is not
        assert_eq!(cmp("3H", "3D"), None);
        assert_eq!(compare_cards(card("3H"), card("4H"), None), Some(Ordering::Less));
        assert_eq!(compare_cards(card("3H"), card("4D"), None), None);
    }
}
