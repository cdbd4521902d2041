use crate::primitives::*;
use crate::rules::VGameError;
use crate::util::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::{Ordering, Reverse};
use std::fmt;

/// One group of cards: a single, pair, triple, or tractor, described by its
/// lowest card, multiplicity and length.
/// - single ace of clubs: base AC, 1, 1
/// - pair of kings of diamonds: base KD, 2, 1
/// - 2233 of spades tractor: base 2S, 2, 2
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SPlay {
    card: ECard,
    n_multiplicity: usize,
    n_length: usize,
}

impl SPlay {
    pub fn new(card: ECard, n_multiplicity: usize, n_length: usize) -> Result<SPlay, VGameError> {
        if n_multiplicity<1 {
            return Err(VGameError::InvalidShape("Cannot have multiplicity < 1.".into()));
        }
        if n_length<1 {
            return Err(VGameError::InvalidShape("Cannot have length < 1.".into()));
        }
        if n_length>1 && n_multiplicity==1 {
            return Err(VGameError::InvalidShape("Cannot have tractors of multiplicity 1.".into()));
        }
        Ok(SPlay{card, n_multiplicity, n_length})
    }

    pub fn single(card: ECard) -> SPlay {
        SPlay{card, n_multiplicity: 1, n_length: 1}
    }

    pub fn card(self) -> ECard {
        self.card
    }

    pub fn multiplicity(self) -> usize {
        self.n_multiplicity
    }

    pub fn length(self) -> usize {
        self.n_length
    }

    pub fn size(self) -> usize {
        self.n_multiplicity * self.n_length
    }

    pub fn trump_or_suit(self, declared: SDeclaredCard) -> VTrumpOrSuit {
        trump_or_suit(self.card, declared)
    }

    /// The concrete cards this play stands for, walking the tractor chain
    /// from the base card. Fails if the chain ends before `length` steps.
    /// `b_wraparound` admits the Ace wraparound on the chain's first step.
    pub fn expand(self, declared: SDeclaredCard, b_wraparound: bool) -> Result<Vec<ECard>, VGameError> {
        let mut veccard = Vec::with_capacity(self.size());
        let mut ocard_cur = Some(self.card);
        for i_step in 0..self.n_length {
            let card_cur = ocard_cur
                .ok_or_else(|| VGameError::OutOfRange("Play goes out of range.".into()))?;
            veccard.extend(std::iter::repeat(card_cur).take(self.n_multiplicity));
            ocard_cur = next_in_chain(card_cur, declared, /*b_wrap*/b_wraparound && i_step==0);
        }
        Ok(veccard)
    }
}

impl fmt::Display for SPlay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.n_multiplicity, self.n_length) {
            (1, 1) => write!(f, "{}", self.card),
            (n_multiplicity, 1) => write!(f, "{}x{}", self.card, n_multiplicity),
            (n_multiplicity, n_length) => write!(f, "{}x{}x{}", self.card, n_multiplicity, n_length),
        }
    }
}

/// Canonical play ordering: size ascending, then multiplicity, then
/// trump-relative card order (incomparable cards tie).
pub fn sort_plays(vecplay: &mut [SPlay], odeclared: Option<SDeclaredCard>) {
    vecplay.sort_by(|play_fst, play_snd| {
        play_fst.size().cmp(&play_snd.size())
            .then_with(|| play_fst.multiplicity().cmp(&play_snd.multiplicity()))
            .then_with(|| {
                compare_cards(play_fst.card(), play_snd.card(), odeclared)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

/// Largest-first ordering with ascending base cards on shape ties. Both a
/// throw and its maximal decomposition are brought into this order before
/// being compared.
pub fn sort_plays_maximal(vecplay: &mut [SPlay], declared: SDeclaredCard) {
    vecplay.sort_by_key(|play| (
        Reverse(play.size()),
        Reverse(play.multiplicity()),
        sort_key(play.card(), declared),
    ));
}

/// Whether the lead play keeps winning against a response, position by
/// position. Shape mismatches default to the lead winning; genuinely illegal
/// responses must have been rejected before this.
pub fn wins_against(slcplay_lead: &[SPlay], slcplay_response: &[SPlay], declared: SDeclaredCard) -> bool {
    if slcplay_lead.len() != slcplay_response.len() {
        return true;
    }
    let play_lead_fst = match slcplay_lead.first() {
        Some(&play) => play,
        None => return true,
    };
    let trumporsuit_lead = play_lead_fst.trump_or_suit(declared);
    for (play_lead, play_response) in slcplay_lead.iter().zip(slcplay_response.iter()) {
        if play_lead.multiplicity() != play_response.multiplicity()
            || play_lead.length() != play_response.length()
        {
            return true;
        }
        let trumporsuit_response = play_response.trump_or_suit(declared);
        if trumporsuit_lead != trumporsuit_response && trumporsuit_response != VTrumpOrSuit::Trump {
            return true;
        }
        if trumporsuit_lead == trumporsuit_response
            && compare_cards(play_lead.card(), play_response.card(), Some(declared))
                .map_or(true, |ord| ord != Ordering::Less)
        {
            return true;
        }
    }
    false
}

#[derive(Serialize, Deserialize)]
struct SPlaySerialized {
    c: ECard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    m: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    l: Option<usize>,
}

impl Serialize for SPlay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SPlaySerialized {
            c: self.card,
            m: if_then_some!(self.n_multiplicity!=1, self.n_multiplicity),
            l: if_then_some!(self.n_length!=1, self.n_length),
        }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SPlay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let playserialized = SPlaySerialized::deserialize(deserializer)?;
        SPlay::new(
            playserialized.c,
            playserialized.m.unwrap_or(1),
            playserialized.l.unwrap_or(1),
        ).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(str_card: &str) -> ECard {
        unwrap!(str_card.parse())
    }
    fn declared(str_card: &str) -> SDeclaredCard {
        unwrap!(SDeclaredCard::from_card(card(str_card)))
    }
    fn play(str_card: &str, n_multiplicity: usize, n_length: usize) -> SPlay {
        unwrap!(SPlay::new(card(str_card), n_multiplicity, n_length))
    }
    fn cards(slcstr: &[&str]) -> Vec<ECard> {
        slcstr.iter().map(|str_card| card(str_card)).collect()
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(SPlay::new(card("3S"), 0, 1).is_err());
        assert!(SPlay::new(card("3S"), 2, 0).is_err());
        assert!(SPlay::new(card("3S"), 1, 2).is_err());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(unwrap!(serde_json::to_string(&SPlay::single(card("KS")))), r#"{"c":"KS"}"#);
        assert_eq!(unwrap!(serde_json::to_string(&play("KS", 2, 3))), r#"{"c":"KS","m":2,"l":3}"#);
        assert_eq!(unwrap!(serde_json::to_string(&play("3S", 1, 1))), r#"{"c":"3S"}"#);
        assert_eq!(unwrap!(serde_json::from_str::<SPlay>(r#"{"c":"KS","m":2,"l":3}"#)), play("KS", 2, 3));
        assert_eq!(unwrap!(serde_json::from_str::<SPlay>(r#"{"c":"KS"}"#)), SPlay::single(card("KS")));
        assert!(serde_json::from_str::<SPlay>(r#"{"c":"KS","m":1,"l":3}"#).is_err());
    }

    #[test]
    fn test_trump_or_suit() {
        assert_eq!(SPlay::single(card("3S")).trump_or_suit(declared("2C")), VTrumpOrSuit::Suit(ESuit::Spades));
        assert_eq!(play("3H", 2, 2).trump_or_suit(declared("2C")), VTrumpOrSuit::Suit(ESuit::Hearts));
        assert_eq!(play("3C", 2, 2).trump_or_suit(declared("2C")), VTrumpOrSuit::Trump);
        assert_eq!(SPlay::single(card("2S")).trump_or_suit(declared("2C")), VTrumpOrSuit::Trump);
        assert_eq!(SPlay::single(card("SJ")).trump_or_suit(declared("2C")), VTrumpOrSuit::Trump);
        assert_eq!(SPlay::single(card("BJ")).trump_or_suit(declared("2C")), VTrumpOrSuit::Trump);
    }

    #[test]
    fn test_expand() {
        assert_eq!(unwrap!(SPlay::single(card("2S")).expand(declared("2S"), true)), cards(&["2S"]));
        assert_eq!(unwrap!(play("2S", 2, 1).expand(declared("2S"), true)), cards(&["2S", "2S"]));
        assert_eq!(unwrap!(play("2S", 2, 2).expand(declared("4C"), true)), cards(&["2S", "2S", "3S", "3S"]));
        assert_eq!(
            unwrap!(play("QS", 2, 3).expand(declared("2C"), true)),
            cards(&["QS", "QS", "KS", "KS", "AS", "AS"]),
        );
        assert_eq!(
            unwrap!(play("2S", 4, 4).expand(declared("6C"), true)),
            cards(&["2S", "2S", "2S", "2S", "3S", "3S", "3S", "3S", "4S", "4S", "4S", "4S", "5S", "5S", "5S", "5S"]),
        );
        // declared rank is skipped within the suit
        assert_eq!(unwrap!(play("2S", 2, 2).expand(declared("3S"), true)), cards(&["2S", "2S", "4S", "4S"]));
        assert_eq!(unwrap!(play("SJ", 2, 2).expand(declared("2S"), true)), cards(&["SJ", "SJ", "BJ", "BJ"]));
        assert_eq!(
            unwrap!(play("2S", 2, 3).expand(declared("2S"), true)),
            cards(&["2S", "2S", "SJ", "SJ", "BJ", "BJ"]),
        );
        assert_eq!(
            unwrap!(play("AS", 2, 3).expand(declared("AS"), true)),
            cards(&["AS", "AS", "SJ", "SJ", "BJ", "BJ"]),
        );
        // wraparound, first step only
        assert_eq!(unwrap!(play("AH", 2, 3).expand(declared("4S"), true)), cards(&["AH", "AH", "2H", "2H", "3H", "3H"]));
        assert_eq!(unwrap!(play("AH", 2, 3).expand(declared("2S"), true)), cards(&["AH", "AH", "3H", "3H", "4H", "4H"]));
        assert_eq!(unwrap!(play("AS", 2, 3).expand(declared("4S"), true)), cards(&["AS", "AS", "2S", "2S", "3S", "3S"]));
        assert_eq!(unwrap!(play("AS", 2, 3).expand(declared("2S"), true)), cards(&["AS", "AS", "3S", "3S", "4S", "4S"]));
        // wraparound disabled: the chain still ends at the ace
        assert!(play("AH", 2, 2).expand(declared("4S"), false).is_err());
        assert!(play("AS", 2, 3).expand(declared("2S"), false).is_err());
        assert_eq!(unwrap!(play("KH", 2, 2).expand(declared("4S"), false)), cards(&["KH", "KH", "AH", "AH"]));
        // chain ends
        assert!(play("KS", 2, 3).expand(declared("2C"), true).is_err());
        assert!(play("KS", 2, 2).expand(declared("AC"), true).is_err());
        assert!(play("SJ", 2, 3).expand(declared("2S"), true).is_err());
        assert!(play("2S", 2, 2).expand(declared("2H"), true).is_err());
    }

    #[test]
    fn test_sort_plays() {
        let mut vecplay = vec![
            play("QC", 3, 3),
            play("3C", 2, 2),
            play("6C", 2, 3),
            play("5C", 1, 1),
            SPlay::single(card("2C")),
            play("9C", 3, 2),
            play("10C", 2, 1),
            play("JC", 3, 1),
        ];
        sort_plays(&mut vecplay, /*odeclared*/None);
        assert_eq!(vecplay, vec![
            SPlay::single(card("2C")),
            SPlay::single(card("5C")),
            play("10C", 2, 1),
            play("JC", 3, 1),
            play("3C", 2, 2),
            play("6C", 2, 3),
            play("9C", 3, 2),
            play("QC", 3, 3),
        ]);
    }

    #[test]
    fn test_wins_against() {
        let declared = declared("2S");
        // mismatched response shape
        assert!(wins_against(
            &[play("4C", 2, 1), SPlay::single(card("5C"))],
            &[SPlay::single(card("AC")), SPlay::single(card("KC")), SPlay::single(card("4C"))],
            declared,
        ));
        // partially off suit
        assert!(wins_against(
            &[play("4C", 2, 1), SPlay::single(card("5C"))],
            &[play("3C", 2, 1), SPlay::single(card("4H"))],
            declared,
        ));
        // fully off suit
        assert!(wins_against(
            &[play("4C", 2, 1), SPlay::single(card("5C"))],
            &[play("6H", 2, 1), SPlay::single(card("4H"))],
            declared,
        ));
        // matching but lower
        assert!(wins_against(
            &[play("AC", 2, 1), SPlay::single(card("KC"))],
            &[play("3C", 2, 1), SPlay::single(card("4C"))],
            declared,
        ));
        // matching and higher
        assert!(!wins_against(&[play("3C", 2, 2)], &[play("KC", 2, 2)], declared));
        // trump response
        assert!(!wins_against(
            &[play("AC", 2, 1), SPlay::single(card("KC"))],
            &[play("3S", 2, 1), SPlay::single(card("SJ"))],
            declared,
        ));
        // trump vs trump
        assert!(!wins_against(&[play("AS", 2, 1)], &[play("2C", 2, 1)], declared));
        assert!(!wins_against(&[play("2S", 2, 1)], &[play("SJ", 2, 1)], declared));
        assert!(!wins_against(&[play("2H", 2, 1)], &[play("SJ", 2, 1)], declared));
        assert!(wins_against(&[play("2H", 2, 1)], &[play("3S", 2, 1)], declared));
        assert!(wins_against(&[play("BJ", 2, 1)], &[play("SJ", 2, 1)], declared));
        // an exact copy of the lead never beats it
        assert!(wins_against(&[play("7C", 2, 2)], &[play("7C", 2, 2)], declared));
    }
}
