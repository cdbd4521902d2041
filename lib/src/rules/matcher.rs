use crate::primitives::*;
use crate::rules::play::SPlay;
use crate::util::*;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Per-card multiplicities of one effective suit's holdings. A fixed
/// rank-by-suit array instead of a generic map keeps branch copies cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SCardCounts {
    mapsuitrank: EnumMap<ESuit, EnumMap<ERank, usize>>,
    mapjoker: EnumMap<EJoker, usize>,
}

impl SCardCounts {
    pub fn new() -> SCardCounts {
        SCardCounts {
            mapsuitrank: ESuit::map_from_fn(|_esuit| ERank::map_from_fn(|_erank| 0)),
            mapjoker: EJoker::map_from_fn(|_ejoker| 0),
        }
    }

    pub fn new_from_cards(itcard: impl IntoIterator<Item=ECard>) -> SCardCounts {
        let mut cardcounts = SCardCounts::new();
        for card in itcard {
            cardcounts.add(card, 1);
        }
        cardcounts
    }

    pub fn count(&self, card: ECard) -> usize {
        match card {
            ECard::Suited(erank, esuit) => self.mapsuitrank[esuit][erank],
            ECard::Joker(ejoker) => self.mapjoker[ejoker],
        }
    }

    fn count_mut(&mut self, card: ECard) -> &mut usize {
        match card {
            ECard::Suited(erank, esuit) => &mut self.mapsuitrank[esuit][erank],
            ECard::Joker(ejoker) => &mut self.mapjoker[ejoker],
        }
    }

    pub fn add(&mut self, card: ECard, n: usize) {
        *self.count_mut(card) += n;
    }

    pub fn remove(&mut self, card: ECard, n: usize) {
        let n_count = self.count_mut(card);
        debug_verify!(*n_count >= n);
        *n_count -= n;
    }

    pub fn total(&self) -> usize {
        self.cards_with_counts().map(|(_card, n_count)| n_count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.cards_with_counts().map(|(_card, n_count)| n_count).max().unwrap_or(0)
    }

    pub fn cards_with_counts(&self) -> impl Iterator<Item=(ECard, usize)> + '_ {
        ESuit::values()
            .flat_map(|esuit| ERank::values().map(move |erank| ECard::Suited(erank, esuit)))
            .chain(EJoker::values().map(ECard::Joker))
            .filter_map(move |card| {
                let n_count = self.count(card);
                if_then_some!(0 < n_count, (card, n_count))
            })
    }
}

impl Default for SCardCounts {
    fn default() -> SCardCounts {
        SCardCounts::new()
    }
}

/// One element of a matcher possibility: either a concrete meld from the
/// hand, or a placeholder standing for one arbitrary leftover card.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum VMatch {
    Play(SPlay),
    Placeholder,
}

// Table of obtainable melds: (multiplicity, length) to the base cards
// achieving that shape, with how often each is available. Cards are kept in
// ascending trump-relative order.
type STable = BTreeMap<(usize, usize), Vec<(ECard, usize)>>;

fn build_table(
    cardcounts: &SCardCounts,
    n_multiplicity_max: usize,
    n_length_max: usize,
    declared: SDeclaredCard,
    b_wraparound: bool,
) -> STable {
    let mut table = STable::new();
    for n_multiplicity in 2..=n_multiplicity_max {
        let mut veccardn: Vec<(ECard, usize)> = cardcounts.cards_with_counts()
            .filter(|&(_card, n_count)| n_count >= n_multiplicity)
            .map(|(card, n_count)| (card, n_count/n_multiplicity))
            .collect();
        veccardn.sort_unstable_by_key(|&(card, _n_count)| sort_key(card, declared));
        table.insert((n_multiplicity, 1), veccardn);
        for n_length in 2..=n_length_max {
            let veccardn: Vec<(ECard, usize)> = table[&(n_multiplicity, n_length-1)].iter()
                .filter_map(|&(card, n_count_prev)| {
                    let card_succ = chain_successor(card, declared, b_wraparound, n_length-1)?;
                    let &(_card, n_count_succ) = table[&(n_multiplicity, 1)].iter()
                        .find(|&&(card_base, _n_count)| card_base==card_succ)?;
                    Some((card, n_count_prev.min(n_count_succ)))
                })
                .collect();
            table.insert((n_multiplicity, n_length), veccardn);
        }
    }
    table
}

/// The residual shape components still owed after answering a request for
/// (`n_multiplicity_target`, `n_length_target`) with a smaller sub-shape
/// (`n_multiplicity`, `n_length`). Multiplicity-1 tractors do not exist, so
/// a multiplicity deficit of exactly 1 decays into loose singles.
pub fn compute_needs(
    n_multiplicity_target: usize,
    n_length_target: usize,
    n_multiplicity: usize,
    n_length: usize,
) -> Vec<(usize, usize)> {
    debug_verify!(n_multiplicity <= n_multiplicity_target && n_length <= n_length_target);
    let mut vecshape = Vec::new();
    if n_length < n_length_target {
        vecshape.push((n_multiplicity_target, n_length_target - n_length));
    }
    match n_multiplicity_target - n_multiplicity {
        0 => {},
        1 => vecshape.extend(std::iter::repeat((1, 1)).take(n_length)),
        n_diff => vecshape.push((n_diff, n_length)),
    }
    vecshape
}

/// Enumerates legal uses of one effective suit's holdings against a lead
/// shape. Natural combinations must be used whole: breaking a group to
/// satisfy a request is only allowed when no equal-or-larger unbroken group
/// fits, and all minimal-deviation ties are returned.
#[derive(Clone, Debug, new)]
pub struct SMatcher {
    cardcounts: SCardCounts,
    declared: SDeclaredCard,
    b_wraparound: bool,
}

impl SMatcher {
    pub fn new_from_hand(slccard: &[ECard], declared: SDeclaredCard, b_wraparound: bool) -> SMatcher {
        SMatcher::new(
            SCardCounts::new_from_cards(slccard.iter().copied()),
            declared,
            b_wraparound,
        )
    }

    pub fn possibilities(&self, slcplay_target: &[SPlay]) -> Vec<Vec<VMatch>> {
        let vecshape: Vec<(usize, usize)> = slcplay_target.iter()
            .map(|play| (play.multiplicity(), play.length()))
            .collect();
        let mut vecvecmatch = Vec::new();
        self.enumerate(&self.cardcounts, &vecshape, &mut Vec::new(), &mut vecvecmatch);
        for vecmatch in vecvecmatch.iter_mut() {
            self.canonicalize(vecmatch);
        }
        // keep only the minimal-deviation ties: possibilities whose profile
        // of (size, multiplicity) shapes is maximal
        let fn_profile = |vecmatch: &[VMatch]| -> Vec<(usize, usize)> {
            vecmatch.iter()
                .map(|match_| match match_ {
                    VMatch::Play(play) => (play.size(), play.multiplicity()),
                    VMatch::Placeholder => (1, 1),
                })
                .collect()
        };
        if let Some(vecshape_best) = vecvecmatch.iter().map(|vecmatch| fn_profile(vecmatch)).max() {
            vecvecmatch.retain(|vecmatch| fn_profile(vecmatch)==vecshape_best);
        }
        let mut vecvecmatch_out: Vec<Vec<VMatch>> = Vec::new();
        for vecmatch in vecvecmatch {
            if !vecvecmatch_out.contains(&vecmatch) {
                vecvecmatch_out.push(vecmatch);
            }
        }
        vecvecmatch_out
    }

    fn enumerate(
        &self,
        cardcounts: &SCardCounts,
        slcshape_pending: &[(usize, usize)],
        vecmatch_cur: &mut Vec<VMatch>,
        vecvecmatch_out: &mut Vec<Vec<VMatch>>,
    ) {
        let (&(n_multiplicity_target, n_length_target), slcshape_rest) = match slcshape_pending.split_first() {
            Some(tpl) => tpl,
            None => {
                vecvecmatch_out.push(vecmatch_cur.clone());
                return;
            },
        };
        let table = build_table(
            cardcounts,
            n_multiplicity_target,
            n_length_target,
            self.declared,
            self.b_wraparound,
        );
        // sub-shapes fitting inside the request, largest first, with
        // multiplicity breaking size ties
        let mut vecshape_candidate: Vec<(usize, usize)> = (2..=n_multiplicity_target)
            .flat_map(|n_multiplicity| (1..=n_length_target).map(move |n_length| (n_multiplicity, n_length)))
            .collect();
        vecshape_candidate.sort_unstable_by_key(|&(n_multiplicity, n_length)|
            (Reverse(n_multiplicity*n_length), Reverse(n_multiplicity))
        );
        for (n_multiplicity, n_length) in vecshape_candidate {
            let slccardn = &table[&(n_multiplicity, n_length)];
            if slccardn.is_empty() {
                continue;
            }
            let mut vecshape_next = slcshape_rest.to_vec();
            vecshape_next.extend(compute_needs(
                n_multiplicity_target,
                n_length_target,
                n_multiplicity,
                n_length,
            ));
            for &(card, _n_avail) in slccardn {
                let play = unwrap!(SPlay::new(card, n_multiplicity, n_length));
                let mut cardcounts_branch = cardcounts.clone();
                for card_consumed in unwrap!(play.expand(self.declared, self.b_wraparound)) {
                    cardcounts_branch.remove(card_consumed, 1);
                }
                vecmatch_cur.push(VMatch::Play(play));
                self.enumerate(&cardcounts_branch, &vecshape_next, vecmatch_cur, vecvecmatch_out);
                vecmatch_cur.pop();
            }
            return;
        }
        // nothing of multiplicity >= 2 achievable: one arbitrary leftover
        // card, chosen at submission time
        let mut vecshape_next = slcshape_rest.to_vec();
        vecshape_next.extend(compute_needs(n_multiplicity_target, n_length_target, 1, 1));
        vecmatch_cur.push(VMatch::Placeholder);
        self.enumerate(cardcounts, &vecshape_next, vecmatch_cur, vecvecmatch_out);
        vecmatch_cur.pop();
    }

    fn canonicalize(&self, vecmatch: &mut [VMatch]) {
        let declared = self.declared;
        vecmatch.sort_by_key(|match_| match *match_ {
            VMatch::Play(play) => (
                Reverse(play.size()),
                Reverse(play.multiplicity()),
                0,
                sort_key(play.card(), declared),
            ),
            VMatch::Placeholder => (Reverse(1), Reverse(1), 1, (0, 0, 0)),
        });
    }

    /// Whether the holdings can beat `play` with a same-shape meld.
    pub fn beats_play(&self, play: SPlay) -> bool {
        let fn_beats = |card: ECard| {
            compare_cards(card, play.card(), Some(self.declared))==Some(std::cmp::Ordering::Greater)
        };
        if play.multiplicity()==1 {
            self.cardcounts.cards_with_counts().any(|(card, _n_count)| fn_beats(card))
        } else {
            let table = build_table(
                &self.cardcounts,
                play.multiplicity(),
                play.length(),
                self.declared,
                self.b_wraparound,
            );
            table[&(play.multiplicity(), play.length())].iter().any(|&(card, _n_count)| fn_beats(card))
        }
    }

    /// The canonical maximal decomposition of the full holdings into melds,
    /// greedily taking the largest shape (lowest base card on ties) first.
    /// Used to detect improperly broken natural combinations in a throw.
    pub fn decompose_maximal(&self) -> Vec<SPlay> {
        let mut cardcounts = self.cardcounts.clone();
        let mut vecplay = Vec::new();
        loop {
            let n_multiplicity_max = cardcounts.max_count();
            if n_multiplicity_max < 2 {
                break;
            }
            let n_length_max = cardcounts.total()/2;
            let table = build_table(
                &cardcounts,
                n_multiplicity_max,
                n_length_max,
                self.declared,
                self.b_wraparound,
            );
            let mut vecshape_candidate: Vec<(usize, usize)> = (2..=n_multiplicity_max)
                .flat_map(|n_multiplicity| (1..=n_length_max).map(move |n_length| (n_multiplicity, n_length)))
                .collect();
            vecshape_candidate.sort_unstable_by_key(|&(n_multiplicity, n_length)|
                (Reverse(n_multiplicity*n_length), Reverse(n_multiplicity))
            );
            let oplay = vecshape_candidate.into_iter()
                .find_map(|(n_multiplicity, n_length)| {
                    let &(card, _n_count) = table[&(n_multiplicity, n_length)].first()?;
                    Some(unwrap!(SPlay::new(card, n_multiplicity, n_length)))
                });
            match oplay {
                None => break,
                Some(play) => {
                    for card_consumed in unwrap!(play.expand(self.declared, self.b_wraparound)) {
                        cardcounts.remove(card_consumed, 1);
                    }
                    vecplay.push(play);
                },
            }
        }
        for (card, n_count) in cardcounts.cards_with_counts() {
            vecplay.extend(std::iter::repeat(SPlay::single(card)).take(n_count));
        }
        crate::rules::play::sort_plays_maximal(&mut vecplay, self.declared);
        vecplay
    }
}

/// Whether submitted cards realize one matcher possibility: the concrete
/// melds' cards must all be present and every surplus card stands in for
/// one placeholder.
pub fn matches_possibility(
    slccard: &[ECard],
    slcmatch: &[VMatch],
    declared: SDeclaredCard,
    b_wraparound: bool,
) -> bool {
    let mut cardcounts_submitted = SCardCounts::new_from_cards(slccard.iter().copied());
    let mut n_placeholders = 0;
    for match_ in slcmatch {
        match match_ {
            VMatch::Placeholder => n_placeholders += 1,
            VMatch::Play(play) => {
                for card in unwrap!(play.expand(declared, b_wraparound)) {
                    if cardcounts_submitted.count(card)==0 {
                        return false;
                    }
                    cardcounts_submitted.remove(card, 1);
                }
            },
        }
    }
    cardcounts_submitted.total()==n_placeholders
}
