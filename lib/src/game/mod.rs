pub mod deck;
pub use self::deck::*;

use crate::primitives::*;
use crate::rules::*;
use crate::util::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

plain_enum_mod!(modegamephase, derive(Hash,), map_derive(), EGamePhase {
    Deal, Bottom, Play, Score,
});

impl std::fmt::Display for EGamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", match self {
            EGamePhase::Deal => "deal",
            EGamePhase::Bottom => "bottom",
            EGamePhase::Play => "play",
            EGamePhase::Score => "score",
        })
    }
}

/// Per-player round state. Rank persists across rounds, hand and collected
/// point cards are reset by `start_round`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SPlayer {
    pub erank: ERank,
    pub hand: SHand,
    pub veccard_points: Vec<ECard>,
}

impl SPlayer {
    fn new() -> SPlayer {
        SPlayer {
            erank: ERank::Two,
            hand: SHand::default(),
            veccard_points: Vec::new(),
        }
    }

    /// Advances the rank, clamping at ace. Returns true if the player
    /// climbed past ace and thereby won the game.
    fn increment_rank(&mut self, n_steps: usize) -> bool {
        match ERank::checked_from_usize(self.erank.to_usize() + n_steps) {
            Some(erank) => {
                self.erank = erank;
                false
            },
            None => {
                self.erank = ERank::Ace;
                true
            },
        }
    }

    fn new_round(&mut self) {
        self.hand = SHand::default();
        self.veccard_points.clear();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SDeclaration {
    pub card: ECard,
    pub n_amount: usize,
    pub i_player: usize,
    pub b_can_prev_player_reinforce: bool,
    pub oi_player_prev: Option<usize>,
}

impl SDeclaration {
    /// The reinforce-eligible flag reveals the previous declarer's hand, so
    /// broadcasts to anyone but that player must use this form.
    pub fn redacted(&self) -> SDeclaration {
        SDeclaration {
            b_can_prev_player_reinforce: false,
            oi_player_prev: None,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SFriendCall {
    pub card: ECard,
    pub n_nth: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SDealPhaseResult {
    pub i_dealer: usize,
    pub veccard_kitty: Vec<ECard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct STrickResult {
    pub i_winner: usize,
    pub veccard_points: Vec<ECard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SRoundResult {
    pub veci_winner: Vec<usize>,
    pub n_level_change: isize,
    pub veci_game_winner: Vec<usize>,
    pub n_points: isize,
    pub veccard_kitty: Vec<ECard>,
}

/// What a successful `make_play` amounts to, for exhaustive caller handling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VPlayResult {
    None,
    ForcedThrow(SPlay),
    Trick(STrickResult),
    Round(SRoundResult),
}

/// The authoritative state of one match. Handlers validate fully before
/// mutating, so a failing call leaves the state untouched.
pub struct SGameState<DeckSource: TDeckSource> {
    decksource: DeckSource,
    pub ruleset: SRuleSet,
    pub ephase: EGamePhase,
    pub veccard_deck: Vec<ECard>,
    pub vecplayer: Vec<SPlayer>,
    pub veccard_kitty: Vec<ECard>,
    pub odeclared: Option<SDeclaredCard>,
    pub vecdeclaration: Vec<SDeclaration>,
    pub ovecfriendcall: Option<Vec<SFriendCall>>,
    pub seti_friend: BTreeSet<usize>,
    pub veci_winner: Vec<usize>,
    pub i_turn: usize,
    pub vectrick: Vec<Vec<SPlay>>,
}

impl<DeckSource: TDeckSource> SGameState<DeckSource> {
    pub fn new(ruleset: SRuleSet, decksource: DeckSource) -> SGameState<DeckSource> {
        let n_players = ruleset.n_players;
        SGameState {
            decksource,
            ruleset,
            ephase: EGamePhase::Score,
            veccard_deck: Vec::new(),
            vecplayer: (0..n_players).map(|_i_player| SPlayer::new()).collect(),
            veccard_kitty: Vec::new(),
            odeclared: None,
            vecdeclaration: Vec::new(),
            ovecfriendcall: None,
            seti_friend: BTreeSet::new(),
            veci_winner: (0..n_players).collect(),
            i_turn: 0,
            vectrick: Vec::new(),
        }
    }

    fn check_phase(&self, ephase_required: EGamePhase, str_action: &'static str) -> Result<(), VGameError> {
        if self.ephase != ephase_required {
            return Err(VGameError::WrongPhase {
                str_action,
                ephase_required,
                ephase_actual: self.ephase,
            });
        }
        Ok(())
    }

    fn increment_turn(&mut self) {
        self.i_turn = (self.i_turn + 1) % self.ruleset.n_players;
    }

    pub fn start_round(&mut self) -> Result<(), VGameError> {
        self.check_phase(EGamePhase::Score, "start_round")?;
        self.ephase = EGamePhase::Deal;
        self.veccard_kitty.clear();
        self.seti_friend.clear();
        self.odeclared = None;
        self.ovecfriendcall = None;
        self.vecdeclaration.clear();
        self.vectrick.clear();
        self.veccard_deck = self.decksource.deck(self.ruleset.n_decks);
        for player in self.vecplayer.iter_mut() {
            player.new_round();
        }
        info!("Starting round with {} players, {} decks.", self.ruleset.n_players, self.ruleset.n_decks);
        Ok(())
    }

    /// Deals one card to the player whose turn it is. Returns `None` once
    /// only the kitty remains.
    pub fn deal_card(&mut self) -> Result<Option<ECard>, VGameError> {
        self.check_phase(EGamePhase::Deal, "deal_card")?;
        if self.veccard_deck.len()==self.ruleset.n_kitty {
            return Ok(None);
        }
        let card = unwrap!(self.veccard_deck.pop());
        self.vecplayer[self.i_turn].hand.add_card(card);
        self.increment_turn();
        Ok(Some(card))
    }

    pub fn declare(&mut self, i_player: usize, card: ECard, n_amount: usize) -> Result<SDeclaration, VGameError> {
        self.check_phase(EGamePhase::Deal, "declare")?;
        let player = self.vecplayer.get(i_player)
            .ok_or_else(|| VGameError::OutOfRange(format!("No player {}.", i_player)))?;
        match card {
            ECard::Suited(erank, _esuit) if erank==player.erank => {},
            _ => return Err(VGameError::IllegalDeclaration("Player trying to declare out of rank.".into())),
        }
        if self.ruleset.b_winners_declare && !self.veci_winner.contains(&i_player) {
            return Err(VGameError::IllegalDeclaration("Only winners may declare.".into()));
        }
        if n_amount<1 || player.hand.count(card)<n_amount {
            return Err(VGameError::IllegalDeclaration("Player trying to declare with cards they don't have.".into()));
        }
        if let Some(declaration_prev) = self.vecdeclaration.last() {
            if n_amount==declaration_prev.n_amount && declaration_prev.b_can_prev_player_reinforce {
                match self.vecdeclaration.iter().rev().nth(1) {
                    Some(declaration_orig)
                        if declaration_orig.i_player==i_player && declaration_orig.card==card => {},
                    _ => return Err(VGameError::IllegalDeclaration("Invalid reinforce.".into())),
                }
            } else if n_amount<=declaration_prev.n_amount {
                return Err(VGameError::IllegalDeclaration("Not enough cards to overturn.".into()));
            }
        }
        let b_can_prev_player_reinforce = self.vecdeclaration.last().map_or(false, |declaration_prev| {
            declaration_prev.n_amount < n_amount
                && self.vecplayer[declaration_prev.i_player].hand.count(declaration_prev.card) >= n_amount
        });
        let declaration = SDeclaration {
            card,
            n_amount,
            i_player,
            b_can_prev_player_reinforce,
            oi_player_prev: if_then_some!(
                b_can_prev_player_reinforce,
                unwrap!(self.vecdeclaration.last()).i_player
            ),
        };
        debug!("Player {} declares {} x{}.", i_player, card, n_amount);
        self.vecdeclaration.push(declaration.clone());
        Ok(declaration)
    }

    pub fn end_deal_phase(&mut self) -> Result<SDealPhaseResult, VGameError> {
        self.check_phase(EGamePhase::Deal, "end_deal_phase")?;
        let declaration = self.vecdeclaration.last()
            .ok_or_else(|| VGameError::IllegalDeclaration("No trump has been declared.".into()))?;
        let declared = unwrap!(SDeclaredCard::from_card(declaration.card));
        let i_dealer = declaration.i_player;
        self.odeclared = Some(declared);
        self.ephase = EGamePhase::Bottom;
        self.i_turn = i_dealer;
        self.seti_friend.insert(i_dealer);
        let veccard_kitty = std::mem::take(&mut self.veccard_deck);
        for &card in &veccard_kitty {
            self.vecplayer[i_dealer].hand.add_card(card);
        }
        for player in self.vecplayer.iter_mut() {
            player.hand.sort(declared);
        }
        info!("Player {} declared {} as trump.", i_dealer, declared);
        Ok(SDealPhaseResult { i_dealer, veccard_kitty })
    }

    pub fn end_bottom_phase(
        &mut self,
        slccard_kitty: &[ECard],
        vecfriendcall: Vec<SFriendCall>,
    ) -> Result<(), VGameError> {
        self.check_phase(EGamePhase::Bottom, "end_bottom_phase")?;
        if vecfriendcall.len() != self.ruleset.n_team_size-1 {
            return Err(VGameError::IllegalSelection(
                format!("Need to call {} friend(s).", self.ruleset.n_team_size-1)
            ));
        }
        if vecfriendcall.iter().any(|friendcall| friendcall.n_nth==0) {
            return Err(VGameError::IllegalSelection("Friend call must name the 1st occurrence or later.".into()));
        }
        if slccard_kitty.len() != self.ruleset.n_kitty {
            return Err(VGameError::IllegalSelection(
                format!("Bottom must be {} cards.", self.ruleset.n_kitty)
            ));
        }
        if !self.vecplayer[self.i_turn].hand.contains_all(slccard_kitty) {
            return Err(VGameError::IllegalSelection("Bottom includes card not in hand.".into()));
        }
        unwrap!(self.vecplayer[self.i_turn].hand.remove_cards(slccard_kitty));
        self.veccard_kitty = slccard_kitty.to_vec();
        self.ovecfriendcall = Some(vecfriendcall);
        self.ephase = EGamePhase::Play;
        Ok(())
    }

    pub fn make_play(&mut self, vecplay: Vec<SPlay>) -> Result<VPlayResult, VGameError> {
        self.check_phase(EGamePhase::Play, "make_play")?;
        let declared = unwrap!(self.odeclared);
        if vecplay.is_empty() {
            return Err(VGameError::IllegalPlay("Play must not be empty.".into()));
        }
        let mut vecplay = vecplay;
        sort_plays(&mut vecplay, Some(declared));
        vecplay.reverse();
        let mut b_forced = false;
        if self.vectrick.is_empty() && vecplay.len()>1 {
            let trumporsuit_throw = vecplay[0].trump_or_suit(declared);
            if vecplay.iter().any(|play| play.trump_or_suit(declared) != trumporsuit_throw) {
                return Err(VGameError::IllegalPlay("Throw is not suited.".into()));
            }
            let mut veccard_throw = Vec::new();
            for play in &vecplay {
                veccard_throw.extend(play.expand(declared, self.ruleset.b_wraparound)?);
            }
            let mut vecplay_canonical = vecplay.clone();
            sort_plays_maximal(&mut vecplay_canonical, declared);
            let matcher_throw = SMatcher::new_from_hand(&veccard_throw, declared, self.ruleset.b_wraparound);
            if matcher_throw.decompose_maximal() != vecplay_canonical {
                return Err(VGameError::IllegalPlay("Throw breaks up a natural combination.".into()));
            }
            if let Some(play_beatable) = self.find_beatable_throw_play(&vecplay, declared) {
                // callable out: the throw collapses to one card of its
                // largest beatable meld
                b_forced = true;
                vecplay = vec![SPlay::single(play_beatable.card())];
            }
        }
        let mut veccard = Vec::new();
        for play in &vecplay {
            veccard.extend(play.expand(declared, self.ruleset.b_wraparound)?);
        }
        if !self.vecplayer[self.i_turn].hand.contains_all(&veccard) {
            return Err(VGameError::IllegalPlay("Player is trying to play cards they don't have.".into()));
        }
        if !self.is_valid_play(&veccard, declared) {
            return Err(VGameError::IllegalPlay("Player is not allowed to play that.".into()));
        }
        // all checks passed, mutate
        let i_player_cur = self.i_turn;
        if let Some(vecfriendcall) = &mut self.ovecfriendcall {
            for &card in &veccard {
                for friendcall in vecfriendcall.iter_mut() {
                    if card==friendcall.card {
                        if friendcall.n_nth==1 {
                            self.seti_friend.insert(i_player_cur);
                            self.vecplayer[i_player_cur].veccard_points.clear();
                        } else {
                            friendcall.n_nth -= 1;
                        }
                    }
                }
            }
        }
        unwrap!(self.vecplayer[i_player_cur].hand.remove_cards(&veccard));
        let oplay_forced = if_then_some!(b_forced, vecplay[0]);
        self.vectrick.push(vecplay);
        if self.vectrick.len()==self.ruleset.n_players {
            self.increment_turn(); // back to the trick's leader
            let (i_winner, veccard_points) = self.compute_winner(declared);
            self.i_turn = i_winner;
            if !self.seti_friend.contains(&i_winner) {
                self.vecplayer[i_winner].veccard_points.extend(veccard_points.iter().copied());
            }
            self.vectrick.clear();
            debug!("Trick won by player {}.", i_winner);
            if self.vecplayer[0].hand.is_empty() {
                self.ephase = EGamePhase::Score;
                return Ok(VPlayResult::Round(self.calculate_score()));
            }
            return Ok(VPlayResult::Trick(STrickResult { i_winner, veccard_points }));
        }
        self.increment_turn();
        Ok(match oplay_forced {
            Some(play_forced) => VPlayResult::ForcedThrow(play_forced),
            None => VPlayResult::None,
        })
    }

    /// The largest meld of a multi-meld throw that some other player's
    /// same-suit holdings could beat, if any.
    fn find_beatable_throw_play(&self, slcplay: &[SPlay], declared: SDeclaredCard) -> Option<SPlay> {
        let n_players = self.ruleset.n_players;
        for &play in slcplay {
            let trumporsuit = play.trump_or_suit(declared);
            for i_offset in 1..n_players {
                let veccard_suited = self.vecplayer[(self.i_turn + i_offset) % n_players]
                    .hand
                    .cards_of_suit(trumporsuit, declared);
                let matcher = SMatcher::new_from_hand(&veccard_suited, declared, self.ruleset.b_wraparound);
                if matcher.beats_play(play) {
                    return Some(play);
                }
            }
        }
        None
    }

    fn is_valid_play(&self, slccard: &[ECard], declared: SDeclaredCard) -> bool {
        let slcplay_lead = match self.vectrick.first() {
            None => return true,
            Some(vecplay_lead) => vecplay_lead,
        };
        let n_trick_size: usize = slcplay_lead.iter().map(|play| play.size()).sum();
        if slccard.len() != n_trick_size {
            return false;
        }
        let trumporsuit_lead = match slcplay_lead.first() {
            Some(play) => play.trump_or_suit(declared),
            None => return false,
        };
        let veccard_suited = self.vecplayer[self.i_turn].hand.cards_of_suit(trumporsuit_lead, declared);
        let n_play_suited = slccard.iter()
            .filter(|&&card| trump_or_suit(card, declared)==trumporsuit_lead)
            .count();
        if veccard_suited.len() > n_trick_size {
            if n_play_suited != n_trick_size {
                return false;
            }
            let matcher = SMatcher::new_from_hand(&veccard_suited, declared, self.ruleset.b_wraparound);
            matcher.possibilities(slcplay_lead).iter()
                .any(|vecmatch| matches_possibility(slccard, vecmatch, declared, self.ruleset.b_wraparound))
        } else {
            n_play_suited==veccard_suited.len()
        }
    }

    fn compute_winner(&self, declared: SDeclaredCard) -> (usize, Vec<ECard>) {
        debug_verify_eq!(self.vectrick.len(), self.ruleset.n_players);
        let mut i_winner_offset = 0;
        let mut veccard_points = Vec::new();
        for (i_offset, vecplay) in self.vectrick.iter().enumerate() {
            if 0<i_offset && !wins_against(&self.vectrick[i_winner_offset], vecplay, declared) {
                i_winner_offset = i_offset;
            }
            for play in vecplay {
                for card in unwrap!(play.expand(declared, self.ruleset.b_wraparound)) {
                    if points_card(card)!=0 {
                        veccard_points.push(card);
                    }
                }
            }
        }
        ((self.i_turn + i_winner_offset) % self.ruleset.n_players, veccard_points)
    }

    fn calculate_score(&mut self) -> SRoundResult {
        let n_cutoff = self.ruleset.cutoff();
        let mut n_points: isize = 0;
        let mut veci_defender = Vec::new();
        for (i_player, player) in self.vecplayer.iter().enumerate() {
            if !self.seti_friend.contains(&i_player) {
                veci_defender.push(i_player);
                n_points += player.veccard_points.iter().copied().map(points_card).sum::<isize>();
            }
        }
        if !self.seti_friend.contains(&self.i_turn) {
            n_points += self.veccard_kitty.iter().copied().map(points_card).sum::<isize>()
                * self.ruleset.n_bottom_multiplier;
        }
        let (n_multiplier, veci_winner) = if n_points >= n_cutoff {
            (1, veci_defender)
        } else {
            (
                self.ruleset.n_team_size.as_num::<isize>() - self.seti_friend.len().as_num::<isize>() + 1,
                self.seti_friend.iter().copied().collect(),
            )
        };
        let n_level_change = n_multiplier * if n_points==0 {
            3
        } else {
            ((n_points - n_cutoff) * 2).div_euclid(n_cutoff).abs()
        };
        self.veci_winner = veci_winner.clone();
        let mut veci_game_winner = Vec::new();
        for &i_player in &veci_winner {
            if self.vecplayer[i_player].increment_rank(n_level_change.as_num::<usize>()) {
                veci_game_winner.push(i_player);
            }
        }
        info!("Round over: {} points for the defenders, winners {:?} advance {} level(s).", n_points, veci_winner, n_level_change);
        SRoundResult {
            veci_winner,
            n_level_change,
            veci_game_winner,
            n_points,
            veccard_kitty: self.veccard_kitty.clone(),
        }
    }
}
