use crate::util::*;
use serde::{Deserialize, Serialize};

/// Per-match configuration, fixed at construction. Round handlers read it
/// but never modify it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SRuleSet {
    pub n_decks: usize,
    pub n_players: usize,
    pub n_kitty: usize,
    pub n_team_size: usize,
    pub b_wraparound: bool,
    pub b_winners_declare: bool,
    pub n_cutoff_per_deck: isize,
    pub n_bottom_multiplier: isize,
}

impl SRuleSet {
    pub fn new(n_decks: usize, n_players: usize) -> Result<SRuleSet, Error> {
        if n_decks==0 {
            bail!("Must not have 0 decks.");
        }
        if n_players<2 {
            bail!("Must have at least 2 players.");
        }
        let mut n_kitty = (54*n_decks) % n_players;
        // small kitties are unplayable, grow by a full deal round
        while 2*n_kitty + n_players < 12 {
            n_kitty += n_players;
        }
        Ok(SRuleSet {
            n_decks,
            n_players,
            n_kitty,
            n_team_size: n_players/2,
            b_wraparound: true,
            b_winners_declare: true,
            n_cutoff_per_deck: 40,
            n_bottom_multiplier: 2,
        })
    }

    pub fn with_kitty_size(mut self, n_kitty: usize) -> Result<SRuleSet, Error> {
        if 54*self.n_decks <= n_kitty || (54*self.n_decks - n_kitty) % self.n_players != 0 {
            bail!("Invalid bottom size.");
        }
        self.n_kitty = n_kitty;
        Ok(self)
    }

    pub fn with_team_size(mut self, n_team_size: usize) -> Result<SRuleSet, Error> {
        if n_team_size==0 {
            bail!("Must have a team size of at least 1.");
        }
        self.n_team_size = n_team_size;
        Ok(self)
    }

    pub fn with_wraparound(mut self, b_wraparound: bool) -> SRuleSet {
        self.b_wraparound = b_wraparound;
        self
    }

    pub fn with_winners_declare(mut self, b_winners_declare: bool) -> SRuleSet {
        self.b_winners_declare = b_winners_declare;
        self
    }

    pub fn with_cutoff_per_deck(mut self, n_cutoff_per_deck: isize) -> SRuleSet {
        self.n_cutoff_per_deck = n_cutoff_per_deck;
        self
    }

    pub fn with_bottom_multiplier(mut self, n_bottom_multiplier: isize) -> SRuleSet {
        self.n_bottom_multiplier = n_bottom_multiplier;
        self
    }

    pub fn cutoff(&self) -> isize {
        self.n_cutoff_per_deck * self.n_decks.as_num::<isize>()
    }
}
