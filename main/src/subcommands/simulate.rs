use crate::util::*;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tractor_lib::game::*;
use tractor_lib::primitives::*;
use tractor_lib::rules::*;

pub fn subcommand(str_subcommand: &'static str) -> clap::Command<'static> {
    clap::Command::new(str_subcommand)
        .about("Simulates rounds played by simple bot players.")
        .arg(clap::Arg::new("decks")
            .long("decks")
            .takes_value(true)
            .default_value("2")
            .help("Number of physical decks")
        )
        .arg(clap::Arg::new("players")
            .long("players")
            .takes_value(true)
            .default_value("5")
            .help("Number of players")
        )
        .arg(clap::Arg::new("rounds")
            .long("rounds")
            .takes_value(true)
            .default_value("1")
            .help("Number of rounds to play")
        )
        .arg(clap::Arg::new("seed")
            .long("seed")
            .takes_value(true)
            .help("Seed for the deck shuffles, for reproducible rounds")
        )
}

fn parse_arg<T: std::str::FromStr>(clapmatches: &clap::ArgMatches, str_arg: &str) -> Result<T, Error> {
    unwrap!(clapmatches.value_of(str_arg))
        .parse()
        .map_err(|_| format_err!("Cannot parse --{}.", str_arg))
}

pub fn run(clapmatches: &clap::ArgMatches) -> Result<(), Error> {
    let n_decks = parse_arg(clapmatches, "decks")?;
    let n_players = parse_arg(clapmatches, "players")?;
    let n_rounds: usize = parse_arg(clapmatches, "rounds")?;
    let rng = match clapmatches.value_of("seed") {
        Some(str_seed) => StdRng::seed_from_u64(
            str_seed.parse().map_err(|_| format_err!("Cannot parse --seed."))?
        ),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut gamestate = SGameState::new(
        SRuleSet::new(n_decks, n_players)?,
        SShuffledDeckSource::new(rng),
    );
    for i_round in 0..n_rounds {
        let roundresult = play_round(&mut gamestate)?;
        println!(
            "Round {}: {} points for the defenders; players {:?} advance {} level(s).",
            i_round + 1,
            roundresult.n_points,
            roundresult.veci_winner,
            roundresult.n_level_change,
        );
        if !roundresult.veci_game_winner.is_empty() {
            println!("Game over: players {:?} win.", roundresult.veci_game_winner);
            break;
        }
    }
    for (i_player, player) in gamestate.vecplayer.iter().enumerate() {
        println!("Player {} stands at rank {}.", i_player, player.erank.text());
    }
    Ok(())
}

fn play_round(gamestate: &mut SGameState<impl TDeckSource>) -> Result<SRoundResult, Error> {
    gamestate.start_round()?;
    while gamestate.deal_card()?.is_some() {}
    declare_best(gamestate)?;
    let dealphaseresult = gamestate.end_deal_phase()?;
    exchange_bottom(gamestate, dealphaseresult.i_dealer)?;
    loop {
        let vecplay = choose_play(gamestate)?;
        if let VPlayResult::Round(roundresult) = gamestate.make_play(vecplay)? {
            return Ok(roundresult);
        }
    }
}

/// Declares the strongest declaration available to any eligible player.
fn declare_best(gamestate: &mut SGameState<impl TDeckSource>) -> Result<(), Error> {
    let mut otpl_best: Option<(usize, ECard, usize)> = None;
    for (i_player, player) in gamestate.vecplayer.iter().enumerate() {
        if gamestate.ruleset.b_winners_declare && !gamestate.veci_winner.contains(&i_player) {
            continue;
        }
        for &card in player.hand.cards().iter().unique() {
            if let ECard::Suited(erank, _esuit) = card {
                if erank==player.erank {
                    let n_amount = player.hand.count(card);
                    if otpl_best.map_or(true, |(_i, _card, n_amount_best)| n_amount_best < n_amount) {
                        otpl_best = Some((i_player, card, n_amount));
                    }
                }
            }
        }
    }
    let (i_player, card, n_amount) = otpl_best
        .ok_or_else(|| format_err!("No player can declare trump."))?;
    gamestate.declare(i_player, card, n_amount)?;
    Ok(())
}

fn exchange_bottom(gamestate: &mut SGameState<impl TDeckSource>, i_dealer: usize) -> Result<(), Error> {
    // hands are sorted after the deal, so the front of the dealer's hand
    // holds the weakest plain-suit cards
    let veccard_bottom = gamestate.vecplayer[i_dealer].hand.cards()
        [..gamestate.ruleset.n_kitty]
        .to_vec();
    let vecfriendcall = ESuit::values()
        .collect::<Vec<_>>()
        .into_iter()
        .cycle()
        .take(gamestate.ruleset.n_team_size - 1)
        .map(|esuit| SFriendCall {
            card: ECard::new(ERank::Ace, esuit),
            n_nth: 1,
        })
        .collect();
    gamestate.end_bottom_phase(&veccard_bottom, vecfriendcall)?;
    Ok(())
}

fn choose_play(gamestate: &SGameState<impl TDeckSource>) -> Result<Vec<SPlay>, Error> {
    let declared = gamestate.odeclared
        .ok_or_else(|| format_err!("No trump declared."))?;
    let b_wraparound = gamestate.ruleset.b_wraparound;
    let hand = &gamestate.vecplayer[gamestate.i_turn].hand;
    match gamestate.vectrick.first() {
        None => {
            // lead the biggest combination of the longest suit
            let trumporsuit_lead = unwrap!(
                ESuit::values()
                    .map(VTrumpOrSuit::Suit)
                    .chain(std::iter::once(VTrumpOrSuit::Trump))
                    .max_by_key(|&trumporsuit| hand.cards_of_suit(trumporsuit, declared).len())
            );
            let veccard_suited = hand.cards_of_suit(trumporsuit_lead, declared);
            let vecplay = SMatcher::new_from_hand(&veccard_suited, declared, b_wraparound)
                .decompose_maximal();
            Ok(vec![*unwrap!(vecplay.first())])
        },
        Some(vecplay_lead) => {
            let n_trick_size: usize = vecplay_lead.iter().map(|play| play.size()).sum();
            let mut veccard_selected = Vec::new();
            while veccard_selected.len() < n_trick_size {
                let veccard_selectable = selectable_cards(
                    hand,
                    &veccard_selected,
                    Some(&vecplay_lead[..]),
                    declared,
                    b_wraparound,
                );
                match veccard_selectable.first() {
                    Some(&card) => veccard_selected.push(card),
                    None => return Err(format_err!(
                        "Player {} has no selectable card.", gamestate.i_turn
                    )),
                }
            }
            Ok(SMatcher::new_from_hand(&veccard_selected, declared, b_wraparound)
                .decompose_maximal())
        },
    }
}
