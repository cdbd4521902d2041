pub mod matcher;
pub mod play;
pub mod ruleset;
pub mod selectable;

pub use self::{matcher::*, play::*, ruleset::*, selectable::*};

use crate::game::EGamePhase;
use crate::util::*;

/// Why a game action was rejected. Rejected actions never modify state.
#[derive(Debug, Fail)]
pub enum VGameError {
    #[fail(display = "{} requires phase {} but the game is in phase {}", str_action, ephase_required, ephase_actual)]
    WrongPhase {
        str_action: &'static str,
        ephase_required: EGamePhase,
        ephase_actual: EGamePhase,
    },
    #[fail(display = "Invalid combination shape: {}", _0)]
    InvalidShape(String),
    #[fail(display = "Out of range: {}", _0)]
    OutOfRange(String),
    #[fail(display = "Illegal declaration: {}", _0)]
    IllegalDeclaration(String),
    #[fail(display = "Illegal selection: {}", _0)]
    IllegalSelection(String),
    #[fail(display = "Illegal play: {}", _0)]
    IllegalPlay(String),
}
