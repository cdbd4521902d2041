pub mod card;
pub mod hand;

pub use self::{card::*, hand::*};
