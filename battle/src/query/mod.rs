//! Query helpers for battle decision making

mod matchup;

pub use matchup::{
    has_advantage, immunities, is_disadvantaged, matchup_score, resistances, weaknesses,
};
