//! Team import and export for Coliseum battles.
//!
//! A [`TeamSet`] names species, nicknames, moves and bag items without
//! touching the catalog. It can be read from and written to a plain-text
//! format ([`parse_team`], [`TeamSet::to_text`]) or JSON, and turned into a
//! battle-ready roster and inventory with [`TeamSet::build`].
//!
//! ```ignore
//! use coliseum_battle::{Catalog, Coach};
//! use coliseum_team::parse_team;
//!
//! let team = parse_team("Sparky (Pikachu)\n- Thunderbolt\n\nBag: Potion")?;
//! let (roster, bag) = team.build(Catalog::builtin()?)?;
//! let coach = Coach::human("Ash").with_roster(roster).with_inventory(bag);
//! ```

mod error;
mod set;
mod text;

pub use error::TeamError;
pub use set::{MemberSet, TeamSet};
pub use text::parse_team;
