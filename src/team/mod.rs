//! Teams: the challenge state machine, curses, specials and secrets.
//!
//! A team's whole state is one `TeamRecord` document. The operations here are
//! `impl Game` blocks split by concern:
//!
//! - `state`: roster, challenges, veto, win check
//! - `curses`: clearable and ongoing curses, special abilities
//! - `secrets`: secret stops, mulligan flags, the secret-moving specials

pub mod curses;
pub mod secrets;
pub mod state;

pub use state::Claimed;
