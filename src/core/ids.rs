//! Identifiers for every entity in a game.
//!
//! Entities are value objects reconstructed from an id and resolved against
//! the document store on each access, so ids are the only thing callers hold.
//!
//! ## Kinds
//!
//! - `GameId`: short uppercase code naming one game
//! - `TeamId`: roster index, allocated in join order
//! - `StopCode`, `LineColour`, `ChallengeId`, `ActionCode`: static catalog keys
//! - `DeckId`: one live card inside a game's deck (`CODE-zone-k`)
//! - `ZoneNumber`: one of the four map zones
//!
//! ```
//! use tramopoly::core::{DeckId, ActionCode, ZoneNumber};
//!
//! let id = DeckId::for_card(&ActionCode::new("RAILROADED"), ZoneNumber::new(2), 1);
//! assert_eq!(id.as_str(), "RAILROADED-2-1");
//! ```

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a string-backed identifier with the usual accessors.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Short uppercase code naming a game.
    GameId
}

string_id! {
    /// Static code of a map stop, e.g. `SPS`.
    StopCode
}

string_id! {
    /// Colour naming a line, e.g. `orange`.
    LineColour
}

string_id! {
    /// Static id of a challenge attached to a stop.
    ChallengeId
}

string_id! {
    /// Static code of an action card, e.g. `CURSE-CLEAR-SING`.
    ActionCode
}

string_id! {
    /// A live card bound to one game's deck.
    DeckId
}

impl DeckId {
    /// Deck id of the `copy`th copy of `code` in `zone`'s starting deck.
    #[must_use]
    pub fn for_card(code: &ActionCode, zone: ZoneNumber, copy: usize) -> Self {
        Self(format!("{code}-{zone}-{copy}"))
    }
}

/// Team identifier. Teams are numbered in the order they join a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl TeamId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Roster index of this team.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// One of the map's zones, numbered outward from the centre.
///
/// Border stops sit between their inner zone `n` and the outer zone `n + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneNumber(pub u8);

impl ZoneNumber {
    /// Highest zone number on the map.
    pub const MAX: u8 = 4;

    #[must_use]
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Whether this number names a zone that exists.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1 && self.0 <= Self::MAX
    }

    /// The zone beyond this one, if any.
    #[must_use]
    pub const fn outer(self) -> Option<Self> {
        if self.0 < Self::MAX {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// Every zone in ascending order.
    pub fn all() -> impl Iterator<Item = ZoneNumber> {
        (1..=Self::MAX).map(ZoneNumber)
    }
}

impl fmt::Display for ZoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
