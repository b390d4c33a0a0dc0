//! Static catalog: the map, the cards, the challenges and the reward tree.
//!
//! Reference data is read-only and shared across games. Live per-game state
//! lives in the store.

pub mod definition;
pub mod registry;

pub use definition::{
    ActionDef, CatalogSource, ChallengeDef, LineDef, Placement, PlacementNode, SectionRule, Special, SpecialDef,
    StartDeck, StopDef,
};
pub use registry::{clean, Catalog, CatalogError};
