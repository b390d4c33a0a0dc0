//! Validated catalog with fast lookup.
//!
//! The `Catalog` is loaded once and shared by every game. Loading checks that
//! every cross-reference resolves (stop lines, parents, challenges, deck
//! codes, reward placements, search targets), so game code can treat a
//! missing lookup on catalog data as a broken invariant.

use rustc_hash::FxHashMap;

use crate::core::{ActionCode, ChallengeId, LineColour, StopCode, ZoneNumber};

use super::definition::{
    ActionDef, CatalogSource, ChallengeDef, LineDef, Placement, PlacementNode, SectionRule, Special, SpecialDef,
    StopDef,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate {kind} {code}")]
    Duplicate { kind: &'static str, code: String },
    #[error("{from} refers to unknown {kind} {code}")]
    UnknownReference {
        kind: &'static str,
        code: String,
        from: String,
    },
    #[error("unknown action code {0}")]
    UnknownActionCode(String),
    #[error("ongoing curse {0} has no timer")]
    MissingTimer(String),
    #[error("stop {stop} has invalid zone {zone}")]
    InvalidZone { stop: String, zone: u8 },
    #[error("challenge {0} is attached to more than one stop")]
    SharedChallenge(String),
}

/// Strip a search term down to lowercase letters, digits and single spaces.
///
/// ```
/// use tramopoly::catalog::clean;
///
/// assert_eq!(clean("St. Peter's-Square"), "st peters square");
/// ```
#[must_use]
pub fn clean(term: &str) -> String {
    term.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c == '-' || c == ' ' {
                Some(' ')
            } else {
                None
            }
        })
        .collect()
}

/// Static reference data, keyed by code.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    stops: FxHashMap<StopCode, StopDef>,
    stop_order: Vec<StopCode>,
    lines: Vec<LineDef>,
    challenges: FxHashMap<ChallengeId, ChallengeDef>,
    challenge_stops: FxHashMap<ChallengeId, StopCode>,
    actions: FxHashMap<ActionCode, ActionDef>,
    specials: FxHashMap<Special, SpecialDef>,
    start_decks: FxHashMap<ZoneNumber, Vec<ActionCode>>,
    rewards: Vec<Placement>,
    search: FxHashMap<String, StopCode>,
    central_stop: Option<StopCode>,
    sections: Option<SectionRule>,
}

fn unknown(kind: &'static str, code: impl ToString, from: impl ToString) -> CatalogError {
    CatalogError::UnknownReference {
        kind,
        code: code.to_string(),
        from: from.to_string(),
    }
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let source: CatalogSource = serde_json::from_str(json)?;
        Self::from_source(source)
    }

    /// Index and validate already-parsed catalog data.
    pub fn from_source(source: CatalogSource) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            rewards: source.rewards,
            central_stop: source.central_stop,
            sections: source.sections,
            ..Self::default()
        };

        for line in source.lines {
            if catalog.line(&line.colour).is_some() {
                return Err(CatalogError::Duplicate {
                    kind: "line",
                    code: line.colour.to_string(),
                });
            }
            catalog.lines.push(line);
        }

        for challenge in source.challenges {
            if catalog.challenges.contains_key(&challenge.id) {
                return Err(CatalogError::Duplicate {
                    kind: "challenge",
                    code: challenge.id.to_string(),
                });
            }
            catalog.challenges.insert(challenge.id.clone(), challenge);
        }

        for stop in source.stops {
            catalog.register_stop(stop)?;
        }

        for action in source.actions {
            if catalog.actions.contains_key(&action.code) {
                return Err(CatalogError::Duplicate {
                    kind: "action",
                    code: action.code.to_string(),
                });
            }
            catalog.actions.insert(action.code.clone(), action);
        }

        for special in source.specials {
            catalog.specials.insert(special.code, special);
        }

        for deck in source.start_decks {
            if let Some(code) = deck.cards.iter().find(|code| !catalog.actions.contains_key(*code)) {
                return Err(unknown("action", code, format!("zone {} deck", deck.zone)));
            }
            catalog.start_decks.entry(deck.zone).or_default().extend(deck.cards);
        }

        for (term, code) in source.search {
            if !catalog.stops.contains_key(&code) {
                return Err(unknown("stop", &code, format!("search term {term:?}")));
            }
            catalog.search.insert(clean(&term), code);
        }

        catalog.validate()?;
        Ok(catalog)
    }

    fn register_stop(&mut self, stop: StopDef) -> Result<(), CatalogError> {
        if self.stops.contains_key(&stop.code) {
            return Err(CatalogError::Duplicate {
                kind: "stop",
                code: stop.code.to_string(),
            });
        }
        let zone_ok = stop.zone.is_valid() && (!stop.border || stop.zone.outer().is_some());
        if !zone_ok {
            return Err(CatalogError::InvalidZone {
                stop: stop.code.to_string(),
                zone: stop.zone.raw(),
            });
        }
        if let Some(line) = stop.lines.iter().find(|line| self.line(line).is_none()) {
            return Err(unknown("line", line, &stop.code));
        }
        for challenge in &stop.challenges {
            if !self.challenges.contains_key(challenge) {
                return Err(unknown("challenge", challenge, &stop.code));
            }
            if self
                .challenge_stops
                .insert(challenge.clone(), stop.code.clone())
                .is_some()
            {
                return Err(CatalogError::SharedChallenge(challenge.to_string()));
            }
        }
        self.stop_order.push(stop.code.clone());
        self.stops.insert(stop.code.clone(), stop);
        Ok(())
    }

    /// Checks that need every stop registered first.
    fn validate(&self) -> Result<(), CatalogError> {
        for stop in self.stops() {
            if let Some(parent) = &stop.parent {
                if !self.stops.contains_key(parent) {
                    return Err(unknown("stop", parent, format!("parent of {}", stop.code)));
                }
            }
        }
        if let Some(central) = &self.central_stop {
            if !self.stops.contains_key(central) {
                return Err(unknown("stop", central, "central_stop"));
            }
        }
        if let Some(rule) = &self.sections {
            if self.line(&rule.line).is_none() {
                return Err(unknown("line", &rule.line, "sections"));
            }
            if !self.stops.contains_key(&rule.shortcut_stop) {
                return Err(unknown("stop", &rule.shortcut_stop, "sections"));
            }
        }
        self.validate_placements(&self.rewards)
    }

    fn validate_placements(&self, parts: &[Placement]) -> Result<(), CatalogError> {
        for part in parts {
            match part {
                Placement::Stop(code) | Placement::Node(PlacementNode::Special { stop: code, .. }) => {
                    if !self.stops.contains_key(code) {
                        return Err(unknown("stop", code, "reward placement"));
                    }
                }
                Placement::Node(PlacementNode::Choice { parts, .. } | PlacementNode::All { parts }) => {
                    self.validate_placements(parts)?;
                }
            }
        }
        Ok(())
    }

    // Stops

    #[must_use]
    pub fn stop(&self, code: &str) -> Option<&StopDef> {
        self.stops.get(code)
    }

    /// All stops in catalog order.
    pub fn stops(&self) -> impl Iterator<Item = &StopDef> {
        self.stop_order.iter().filter_map(|code| self.stops.get(code))
    }

    pub fn stops_on_line<'a>(&'a self, line: &'a LineColour) -> impl Iterator<Item = &'a StopDef> {
        self.stops().filter(move |stop| stop.on_line(line))
    }

    /// Stops whose inner zone is `zone`.
    pub fn stops_in_zone(&self, zone: ZoneNumber) -> impl Iterator<Item = &StopDef> {
        self.stops().filter(move |stop| stop.zone == zone)
    }

    /// The route section a stop belongs to.
    ///
    /// Zone-1 stops off the border all share the central stop.
    #[must_use]
    pub fn parent_of<'a>(&'a self, stop: &'a StopDef) -> Option<&'a StopCode> {
        match &self.central_stop {
            Some(central) if stop.zone == ZoneNumber::new(1) && !stop.border => Some(central),
            _ => stop.parent.as_ref(),
        }
    }

    /// Look a stop up by a loosely typed name.
    #[must_use]
    pub fn search_stop(&self, term: &str) -> Option<&StopDef> {
        let code = self.search.get(&clean(term))?;
        self.stop(code.as_str())
    }

    // Lines

    #[must_use]
    pub fn line(&self, colour: &LineColour) -> Option<&LineDef> {
        self.lines.iter().find(|line| &line.colour == colour)
    }

    /// All lines in catalog order.
    #[must_use]
    pub fn lines(&self) -> &[LineDef] {
        &self.lines
    }

    #[must_use]
    pub fn sections(&self) -> Option<&SectionRule> {
        self.sections.as_ref()
    }

    // Challenges

    #[must_use]
    pub fn challenge(&self, id: &ChallengeId) -> Option<&ChallengeDef> {
        self.challenges.get(id)
    }

    /// The stop a challenge is attempted at.
    #[must_use]
    pub fn challenge_location(&self, id: &ChallengeId) -> Option<&StopCode> {
        self.challenge_stops.get(id)
    }

    #[must_use]
    pub fn challenge_by_title(&self, title: &str) -> Option<&ChallengeDef> {
        let wanted = clean(title);
        self.challenges.values().find(|challenge| clean(&challenge.title) == wanted)
    }

    // Cards

    #[must_use]
    pub fn action(&self, code: &ActionCode) -> Option<&ActionDef> {
        self.actions.get(code)
    }

    /// Starting deck codes of a zone, repeats included.
    #[must_use]
    pub fn start_deck(&self, zone: ZoneNumber) -> &[ActionCode] {
        self.start_decks.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Zones whose starting deck holds `code`.
    pub fn zones_holding<'a>(&'a self, code: &'a ActionCode) -> impl Iterator<Item = ZoneNumber> + 'a {
        ZoneNumber::all().filter(move |zone| self.start_deck(*zone).contains(code))
    }

    #[must_use]
    pub fn special(&self, code: Special) -> Option<&SpecialDef> {
        self.specials.get(&code)
    }

    /// The reward placement tree.
    #[must_use]
    pub fn rewards(&self) -> &[Placement] {
        &self.rewards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "lines": [{"colour": "blue"}, {"colour": "orange"}],
        "challenges": [
            {"id": "C1", "title": "Sing a Song"},
            {"id": "C2", "title": "Count Trams", "veto_minutes": 5}
        ],
        "stops": [
            {"code": "SPS", "name": "St Peter's Square", "zone": 1, "lines": ["blue", "orange"], "challenges": ["C1"]},
            {"code": "PIC", "name": "Piccadilly", "zone": 1, "lines": ["blue"], "parent": "SPS"},
            {"code": "CNK", "name": "Cornbrook", "zone": 1, "border": true, "lines": ["orange"], "parent": "SPS", "challenges": ["C2"]}
        ],
        "actions": [
            {"code": "CANCELLED", "title": "Cancelled"},
            {"code": "CURSE-ONGOING-HOP", "title": "Hop", "timer_minutes": 15}
        ],
        "start_decks": [{"zone": 1, "cards": ["CANCELLED", "CANCELLED", "CURSE-ONGOING-HOP"]}],
        "rewards": ["PIC", {"type": "special", "stop": "CNK", "code": "IMMUNITY"}],
        "search": {"St Peter's Square": "SPS", "piccadilly": "PIC"},
        "central_stop": "SPS"
    }"#;

    #[test]
    fn test_load_and_lookup() {
        let catalog = Catalog::from_json(CATALOG).unwrap();

        assert_eq!(catalog.stops().count(), 3);
        assert_eq!(catalog.stops_on_line(&LineColour::new("orange")).count(), 2);
        assert_eq!(catalog.challenge_location(&ChallengeId::new("C2")), Some(&StopCode::new("CNK")));
        assert_eq!(catalog.start_deck(ZoneNumber::new(1)).len(), 3);
        assert!(catalog.start_deck(ZoneNumber::new(4)).is_empty());
    }

    #[test]
    fn test_search() {
        let catalog = Catalog::from_json(CATALOG).unwrap();

        assert_eq!(catalog.search_stop("st peters square").map(|s| s.name.as_str()), Some("St Peter's Square"));
        assert_eq!(catalog.search_stop("PICCADILLY!").map(|s| s.code.as_str()), Some("PIC"));
        assert!(catalog.search_stop("nowhere").is_none());
        assert_eq!(catalog.challenge_by_title("count trams").map(|c| c.id.as_str()), Some("C2"));
    }

    #[test]
    fn test_parent_of() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let pic = catalog.stop("PIC").unwrap();
        let cnk = catalog.stop("CNK").unwrap();
        let sps = catalog.stop("SPS").unwrap();

        assert_eq!(catalog.parent_of(pic).map(StopCode::as_str), Some("SPS"));
        assert_eq!(catalog.parent_of(sps).map(StopCode::as_str), Some("SPS"));
        assert_eq!(catalog.parent_of(cnk).map(StopCode::as_str), Some("SPS"));
    }

    #[test]
    fn test_dangling_line_rejected() {
        let json = r#"{"stops": [{"code": "X", "name": "X", "zone": 1, "lines": ["pink"]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::UnknownReference { kind: "line", .. })
        ));
    }

    #[test]
    fn test_outer_border_rejected() {
        let json = r#"{"stops": [{"code": "X", "name": "X", "zone": 4, "border": true}]}"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::InvalidZone { .. })));
    }

    #[test]
    fn test_unknown_deck_card_rejected() {
        let json = r#"{"start_decks": [{"zone": 1, "cards": ["CANCELLED"]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::UnknownReference { kind: "action", .. })
        ));
    }

    #[test]
    fn test_unknown_action_code_rejected() {
        let json = r#"{"actions": [{"code": "WILDCARD", "title": "?"}]}"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("Team Red"), "team red");
        assert_eq!(clean("  A-b "), "  a b ");
    }
}
