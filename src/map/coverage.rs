//! Zone coverage: whether a set of stops spans enough zones to claim a line.
//!
//! ## Algorithm
//!
//! Pure stops tick their own zone. Border stops are pooled by inner zone; a
//! border stop with inner zone `n` can tick either `n` or `n + 1`. Open zones
//! are then visited in ascending order, and each takes a border stop whose
//! outer zone it is (inner `z - 1`, which is useless for later zones) before
//! one whose inner zone it is (inner `z`). Visiting deadlines in order and
//! spending the tightest candidate first is optimal, so the result equals the
//! best possible assignment and does not depend on the order stops are given.
//!
//! ## Section mode
//!
//! With the claim-orange special on the section line, pure stops tick a
//! `(zone, parent section)` pair instead of a zone. Holding the shortcut stop
//! together with a pure stop in the shortcut section succeeds outright.
//! Section keys never close a numbered zone, so border stops may then add
//! coverage in any zone they touch.

use smallvec::SmallVec;

use crate::catalog::SectionRule;
use crate::core::ZoneNumber;

/// Distinct zones a line claim must cover.
pub const ZONES_TO_CLAIM: usize = 3;

/// The zone facts of one stop that coverage needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneSpan<'a> {
    pub code: &'a str,
    pub zone: ZoneNumber,
    pub border: bool,
    pub parent: Option<&'a str>,
}

/// Whether coverage counts zones or route sections.
#[derive(Clone, Copy, Debug)]
pub enum CoverageMode<'a> {
    Zones,
    Sections(&'a SectionRule),
}

/// Whether `spans` cover at least `ZONES_TO_CLAIM` zones.
#[must_use]
pub fn enough_zones_covered(spans: &[ZoneSpan<'_>], mode: CoverageMode<'_>) -> bool {
    covered_zone_count(spans, mode) >= ZONES_TO_CLAIM
}

/// How many zones `spans` cover under the best border assignment.
///
/// In section mode a satisfied shortcut reports `ZONES_TO_CLAIM`.
#[must_use]
pub fn covered_zone_count(spans: &[ZoneSpan<'_>], mode: CoverageMode<'_>) -> usize {
    let mut ticked: SmallVec<[(u8, Option<&str>); 8]> = SmallVec::new();
    // border stops available, indexed by inner zone
    let mut borders = [0usize; ZoneNumber::MAX as usize + 1];

    for span in spans {
        if span.border {
            if let Some(slot) = borders.get_mut(usize::from(span.zone.raw())) {
                *slot += 1;
            }
            continue;
        }
        let key = match mode {
            CoverageMode::Zones => (span.zone.raw(), None),
            CoverageMode::Sections(_) => (span.zone.raw(), span.parent),
        };
        if !ticked.contains(&key) {
            ticked.push(key);
        }
    }

    if let CoverageMode::Sections(rule) = mode {
        let shortcut = (rule.shortcut_zone.raw(), Some(rule.shortcut_parent.as_str()));
        let holds_stop = spans.iter().any(|span| span.code == rule.shortcut_stop.as_str());
        if ticked.len() < ZONES_TO_CLAIM && holds_stop && ticked.contains(&shortcut) {
            return ZONES_TO_CLAIM;
        }
    }

    let mut covered = ticked.len();
    for zone in ZoneNumber::all() {
        let open = match mode {
            CoverageMode::Zones => !ticked.iter().any(|(ticked_zone, _)| *ticked_zone == zone.raw()),
            CoverageMode::Sections(_) => true,
        };
        if !open {
            continue;
        }
        let below = usize::from(zone.raw() - 1);
        let here = usize::from(zone.raw());
        if borders[below] > 0 {
            borders[below] -= 1;
            covered += 1;
        } else if borders[here] > 0 {
            borders[here] -= 1;
            covered += 1;
        }
    }
    covered
}
