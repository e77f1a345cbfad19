//! Totalistic Life-like rules.

use crate::{
    cells::{State, ALIVE, DEAD},
    error::Error,
};
use ca_rules::ParseLife;
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A totalistic Life-like rule, given by its survival and birth sets.
///
/// A living cell stays [`ALIVE`] if its number of living neighbors is in
/// `survival`; a dead cell becomes [`ALIVE`] if its number of living
/// neighbors is in `birth`. Every other cell is [`DEAD`] in the next
/// generation.
///
/// Both sets may be empty, and may contain counts larger than
/// [`MAX_NEIGHBORS`](super::MAX_NEIGHBORS), which simply never match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleSet {
    survival: BTreeSet<u32>,
    birth: BTreeSet<u32>,
}

impl RuleSet {
    /// Constructs a new rule from the survival and birth counts.
    pub fn new<S, B>(survival: S, birth: B) -> Self
    where
        S: IntoIterator<Item = u32>,
        B: IntoIterator<Item = u32>,
    {
        RuleSet {
            survival: survival.into_iter().collect(),
            birth: birth.into_iter().collect(),
        }
    }

    /// Conway's Game of Life: `B3/S23`.
    pub fn conway() -> Self {
        Self::new([2, 3], [3])
    }

    /// HighLife: `B36/S23`.
    pub fn highlife() -> Self {
        Self::new([2, 3], [3, 6])
    }

    /// Seeds: `B2/S`. No cell ever survives.
    pub fn seeds() -> Self {
        Self::new([], [2])
    }

    /// Life without Death: `B3/S012345678`. No cell ever dies.
    pub fn life_without_death() -> Self {
        Self::new(0..=8, [3])
    }

    /// Day & Night: `B3678/S34678`.
    pub fn day_and_night() -> Self {
        Self::new([3, 4, 6, 7, 8], [3, 6, 7, 8])
    }

    /// Neighbor counts at which a living cell survives.
    pub fn survival(&self) -> &BTreeSet<u32> {
        &self.survival
    }

    /// Neighbor counts at which a dead cell is born.
    pub fn birth(&self) -> &BTreeSet<u32> {
        &self.birth
    }

    /// Whether a living cell with `count` living neighbors survives.
    #[inline]
    pub fn survives(&self, count: u32) -> bool {
        self.survival.contains(&count)
    }

    /// Whether a dead cell with `count` living neighbors is born.
    #[inline]
    pub fn is_born(&self, count: u32) -> bool {
        self.birth.contains(&count)
    }

    /// The state of a cell in the next generation.
    #[inline]
    pub fn next_state(&self, state: State, count: u32) -> State {
        let alive = if state == ALIVE {
            self.survives(count)
        } else {
            self.is_born(count)
        };
        if alive {
            ALIVE
        } else {
            DEAD
        }
    }

    /// The `B{birth}/S{survival}` notation of the rule.
    ///
    /// Only used for display: counts up to 9 are written as single digits,
    /// and a list containing a larger count is comma-separated instead.
    pub fn notation(&self) -> String {
        format!(
            "B{}/S{}",
            format_counts(&self.birth),
            format_counts(&self.survival)
        )
    }

    /// Parses a list of neighbor counts such as `"2, 3"` or `"[2, 3]"`.
    ///
    /// Counts are separated by commas or whitespace. An empty list is valid.
    pub fn parse_counts(input: &str) -> Result<BTreeSet<u32>, Error> {
        input
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| Error::ParseCountError(input.to_owned()))
            })
            .collect()
    }
}

fn format_counts(counts: &BTreeSet<u32>) -> String {
    if counts.iter().all(|&c| c <= 9) {
        counts.iter().map(u32::to_string).collect()
    } else {
        counts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::conway()
    }
}

/// A parser for the rule.
impl ParseLife for RuleSet {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        Self::new(s.into_iter().map(u32::from), b.into_iter().map(u32::from))
    }
}

impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rule: RuleSet = ParseLife::parse_rule(input).map_err(Error::ParseRuleError)?;
        Ok(rule)
    }
}

impl Display for RuleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conway_notation() {
        assert_eq!(RuleSet::conway().notation(), "B3/S23");
        assert_eq!(RuleSet::seeds().notation(), "B2/S");
        assert_eq!(RuleSet::life_without_death().notation(), "B3/S012345678");
        assert_eq!(RuleSet::default(), RuleSet::conway());
    }

    #[test]
    fn large_counts_are_comma_separated() {
        let rule = RuleSet::new([2], [3, 10]);
        assert_eq!(rule.notation(), "B3,10/S2");
    }

    #[test]
    fn parse_rule_string() -> Result<(), Error> {
        assert_eq!("B3/S23".parse::<RuleSet>()?, RuleSet::conway());
        assert_eq!("B36/S23".parse::<RuleSet>()?, RuleSet::highlife());
        assert_eq!("B2/S".parse::<RuleSet>()?, RuleSet::seeds());
        Ok(())
    }

    #[test]
    fn parse_invalid_rule_string() {
        assert!(matches!(
            "B3/Q23".parse::<RuleSet>(),
            Err(Error::ParseRuleError(_))
        ));
    }

    #[test]
    fn parse_counts() -> Result<(), Error> {
        let expected: BTreeSet<u32> = [2, 3].into_iter().collect();
        assert_eq!(RuleSet::parse_counts("2, 3")?, expected);
        assert_eq!(RuleSet::parse_counts("[2, 3]")?, expected);
        assert_eq!(RuleSet::parse_counts("3 2 3")?, expected);
        assert!(RuleSet::parse_counts("")?.is_empty());
        assert!(matches!(
            RuleSet::parse_counts("2, three"),
            Err(Error::ParseCountError(_))
        ));
        Ok(())
    }

    #[test]
    fn next_state() {
        let rule = RuleSet::conway();
        assert_eq!(rule.next_state(ALIVE, 2), ALIVE);
        assert_eq!(rule.next_state(ALIVE, 3), ALIVE);
        assert_eq!(rule.next_state(ALIVE, 4), DEAD);
        assert_eq!(rule.next_state(DEAD, 3), ALIVE);
        assert_eq!(rule.next_state(DEAD, 2), DEAD);
    }

    #[test]
    fn out_of_range_counts_never_match() {
        let rule = RuleSet::new([9, 42], [9]);
        for count in 0..=8 {
            assert_eq!(rule.next_state(ALIVE, count), DEAD);
            assert_eq!(rule.next_state(DEAD, count), DEAD);
        }
    }
}
