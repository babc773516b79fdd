//! Axial hex-grid coordinates and the six walking directions.
//!
//! The world is a lazily expanding hex grid addressed by axial `(q, r)`
//! coordinates. Every direction has a fixed offset, and opposite directions
//! cancel exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the axial hex grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Where new and defeated players stand.
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The neighbouring cell in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        move_axial(self, direction)
    }

    /// Axis-aligned box of `radius` cells around this coordinate.
    pub fn bounds(self, radius: u32) -> HexBounds {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        HexBounds {
            min_q: self.q.saturating_sub(radius),
            max_q: self.q.saturating_add(radius),
            min_r: self.r.saturating_sub(radius),
            max_r: self.r.saturating_add(radius),
        }
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Inclusive coordinate box used for the visible-room query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexBounds {
    pub min_q: i32,
    pub max_q: i32,
    pub min_r: i32,
    pub max_r: i32,
}

impl HexBounds {
    pub fn contains(&self, coord: HexCoord) -> bool {
        (self.min_q..=self.max_q).contains(&coord.q) && (self.min_r..=self.max_r).contains(&coord.r)
    }
}

/// One of the six hex directions a player can walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    N,
    S,
    Ne,
    Se,
    Nw,
    Sw,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::N,
        Direction::S,
        Direction::Ne,
        Direction::Se,
        Direction::Nw,
        Direction::Sw,
    ];

    /// Axial `(dq, dr)` offset for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::S => (0, 1),
            Direction::Ne => (1, -1),
            Direction::Sw => (-1, 1),
            Direction::Nw => (-1, 0),
            Direction::Se => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::Ne => Direction::Sw,
            Direction::Sw => Direction::Ne,
            Direction::Nw => Direction::Se,
            Direction::Se => Direction::Nw,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::S => "s",
            Direction::Ne => "ne",
            Direction::Se => "se",
            Direction::Nw => "nw",
            Direction::Sw => "sw",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Direction::N => "north",
            Direction::S => "south",
            Direction::Ne => "northeast",
            Direction::Se => "southeast",
            Direction::Nw => "northwest",
            Direction::Sw => "southwest",
        }
    }

    /// Parse a single direction word, short or long form, case-insensitive.
    pub fn parse(word: &str) -> Option<Direction> {
        let word = word.trim().to_ascii_lowercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.short_name() == word || d.long_name() == word)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Apply a direction's offset to a coordinate.
pub fn move_axial(coord: HexCoord, direction: Direction) -> HexCoord {
    let (dq, dr) = direction.offset();
    HexCoord {
        q: coord.q + dq,
        r: coord.r + dr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_the_axial_table() {
        assert_eq!(Direction::N.offset(), (0, -1));
        assert_eq!(Direction::S.offset(), (0, 1));
        assert_eq!(Direction::Ne.offset(), (1, -1));
        assert_eq!(Direction::Sw.offset(), (-1, 1));
        assert_eq!(Direction::Nw.offset(), (-1, 0));
        assert_eq!(Direction::Se.offset(), (1, 0));
    }

    #[test]
    fn opposite_steps_return_to_the_start() {
        let start = HexCoord::new(3, -7);
        for direction in Direction::ALL {
            let there = move_axial(start, direction);
            assert_ne!(there, start);
            assert_eq!(move_axial(there, direction.opposite()), start, "{direction}");
        }
    }

    #[test]
    fn inverse_pairs_are_the_documented_ones() {
        assert_eq!(Direction::N.opposite(), Direction::S);
        assert_eq!(Direction::Ne.opposite(), Direction::Sw);
        assert_eq!(Direction::Nw.opposite(), Direction::Se);
    }

    #[test]
    fn parse_accepts_short_and_long_names() {
        assert_eq!(Direction::parse("NE"), Some(Direction::Ne));
        assert_eq!(Direction::parse("southwest"), Some(Direction::Sw));
        assert_eq!(Direction::parse("up"), None);
    }

    #[test]
    fn bounds_cover_the_radius_box() {
        let bounds = HexCoord::new(2, 2).bounds(5);
        assert!(bounds.contains(HexCoord::new(-3, 7)));
        assert!(!bounds.contains(HexCoord::new(-4, 2)));
    }
}
