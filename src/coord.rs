//! Board points and record coordinates.
//!
//! Records address points with one lowercase letter per axis, `a` through
//! `s` (0 through 18), column first. An empty value or the pass token maps to
//! no point at all, which is distinct from the corner `aa`.

use std::fmt;

use crate::constants::{COMPOSE_SEPARATOR, COORD_FIRST, COORD_LAST, PASS_TOKEN};

/// A point on the board. `x` is the column, `y` the row, both zero-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row-major offset of this point on a board of the given size.
    #[inline]
    pub const fn offset(self, size: usize) -> usize {
        self.y * size + self.x
    }

    /// Inverse of [`Point::offset`].
    #[inline]
    pub const fn from_offset(offset: usize, size: usize) -> Self {
        Self {
            x: offset % size,
            y: offset / size,
        }
    }

    #[inline]
    pub const fn is_on_board(self, size: usize) -> bool {
        self.x < size && self.y < size
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match to_sgf_coord(*self) {
            Some(coord) => f.write_str(&coord),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

fn axis(byte: u8) -> Option<usize> {
    (COORD_FIRST..=COORD_LAST)
        .contains(&byte)
        .then(|| (byte - COORD_FIRST) as usize)
}

/// Parse a record coordinate (e.g. "dd") into a point.
///
/// Returns `None` for an empty value, the pass token, or anything outside
/// the `a..s` alphabet. Characters beyond the first two are ignored, so
/// the leading half of a composed value ("dd:A") resolves to its point.
pub fn parse_sgf_coord(coord: &str) -> Option<Point> {
    if coord.is_empty() || coord == PASS_TOKEN {
        return None;
    }
    let bytes = coord.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    Some(Point::new(axis(bytes[0])?, axis(bytes[1])?))
}

/// Convert a point back into a record coordinate.
///
/// Returns `None` if either axis falls outside the coordinate alphabet.
pub fn to_sgf_coord(pt: Point) -> Option<String> {
    let span = (COORD_LAST - COORD_FIRST) as usize;
    if pt.x > span || pt.y > span {
        return None;
    }
    let mut s = String::with_capacity(2);
    s.push((COORD_FIRST + pt.x as u8) as char);
    s.push((COORD_FIRST + pt.y as u8) as char);
    Some(s)
}

/// Like [`to_sgf_coord`], but also rejects points off a board of `size`.
pub fn to_sgf_coord_on(pt: Point, size: usize) -> Option<String> {
    if !pt.is_on_board(size) {
        return None;
    }
    to_sgf_coord(pt)
}

/// Split a composed value ("aa:bb", "dd:label") at the first separator.
pub fn split_composed(value: &str) -> (&str, Option<&str>) {
    match value.split_once(COMPOSE_SEPARATOR) {
        Some((head, tail)) => (head, Some(tail)),
        None => (value, None),
    }
}

/// Expand compressed point ranges.
///
/// Every value of the form "UL:LR" contributes each coordinate inside the
/// rectangle, column by column. The original values are kept at the front,
/// so the input is never lost and expanding twice only repeats points.
pub fn expand_compressed(coords: &[String]) -> Vec<String> {
    let mut expanded = coords.to_vec();
    for coord in coords {
        let (ul, Some(lr)) = split_composed(coord) else {
            continue;
        };
        let (Some(ul), Some(lr)) = (parse_sgf_coord(ul), parse_sgf_coord(lr)) else {
            continue;
        };
        for x in ul.x..=lr.x {
            for y in ul.y..=lr.y {
                if let Some(c) = to_sgf_coord(Point::new(x, y)) {
                    expanded.push(c);
                }
            }
        }
    }
    expanded
}

/// Whether a value is a compressed range rather than a single coordinate.
pub fn is_compressed(coord: &str) -> bool {
    coord.contains(COMPOSE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corners() {
        assert_eq!(parse_sgf_coord("aa"), Some(Point::new(0, 0)));
        assert_eq!(parse_sgf_coord("ss"), Some(Point::new(18, 18)));
        assert_eq!(parse_sgf_coord("da"), Some(Point::new(3, 0)));
    }

    #[test]
    fn test_pass_is_not_a_point() {
        assert_eq!(parse_sgf_coord(""), None);
        assert_eq!(parse_sgf_coord("tt"), None);
        assert_ne!(parse_sgf_coord("aa"), None);
    }

    #[test]
    fn test_out_of_alphabet() {
        assert_eq!(parse_sgf_coord("zz"), None);
        assert_eq!(parse_sgf_coord("a"), None);
        assert_eq!(parse_sgf_coord("AA"), None);
    }

    #[test]
    fn test_coord_roundtrip() {
        for x in 0..19 {
            for y in 0..19 {
                let pt = Point::new(x, y);
                let s = to_sgf_coord(pt).unwrap();
                assert_eq!(parse_sgf_coord(&s), Some(pt), "roundtrip failed for {s}");
            }
        }
        assert_eq!(to_sgf_coord(Point::new(19, 0)), None);
    }

    #[test]
    fn test_coord_on_small_board() {
        assert_eq!(to_sgf_coord_on(Point::new(8, 8), 9).as_deref(), Some("ii"));
        assert_eq!(to_sgf_coord_on(Point::new(9, 0), 9), None);
    }

    #[test]
    fn test_expand_rectangle() {
        let coords = vec!["aa:bb".to_string()];
        let expanded = expand_compressed(&coords);
        assert_eq!(expanded, vec!["aa:bb", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn test_expand_leaves_plain_points() {
        let coords = vec!["cc".to_string(), "dd".to_string()];
        assert_eq!(expand_compressed(&coords), coords);
    }

    #[test]
    fn test_expand_does_not_touch_input() {
        let coords = vec!["aa:ab".to_string()];
        let first = expand_compressed(&coords);
        let second = expand_compressed(&coords);
        assert_eq!(first, second);
        assert_eq!(coords, vec!["aa:ab"]);
    }

    #[test]
    fn test_split_composed() {
        assert_eq!(split_composed("dd:A"), ("dd", Some("A")));
        assert_eq!(split_composed("dd"), ("dd", None));
        assert_eq!(split_composed("dd:a:b"), ("dd", Some("a:b")));
    }
}
