//! Node properties.
//!
//! A node carries an ordered bag of properties. Codes the engine understands
//! are tagged variants of [`PropId`]; anything else is kept verbatim in
//! [`PropId::Other`] so a record survives a load/save cycle untouched.
//! Insertion order is preserved because serialization follows it.

use std::fmt;

/// What the replay engine does with a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// Play a stone through the rule engine (B, W).
    Move,
    /// Place or remove stones without rules (AB, AW, AE).
    Setup,
    /// Draw a marker (CR, TR, SQ, MA, LB, LN, AR, TW, TB, DD).
    Markup,
    /// Override the displayed move number (MN).
    MoveNumber,
    /// Force the player to move (PL).
    PlayerToMove,
    /// Node comment (C).
    Comment,
    /// Move or position annotation (N, GB, GW, DM, HO, UC, V, BM, DO, IT, TE, KO).
    Annotation,
    /// Clock information (BL, WL, OB, OW).
    Timing,
    /// Game information; stored, never dispatched.
    GameInfo,
    /// Unrecognized code; stored, never dispatched.
    Unknown,
}

macro_rules! prop_ids {
    ($($variant:ident => $code:literal, $kind:ident;)*) => {
        /// A property code.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum PropId {
            $($variant,)*
            /// A code the engine does not interpret.
            Other(String),
        }

        impl PropId {
            /// Map a record code to its variant.
            pub fn from_code(code: &str) -> PropId {
                match code {
                    $($code => PropId::$variant,)*
                    other => PropId::Other(other.to_string()),
                }
            }

            /// The record code ("B", "AW", ...).
            pub fn code(&self) -> &str {
                match self {
                    $(PropId::$variant => $code,)*
                    PropId::Other(code) => code,
                }
            }

            pub fn kind(&self) -> PropKind {
                match self {
                    $(PropId::$variant => PropKind::$kind,)*
                    PropId::Other(_) => PropKind::Unknown,
                }
            }
        }
    };
}

prop_ids! {
    Black => "B", Move;
    White => "W", Move;
    AddBlack => "AB", Setup;
    AddWhite => "AW", Setup;
    AddEmpty => "AE", Setup;
    Circle => "CR", Markup;
    Label => "LB", Markup;
    Triangle => "TR", Markup;
    Mark => "MA", Markup;
    Square => "SQ", Markup;
    TerritoryWhite => "TW", Markup;
    TerritoryBlack => "TB", Markup;
    Line => "LN", Markup;
    Arrow => "AR", Markup;
    Dim => "DD", Markup;
    MoveNumber => "MN", MoveNumber;
    Player => "PL", PlayerToMove;
    Comment => "C", Comment;
    Name => "N", Annotation;
    GoodForBlack => "GB", Annotation;
    GoodForWhite => "GW", Annotation;
    Even => "DM", Annotation;
    Hotspot => "HO", Annotation;
    Unclear => "UC", Annotation;
    Value => "V", Annotation;
    BadMove => "BM", Annotation;
    Doubtful => "DO", Annotation;
    Interesting => "IT", Annotation;
    Tesuji => "TE", Annotation;
    Ko => "KO", Annotation;
    BlackTime => "BL", Timing;
    BlackPeriods => "OB", Timing;
    WhiteTime => "WL", Timing;
    WhitePeriods => "OW", Timing;
    Size => "SZ", GameInfo;
    Handicap => "HA", GameInfo;
    Komi => "KM", GameInfo;
    GameName => "GN", GameInfo;
    PlayerBlack => "PB", GameInfo;
    PlayerWhite => "PW", GameInfo;
    BlackRank => "BR", GameInfo;
    WhiteRank => "WR", GameInfo;
    Result => "RE", GameInfo;
    Date => "DT", GameInfo;
    Event => "EV", GameInfo;
    Round => "RO", GameInfo;
    Place => "PC", GameInfo;
    Rules => "RU", GameInfo;
    FileFormat => "FF", GameInfo;
    GameType => "GM", GameInfo;
    Charset => "CA", GameInfo;
    Application => "AP", GameInfo;
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&str> for PropId {
    fn from(code: &str) -> Self {
        PropId::from_code(code)
    }
}

/// A property value: one string, or an ordered list without duplicates.
#[derive(Debug, Clone, Eq)]
pub enum PropValue {
    Single(String),
    List(Vec<String>),
}

impl PropValue {
    /// All values as a slice, regardless of representation.
    pub fn values(&self) -> &[String] {
        match self {
            PropValue::Single(v) => std::slice::from_ref(v),
            PropValue::List(vs) => vs,
        }
    }

    /// The first value.
    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }
}

/// Two values are equal when they hold the same strings in the same order;
/// a one-element list equals the matching scalar.
impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Single(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Single(v)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(vs: Vec<String>) -> Self {
        PropValue::List(vs)
    }
}

/// How [`Properties::delete_value`] selects values.
#[derive(Debug, Clone, Copy)]
pub enum ValueMatch<'a> {
    /// The value equals the string.
    Exact(&'a str),
    /// The value starts with the string.
    Prefix(&'a str),
}

impl ValueMatch<'_> {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            ValueMatch::Exact(s) => value == *s,
            ValueMatch::Prefix(s) => value.starts_with(s),
        }
    }
}

/// Ordered property bag of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(PropId, PropValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropId, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn position(&self, id: &PropId) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == id)
    }

    pub fn get(&self, id: &PropId) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    /// First value of a property.
    pub fn first(&self, id: &PropId) -> Option<&str> {
        self.get(id).and_then(PropValue::first)
    }

    pub fn contains(&self, id: &PropId) -> bool {
        self.position(id).is_some()
    }

    /// Set a property, replacing any existing value in place.
    pub fn set(&mut self, id: PropId, value: impl Into<PropValue>) {
        let value = value.into();
        match self.position(&id) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((id, value)),
        }
    }

    pub fn remove(&mut self, id: &PropId) -> Option<PropValue> {
        self.position(id).map(|i| self.entries.remove(i).1)
    }

    /// Add a value without replacing existing ones.
    ///
    /// An absent property becomes a scalar; a second distinct value turns it
    /// into a list. A value already present is never added twice.
    pub fn push(&mut self, id: PropId, value: &str) {
        let Some(i) = self.position(&id) else {
            self.entries.push((id, PropValue::Single(value.to_string())));
            return;
        };
        let slot = &mut self.entries[i].1;
        if slot.contains(value) {
            return;
        }
        match slot {
            PropValue::Single(existing) => {
                let existing = std::mem::take(existing);
                *slot = PropValue::List(vec![existing, value.to_string()]);
            }
            PropValue::List(vs) => vs.push(value.to_string()),
        }
    }

    pub fn has_value(&self, id: &PropId, value: &str) -> bool {
        self.get(id).is_some_and(|v| v.contains(value))
    }

    /// Remove matching values from each listed property. A property left
    /// without values is removed entirely.
    pub fn delete_value(&mut self, ids: &[PropId], matcher: ValueMatch<'_>) {
        for id in ids {
            let Some(i) = self.position(id) else {
                continue;
            };
            let now_empty = match &mut self.entries[i].1 {
                PropValue::Single(v) => matcher.matches(v),
                PropValue::List(vs) => {
                    vs.retain(|v| !matcher.matches(v));
                    vs.is_empty()
                }
            };
            if now_empty {
                self.entries.remove(i);
            }
        }
    }

    /// Remove `value` from every property in `ids`, returning it if any
    /// property held it.
    pub(crate) fn take_value(&mut self, ids: &[PropId], value: &str) -> Option<String> {
        let mut removed = None;
        for id in ids {
            if self.has_value(id, value) {
                self.delete_value(std::slice::from_ref(id), ValueMatch::Exact(value));
                removed = Some(value.to_string());
            }
        }
        removed
    }
}
