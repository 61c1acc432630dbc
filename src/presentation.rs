//! Per-node display state that never touches the board: comments, move
//! annotations and clocks.

use std::fmt;

use crate::board::Stone;
use crate::property::PropId;

/// A move or position annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Node name (`N`).
    Name(String),
    GoodForBlack { very: bool },
    GoodForWhite { very: bool },
    Even { joseki: bool },
    Unclear,
    Hotspot,
    /// Position value (`V`), kept as written.
    Value(String),
    BadMove { very: bool },
    Doubtful,
    Interesting,
    Tesuji,
    /// Move is legal even though it retakes a ko (`KO`).
    Ko,
}

impl Annotation {
    /// Interpret an annotation property. Non-annotation codes give `None`.
    pub fn from_property(id: &PropId, value: &str) -> Option<Self> {
        let emphasized = value.trim().parse::<u32>().is_ok_and(|v| v > 1);
        Some(match id {
            PropId::Name => Annotation::Name(value.to_string()),
            PropId::GoodForBlack => Annotation::GoodForBlack { very: emphasized },
            PropId::GoodForWhite => Annotation::GoodForWhite { very: emphasized },
            PropId::Even => Annotation::Even { joseki: emphasized },
            PropId::Unclear => Annotation::Unclear,
            PropId::Hotspot => Annotation::Hotspot,
            PropId::Value => Annotation::Value(value.to_string()),
            PropId::BadMove => Annotation::BadMove { very: emphasized },
            PropId::Doubtful => Annotation::Doubtful,
            PropId::Interesting => Annotation::Interesting,
            PropId::Tesuji => Annotation::Tesuji,
            PropId::Ko => Annotation::Ko,
            _ => return None,
        })
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let very = |v: bool| if v { "very " } else { "" };
        match self {
            Annotation::Name(name) => f.write_str(name),
            Annotation::GoodForBlack { very: v } => write!(f, "{}good for black", very(*v)),
            Annotation::GoodForWhite { very: v } => write!(f, "{}good for white", very(*v)),
            Annotation::Even { joseki: true } => f.write_str("even position (joseki)"),
            Annotation::Even { joseki: false } => f.write_str("even position"),
            Annotation::Unclear => f.write_str("unclear position"),
            Annotation::Hotspot => f.write_str("hotspot"),
            Annotation::Value(v) => write!(f, "value {v}"),
            Annotation::BadMove { very: v } => write!(f, "{}bad move", very(*v)),
            Annotation::Doubtful => f.write_str("doubtful move"),
            Annotation::Interesting => f.write_str("interesting move"),
            Annotation::Tesuji => f.write_str("tesuji"),
            Annotation::Ko => f.write_str("ko"),
        }
    }
}

/// Time left for one player, as last reported on the current path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    pub seconds: Option<f64>,
    /// Moves (or periods) left in the current overtime period.
    pub periods: Option<u32>,
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(seconds) = self.seconds {
            let total = seconds.max(0.0).round() as u64;
            write!(f, "{}:{:02}", total / 60, total % 60)?;
        }
        if let Some(periods) = self.periods {
            write!(f, " ({periods})")?;
        }
        Ok(())
    }
}

/// What the current node shows besides the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub comments: Option<String>,
    pub annotations: Vec<Annotation>,
    pub black_clock: Clock,
    pub white_clock: Clock,
}

impl Presentation {
    /// Drop state that belongs to a single node. Clocks carry over.
    pub fn clear_node(&mut self) {
        self.comments = None;
        self.annotations.clear();
    }

    pub fn clock(&self, color: Stone) -> &Clock {
        match color {
            Stone::White => &self.white_clock,
            _ => &self.black_clock,
        }
    }

    /// Apply a timing property (`BL`, `WL`, `OB`, `OW`). Reporting the time
    /// left resets the period count, which usually follows in the same node.
    pub fn apply_time(&mut self, id: &PropId, value: &str) {
        let clock = match id {
            PropId::BlackTime | PropId::BlackPeriods => &mut self.black_clock,
            PropId::WhiteTime | PropId::WhitePeriods => &mut self.white_clock,
            _ => return,
        };
        match id {
            PropId::BlackTime | PropId::WhiteTime => {
                clock.seconds = value.trim().parse().ok();
                clock.periods = None;
            }
            _ => clock.periods = value.trim().parse().ok(),
        }
    }
}
