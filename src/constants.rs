//! Constants for board geometry, coordinates, and record conventions.
//!
//! Board size is a runtime property of each record (`SZ`), so nothing here is
//! tied to a single size. The constants describe the limits every board and
//! coordinate must respect.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a record does not say otherwise.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Smallest board the engine accepts.
pub const MIN_BOARD_SIZE: usize = 1;

/// Largest board the engine accepts (limited by the coordinate alphabet).
pub const MAX_BOARD_SIZE: usize = 19;

// =============================================================================
// Coordinates
// =============================================================================

/// First letter of the coordinate alphabet (maps to 0).
pub const COORD_FIRST: u8 = b'a';

/// Last letter of the coordinate alphabet (maps to 18).
pub const COORD_LAST: u8 = b's';

/// Pass token used by records written for boards up to 19x19.
pub const PASS_TOKEN: &str = "tt";

/// Move value for a resignation.
pub const RESIGN_TOKEN: &str = "resign";

/// Separator for compressed point ranges ("aa:cc") and composed values
/// such as labels ("dd:A") or lines ("aa:ss").
pub const COMPOSE_SEPARATOR: char = ':';

// =============================================================================
// Record Conventions
// =============================================================================

/// Key holding child sub-trees in a parsed property tree.
pub const CHILDREN_KEY: &str = "_children";

/// Prefix marking private (non-property) keys in a parsed property tree.
pub const PRIVATE_PREFIX: char = '_';

/// First numeric label handed out by the label counter.
pub const FIRST_NUMBER_LABEL: u32 = 1;

/// First alphabetic label handed out by the label counter.
pub const FIRST_LETTER_LABEL: char = 'A';

/// A handicap above this value means White moves first.
pub const HANDICAP_WHITE_FIRST: u32 = 1;
