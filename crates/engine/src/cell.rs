use ordered_float::OrderedFloat;

/// Marker shown for a cell the workbook library could not decode.
/// One bad cell must never abort a sheet load; it degrades to this marker.
pub const UNREADABLE_MARKER: &str = "#UNREADABLE";

/// Raw cell payload at the workbook-reader boundary.
///
/// The io layer maps whatever its parser produces into this enum; the
/// engine never sees parser types directly. There is deliberately no
/// write-side counterpart: the viewer core has no path back into the file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    /// Date/time as the serial number the file actually stores.
    DateTime(f64),
    /// ISO date/duration stored as a literal string (ODS and friends).
    DateTimeText(String),
    /// Stored error value ("#DIV/0!" etc.) or a per-cell decode failure.
    Error(String),
}

/// Type tag carried alongside the finalized display string.
///
/// Holds the comparable value for sort purposes only; it is never used to
/// re-interpret or re-format `display`. `Unreadable` ranks with `Text` and
/// compares by display string.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Empty,
    Number(OrderedFloat<f64>),
    Date(OrderedFloat<f64>),
    Boolean(bool),
    Text,
    Unreadable,
}

/// Immutable cell: what the user sees, plus how it compares.
///
/// Invariant: `display` is exactly the literal textual representation the
/// source file stores. No locale-dependent date or number formatting is
/// ever applied here or anywhere downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub display: String,
    pub kind: CellKind,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl Cell {
    pub fn empty() -> Self {
        Cell {
            display: String::new(),
            kind: CellKind::Empty,
        }
    }

    /// Normalize a raw payload into a display-ready cell.
    ///
    /// Numbers print without a decimal point when integral; everything else
    /// uses Rust's shortest round-trip float display. Booleans print in
    /// their stored lexical form (TRUE/FALSE). Date serials print as the
    /// serial itself, never reformatted. Empty cells normalize to "",
    /// never a placeholder token.
    pub fn normalize(raw: RawPayload) -> Self {
        match raw {
            RawPayload::Empty => Cell::empty(),
            RawPayload::Text(s) => Cell {
                display: s,
                kind: CellKind::Text,
            },
            RawPayload::Number(n) => Cell {
                display: format_number(n),
                kind: CellKind::Number(OrderedFloat(n)),
            },
            RawPayload::Int(n) => Cell {
                display: n.to_string(),
                kind: CellKind::Number(OrderedFloat(n as f64)),
            },
            RawPayload::Bool(b) => Cell {
                display: if b { "TRUE" } else { "FALSE" }.to_string(),
                kind: CellKind::Boolean(b),
            },
            RawPayload::DateTime(serial) => Cell {
                display: format_number(serial),
                kind: CellKind::Date(OrderedFloat(serial)),
            },
            // ISO literals stay text: the stored form is a string, and
            // lexicographic order on ISO 8601 is already chronological.
            RawPayload::DateTimeText(s) => Cell {
                display: s,
                kind: CellKind::Text,
            },
            RawPayload::Error(msg) => Cell {
                display: if msg.is_empty() {
                    UNREADABLE_MARKER.to_string()
                } else {
                    msg
                },
                kind: CellKind::Unreadable,
            },
        }
    }

    /// Text used for search dispatch. Identical to the display text; any
    /// cleanup happens in the query builder, not here.
    pub fn search_text(&self) -> &str {
        &self.display
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, CellKind::Empty)
    }
}

/// Integers without decimals, everything else via shortest round-trip.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_normalizes_to_empty_string() {
        let cell = Cell::normalize(RawPayload::Empty);
        assert_eq!(cell.display, "");
        assert!(cell.is_empty());
    }

    #[test]
    fn text_is_untouched() {
        let cell = Cell::normalize(RawPayload::Text("  Hello　世界\n".to_string()));
        // Display keeps every byte; cleanup belongs to the query builder
        assert_eq!(cell.display, "  Hello　世界\n");
        assert_eq!(cell.kind, CellKind::Text);
    }

    #[test]
    fn integral_float_prints_without_decimals() {
        assert_eq!(Cell::normalize(RawPayload::Number(42.0)).display, "42");
        assert_eq!(Cell::normalize(RawPayload::Number(-3.0)).display, "-3");
    }

    #[test]
    fn fractional_float_round_trips() {
        assert_eq!(Cell::normalize(RawPayload::Number(1.5)).display, "1.5");
        assert_eq!(Cell::normalize(RawPayload::Number(0.1)).display, "0.1");
    }

    #[test]
    fn bool_prints_stored_lexical_form() {
        assert_eq!(Cell::normalize(RawPayload::Bool(true)).display, "TRUE");
        assert_eq!(Cell::normalize(RawPayload::Bool(false)).display, "FALSE");
    }

    #[test]
    fn date_serial_is_not_reformatted() {
        // 2023-07-16 12:00 is serial 45123.5 in the 1900 system; the viewer
        // shows the serial, never a rendered date
        let cell = Cell::normalize(RawPayload::DateTime(45123.5));
        assert_eq!(cell.display, "45123.5");
        assert_eq!(cell.kind, CellKind::Date(OrderedFloat(45123.5)));
    }

    #[test]
    fn iso_date_literal_stays_text() {
        let cell = Cell::normalize(RawPayload::DateTimeText("2023-07-16".to_string()));
        assert_eq!(cell.display, "2023-07-16");
        assert_eq!(cell.kind, CellKind::Text);
    }

    #[test]
    fn decode_failure_becomes_marker() {
        let cell = Cell::normalize(RawPayload::Error(String::new()));
        assert_eq!(cell.display, UNREADABLE_MARKER);
        assert_eq!(cell.kind, CellKind::Unreadable);
    }

    #[test]
    fn stored_error_value_keeps_its_code() {
        let cell = Cell::normalize(RawPayload::Error("#DIV/0!".to_string()));
        assert_eq!(cell.display, "#DIV/0!");
        assert_eq!(cell.kind, CellKind::Unreadable);
    }

    #[test]
    fn search_text_equals_display() {
        let cell = Cell::normalize(RawPayload::Text("  New   York ".to_string()));
        assert_eq!(cell.search_text(), cell.display);
    }
}
