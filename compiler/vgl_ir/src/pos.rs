//! Source positions recovered for runtime diagnostics.

use std::fmt;

/// A line/column position in source text.
///
/// Both coordinates are 1-based; `SourcePos::default()` is the "unknown"
/// position `0:0`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    /// Create a position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        SourcePos { line, column }
    }

    /// Whether this is a real position rather than the unknown default.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::SourcePos;
    crate::static_assert_size!(SourcePos, 8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        assert_eq!(SourcePos::new(12, 4).to_string(), "12.4");
        assert_eq!(format!("{:?}", SourcePos::new(12, 4)), "12:4");
    }

    #[test]
    fn test_pos_ordering_is_line_major() {
        assert!(SourcePos::new(2, 1) > SourcePos::new(1, 80));
        assert!(SourcePos::new(3, 2) > SourcePos::new(3, 1));
    }

    #[test]
    fn test_pos_unknown_default() {
        assert!(!SourcePos::default().is_known());
        assert!(SourcePos::new(1, 1).is_known());
    }
}
