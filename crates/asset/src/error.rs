//! Errors raised while reading OBJ text.

use std::fmt;

use thiserror::Error;

/// Position inside an OBJ source. `line` and `column` start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl Default for Location {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Which attribute table a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texture coordinate",
            AttributeKind::Normal => "normal",
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("{location}: unexpected end of input")]
    UnexpectedEof { location: Location },

    #[error("{location}: unexpected {found:?}")]
    UnexpectedToken { location: Location, found: char },

    #[error("{location}: expected {expected}")]
    MalformedNumber {
        location: Location,
        expected: &'static str,
    },

    #[error("{location}: expected end of line")]
    MissingNewline { location: Location },

    #[error("{location}: homogeneous coordinate w is zero")]
    ZeroHomogeneous { location: Location },

    #[error("{location}: face has {count} vertices, at least 3 are required")]
    TooFewVertices { location: Location, count: usize },

    #[error("{location}: indices are 1-based, found 0")]
    ZeroIndex { location: Location },

    #[error("{location}: {kind} index {index} is out of range ({len} defined)")]
    IndexOutOfRange {
        location: Location,
        kind: AttributeKind,
        index: usize,
        len: usize,
    },
}

impl ObjError {
    pub fn location(&self) -> Location {
        match self {
            ObjError::UnexpectedEof { location }
            | ObjError::UnexpectedToken { location, .. }
            | ObjError::MalformedNumber { location, .. }
            | ObjError::MissingNewline { location }
            | ObjError::ZeroHomogeneous { location }
            | ObjError::TooFewVertices { location, .. }
            | ObjError::ZeroIndex { location }
            | ObjError::IndexOutOfRange { location, .. } => *location,
        }
    }
}
