//! SVG path data model.
//!
//! A [`PathCommand`] keeps repetitions together (`L1 2 3 4` is one command with four
//! parameters), so the transformer and formatter work on runs of one kind at a time.

use std::fmt;

use crate::error::{Result, malformed_path};

mod format;
mod parse;
mod transform;

pub use format::PathFormatter;
pub use parse::parse_path;
pub use transform::{has_rel_move_after_close, transform_path, transform_path_data};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    MoveTo,
    RelMoveTo,
    LineTo,
    RelLineTo,
    HorizontalTo,
    RelHorizontalTo,
    VerticalTo,
    RelVerticalTo,
    CubicTo,
    RelCubicTo,
    SmoothCubicTo,
    RelSmoothCubicTo,
    QuadTo,
    RelQuadTo,
    SmoothQuadTo,
    RelSmoothQuadTo,
    ArcTo,
    RelArcTo,
    Close,
    RelClose,
}

impl PathKind {
    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'M' => Self::MoveTo,
            'm' => Self::RelMoveTo,
            'L' => Self::LineTo,
            'l' => Self::RelLineTo,
            'H' => Self::HorizontalTo,
            'h' => Self::RelHorizontalTo,
            'V' => Self::VerticalTo,
            'v' => Self::RelVerticalTo,
            'C' => Self::CubicTo,
            'c' => Self::RelCubicTo,
            'S' => Self::SmoothCubicTo,
            's' => Self::RelSmoothCubicTo,
            'Q' => Self::QuadTo,
            'q' => Self::RelQuadTo,
            'T' => Self::SmoothQuadTo,
            't' => Self::RelSmoothQuadTo,
            'A' => Self::ArcTo,
            'a' => Self::RelArcTo,
            'Z' => Self::Close,
            'z' => Self::RelClose,
            _ => return None,
        })
    }

    pub fn letter(self) -> char {
        match self {
            Self::MoveTo => 'M',
            Self::RelMoveTo => 'm',
            Self::LineTo => 'L',
            Self::RelLineTo => 'l',
            Self::HorizontalTo => 'H',
            Self::RelHorizontalTo => 'h',
            Self::VerticalTo => 'V',
            Self::RelVerticalTo => 'v',
            Self::CubicTo => 'C',
            Self::RelCubicTo => 'c',
            Self::SmoothCubicTo => 'S',
            Self::RelSmoothCubicTo => 's',
            Self::QuadTo => 'Q',
            Self::RelQuadTo => 'q',
            Self::SmoothQuadTo => 'T',
            Self::RelSmoothQuadTo => 't',
            Self::ArcTo => 'A',
            Self::RelArcTo => 'a',
            Self::Close => 'Z',
            Self::RelClose => 'z',
        }
    }

    pub fn is_relative(self) -> bool {
        self.letter().is_ascii_lowercase()
    }

    /// Absolute counterpart of a relative kind; absolute kinds map to themselves.
    pub fn to_absolute(self) -> Self {
        match Self::from_letter(self.letter().to_ascii_uppercase()) {
            Some(kind) => kind,
            None => self,
        }
    }

    pub fn to_relative(self) -> Self {
        match Self::from_letter(self.letter().to_ascii_lowercase()) {
            Some(kind) => kind,
            None => self,
        }
    }

    pub fn is_close(self) -> bool {
        matches!(self, Self::Close | Self::RelClose)
    }

    pub fn is_move(self) -> bool {
        matches!(self, Self::MoveTo | Self::RelMoveTo)
    }

    pub fn is_arc(self) -> bool {
        matches!(self, Self::ArcTo | Self::RelArcTo)
    }

    /// Number of parameters in one repetition of the command.
    pub fn arity(self) -> usize {
        match self.to_absolute() {
            Self::Close => 0,
            Self::MoveTo | Self::LineTo | Self::SmoothQuadTo => 2,
            Self::HorizontalTo | Self::VerticalTo => 1,
            Self::CubicTo => 6,
            Self::SmoothCubicTo | Self::QuadTo => 4,
            Self::ArcTo => 7,
            _ => 0,
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub kind: PathKind,
    pub params: Vec<f64>,
}

impl PathCommand {
    /// Builds a command, checking that `params` holds a whole number of repetitions.
    pub fn new(kind: PathKind, params: Vec<f64>) -> Result<Self> {
        let command = Self { kind, params };
        command.check_arity()?;
        Ok(command)
    }

    /// Fails with [`crate::Error::MalformedPath`] unless `params` holds a whole number of
    /// repetitions. Fields are public, so commands built by hand may not.
    pub fn check_arity(&self) -> Result<()> {
        let arity = self.kind.arity();
        let len = self.params.len();
        let valid = if arity == 0 {
            len == 0
        } else {
            len > 0 && len % arity == 0
        };
        if valid {
            return Ok(());
        }
        Err(malformed_path(format!(
            "'{}' takes a multiple of {} parameters, got {}",
            self.kind.letter(),
            arity,
            len
        )))
    }

    pub fn close() -> Self {
        Self {
            kind: PathKind::Close,
            params: Vec::new(),
        }
    }

    pub fn repetitions(&self) -> usize {
        match self.kind.arity() {
            0 => 1,
            arity => self.params.len() / arity,
        }
    }
}
