//! Error codes for all engine diagnostics.
//!
//! The first digit names the phase that reports the problem.

use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E2xxx: Static conflicts
/// - E6xxx: Runtime exceptions
/// - W2xxx: Static warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Static conflicts (E2xxx)
    /// Bound value does not match the bind's declared type
    E2001,
    /// Name declared twice in the same scope
    E2002,
    /// Name refers to its own definition
    E2003,
    /// Sources borrow each other in a cycle
    E2004,
    /// Borrow names a source or definition that does not exist
    E2005,
    /// Reference to a name that is not in scope
    E2006,
    /// Map literal entry is not a key/value pair
    E2007,
    /// List access on something that is not a list
    E2008,
    /// List index is not a number
    E2009,
    /// Evaluation of something that is not a function
    E2010,
    /// Stream construct applied to something that is not a stream
    E2011,
    /// Previous offset is not a number
    E2012,
    /// Argument does not match the input's type
    E2013,
    /// Required input was not given
    E2014,
    /// More arguments than inputs
    E2015,
    /// Condition is not a boolean
    E2016,
    /// Block ends in something other than an expression
    E2017,
    /// Block or function has no expression to evaluate
    E2018,
    /// Placeholder left in the program
    E2019,
    /// Unparsable text left in the program
    E2020,

    // Runtime exceptions (E6xxx)
    /// Name is not bound
    E6001,
    /// Value has the wrong type
    E6002,
    /// Evaluation took too many steps
    E6003,
    /// Too many nested function evaluations
    E6004,
    /// Evaluation depends on itself
    E6005,
    /// Placeholder reached
    E6006,
    /// Unparsable text reached
    E6007,
    /// Expected a value, found none
    E6008,

    // Static warnings (W2xxx)
    /// Operators of different precedence mixed without grouping
    W2001,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::W2001 => "W2001",
        }
    }

    /// Check if this is a static conflict (E2xxx range).
    pub fn is_conflict(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a runtime exception (E6xxx range).
    pub fn is_runtime(&self) -> bool {
        self.as_str().starts_with("E6")
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W2001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
