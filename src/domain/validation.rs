use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    PageLengthOutOfRange { min: u16, max: u16, actual: u16 },
    InvalidHeaderValue { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::PageLengthOutOfRange { min, max, actual } => {
                write!(
                    f,
                    "page length out of range: {actual} (expected {min}..={max})"
                )
            }
            Self::InvalidHeaderValue { field } => {
                write!(f, "{field} contains characters not allowed in an HTTP header")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
