//! Reserved keywords of the schema language and the forms they select.

use std::fmt;

/// Expression form selected by a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// `_map`, `_mapOptional`, `_mapOf`, `_merge`
    Map,
    /// `_list`, `_listOptional`, `_listOf`
    List,
    /// `_oneOf`
    OneOf,
    /// `_in`
    In,
    /// `_regex`
    Regex,
    /// `_min`, `_max`, `_exactCount`; only valid next to a map or list form
    Sizing,
}

impl Form {
    /// Whether sizing keywords may accompany this form
    #[must_use]
    pub const fn accepts_sizing(self) -> bool {
        matches!(self, Self::Map | Self::List)
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::List => write!(f, "list"),
            Self::OneOf => write!(f, "oneOf"),
            Self::In => write!(f, "in"),
            Self::Regex => write!(f, "regex"),
            Self::Sizing => write!(f, "sizing"),
        }
    }
}

/// A reserved keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Required named properties
    Map,
    /// Optional named properties
    MapOptional,
    /// Catch-all key/value pair
    MapOf,
    /// Mergeable expressions contributing properties
    Merge,
    /// Required positional items
    List,
    /// Optional positional items
    ListOptional,
    /// Catch-all item expression
    ListOf,
    /// Ordered alternatives
    OneOf,
    /// Literal scalar set
    In,
    /// Pattern on strings
    Regex,
    /// Lower size bound
    Min,
    /// Upper size bound
    Max,
    /// Exact size
    ExactCount,
}

impl Keyword {
    /// Recognize a keyword, including the historical aliases
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let keyword = match text {
            "_map" => Self::Map,
            "_mapOptional" | "_mapFacultative" => Self::MapOptional,
            "_mapOf" => Self::MapOf,
            "_merge" => Self::Merge,
            "_list" => Self::List,
            "_listOptional" | "_listFacultative" => Self::ListOptional,
            "_listOf" => Self::ListOf,
            "_oneOf" => Self::OneOf,
            "_in" => Self::In,
            "_regex" => Self::Regex,
            "_min" => Self::Min,
            "_max" => Self::Max,
            "_exactCount" | "_nb" => Self::ExactCount,
            _ => return None,
        };
        Some(keyword)
    }

    /// Form this keyword belongs to
    #[must_use]
    pub const fn form(self) -> Form {
        match self {
            Self::Map | Self::MapOptional | Self::MapOf | Self::Merge => Form::Map,
            Self::List | Self::ListOptional | Self::ListOf => Form::List,
            Self::OneOf => Form::OneOf,
            Self::In => Form::In,
            Self::Regex => Form::Regex,
            Self::Min | Self::Max | Self::ExactCount => Form::Sizing,
        }
    }

    /// Canonical spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Map => "_map",
            Self::MapOptional => "_mapOptional",
            Self::MapOf => "_mapOf",
            Self::Merge => "_merge",
            Self::List => "_list",
            Self::ListOptional => "_listOptional",
            Self::ListOf => "_listOf",
            Self::OneOf => "_oneOf",
            Self::In => "_in",
            Self::Regex => "_regex",
            Self::Min => "_min",
            Self::Max => "_max",
            Self::ExactCount => "_exactCount",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
