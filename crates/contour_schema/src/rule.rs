//! Named rules of a schema.

use contour_core::Node;
use std::fmt;

use crate::builder::Builder;
use crate::expr::Expression;

/// Ground rules implemented natively by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `string`
    String,
    /// `int`
    Int,
    /// `float` (integers accepted)
    Float,
    /// `boolean`
    Boolean,
    /// `nullType`
    NullType,
    /// `binary`, a base64 string
    Binary,
    /// `timestamp`, an RFC 3339 date-time
    Timestamp,
}

impl Intrinsic {
    /// Every intrinsic, in seeding order
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Int,
        Self::Float,
        Self::Boolean,
        Self::NullType,
        Self::Binary,
        Self::Timestamp,
    ];

    /// Rule name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::NullType => "nullType",
            Self::Binary => "binary",
            Self::Timestamp => "timestamp",
        }
    }

    /// What content this rule expects, for error messages
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Self::String => "a YAML string",
            Self::Int => "a YAML integer",
            Self::Float => "a YAML float",
            Self::Boolean => "a YAML boolean",
            Self::NullType => "the YAML null value",
            Self::Binary => "a YAML binary (a base64 string)",
            Self::Timestamp => "a YAML timestamp (an RFC 3339 date-time)",
        }
    }
}

/// A named production of the schema
#[derive(Clone)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) exported_name: Option<String>,
    pub(crate) expression: Option<Expression>,
    pub(crate) builder: Option<Builder>,
    pub(crate) intrinsic: Option<Intrinsic>,
    pub(crate) builtin: bool,
    pub(crate) declaration: Option<Node>,
    pub(crate) body: Option<Node>,
}

impl Rule {
    /// A user rule whose body is not resolved yet
    pub(crate) fn hollow(
        name: String,
        exported_name: Option<String>,
        declaration: Node,
        body: Node,
    ) -> Self {
        Self {
            name,
            exported_name,
            expression: None,
            builder: None,
            intrinsic: None,
            builtin: false,
            declaration: Some(declaration),
            body: Some(body),
        }
    }

    /// A built-in ground rule backed by the matcher
    pub(crate) fn from_intrinsic(intrinsic: Intrinsic) -> Self {
        Self {
            name: intrinsic.name().to_string(),
            exported_name: None,
            expression: None,
            builder: None,
            intrinsic: Some(intrinsic),
            builtin: true,
            declaration: None,
            body: None,
        }
    }

    /// A built-in rule defined by an expression
    pub(crate) fn builtin(name: &str, expression: Expression) -> Self {
        Self {
            name: name.to_string(),
            exported_name: None,
            expression: Some(expression),
            builder: None,
            intrinsic: None,
            builtin: true,
            declaration: None,
            body: None,
        }
    }

    /// Local name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name under which a builder is looked up, for exported rules
    #[must_use]
    pub fn exported_name(&self) -> Option<&str> {
        self.exported_name.as_deref()
    }

    /// Whether the rule was declared builder-eligible
    #[must_use]
    pub const fn is_exported(&self) -> bool {
        self.exported_name.is_some()
    }

    /// Resolved body; `None` for intrinsics
    #[must_use]
    pub const fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    /// Attached builder
    #[must_use]
    pub const fn builder(&self) -> Option<&Builder> {
        self.builder.as_ref()
    }

    /// Native matcher of a ground rule
    #[must_use]
    pub const fn intrinsic(&self) -> Option<Intrinsic> {
        self.intrinsic
    }

    /// Whether this is one of the fixed ground rules
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Key node the rule was declared with
    #[must_use]
    pub const fn declaration(&self) -> Option<&Node> {
        self.declaration.as_ref()
    }

    pub(crate) const fn body(&self) -> Option<&Node> {
        self.body.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("exported_name", &self.exported_name)
            .field("intrinsic", &self.intrinsic)
            .field("resolved", &self.expression.is_some())
            .field("builder", &self.builder.is_some())
            .finish()
    }
}
