pub mod limits;
pub mod token;

pub use limits::ReadLimits;
pub use token::{SkipToken, TokenValue};

/// Flavor of a "read a collection" request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// Fetch the page of entities only.
    Entities,
    /// Fetch the page of entities and the total matching-row count.
    EntitiesWithCount,
    /// Fetch the total matching-row count only.
    Count,
}

impl QueryKind {
    #[must_use]
    pub fn wants_results(self) -> bool {
        !matches!(self, QueryKind::Count)
    }

    #[must_use]
    pub fn wants_count(self) -> bool {
        !matches!(self, QueryKind::Entities)
    }
}

// Ordering primitives
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Reverse the sort direction (Asc <-> Desc)
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// One `$orderby` segment: navigation hops ending in a field name, plus a direction.
///
/// The last sub-path entry is the sortable field; everything before it is a
/// navigation hop. Order of segments is significant and defines column
/// precedence for both SQL `ORDER BY` and skip-token comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBySegment {
    pub path: Vec<String>,
    pub dir: SortDir,
}

impl OrderBySegment {
    pub fn new<I, S>(path: I, dir: SortDir) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            dir,
        }
    }

    /// Shorthand for an ascending single-field segment.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            path: vec![field.into()],
            dir: SortDir::Asc,
        }
    }

    /// Shorthand for a descending single-field segment.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            path: vec![field.into()],
            dir: SortDir::Desc,
        }
    }

    /// Terminal (sortable) field name, if the path is non-empty.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Navigation hops preceding the terminal field.
    #[must_use]
    pub fn hops(&self) -> &[String] {
        match self.path.len() {
            0 => &[],
            n => &self.path[..n - 1],
        }
    }

    fn signed(&self) -> String {
        let sign = match self.dir {
            SortDir::Asc => '+',
            SortDir::Desc => '-',
        };
        format!("{sign}{}", self.path.join("/"))
    }
}

/// Ordered `$orderby` specification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct OrderBySpec(pub Vec<OrderBySegment>);

impl OrderBySpec {
    pub fn empty() -> Self {
        Self(vec![])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Render as "+f1,-nav/f2" for skip tokens.
    #[must_use]
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(OrderBySegment::signed)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse signed tokens back to an `OrderBySpec` (e.g. "+a,-b/c").
    ///
    /// # Errors
    /// Returns `Error::InvalidOrderByField` if the input is empty or contains
    /// empty field names.
    pub fn from_signed_tokens(signed: &str) -> Result<Self, Error> {
        let mut out = Vec::new();
        for seg in signed.split(',') {
            let seg = seg.trim();
            if seg.is_empty() {
                continue;
            }
            let (dir, name) = match seg.as_bytes()[0] {
                b'+' => (SortDir::Asc, &seg[1..]),
                b'-' => (SortDir::Desc, &seg[1..]),
                _ => (SortDir::Asc, seg), // default '+'
            };
            if name.is_empty() || name.split('/').any(str::is_empty) {
                return Err(Error::InvalidOrderByField(seg.to_owned()));
            }
            out.push(OrderBySegment {
                path: name.split('/').map(str::to_owned).collect(),
                dir,
            });
        }
        if out.is_empty() {
            return Err(Error::InvalidOrderByField("empty order".into()));
        }
        Ok(OrderBySpec(out))
    }

    /// Check equality against a signed token list (e.g. "+a,-b/c").
    #[must_use]
    pub fn equals_signed_tokens(&self, signed: &str) -> bool {
        match Self::from_signed_tokens(signed) {
            Ok(theirs) => theirs == *self,
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for OrderBySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }

        let formatted: Vec<String> = self
            .0
            .iter()
            .map(|seg| {
                let dir_str = match seg.dir {
                    SortDir::Asc => "asc",
                    SortDir::Desc => "desc",
                };
                format!("{} {dir_str}", seg.path.join("/"))
            })
            .collect();

        write!(f, "{}", formatted.join(", "))
    }
}

/// Protocol literal-type tags carried inside skip tokens so values
/// round-trip without type ambiguity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LiteralKind {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "i64")]
    I64,
    #[serde(rename = "f64")]
    F64,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "datetime")]
    DateTimeUtc,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "decimal")]
    Decimal,
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LiteralKind::String => "string",
            LiteralKind::I64 => "i64",
            LiteralKind::F64 => "f64",
            LiteralKind::Bool => "bool",
            LiteralKind::Uuid => "uuid",
            LiteralKind::DateTimeUtc => "datetime",
            LiteralKind::Date => "date",
            LiteralKind::Time => "time",
            LiteralKind::Decimal => "decimal",
        };
        write!(f, "{s}")
    }
}

/// Result envelope for a resource-set read.
///
/// `count` is meaningful only for count-bearing query kinds (zero otherwise);
/// `has_more` is true only when the store reported more matching rows beyond
/// the returned page.
#[derive(Clone, Debug, Default)]
pub struct ResourceSetResult<T> {
    pub results: Vec<T>,
    pub count: u64,
    pub has_more: bool,
}

impl<T> ResourceSetResult<T> {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            has_more: false,
        }
    }
}

/// Unified error type for read-query translation.
///
/// Invalid-input variants are raised before any store access; store-level
/// failures are carried in `Db` without retry or suppression.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    // OrderBy resolution errors
    #[error("unsupported $orderby field: {0}")]
    InvalidOrderByField(String),

    // Eager-load contract violations
    #[error("eager-load elements must be non-empty strings")]
    InvalidEagerLoad,

    // Skip-token contract violations
    #[error("skip token carries {got} value pair(s) but {expected} order-by column(s) are active")]
    TokenCardinality { expected: usize, got: usize },

    #[error("skip token value for '{field}' is typed {got} but the column is {expected}")]
    TokenTypeMismatch {
        field: String,
        expected: LiteralKind,
        got: LiteralKind,
    },

    #[error("skip token was minted under a different sort order")]
    OrderMismatch,

    #[error("skip token literal for '{field}' is not a valid {kind}")]
    TokenInvalidLiteral { field: String, kind: LiteralKind },

    // Skip-token codec errors
    #[error("invalid skip token: invalid base64url encoding")]
    TokenInvalidBase64,

    #[error("invalid skip token: malformed JSON")]
    TokenInvalidJson,

    #[error("invalid skip token: unsupported version")]
    TokenInvalidVersion,

    #[error("invalid skip token: empty or invalid values")]
    TokenInvalidValues,

    // Input caps
    #[error("INVALID_LIMIT")]
    InvalidLimit,

    // Database and low-level errors
    #[error("database error: {0}")]
    Db(String),
}
