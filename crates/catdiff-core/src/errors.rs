use catdiff_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (and the CLI exit-code
/// mapping) can rely on across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    /// Catalog JSON is malformed or structurally unusable
    ParseError,
    /// The differ was handed a catalog that failed to parse
    DifferInput,
    /// An ignore-rule declaration has an invalid shape
    InvalidRule,
    /// A regular expression in a rule does not compile
    PatternError,
    /// A filter name is not registered
    UnknownFilter,
    /// The settings document is invalid
    InvalidSettings,

    // Rendering
    /// The requested output format is not supported
    UnsupportedFormat,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ParseError => "ERR_PARSE",
            ExErrorKind::DifferInput => "ERR_DIFFER_INPUT",
            ExErrorKind::InvalidRule => "ERR_INVALID_RULE",
            ExErrorKind::PatternError => "ERR_PATTERN",
            ExErrorKind::UnknownFilter => "ERR_UNKNOWN_FILTER",
            ExErrorKind::InvalidSettings => "ERR_INVALID_SETTINGS",
            ExErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus enough context
/// (operation, offending rule, catalog side, resource) to attribute the failure.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    rule: Option<String>,
    catalog: Option<String>,
    resource: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            rule: None,
            catalog: None,
            resource: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the text of the rule that failed
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Add which catalog ("old" / "new") the failure belongs to
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Add resource identity context (`Type[Title]`)
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the offending rule, if any
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Get the catalog side, if any
    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    /// Get the resource identity, if any
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(catalog) = &self.catalog {
            write!(f, " (catalog: {})", catalog)?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " (resource: {})", resource)?;
        }
        if let Some(rule) = &self.rule {
            write!(f, " (rule: {})", rule)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain failures raised while parsing, configuring and rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatdiffError {
    // ===== Catalog =====
    /// Catalog text is not valid JSON
    #[error("Catalog is not valid JSON: {message}")]
    MalformedJson { message: String },

    /// Neither `resources` nor `data.resources` holds an array
    #[error("Catalog has no resources array (expected `resources` or `data.resources`)")]
    MissingResources,

    /// A resource entry is not usable
    #[error("Resource #{index} is invalid: {reason}")]
    InvalidResource { index: usize, reason: String },

    /// Two resources share the same identity
    #[error("Duplicate resource {resource}")]
    DuplicateResource { resource: String },

    /// A catalog that failed to parse was passed to the differ
    #[error("Cannot diff an invalid {side} catalog: {reason}")]
    InvalidCatalog { side: String, reason: String },

    // ===== Rules =====
    /// Rule declaration does not have a usable shape
    #[error("Malformed ignore rule `{rule}`: {reason}")]
    MalformedRule { rule: String, reason: String },

    /// A regex inside a rule does not compile
    #[error("Pattern `{pattern}` in rule `{rule}` does not compile: {reason}")]
    BadPattern {
        pattern: String,
        rule: String,
        reason: String,
    },

    // ===== Pipeline / display =====
    /// Filter name not present in the registry
    #[error("Unknown filter `{name}`")]
    UnknownFilter { name: String },

    /// Output format name not recognised
    #[error("Unsupported output format `{name}`")]
    UnknownFormat { name: String },

    /// Settings document rejected
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File system failure
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl CatdiffError {
    /// Attribute a pattern failure to the full rule text it was found in.
    pub fn within_rule(self, rule: &str) -> Self {
        match self {
            CatdiffError::BadPattern {
                pattern, reason, ..
            } => CatdiffError::BadPattern {
                pattern,
                rule: rule.to_string(),
                reason,
            },
            other => other,
        }
    }
}

/// Conversion from CatdiffError to ExError
impl From<CatdiffError> for ExError {
    fn from(err: CatdiffError) -> Self {
        let message = err.to_string();
        match err {
            CatdiffError::MalformedJson { .. }
            | CatdiffError::MissingResources
            | CatdiffError::InvalidResource { .. } => {
                ExError::new(ExErrorKind::ParseError).with_message(message)
            }

            CatdiffError::DuplicateResource { resource } => ExError::new(ExErrorKind::ParseError)
                .with_resource(resource)
                .with_message(message),

            CatdiffError::InvalidCatalog { side, .. } => ExError::new(ExErrorKind::DifferInput)
                .with_catalog(side)
                .with_message(message),

            CatdiffError::MalformedRule { rule, .. } => ExError::new(ExErrorKind::InvalidRule)
                .with_rule(rule)
                .with_message(message),

            CatdiffError::BadPattern { rule, .. } => ExError::new(ExErrorKind::PatternError)
                .with_rule(rule)
                .with_message(message),

            CatdiffError::UnknownFilter { .. } => {
                ExError::new(ExErrorKind::UnknownFilter).with_message(message)
            }

            CatdiffError::UnknownFormat { .. } => {
                ExError::new(ExErrorKind::UnsupportedFormat).with_message(message)
            }

            CatdiffError::InvalidSettings { .. } => {
                ExError::new(ExErrorKind::InvalidSettings).with_message(message)
            }

            CatdiffError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            CatdiffError::Io { .. } => ExError::new(ExErrorKind::Io).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to CatdiffError
impl From<serde_json::Error> for CatdiffError {
    fn from(err: serde_json::Error) -> Self {
        CatdiffError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CatdiffError {
    fn from(err: std::io::Error) -> Self {
        CatdiffError::Io {
            message: err.to_string(),
        }
    }
}
