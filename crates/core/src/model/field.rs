//! Field type tags and field definitions.

use serde::{Deserialize, Serialize};

/// Declared storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Bounded text (`varchar`).
    String,
    /// Unbounded text.
    Text,
    /// Case-insensitive text.
    CiText,
    Char,
    Integer,
    BigInt,
    Float,
    Decimal,
    Boolean,
    /// Date with time.
    Date,
    /// Calendar date without time.
    DateOnly,
    Uuid,
    Json,
    Blob,
    Enum,
}

impl FieldType {
    /// Get the display name for this field type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::CiText => "citext",
            Self::Char => "char",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateOnly => "dateonly",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::Blob => "blob",
            Self::Enum => "enum",
        }
    }

    /// Whether values of this type are stored as text and must not hold
    /// collections or objects.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Text | Self::CiText)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" | "varchar" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "citext" => Ok(Self::CiText),
            "char" => Ok(Self::Char),
            "integer" | "int" => Ok(Self::Integer),
            "bigint" => Ok(Self::BigInt),
            "float" | "double" | "real" => Ok(Self::Float),
            "decimal" | "numeric" => Ok(Self::Decimal),
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" | "datetime" => Ok(Self::Date),
            "dateonly" => Ok(Self::DateOnly),
            "uuid" => Ok(Self::Uuid),
            "json" | "jsonb" => Ok(Self::Json),
            "blob" | "binary" => Ok(Self::Blob),
            "enum" => Ok(Self::Enum),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

/// Definition of one field of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    /// Whether null is an acceptable value. Defaults to true.
    pub allow_null: bool,
    /// Value is produced by storage (timestamps and the like).
    pub auto_generated: bool,
    pub auto_increment: bool,
    /// Message used instead of the default not-null message.
    pub not_null_message: Option<String>,
    /// Accessor of the to-one association this field is the foreign key of.
    pub belongs_to: Option<String>,
}

impl FieldDefinition {
    /// Create a nullable field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            allow_null: true,
            auto_generated: false,
            auto_increment: false,
            not_null_message: None,
            belongs_to: None,
        }
    }

    /// Disallow null values.
    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    /// Disallow null values with a custom message.
    pub fn not_null_with(mut self, message: impl Into<String>) -> Self {
        self.allow_null = false;
        self.not_null_message = Some(message.into());
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark as the foreign key of the to-one association named `accessor`.
    pub fn belongs_to(mut self, accessor: impl Into<String>) -> Self {
        self.belongs_to = Some(accessor.into());
        self
    }

    /// Auto-generated values bypass the not-null and shape checks.
    pub fn skips_schema_checks(&self) -> bool {
        self.auto_generated || self.auto_increment
    }
}
