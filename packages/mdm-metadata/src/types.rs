use mdm_metadata_lib::display_type_name;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Stable handle of a type node inside a [`crate::MetadataRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(usize);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The `(namespace, name)` pair that identifies a type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub namespace: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_type_name(&self.namespace, &self.name))
    }
}

/// Locale tag used to key display labels (`en`, `fr`, `zh_CN`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Built-in simple types known to every repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum XsdType {
    #[strum(serialize = "long")]
    Long,
    #[strum(serialize = "decimal")]
    Decimal,
    #[strum(serialize = "boolean")]
    Boolean,
    #[strum(serialize = "byte")]
    Byte,
    #[strum(serialize = "date")]
    Date,
    #[strum(serialize = "dateTime")]
    DateTime,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "float")]
    Float,
    #[strum(serialize = "integer")]
    Integer,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "short")]
    Short,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "positiveInteger")]
    PositiveInteger,
    #[strum(serialize = "negativeInteger")]
    NegativeInteger,
    #[strum(serialize = "nonPositiveInteger")]
    NonPositiveInteger,
    #[strum(serialize = "nonNegativeInteger")]
    NonNegativeInteger,
    #[strum(serialize = "unsignedInt")]
    UnsignedInt,
    #[strum(serialize = "hexBinary")]
    HexBinary,
    #[strum(serialize = "base64Binary")]
    Base64Binary,
    #[strum(serialize = "anyURI")]
    AnyUri,
    #[strum(serialize = "QName")]
    QName,
    #[strum(serialize = "time")]
    Time,
    #[strum(serialize = "duration")]
    Duration,
    #[strum(serialize = "unsignedShort")]
    UnsignedShort,
    #[strum(serialize = "unsignedByte")]
    UnsignedByte,
    #[strum(serialize = "unsignedLong")]
    UnsignedLong,
    #[strum(serialize = "MULTI_LINGUAL")]
    MultiLingual,
    #[strum(serialize = "UUID")]
    Uuid,
    #[strum(serialize = "gYearMonth")]
    GYearMonth,
    #[strum(serialize = "gYear")]
    GYear,
    #[strum(serialize = "gMonthDay")]
    GMonthDay,
    #[strum(serialize = "gDay")]
    GDay,
    #[strum(serialize = "gMonth")]
    GMonth,
}
