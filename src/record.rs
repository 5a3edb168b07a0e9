//! Static description of record types.
//!
//! A record type declares its fields once, at compile time, as a slice of [`Field`]s. Everything
//! else in this crate (examples, predicates, stores) works from that description rather than
//! inspecting values at runtime. The description is usually generated with
//! [`#[derive(Record)]`](crate::Record).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Error as FmtError, Formatter};

/// The identifier type of every record. Assigned by the store on insert.
pub type Id = i64;

/// The declared type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Integers. Stored as [`i64`] regardless of the width declared on the record.
    Int,
    /// Free text.
    Text,
}

impl Display for Kind {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::Int => write!(f, "integer"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// How a present example value is compared to the stored value of a field.
///
/// The mode belongs to the field declaration; callers building examples cannot change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The stored value must equal the example value.
    Exact,
    /// The stored text must contain the example text.
    Contains,
    /// The stored text must contain the example text, ignoring ASCII case.
    ContainsIgnoreCase,
}

/// One entry of a record's static schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    /// The field name. Doubles as the column name in SQL stores.
    pub name: &'static str,
    /// The type of values the field holds.
    pub kind: Kind,
    /// How example values are compared against this field.
    pub mode: MatchMode,
    /// Whether the field may hold [`Value::Null`].
    pub nullable: bool,
}

/// A dynamically typed field value.
///
/// Values order as `Null < Int < Text`, integers numerically and text bytewise, which is the
/// ordering SQLite applies to mixed columns under its default collation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// An integer.
    Int(i64),
    /// A piece of text.
    Text(String),
}

impl Value {
    /// The kind of this value, or [`None`] for [`Value::Null`] which fits any nullable field.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(Kind::Int),
            Self::Text(_) => Some(Kind::Text),
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Lossless conversions from the integer types a record may declare.
macro_rules! int_value {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Value {
                #[inline]
                fn from(value: $int) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A type with a static schema that can be stored and matched by example.
///
/// Implementations are normally derived; see [`Record`](crate::Record) for the attributes. A
/// hand-written implementation must keep [`FIELDS`](Self::FIELDS), [`ID`](Self::ID) and
/// [`get`](Self::get) consistent: every declared field name must be answered by `get`, and the
/// identity field must be a non-nullable [`Kind::Int`] field.
pub trait Record: Clone + Send + Sync + 'static {
    /// The entity name. Used as the table name by SQL stores.
    const ENTITY: &'static str;

    /// Every field of the record, identity field included, in declaration order.
    const FIELDS: &'static [Field];

    /// The name of the identity field.
    const ID: &'static str;

    /// The identifier of this record.
    fn id(&self) -> Id;

    /// This record with its identifier replaced. Used by stores when assigning identifiers.
    #[must_use]
    fn with_id(self, id: Id) -> Self;

    /// The current value of the named field, or [`None`] if no such field is declared.
    fn get(&self, field: &str) -> Option<Value>;

    /// Look up a field declaration by name.
    #[inline]
    #[must_use]
    fn field(name: &str) -> Option<&'static Field> {
        Self::FIELDS.iter().find(|field| field.name == name)
    }

    /// The declaration of the identity field.
    #[inline]
    #[must_use]
    fn id_field() -> Field {
        Field {
            name: Self::ID,
            kind: Kind::Int,
            mode: MatchMode::Exact,
            nullable: false,
        }
    }
}
