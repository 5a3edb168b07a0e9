use super::Query;
use crate::{
    errors::ExampleError,
    example::{Example, Probe},
    record::{Field, Id, Kind, MatchMode, Record, Value},
};
use nameof::{name_of, name_of_type};
use std::{
    fmt::{Debug, Error as FmtError, Formatter},
    marker::PhantomData,
};

/// The test a [`Predicate`] applies to the value of its field.
#[derive(Clone, PartialEq, Eq)]
pub enum Test {
    /// The value must be null.
    IsNull,
    /// The value must equal the operand. The operand is never [`Value::Null`].
    Eq(Value),
    /// The value must be text containing `needle`.
    Contains {
        /// The text to search for. Already lowercased if `ignore_case` is set.
        needle: String,
        /// Compare ignoring ASCII case.
        ignore_case: bool,
    },
}

impl Test {
    /// Apply the test to a stored value. Null only ever satisfies [`Test::IsNull`].
    #[inline]
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::IsNull, value) => value.is_null(),
            (Self::Eq(operand), value) => operand == value,
            (
                Self::Contains {
                    needle,
                    ignore_case: true,
                },
                Value::Text(text),
            ) => text.to_ascii_lowercase().contains(needle.as_str()),
            (
                Self::Contains {
                    needle,
                    ignore_case: false,
                },
                Value::Text(text),
            ) => text.contains(needle.as_str()),
            (Self::Contains { .. }, Value::Null | Value::Int(_)) => false,
        }
    }
}

impl Debug for Test {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::IsNull => write!(f, "is null"),
            Self::Eq(operand) => write!(f, "= {operand:?}"),
            Self::Contains {
                needle,
                ignore_case: true,
            } => write!(f, "~* {needle:?}"),
            Self::Contains {
                needle,
                ignore_case: false,
            } => write!(f, "~ {needle:?}"),
        }
    }
}

/// A single field-level condition.
#[derive(Clone, PartialEq, Eq)]
pub struct Predicate {
    /// The field the condition applies to.
    pub field: Field,
    /// The condition.
    pub test: Test,
}

impl Predicate {
    /// Build the predicate for one present example probe on `field`.
    ///
    /// Returns [`None`] for [`Probe::Absent`], which constrains nothing.
    ///
    /// A present empty string on a substring field is compared for equality: it filters for
    /// empty values rather than matching every non-null value.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleError::NotNullable`] for a null probe on a non-nullable field and
    /// [`ExampleError::KindMismatch`] if the value kind differs from the field kind.
    #[inline]
    pub fn from_probe(field: Field, probe: &Probe) -> Result<Option<Self>, ExampleError> {
        let test = match probe {
            Probe::Absent => return Ok(None),
            Probe::Null | Probe::Value(Value::Null) if field.nullable => Test::IsNull,
            Probe::Null | Probe::Value(Value::Null) => {
                return Err(ExampleError::NotNullable { field: field.name });
            },
            Probe::Value(value @ Value::Int(_)) if field.kind == Kind::Int => {
                Test::Eq(value.clone())
            },
            Probe::Value(Value::Text(text)) if field.kind == Kind::Text => {
                match field.mode {
                    _ if text.is_empty() => Test::Eq(Value::Text(String::new())),
                    MatchMode::Exact => Test::Eq(Value::Text(text.clone())),
                    MatchMode::Contains => Test::Contains {
                        needle: text.clone(),
                        ignore_case: false,
                    },
                    MatchMode::ContainsIgnoreCase => Test::Contains {
                        needle: text.to_ascii_lowercase(),
                        ignore_case: true,
                    },
                }
            },
            Probe::Value(value @ (Value::Int(_) | Value::Text(_))) => {
                return Err(ExampleError::KindMismatch {
                    field: field.name,
                    expected: field.kind,
                    found: value.kind().unwrap_or(field.kind),
                });
            },
        };
        Ok(Some(Self { field, test }))
    }
}

impl<R> Query<R> for Predicate
where
    R: Record,
{
    /// Undeclared fields never match.
    #[inline]
    fn evaluate(&self, data: &R) -> bool {
        data.get(self.field.name)
            .is_some_and(|value| self.test.matches(&value))
    }
}

impl Debug for Predicate {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let Self { field, test } = self;
        if f.alternate() {
            write!(f, "{} {test:?}", field.name)
        } else {
            f.debug_struct(name_of_type!(Predicate))
                .field(name_of!(field in Self), &field.name)
                .field(name_of!(test in Self), test)
                .finish()
        }
    }
}

/// An ordered conjunction of predicates over records of type `R`.
///
/// The empty conjunction matches every record.
pub struct Conjunction<R> {
    /// The predicates, in schema declaration order when built from an example.
    predicates: Vec<Predicate>,
    /// Ties the conjunction to its record type.
    _phantom: PhantomData<fn() -> R>,
}

impl<R> Conjunction<R> {
    /// The unconstrained conjunction.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            predicates: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Add a predicate at the end.
    #[inline]
    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The predicates, in order.
    #[inline]
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` if this conjunction matches every record.
    #[inline]
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<R> Conjunction<R>
where
    R: Record,
{
    /// Build the predicates of an example: one per present field, in the order the fields are
    /// declared on `R`. Absent fields contribute nothing, so an example with every field absent
    /// becomes the unconstrained conjunction.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleError::UnknownField`] if the example assigns a field `R` does not declare,
    /// and the errors of [`Predicate::from_probe`] for mistyped values.
    #[inline]
    pub fn from_example(example: &Example<R>) -> Result<Self, ExampleError> {
        if let Some((name, _)) = example
            .assignments()
            .find(|(name, _)| R::field(name).is_none())
        {
            return Err(ExampleError::UnknownField { field: name.into() });
        }

        let predicates = R::FIELDS
            .iter()
            .filter_map(|field| {
                Predicate::from_probe(*field, example.probe(field.name)).transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            predicates,
            _phantom: PhantomData,
        })
    }

    /// Match the single record with identifier `id`.
    #[inline]
    #[must_use]
    pub fn by_id(id: Id) -> Self {
        Self::all().and(Predicate {
            field: R::id_field(),
            test: Test::Eq(Value::Int(id)),
        })
    }
}

impl<R> Query<R> for Conjunction<R>
where
    R: Record,
{
    #[inline]
    fn evaluate(&self, data: &R) -> bool {
        self.predicates
            .iter()
            .all(|predicate| Query::<R>::evaluate(predicate, data))
    }
}

impl<R> Clone for Conjunction<R> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<R> Debug for Conjunction<R> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if f.alternate() {
            if self.predicates.is_empty() {
                return write!(f, "true");
            }
            for (index, predicate) in self.predicates.iter().enumerate() {
                if index > 0 {
                    write!(f, " & ")?;
                }
                write!(f, "{predicate:#?}")?;
            }
            Ok(())
        } else {
            f.debug_tuple("Conjunction")
                .field(&self.predicates)
                .finish()
        }
    }
}
