//! Example objects: partially populated records used as filters.

use crate::{
    errors::ExampleError,
    record::{MatchMode, Record, Value},
};
use std::{
    collections::BTreeMap,
    fmt::{Debug, Error as FmtError, Formatter},
    marker::PhantomData,
};

/// The constraint an example places on one field.
///
/// This is deliberately a tri-state rather than an [`Option`]: an empty string or a zero is a real
/// filter value and must never be confused with "no filter".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Probe {
    /// The field is unconstrained.
    #[default]
    Absent,
    /// The field must be null.
    Null,
    /// The field must match this value under the field's [`MatchMode`].
    Value(Value),
}

impl Probe {
    /// Returns `true` unless this is [`Probe::Absent`].
    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl<T> From<Option<T>> for Probe
where
    T: Into<Value>,
{
    /// [`None`] becomes [`Probe::Absent`], which is the common convention for optional inputs.
    /// Use [`Probe::Null`] explicitly to filter for null.
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, |value| Self::Value(value.into()))
    }
}

/// A sparse set of field assignments over the record type `R`.
///
/// Fields that were never assigned are [`Probe::Absent`]. Assignments are not checked against the
/// schema here; that happens when the example is turned into predicates (see
/// [`Conjunction::from_example`](crate::query::Conjunction::from_example)), so that a mistyped
/// example is reported once, with the offending field named.
#[derive(Clone)]
pub struct Example<R> {
    /// Assigned fields, in assignment order. Each name occurs at most once.
    assignments: Vec<(Box<str>, Probe)>,
    /// Ties the example to its record type.
    _phantom: PhantomData<fn() -> R>,
}

impl<R> Example<R> {
    /// An example with every field absent. Matches every record.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assignments: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Constrain `field` to match `value`.
    #[inline]
    #[must_use]
    pub fn set(self, field: &str, value: impl Into<Value>) -> Self {
        self.set_probe(field, Probe::Value(value.into()))
    }

    /// Constrain `field` to be null.
    #[inline]
    #[must_use]
    pub fn set_null(self, field: &str) -> Self {
        self.set_probe(field, Probe::Null)
    }

    /// Set the probe of `field`, replacing any earlier assignment. Setting [`Probe::Absent`]
    /// removes the assignment.
    #[inline]
    #[must_use]
    pub fn set_probe(mut self, field: &str, probe: Probe) -> Self {
        self.assign(field, probe);
        self
    }

    /// In-place version of [`set_probe`](Self::set_probe).
    fn assign(&mut self, field: &str, probe: Probe) {
        let existing = self
            .assignments
            .iter()
            .position(|(name, _)| name.as_ref() == field);
        match (existing, probe) {
            (Some(index), Probe::Absent) => {
                let _removed = self.assignments.remove(index);
            },
            (Some(index), probe) => self.assignments[index].1 = probe,
            (None, Probe::Absent) => {},
            (None, probe) => self.assignments.push((field.into(), probe)),
        }
    }

    /// The probe of `field`. Unassigned fields are [`Probe::Absent`].
    #[inline]
    #[must_use]
    pub fn probe(&self, field: &str) -> &Probe {
        self.assignments
            .iter()
            .find(|(name, _)| name.as_ref() == field)
            .map_or(&Probe::Absent, |(_, probe)| probe)
    }

    /// Every assigned field with its probe, in assignment order.
    #[inline]
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &Probe)> {
        self.assignments
            .iter()
            .map(|(name, probe)| (name.as_ref(), probe))
    }

    /// Returns `true` if no field is constrained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl<R> Example<R>
where
    R: Record,
{
    /// The comparison mode the schema declares for `field`, or [`None`] for unknown fields.
    #[inline]
    #[must_use]
    pub fn mode(field: &str) -> Option<MatchMode> {
        R::field(field).map(|field| field.mode)
    }

    /// Read an example from a JSON object.
    ///
    /// Keys are field names. `null` constrains the field to be null; integers and strings are
    /// values; keys not present are absent.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleError::Malformed`] if the input is not a JSON object or holds values other
    /// than `null`, integers and strings. Field names and kinds are not checked here.
    #[inline]
    pub fn from_json(json: &str) -> Result<Self, ExampleError> {
        let fields = serde_json::from_str::<BTreeMap<String, Option<Value>>>(json)
            .map_err(ExampleError::Malformed)?;
        Ok(fields
            .into_iter()
            .map(|(name, value)| (name, value.map_or(Probe::Null, Probe::Value)))
            .collect())
    }
}

impl<R> Default for Example<R> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Debug for Example<R> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_map()
            .entries(self.assignments.iter().map(|(name, probe)| (name, probe)))
            .finish()
    }
}

impl<R, S> FromIterator<(S, Probe)> for Example<R>
where
    S: AsRef<str>,
{
    #[inline]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, Probe)>,
    {
        let mut example = Self::new();
        for (field, probe) in iter {
            example.assign(field.as_ref(), probe);
        }
        example
    }
}
