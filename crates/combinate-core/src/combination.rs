use std::fmt;
use std::rc::Rc;

use crate::subsets::subsets;
use crate::value::Value;

/// One candidate a combination offers for a field.
///
/// `Omit` is the omission marker: the field is left unset in that result. It
/// is never equal to any [`Value`], including [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Set(Value),
    Omit,
}

impl Candidate {
    pub fn is_omit(&self) -> bool {
        matches!(self, Candidate::Omit)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Candidate::Set(value) => Some(value),
            Candidate::Omit => None,
        }
    }
}

impl From<Value> for Candidate {
    fn from(value: Value) -> Self {
        Candidate::Set(value)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Set(value) => fmt::Display::fmt(value, f),
            Candidate::Omit => f.write_str("<omit>"),
        }
    }
}

/// Which constructor produced a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationKind {
    One,
    Some,
    Optional,
    Nested,
    Custom,
}

type Producer = Rc<dyn Fn() -> Vec<Candidate>>;

/// Lazily evaluated set of candidate values for a single template field.
///
/// The producer must be free of side effects; the engine evaluates it once
/// per field per generation pass.
#[derive(Clone)]
pub struct Combination {
    kind: CombinationKind,
    producer: Producer,
    checked: bool,
}

impl Combination {
    /// Build a combination from an arbitrary candidate producer.
    pub fn from_fn(producer: impl Fn() -> Vec<Candidate> + 'static) -> Self {
        Self::with_kind(CombinationKind::Custom, producer)
    }

    pub(crate) fn with_kind(
        kind: CombinationKind,
        producer: impl Fn() -> Vec<Candidate> + 'static,
    ) -> Self {
        Self {
            kind,
            producer: Rc::new(producer),
            checked: true,
        }
    }

    /// Wrap an already-evaluated candidate list, e.g. a nested expansion.
    pub fn from_candidates(kind: CombinationKind, candidates: Vec<Candidate>) -> Self {
        Self::with_kind(kind, move || candidates.clone())
    }

    pub fn kind(&self) -> CombinationKind {
        self.kind
    }

    /// Evaluate the producer.
    pub fn candidates(&self) -> Vec<Candidate> {
        (self.producer)()
    }

    /// Mark the combination as deliberately inconsistent with the declared
    /// field shape. Candidates are unchanged; shape validation stops checking
    /// them.
    pub fn unchecked(mut self) -> Self {
        self.checked = false;
        self
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

impl fmt::Debug for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combination")
            .field("kind", &self.kind)
            .field("checked", &self.checked)
            .finish_non_exhaustive()
    }
}

/// Choose exactly one of `values`, in the given order.
pub fn one<I, V>(values: I) -> Combination
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    Combination::with_kind(CombinationKind::One, move || {
        values.iter().cloned().map(Candidate::Set).collect()
    })
}

/// Either `value` or the omission marker.
pub fn optional(value: impl Into<Value>) -> Combination {
    let value = value.into();
    Combination::with_kind(CombinationKind::Optional, move || {
        vec![Candidate::Set(value.clone()), Candidate::Omit]
    })
}

/// Choose any subset of `values`, the empty one included.
///
/// Each subset is an array candidate; subsets come in
/// [`array_combinate`](crate::subsets::array_combinate) order. Evaluating
/// the combination panics when there are more than
/// [`MAX_SUBSET_ITEMS`](crate::subsets::MAX_SUBSET_ITEMS) values.
pub fn some<I, V>(values: I) -> Combination
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    Combination::with_kind(CombinationKind::Some, move || {
        subsets(&values)
            .map(|subset| Candidate::Set(Value::array(subset)))
            .collect()
    })
}
