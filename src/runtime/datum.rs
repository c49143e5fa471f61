//! Data elements for the bulk-data construct

use fugue::ChoiceValue;

/// One element of a data collection, or one fantasized datum
///
/// A datum is either a single value or an ordered sequence of values. The
/// fantasy estimator inspects the first element of a collection to decide
/// which shape every fantasized datum of that collection takes.
#[derive(Clone, Debug)]
pub enum Datum {
    /// A single value
    Single(ChoiceValue),
    /// An ordered sequence of values
    Multiple(Vec<ChoiceValue>),
}

impl Datum {
    /// Whether this datum is array-shaped
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// Number of values held
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(values) => values.len(),
        }
    }

    /// Whether this is an empty sequence
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value of a single datum
    pub fn as_single(&self) -> Option<&ChoiceValue> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }

    /// The values of an array datum
    pub fn as_multiple(&self) -> Option<&[ChoiceValue]> {
        match self {
            Self::Single(_) => None,
            Self::Multiple(values) => Some(values),
        }
    }

    /// Value at `index`; a single datum only has index 0
    pub fn get(&self, index: usize) -> Option<&ChoiceValue> {
        match self {
            Self::Single(value) if index == 0 => Some(value),
            Self::Single(_) => None,
            Self::Multiple(values) => values.get(index),
        }
    }
}

impl From<ChoiceValue> for Datum {
    fn from(value: ChoiceValue) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<ChoiceValue>> for Datum {
    fn from(values: Vec<ChoiceValue>) -> Self {
        Self::Multiple(values)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Single(ChoiceValue::F64(value))
    }
}

impl From<Vec<f64>> for Datum {
    fn from(values: Vec<f64>) -> Self {
        Self::Multiple(values.into_iter().map(ChoiceValue::F64).collect())
    }
}
