use std::collections::HashSet;
use std::fmt;

use crate::error::LabelError;

/// Upper bound on the number of labels; one per palette colour.
pub const MAX_LABELS: usize = 10;

// ---------------------------------------------------------------------------
// LabelId – index of a label inside its set
// ---------------------------------------------------------------------------

/// A label addressed by its position in the [`LabelSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub(crate) u8);

impl LabelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// LabelSet – ordered, distinct, bounded
// ---------------------------------------------------------------------------

/// Ordered sequence of distinct category names with one designated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
    default: LabelId,
}

impl LabelSet {
    /// Validate `names` and locate `default` among them.
    pub fn new<I, S>(names: I, default: &str) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(LabelError::EmptyLabelSet);
        }
        if names.len() > MAX_LABELS {
            return Err(LabelError::TooManyLabels { count: names.len() });
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(LabelError::DuplicateLabel(name.clone()));
            }
        }

        let default = names
            .iter()
            .position(|n| n == default)
            .map(|i| LabelId(i as u8))
            .ok_or_else(|| LabelError::UnknownDefaultLabel(default.to_string()))?;

        Ok(Self { names, default })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn default_label(&self) -> LabelId {
        self.default
    }

    /// Look up a label by name.
    pub fn id_of(&self, name: &str) -> Option<LabelId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| LabelId(i as u8))
    }

    /// Name of a label. Ids always come from this set, so indexing is safe.
    pub fn name(&self, id: LabelId) -> &str {
        &self.names[id.index()]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All ids in label order.
    pub fn ids(&self) -> impl Iterator<Item = LabelId> + '_ {
        (0..self.names.len()).map(|i| LabelId(i as u8))
    }
}
