use serde::{Deserialize, Deserializer};

/// A field of a partial update. Unlike `Option`, this tells an omitted
/// field apart from one that was sent as `null`.
///
/// Use with `#[serde(default)]` so an omitted field becomes `Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Overwrite an optional field. Like `Missing`, `Null` leaves it as is.
    pub fn apply_to(self, target: &mut Option<T>) {
        if let Patch::Value(value) = self {
            *target = Some(value);
        }
    }

    /// Overwrite a required field. Only a concrete value counts.
    pub fn apply_to_required(self, target: &mut T) {
        if let Patch::Value(value) = self {
            *target = value;
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}
