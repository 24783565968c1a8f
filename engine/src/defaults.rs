//! Key definitions.
//!
//! The defaults map is the single source of truth for which keys the engine
//! owns and how each one is cast and rendered. It is fixed once handed to a
//! [`Synchronizer`](crate::Synchronizer).

use crate::{error::Result, Error, Key, Kind, ScalarKind, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Definition of a single key: its kind and default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KeySpecRepr", into = "KeySpecRepr")]
pub struct KeySpec {
    kind: Kind,
    default: Value,
}

impl KeySpec {
    /// Create a key definition, checking that the default has the given kind.
    pub fn new(kind: Kind, default: impl Into<Value>) -> Result<Self> {
        let default = default.into();
        if !kind.admits(&default) {
            return Err(Error::TypeMismatch {
                key: String::new(),
                expected: kind.to_string(),
                got: Kind::of(&default)
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "mixed array".to_string()),
            });
        }
        Ok(Self { kind, default })
    }

    /// Create a key definition whose kind is inferred from the default.
    ///
    /// Empty arrays become `string[]`; use [`KeySpec::new`] for other member
    /// kinds.
    pub fn infer(default: impl Into<Value>) -> Result<Self> {
        let default = default.into();
        let kind = Kind::of(&default).ok_or_else(|| Error::TypeMismatch {
            key: String::new(),
            expected: "bool, number, string or a flat array of one of them".to_string(),
            got: "mixed array".to_string(),
        })?;
        Ok(Self { kind, default })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Cast a fragment string for this key.
    pub fn cast(&self, raw: &str) -> Value {
        self.kind.cast(raw)
    }

    /// Canonical rendering of the default.
    pub fn default_rendered(&self) -> String {
        self.default.render()
    }

    /// Render a value for the live diff.
    ///
    /// Returns `None` when the rendering equals the default's rendering: the
    /// key belongs out of the diff. An empty string is a real value (an
    /// empty array or text), not an omission.
    pub fn stringify(&self, value: &Value) -> Option<String> {
        let rendered = self.kind.render(value);
        (rendered != self.default_rendered()).then_some(rendered)
    }
}

/// Wire form: a bare default (kind inferred) or `{"kind", "default"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum KeySpecRepr {
    Typed { kind: Kind, default: Value },
    Bare(Value),
}

impl TryFrom<KeySpecRepr> for KeySpec {
    type Error = Error;

    fn try_from(repr: KeySpecRepr) -> Result<Self> {
        match repr {
            KeySpecRepr::Typed { kind, default } => KeySpec::new(kind, default),
            KeySpecRepr::Bare(default) => KeySpec::infer(default),
        }
    }
}

impl From<KeySpec> for KeySpecRepr {
    fn from(spec: KeySpec) -> Self {
        KeySpecRepr::Typed {
            kind: spec.kind,
            default: spec.default,
        }
    }
}

/// Rust types usable as a default in [`Defaults::with`].
///
/// Covers scalars and flat vectors of a single scalar type, so the kind is
/// known without looking at the value.
pub trait DefaultValue: Into<Value> {
    fn kind() -> Kind;
}

macro_rules! default_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl DefaultValue for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }
            }

            impl DefaultValue for Vec<$ty> {
                fn kind() -> Kind {
                    Kind::Array(ScalarKind::$kind)
                }
            }
        )*
    };
}

default_value!(
    bool => Bool,
    f64 => Number,
    i32 => Number,
    i64 => Number,
    u32 => Number,
    &str => Str,
    String => Str,
);

/// The defaults map: key name to definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Defaults {
    keys: BTreeMap<Key, KeySpec>,
}

impl Defaults {
    pub fn new() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Add a key definition, replacing any previous one for the same key.
    pub fn insert(&mut self, key: impl Into<Key>, spec: KeySpec) -> &mut Self {
        self.keys.insert(key.into(), spec);
        self
    }

    /// Builder-style method to add a key whose kind follows from the Rust
    /// type of its default. An empty `Vec<i32>` declares a `number[]` key.
    pub fn with<T: DefaultValue>(mut self, key: impl Into<Key>, default: T) -> Self {
        let spec = KeySpec {
            kind: T::kind(),
            default: default.into(),
        };
        self.insert(key, spec);
        self
    }

    /// Builder-style method to add a key with an explicit kind.
    pub fn with_kind(
        mut self,
        key: impl Into<Key>,
        kind: Kind,
        default: impl Into<Value>,
    ) -> Result<Self> {
        let key = key.into();
        let spec = KeySpec::new(kind, default).map_err(|e| match e {
            Error::TypeMismatch { expected, got, .. } => Error::TypeMismatch {
                key: key.clone(),
                expected,
                got,
            },
            other => other,
        })?;
        self.insert(key, spec);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&KeySpec> {
        self.keys.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &KeySpec)> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
