//! Drawing store: the canonical canvas.
//!
//! DESIGN
//! ======
//! Elements live in a `Vec` so bootstrap snapshots come out in insertion
//! order. A side index maps element id to its slot, making upsert O(1)
//! amortized: a known id is replaced in place, an unseen id is appended.
//!
//! Element bodies are opaque JSON objects. The store looks at `id` and
//! nothing else; the body is replayed to clients exactly as received.
//!
//! Payloads without a usable `id` are rejected when converted into a
//! [`DrawingElement`], so the store never holds anonymous elements.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ElementError {
    #[error("element payload must be a JSON object")]
    NotAnObject,
    #[error("element has no id")]
    MissingId,
    #[error("element id must be a string or number, got {0}")]
    InvalidId(&'static str),
}

/// Client-assigned element identity. Strings and numbers never compare
/// equal to each other, so `"1"` and `1` are different elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementId {
    Text(String),
    Number(String),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Number(s) => f.write_str(s),
        }
    }
}

impl TryFrom<&Value> for ElementId {
    type Error = ElementError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => Ok(Self::Number(canonical_number(n))),
            Value::Null => Err(ElementError::MissingId),
            Value::Bool(_) => Err(ElementError::InvalidId("bool")),
            Value::Array(_) => Err(ElementError::InvalidId("array")),
            Value::Object(_) => Err(ElementError::InvalidId("object")),
        }
    }
}

/// Largest magnitude below which every integral `f64` is an exact integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Numeric ids compare by value: `1`, `1.0` and `1e0` are the same id.
fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT {
        #[allow(clippy::cast_possible_truncation)]
        let i = f as i64;
        return i.to_string();
    }
    f.to_string()
}

/// One drawable unit: identity plus the untouched client payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingElement {
    id: ElementId,
    body: Map<String, Value>,
}

#[cfg(test)]
impl DrawingElement {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl TryFrom<Map<String, Value>> for DrawingElement {
    type Error = ElementError;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = body.get("id").ok_or(ElementError::MissingId).and_then(ElementId::try_from)?;
        Ok(Self { id, body })
    }
}

impl TryFrom<Value> for DrawingElement {
    type Error = ElementError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(body) = value else {
            return Err(ElementError::NotAnObject);
        };
        Self::try_from(body)
    }
}

impl Serialize for DrawingElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct DrawingStore {
    elements: Vec<DrawingElement>,
    /// Element id -> position in `elements`.
    index: HashMap<ElementId, usize>,
}

impl DrawingStore {
    /// Replace the element with the same id in place, or append it.
    pub fn upsert(&mut self, element: DrawingElement) -> Upsert {
        if let Some(&slot) = self.index.get(&element.id) {
            self.elements[slot] = element;
            return Upsert::Updated;
        }
        self.index.insert(element.id.clone(), self.elements.len());
        self.elements.push(element);
        Upsert::Inserted
    }

    /// Point-in-time copy of every element, in canvas order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DrawingElement> {
        self.elements.clone()
    }

    /// Drop every element. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.elements.len();
        self.elements.clear();
        self.index.clear();
        removed
    }

    #[cfg(test)]
    pub fn get(&self, id: &ElementId) -> Option<&DrawingElement> {
        self.index.get(id).map(|&slot| &self.elements[slot])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
#[path = "drawing_test.rs"]
mod tests;
