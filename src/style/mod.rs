//! Attribute System.
//!
//! Typed, validated, documented configuration knobs attached to an owner:
//! the global [`DashboardStyle`] or a single module. An owner declares a
//! table of [`Attribute`] descriptors; each descriptor maps an external
//! name onto a concrete struct field through a getter/setter pair, so no
//! runtime reflection is involved.
//!
//! # Example
//!
//! ```rust
//! use debug_dashboard::style::{self, Attribute, Value};
//!
//! #[derive(Default)]
//! struct Limits {
//!     depth: i64,
//! }
//!
//! let table = vec![
//!     Attribute::new("depth", 3i64, |l: &Limits| l.depth.into(), |l, v| l.depth = v.as_int())
//!         .doc("Maximum depth.")
//!         .check(|v| v.as_int() >= 0),
//! ];
//!
//! let mut limits = Limits::default();
//! style::initialize(&mut limits, &table);
//! assert_eq!(limits.depth, 3);
//!
//! style::set(&mut limits, &table, "depth", "10").unwrap();
//! assert_eq!(limits.depth, 10);
//! assert!(style::set(&mut limits, &table, "depth", "-1").is_err());
//! assert_eq!(limits.depth, 10);
//! ```

pub mod dashboard;
pub mod literal;

pub use dashboard::{DashboardStyle, Tier};
pub use literal::{Kind, Value};

use crate::error::AttributeError;

// =============================================================================
// Attribute Descriptor
// =============================================================================

/// Declares one attribute of an owner `T`.
pub struct Attribute<T> {
    /// Name the attribute is addressed by.
    pub key: &'static str,
    pub kind: Kind,
    pub default: Value,
    pub doc: &'static str,
    /// Validity predicate, applied after coercion.
    pub check: Option<fn(&Value) -> bool>,
    get: fn(&T) -> Value,
    set: fn(&mut T, Value),
}

impl<T> Attribute<T> {
    /// Declare an attribute whose type is the type of its default.
    pub fn new(
        key: &'static str,
        default: impl Into<Value>,
        get: fn(&T) -> Value,
        set: fn(&mut T, Value),
    ) -> Self {
        let default = default.into();
        Self {
            key,
            kind: default.kind(),
            default,
            doc: "",
            check: None,
            get,
            set,
        }
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn check(mut self, check: fn(&Value) -> bool) -> Self {
        self.check = Some(check);
        self
    }

    /// Override the declared type; the default is coerced at initialization.
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Coerce and validate a value without committing it.
    pub fn validate(&self, value: Value) -> Result<Value, AttributeError> {
        let shown = value.to_string();
        let value = value.coerce(self.kind).ok_or_else(|| AttributeError::Coercion {
            key: self.key.to_string(),
            value: shown.clone(),
            expected: self.kind.name(),
        })?;
        if let Some(check) = self.check {
            if !check(&value) {
                return Err(AttributeError::Rejected {
                    key: self.key.to_string(),
                    value: shown,
                });
            }
        }
        Ok(value)
    }
}

/// Summary of one attribute, for listings and configuration dumps.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name: &'static str,
    pub value: Value,
    pub default: Value,
    pub doc: &'static str,
}

impl AttributeInfo {
    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

/// Outcome of [`set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Empty input: the current value, nothing changed.
    Read(Value),
    /// The new value was committed.
    Written(Value),
}

// =============================================================================
// Operations
// =============================================================================

/// Store the coerced default of every attribute on the owner.
pub fn initialize<T>(owner: &mut T, table: &[Attribute<T>]) {
    for attr in table {
        match attr.default.clone().coerce(attr.kind) {
            Some(value) => (attr.set)(owner, value),
            None => tracing::warn!(key = attr.key, "attribute default does not match its type"),
        }
    }
}

/// Look up an attribute by name.
pub fn find<'a, T>(table: &'a [Attribute<T>], name: &str) -> Result<&'a Attribute<T>, AttributeError> {
    table
        .iter()
        .find(|attr| attr.key == name)
        .ok_or_else(|| AttributeError::Unknown(name.to_string()))
}

/// Current value of an attribute.
pub fn get<T>(owner: &T, table: &[Attribute<T>], name: &str) -> Result<Value, AttributeError> {
    find(table, name).map(|attr| (attr.get)(owner))
}

/// Write an attribute from its literal text.
///
/// Empty `raw` reads the current value instead. Malformed literals, failed
/// coercions and failed predicates leave the owner untouched.
pub fn set<T>(owner: &mut T, table: &[Attribute<T>], name: &str, raw: &str) -> Result<Assignment, AttributeError> {
    let attr = find(table, name)?;
    if raw.trim().is_empty() {
        return Ok(Assignment::Read((attr.get)(owner)));
    }
    let parsed = literal::parse(raw).map_err(|reason| AttributeError::Malformed {
        key: name.to_string(),
        reason,
    })?;
    commit(owner, attr, parsed)
}

/// Write an already-typed value, as read from a declarative config file.
pub fn assign<T>(owner: &mut T, table: &[Attribute<T>], name: &str, value: Value) -> Result<Assignment, AttributeError> {
    let attr = find(table, name)?;
    commit(owner, attr, value)
}

fn commit<T>(owner: &mut T, attr: &Attribute<T>, value: Value) -> Result<Assignment, AttributeError> {
    let value = attr.validate(value)?;
    (attr.set)(owner, value.clone());
    tracing::debug!(name = attr.key, %value, "attribute written");
    Ok(Assignment::Written(value))
}

/// Every attribute with its current value, in declaration order.
pub fn get_all<T>(owner: &T, table: &[Attribute<T>]) -> Vec<(&'static str, Value)> {
    table.iter().map(|attr| (attr.key, (attr.get)(owner))).collect()
}

/// Every attribute with value, default and documentation.
pub fn describe<T>(owner: &T, table: &[Attribute<T>]) -> Vec<AttributeInfo> {
    table
        .iter()
        .map(|attr| AttributeInfo {
            name: attr.key,
            value: (attr.get)(owner),
            default: attr.default.clone().coerce(attr.kind).unwrap_or_else(|| attr.default.clone()),
            doc: attr.doc,
        })
        .collect()
}

/// Validity predicate for SGR parameter strings such as `1;33`.
pub fn is_sgr(value: &Value) -> bool {
    value.as_str().chars().all(|c| c.is_ascii_digit() || c == ';')
}

/// Validity predicate for non-negative integers.
pub fn is_non_negative(value: &Value) -> bool {
    value.as_int() >= 0
}

// =============================================================================
// Tests
// =============================================================================
