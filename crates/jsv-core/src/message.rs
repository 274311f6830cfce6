//! # Validation Messages
//!
//! The result items produced by a schema evaluator. Two messages are the same
//! message only when instance location, schema location and description are
//! all equal; sharing an instance path is not enough.
//!
//! [`ValidationMessages`] behaves as a set that remembers insertion order, so
//! reports list messages in the order the evaluator produced them while set
//! difference between the strict and lenient passes stays well defined.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single validation message with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// JSON Pointer to the offending location in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that produced the message.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationMessage {
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Insertion-ordered set of validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationMessages {
    messages: Vec<ValidationMessage>,
}

impl ValidationMessages {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message. Returns `false` if an equal message was already present.
    pub fn insert(&mut self, message: ValidationMessage) -> bool {
        if self.messages.contains(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns true if an equal message is present.
    pub fn contains(&self, message: &ValidationMessage) -> bool {
        self.messages.contains(message)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationMessage> {
        self.messages.iter()
    }

    /// Returns a slice of all messages.
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationMessage> {
        self.messages
    }

    /// Messages of `self` that are not in `other`, keeping the order of `self`.
    pub fn difference(&self, other: &ValidationMessages) -> ValidationMessages {
        let exclude: HashSet<&ValidationMessage> = other.messages.iter().collect();
        ValidationMessages {
            messages: self
                .messages
                .iter()
                .filter(|m| !exclude.contains(m))
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<ValidationMessage> for ValidationMessages {
    fn from_iter<I: IntoIterator<Item = ValidationMessage>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let messages = iter
            .into_iter()
            .filter(|m| seen.insert(m.clone()))
            .collect();
        Self { messages }
    }
}

impl IntoIterator for ValidationMessages {
    type Item = ValidationMessage;
    type IntoIter = std::vec::IntoIter<ValidationMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationMessages {
    type Item = &'a ValidationMessage;
    type IntoIter = std::slice::Iter<'a, ValidationMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl fmt::Display for ValidationMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}
