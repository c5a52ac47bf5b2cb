// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tokens: the unit of data moving between actors.
//!
//! A [`Token`] carries exactly one [`Payload`] plus an append-only provenance
//! chain. Tokens are never mutated in place: an actor that changes the payload
//! builds a new token with [`Token::with_payload`], which keeps the history of
//! the token it was derived from.
//!
//! # Examples
//!
//! ```
//! use flowtree::token::{Payload, Token, TypeTag};
//!
//! let token = Token::new(Payload::new(21_i64));
//! assert_eq!(token.payload().downcast_ref::<i64>(), Some(&21));
//! assert_eq!(token.payload().type_tag(), &TypeTag::of::<i64>());
//!
//! let doubled = token.with_payload(Payload::new(42_i64));
//! assert_eq!(doubled.value::<i64>(), Some(&42));
//! assert_eq!(token.value::<i64>(), Some(&21));
//! ```

mod payload;
mod type_tag;

pub use payload::Payload;
pub use type_tag::TypeTag;

use crate::path::ActorPath;

/// One step in a token's history: which actor produced the payload and the
/// types it turned into what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceEntry {
    pub actor: ActorPath,
    pub input_type: Option<TypeTag>,
    pub output_type: TypeTag,
}

/// Immutable carrier of one payload value plus its provenance.
#[derive(Debug, Clone)]
pub struct Token {
    payload: Payload,
    provenance: Vec<ProvenanceEntry>,
}

impl Token {
    /// Create a token without any history.
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            provenance: Vec::new(),
        }
    }

    /// Shorthand for `Token::new(Payload::new(value))`.
    pub fn from_value<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self::new(Payload::new(value))
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Typed view of the payload, `None` if the payload is of another type.
    pub fn value<T: std::any::Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn provenance(&self) -> &[ProvenanceEntry] {
        &self.provenance
    }

    /// Build a new token carrying `payload` and this token's provenance chain.
    pub fn with_payload(&self, payload: Payload) -> Self {
        Self {
            payload,
            provenance: self.provenance.clone(),
        }
    }

    /// Return a new token with `entry` appended to the provenance chain.
    pub fn with_provenance(mut self, entry: ProvenanceEntry) -> Self {
        self.provenance.push(entry);
        self
    }

    /// Whether both tokens carry the very same payload instance.
    pub fn same_payload(&self, other: &Token) -> bool {
        self.payload.ptr_eq(&other.payload)
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_payload_keeps_history_and_leaves_original_untouched() {
        let path: ActorPath = "flow.source".parse().unwrap();
        let original = Token::from_value(String::from("hello")).with_provenance(ProvenanceEntry {
            actor: path.clone(),
            input_type: None,
            output_type: TypeTag::of::<String>(),
        });

        let derived = original.with_payload(Payload::new(5_usize));

        assert_eq!(original.value::<String>().map(String::as_str), Some("hello"));
        assert_eq!(derived.value::<usize>(), Some(&5));
        assert_eq!(derived.provenance().len(), 1);
        assert_eq!(derived.provenance()[0].actor, path);
        assert!(!derived.same_payload(&original));
    }

    #[test]
    fn clone_shares_payload() {
        let token = Token::from_value(vec![1_u8, 2, 3]);
        let copy = token.clone();
        assert!(copy.same_payload(&token));
    }

    #[test]
    fn typed_access_rejects_wrong_type() {
        let token = Token::from_value(1.5_f64);
        assert!(token.value::<i64>().is_none());
        assert_eq!(token.value::<f64>(), Some(&1.5));
    }
}
