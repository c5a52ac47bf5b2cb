// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made branch conditions.

use std::marker::PhantomData;

use regex::Regex;

use crate::engine::ActorContext;
use crate::scope::StorageKey;
use crate::token::Token;
use crate::traits::Condition;

/// Holds when a variable, after lookup, equals the expanded template.
pub struct VariableEquals {
    name: String,
    template: String,
}

impl VariableEquals {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }
}

impl Condition for VariableEquals {
    fn evaluate(&self, _token: &Token, ctx: &ActorContext) -> anyhow::Result<bool> {
        let expected = ctx.expand(&self.template);
        Ok(ctx.variables().lookup(&self.name).as_deref() == Some(expected.as_str()))
    }

    fn describe(&self) -> String {
        format!("${{{}}} == '{}'", self.name, self.template)
    }
}

/// Holds when a variable is set and matches a regular expression. An
/// unset variable is an error.
pub struct VariableMatches {
    name: String,
    pattern: Regex,
}

impl VariableMatches {
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }
}

impl Condition for VariableMatches {
    fn evaluate(&self, _token: &Token, ctx: &ActorContext) -> anyhow::Result<bool> {
        let value = ctx.variables().require(&self.name)?;
        Ok(self.pattern.is_match(&value))
    }

    fn describe(&self) -> String {
        format!("${{{}}} =~ /{}/", self.name, self.pattern.as_str())
    }
}

/// Holds when the storage scope has an item under the key.
pub struct StorageHas {
    key: StorageKey,
}

impl StorageHas {
    pub fn new(key: StorageKey) -> Self {
        Self { key }
    }
}

impl Condition for StorageHas {
    fn evaluate(&self, _token: &Token, ctx: &ActorContext) -> anyhow::Result<bool> {
        Ok(ctx.storage().contains(&self.key))
    }

    fn describe(&self) -> String {
        format!("storage has '{}'", self.key)
    }
}

/// Holds when the token's payload is of type `T`.
pub struct PayloadIs<T> {
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Default for PayloadIs<T> {
    fn default() -> Self {
        Self { _type: PhantomData }
    }
}

impl<T: 'static> PayloadIs<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: 'static> Condition for PayloadIs<T> {
    fn evaluate(&self, token: &Token, _ctx: &ActorContext) -> anyhow::Result<bool> {
        Ok(token.payload().is::<T>())
    }

    fn describe(&self) -> String {
        format!("payload is {}", std::any::type_name::<T>())
    }
}

type Predicate = Box<dyn Fn(&Token, &ActorContext) -> anyhow::Result<bool> + Send + Sync>;

/// Condition backed by a closure.
pub struct FnCondition {
    label: String,
    predicate: Predicate,
}

impl FnCondition {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Token, &ActorContext) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Test the payload as a `T`; payloads of other types do not match.
    pub fn on_value<T, F>(label: impl Into<String>, predicate: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(label, move |token, _| {
            Ok(token.value::<T>().map_or(false, |value| predicate(value)))
        })
    }
}

impl Condition for FnCondition {
    fn evaluate(&self, token: &Token, ctx: &ActorContext) -> anyhow::Result<bool> {
        (self.predicate)(token, ctx)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StopHandle;
    use crate::path::ActorPath;
    use crate::scope::{Storage, Variables};

    fn ctx() -> ActorContext {
        let variables = Variables::new();
        variables.set("mode", "fast");
        variables.set("wanted", "fast");
        ActorContext::new(ActorPath::root("b"), variables, Storage::new(), StopHandle::new())
    }

    #[test]
    fn variable_conditions() {
        let ctx = ctx();
        let token = Token::from_value(1_i64);
        assert!(VariableEquals::new("mode", "${wanted}").evaluate(&token, &ctx).unwrap());
        assert!(!VariableEquals::new("mode", "slow").evaluate(&token, &ctx).unwrap());

        let matches = VariableMatches::new("mode", Regex::new("^f").unwrap());
        assert!(matches.evaluate(&token, &ctx).unwrap());
        let unset = VariableMatches::new("missing", Regex::new(".*").unwrap());
        assert!(unset.evaluate(&token, &ctx).is_err());
    }

    #[test]
    fn payload_and_closure_conditions() {
        let ctx = ctx();
        let token = Token::from_value(7_i64);
        assert!(PayloadIs::<i64>::new().evaluate(&token, &ctx).unwrap());
        assert!(!PayloadIs::<String>::new().evaluate(&token, &ctx).unwrap());

        let even = FnCondition::on_value("even", |v: &i64| v % 2 == 0);
        assert!(!even.evaluate(&token, &ctx).unwrap());
        assert_eq!(even.describe(), "even");
    }
}
