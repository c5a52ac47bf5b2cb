// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scoped string variables with `${name}` template expansion.
//!
//! Lookups probe the local scope first and then walk the parent chain; writes
//! always land in the local scope, so a child scope can never change what its
//! parent sees.
//!
//! ```
//! use flowtree::scope::Variables;
//!
//! let root = Variables::new();
//! root.set("dir", "/data");
//!
//! let body = root.child();
//! body.set("file", "in.csv");
//! assert_eq!(body.expand("${dir}/${file} (${missing})"), "/data/in.csv (${missing})");
//! assert_eq!(root.lookup("file"), None);
//! ```

use regex::Regex;

use super::chain::ScopeChain;
use crate::errors::ScopeError;

pub const PLACEHOLDER_START: &str = "${";
pub const PLACEHOLDER_END: &str = "}";

/// Prefix of names that fall back to process environment variables.
pub const ENVIRONMENT_PREFIX: &str = "env.";

const NAME_SPECIALS: &[char] = &['_', '-', ':', '.'];

/// Handle on one variables scope. Clones refer to the same scope.
#[derive(Clone)]
pub struct Variables {
    chain: ScopeChain<String>,
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Variables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variables")
            .field("depth", &self.chain.depth())
            .field("local", &self.chain.local_entries())
            .finish()
    }
}

impl Variables {
    /// New root scope without a parent.
    pub fn new() -> Self {
        Self {
            chain: ScopeChain::root(),
        }
    }

    /// New scope reading through to `self`.
    pub fn child(&self) -> Self {
        Self {
            chain: self.chain.child(),
        }
    }

    /// New empty scope that shares nothing with `self`.
    pub fn detached(&self) -> Self {
        Self::new()
    }

    /// New root scope holding every binding currently visible from `self`.
    pub fn snapshot(&self) -> Self {
        Self {
            chain: self.chain.snapshot(),
        }
    }

    pub fn is_same_scope(&self, other: &Variables) -> bool {
        self.chain.same_frame(&other.chain)
    }

    pub fn depth(&self) -> usize {
        self.chain.depth()
    }

    /// Chained lookup. Names starting with `env.` that are not bound in any
    /// scope resolve against the process environment.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.chain.lookup(name).or_else(|| {
            name.strip_prefix(ENVIRONMENT_PREFIX)
                .and_then(|var| std::env::var(var).ok())
        })
    }

    pub fn lookup_local(&self, name: &str) -> Option<String> {
        self.chain.lookup_local(name)
    }

    /// Like [`lookup`](Self::lookup) but a missing variable is an error.
    pub fn require(&self, name: &str) -> Result<String, ScopeError> {
        self.lookup(name).ok_or_else(|| ScopeError::UnresolvedVariable {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chain.contains(name)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.chain.set(name.into(), value.into())
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.chain.remove(name)
    }

    pub fn clear(&self) {
        self.chain.clear_local();
    }

    pub fn len_local(&self) -> usize {
        self.chain.local_len()
    }

    pub fn local_names(&self) -> Vec<String> {
        self.chain.local_entries().into_iter().map(|(k, _)| k).collect()
    }

    /// Every name visible from this scope, outermost first.
    pub fn names(&self) -> Vec<String> {
        self.chain.names()
    }

    /// Replace every resolvable `${name}`; unresolved placeholders are kept
    /// verbatim. Substituted values are not expanded again.
    pub fn expand(&self, template: &str) -> String {
        expand_with(template, |name| self.lookup(name))
    }

    /// Replace every `${name}`, failing on the first unresolved one.
    pub fn expand_strict(&self, template: &str) -> Result<String, ScopeError> {
        if let Some(name) = extract_names(template).into_iter().find(|name| self.lookup(name).is_none()) {
            return Err(ScopeError::UnresolvedVariable { name });
        }
        Ok(self.expand(template))
    }

    /// Copy local bindings whose name matches `filter` (all when `None`)
    /// into `target`. Returns the propagated names.
    pub fn propagate_to(&self, target: &Variables, filter: Option<&Regex>) -> Vec<String> {
        let mut propagated = Vec::new();
        for (name, value) in self.chain.local_entries() {
            if filter.map_or(true, |re| re.is_match(&name)) {
                target.set(name.clone(), value);
                propagated.push(name);
            }
        }
        propagated
    }

    /// Whether `name` is usable inside a `${...}` placeholder.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || NAME_SPECIALS.contains(&c))
    }

    /// Replace every character that is not allowed in a name with `_`.
    pub fn to_valid_name(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || NAME_SPECIALS.contains(&c) {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn extract_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(PLACEHOLDER_START) {
        let after = &rest[start + PLACEHOLDER_START.len()..];
        match after.find(PLACEHOLDER_END) {
            Some(end) => {
                names.push(after[..end].to_string());
                rest = &after[end + PLACEHOLDER_END.len()..];
            }
            None => break,
        }
    }
    names
}

fn expand_with<F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(PLACEHOLDER_START) {
        output.push_str(&rest[..start]);
        let after = &rest[start + PLACEHOLDER_START.len()..];
        match after.find(PLACEHOLDER_END) {
            Some(end) => {
                let name = &after[..end];
                match resolve(name) {
                    Some(value) => output.push_str(&value),
                    None => {
                        output.push_str(PLACEHOLDER_START);
                        output.push_str(name);
                        output.push_str(PLACEHOLDER_END);
                    }
                }
                rest = &after[end + PLACEHOLDER_END.len()..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn expand_replaces_known_and_keeps_unknown() {
        let vars = Variables::new();
        vars.set("a", "1");
        vars.set("b", "two");
        assert_eq!(vars.expand("${a}+${b}=${c}"), "1+two=${c}");
        assert_eq!(vars.expand("no placeholders"), "no placeholders");
        assert_eq!(vars.expand("dangling ${a"), "dangling ${a");
        assert_eq!(vars.expand("${a}${a}"), "11");
    }

    #[test]
    fn expanded_values_are_not_expanded_again() {
        let vars = Variables::new();
        vars.set("outer", "${inner}");
        vars.set("inner", "x");
        assert_eq!(vars.expand("${outer}"), "${inner}");
    }

    #[test]
    fn expand_strict_reports_first_missing_name() {
        let vars = Variables::new();
        vars.set("a", "1");
        assert_eq!(vars.expand_strict("${a}").unwrap(), "1");
        assert_eq!(
            vars.expand_strict("${a}${b}${c}"),
            Err(ScopeError::UnresolvedVariable { name: "b".into() })
        );
    }

    #[test]
    fn extract_names_in_order() {
        assert_eq!(extract_names("${x}-${y}-${x}"), vec!["x", "y", "x"]);
        assert!(extract_names("${unterminated").is_empty());
    }

    #[test]
    fn child_scope_isolation() {
        let parent = Variables::new();
        parent.set("shared", "parent");
        let child = parent.child();
        child.set("i", "0");
        child.set("shared", "child");

        assert_eq!(child.lookup("shared").as_deref(), Some("child"));
        assert_eq!(parent.lookup("shared").as_deref(), Some("parent"));
        assert!(parent.lookup("i").is_none());
        drop(child);
        assert!(!parent.contains("i"));
    }

    #[test]
    fn require_and_env_fallback() {
        let vars = Variables::new();
        assert!(vars.require("nope").is_err());
        std::env::set_var("FLOWTREE_VARIABLES_TEST", "from-env");
        assert_eq!(vars.lookup("env.FLOWTREE_VARIABLES_TEST").as_deref(), Some("from-env"));
        vars.set("env.FLOWTREE_VARIABLES_TEST", "bound");
        assert_eq!(vars.lookup("env.FLOWTREE_VARIABLES_TEST").as_deref(), Some("bound"));
    }

    #[test]
    fn propagate_copies_matching_local_names() {
        let parent = Variables::new();
        let child = parent.child();
        child.set("result_count", "3");
        child.set("tmp", "x");

        let re = Regex::new("^result_").unwrap();
        let propagated = child.propagate_to(&parent, Some(&re));
        assert_eq!(propagated, vec!["result_count"]);
        assert_eq!(parent.lookup("result_count").as_deref(), Some("3"));
        assert!(parent.lookup("tmp").is_none());
    }

    #[test]
    fn name_validation() {
        assert!(Variables::is_valid_name("loop_value"));
        assert!(Variables::is_valid_name("env.HOME"));
        assert!(!Variables::is_valid_name(""));
        assert!(!Variables::is_valid_name("has space"));
        assert_eq!(Variables::to_valid_name("a b/c"), "a_b_c");
    }

    proptest! {
        #[test]
        fn templates_without_placeholders_are_unchanged(text in "[^$]{0,40}") {
            let vars = Variables::new();
            vars.set("a", "1");
            prop_assert_eq!(vars.expand(&text), text);
        }

        #[test]
        fn bound_placeholder_is_replaced(name in "[a-z_]{1,10}", value in "[a-z0-9 ]{0,10}") {
            let vars = Variables::new();
            vars.set(name.clone(), value.clone());
            let template = format!("<${{{}}}>", name);
            prop_assert_eq!(vars.expand(&template), format!("<{}>", value));
        }
    }
}
