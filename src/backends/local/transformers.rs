// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::payload_text;
use crate::engine::ActorContext;
use crate::errors::ScopeError;
use crate::token::{Payload, Token, TypeTag};
use crate::traits::{Standalone, Transformer};

type MapFn<I, O> = Box<dyn Fn(&I) -> anyhow::Result<O> + Send + Sync>;

/// Applies a function to every payload of type `I`.
pub struct MapTransformer<I, O> {
    map: MapFn<I, O>,
}

impl<I, O> MapTransformer<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(&I) -> O + Send + Sync + 'static,
    {
        Self {
            map: Box::new(move |input| Ok(map(input))),
        }
    }

    pub fn try_new<F>(map: F) -> Self
    where
        F: Fn(&I) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        Self { map: Box::new(map) }
    }
}

#[async_trait]
impl<I, O> Transformer for MapTransformer<I, O>
where
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<I>()]
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<O>()]
    }

    async fn process(&mut self, token: Token, _ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
        let input = token.value::<I>().ok_or_else(|| {
            anyhow::anyhow!(
                "expected payload of type {}, got {}",
                std::any::type_name::<I>(),
                token.payload().type_tag()
            )
        })?;
        let output = (self.map)(input)?;
        Ok(vec![token.with_payload(Payload::new(output))])
    }
}

/// Writes a variable into the current scope.
///
/// As a transformer the token passes through unchanged; the value is either
/// an expanded template or, with [`SetVariable::from_payload`], the text of
/// the token's payload. As a standalone only templates make sense.
pub struct SetVariable {
    name: String,
    value: Option<String>,
}

impl SetVariable {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(template.into()),
        }
    }

    pub fn from_payload(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    fn check_name(&self) -> anyhow::Result<()> {
        if !crate::scope::Variables::is_valid_name(&self.name) {
            return Err(ScopeError::InvalidName {
                name: self.name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Transformer for SetVariable {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.check_name()
    }

    async fn process(&mut self, token: Token, ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
        let value = match &self.value {
            Some(template) => ctx.expand(template),
            None => payload_text(token.payload()).ok_or_else(|| {
                anyhow::anyhow!(
                    "payload of type {} has no text form",
                    token.payload().type_tag()
                )
            })?,
        };
        ctx.variables().set(self.name.clone(), value);
        Ok(vec![token])
    }
}

#[async_trait]
impl Standalone for SetVariable {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.check_name()?;
        if self.value.is_none() {
            anyhow::bail!("variable '{}' has no value template", self.name);
        }
        Ok(())
    }

    async fn execute(&mut self, ctx: &ActorContext) -> anyhow::Result<()> {
        if let Some(template) = &self.value {
            ctx.variables().set(self.name.clone(), ctx.expand(template));
        }
        Ok(())
    }
}

/// Expands `${name}` placeholders in `String` payloads.
#[derive(Default)]
pub struct ExpandTemplate {
    strict: bool,
}

impl ExpandTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[async_trait]
impl Transformer for ExpandTemplate {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<String>()]
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<String>()]
    }

    async fn process(&mut self, token: Token, ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
        let template = token
            .value::<String>()
            .ok_or_else(|| anyhow::anyhow!("expected a String payload"))?;
        let expanded = if self.strict {
            ctx.variables().expand_strict(template)?
        } else {
            ctx.expand(template)
        };
        Ok(vec![token.with_payload(Payload::new(expanded))])
    }
}
