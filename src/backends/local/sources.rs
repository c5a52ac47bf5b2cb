// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::ActorContext;
use crate::scope::StorageKey;
use crate::token::{Token, TypeTag};
use crate::traits::Source;

/// Emits a fixed list of values, one token each.
pub struct ConstantSource<T> {
    values: Vec<T>,
    cursor: usize,
}

impl<T> ConstantSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(values: Vec<T>) -> Self {
        Self { values, cursor: 0 }
    }
}

#[async_trait]
impl<T> Source for ConstantSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<T>()]
    }

    fn has_more(&self) -> bool {
        self.cursor < self.values.len()
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    async fn next(&mut self, _ctx: &ActorContext) -> anyhow::Result<Token> {
        let value = self
            .values
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("source is exhausted"))?;
        self.cursor += 1;
        Ok(Token::from_value(value))
    }
}

/// Emits each template as a `String`, expanded against the variables in
/// scope at the time the token is produced.
pub struct TemplateSource {
    templates: Vec<String>,
    strict: bool,
    cursor: usize,
}

impl TemplateSource {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            strict: false,
            cursor: 0,
        }
    }

    /// Fail on unresolved placeholders instead of keeping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[async_trait]
impl Source for TemplateSource {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<String>()]
    }

    fn has_more(&self) -> bool {
        self.cursor < self.templates.len()
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    async fn next(&mut self, ctx: &ActorContext) -> anyhow::Result<Token> {
        let template = self
            .templates
            .get(self.cursor)
            .ok_or_else(|| anyhow::anyhow!("source is exhausted"))?;
        self.cursor += 1;
        let text = if self.strict {
            ctx.variables().expand_strict(template)?
        } else {
            ctx.expand(template)
        };
        Ok(Token::from_value(text))
    }
}

/// Emits the payload stored under one key, once.
pub struct StorageValueSource {
    key: StorageKey,
    emitted: bool,
}

impl StorageValueSource {
    pub fn new(key: StorageKey) -> Self {
        Self {
            key,
            emitted: false,
        }
    }
}

#[async_trait]
impl Source for StorageValueSource {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.emitted = false;
        Ok(())
    }

    fn has_more(&self) -> bool {
        !self.emitted
    }

    fn rewind(&mut self) {
        self.emitted = false;
    }

    async fn next(&mut self, ctx: &ActorContext) -> anyhow::Result<Token> {
        self.emitted = true;
        let payload = ctx.storage().require(&self.key)?;
        Ok(Token::new(payload))
    }
}
