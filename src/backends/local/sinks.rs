// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::engine::ActorContext;
use crate::scope::StorageKey;
use crate::token::{Token, TypeTag};
use crate::traits::Sink;

/// Keeps a copy of every payload of type `T` it receives.
///
/// Clones share the collected values, so a test or the caller can keep one
/// clone and hand the other to the tree.
pub struct Collector<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Collector<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Collector<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn values(&self) -> Vec<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Sink for Collector<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::of::<T>()]
    }

    async fn consume(&mut self, token: Token, _ctx: &ActorContext) -> anyhow::Result<()> {
        let value = token.value::<T>().cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "expected payload of type {}, got {}",
                std::any::type_name::<T>(),
                token.payload().type_tag()
            )
        })?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
        Ok(())
    }
}

/// Keeps every token it receives, whatever the payload type.
#[derive(Clone, Default)]
pub struct TokenCollector {
    tokens: Arc<Mutex<Vec<Token>>>,
}

impl TokenCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Sink for TokenCollector {
    async fn consume(&mut self, token: Token, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token);
        Ok(())
    }
}

/// Stores each payload under one key of the current storage scope.
pub struct SetStorageValue<T = ()> {
    key: StorageKey,
    _payload: PhantomData<fn() -> T>,
}

impl SetStorageValue<()> {
    /// Accepts any payload type.
    pub fn new(key: StorageKey) -> Self {
        Self {
            key,
            _payload: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> SetStorageValue<T> {
    /// Accepts payloads of type `T` only.
    pub fn typed(key: StorageKey) -> Self {
        Self {
            key,
            _payload: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Sink for SetStorageValue<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        if std::any::TypeId::of::<T>() == std::any::TypeId::of::<()>() {
            vec![TypeTag::unknown()]
        } else {
            vec![TypeTag::of::<T>()]
        }
    }

    async fn consume(&mut self, token: Token, ctx: &ActorContext) -> anyhow::Result<()> {
        ctx.storage().put(&self.key, token.into_payload());
        Ok(())
    }
}
