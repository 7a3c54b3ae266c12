//! Provider registry: key -> provider, last registration wins.

use std::collections::HashMap;

use crate::key::Key;
use crate::provider::Provider;

#[derive(Clone, Default, Debug)]
pub struct Registry {
    providers: HashMap<Key, Provider>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `provider` under its key; returns the provider it replaced, if any.
    pub fn insert(&mut self, provider: Provider) -> Option<Provider> {
        self.providers.insert(provider.provide().clone(), provider)
    }

    pub fn get(&self, key: &Key) -> Option<&Provider> {
        self.providers.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.providers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
