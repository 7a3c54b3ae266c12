//! Container: owns the provider registry and resolves keys into instances.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::catalog::{Arguments, Catalog, Injectable};
use crate::config::ContainerConfig;
use crate::key::{InjectionToken, Key, TypeKey};
use crate::module::Module;
use crate::provider::{Instance, Provider, ProviderSource};
use crate::registry::Registry;
use crate::InjectError;

/// DI container: register providers, then inject by type, token or key.
///
/// Resolution is synchronous and uncached. Value providers return their stored
/// `Arc`, factory providers are called once per request, class providers and
/// unregistered injectable types are constructed after resolving their parameters.
#[derive(Debug)]
pub struct Container {
    registry: Registry,
    catalog: Catalog,
    config: ContainerConfig,
}

/// A class under construction and the parameter it is currently resolving.
struct Frame {
    key: Key,
    class: TypeKey,
    index: usize,
}

/// Keys being constructed within one `inject` call.
#[derive(Default)]
struct ResolutionPath {
    frames: Vec<Frame>,
}

impl ResolutionPath {
    fn position(&self, key: &Key) -> Option<usize> {
        self.frames.iter().position(|frame| &frame.key == key)
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        let catalog = if config.discover {
            Catalog::discovered()
        } else {
            Catalog::new()
        };
        Self::with_catalog(catalog, config)
    }

    pub fn with_catalog(catalog: Catalog, config: ContainerConfig) -> Self {
        Self {
            registry: Registry::new(),
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Mark `T` injectable for this container.
    pub fn register_injectable<T: Injectable>(&mut self) -> &mut Self {
        self.catalog.register::<T>();
        self
    }

    pub fn is_injectable(&self, class: &TypeKey) -> bool {
        self.catalog.is_injectable(class)
    }

    /// Register `provider`, replacing any provider for the same key.
    /// Class providers must name an injectable class.
    pub fn add_provider(&mut self, provider: Provider) -> Result<(), InjectError> {
        if let ProviderSource::Class(binding) = provider.source() {
            let class = binding.class();
            if !self.catalog.is_injectable(class) {
                let err = InjectError::NotInjectable {
                    requested: provider.provide().display_name(),
                    class: class.display_name(),
                };
                debug!(error = %err, "rejected provider");
                return Err(err);
            }
        }
        let key = provider.provide().clone();
        let kind = provider.kind();
        if self.registry.insert(provider).is_some() {
            debug!(key = %key, kind, "replaced provider");
        } else {
            debug!(key = %key, kind, "registered provider");
        }
        Ok(())
    }

    /// Apply a module's registrations.
    pub fn register<M: Module + ?Sized>(&mut self, module: &M) -> Result<&mut Self, InjectError> {
        module.register_into(self)?;
        Ok(self)
    }

    pub fn get_provider(&self, key: &Key) -> Option<&Provider> {
        self.registry.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registry.contains(key)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Resolve `T` by its type key. `T` may be a trait object bound with [`Provider::bind`].
    pub fn inject<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectError> {
        let key = Key::of::<T>();
        self.inject_key(&key)?
            .downcast::<T>()
            .ok_or_else(|| InjectError::type_mismatch::<T>(&key))
    }

    pub fn inject_token<T: ?Sized + Send + Sync + 'static>(
        &self,
        token: &InjectionToken<T>,
    ) -> Result<Arc<T>, InjectError> {
        let key = token.key();
        self.inject_key(&key)?
            .downcast::<T>()
            .ok_or_else(|| InjectError::type_mismatch::<T>(&key))
    }

    /// Resolve `key` to an untyped instance.
    pub fn inject_key(&self, key: &Key) -> Result<Instance, InjectError> {
        let mut path = ResolutionPath::default();
        self.resolve(key, &mut path)
            .inspect_err(|err| debug!(key = %key, error = %err, "injection failed"))
    }

    fn resolve(&self, key: &Key, path: &mut ResolutionPath) -> Result<Instance, InjectError> {
        trace!(key = %key, depth = path.depth(), "resolving");
        match self.registry.get(key).map(Provider::source) {
            Some(ProviderSource::Value(value)) => Ok(value.clone()),
            Some(ProviderSource::Factory(factory)) => Ok(factory()),
            Some(ProviderSource::Class(binding)) => {
                let built = self.construct(key, binding.class(), path)?;
                binding.adapt(built)
            }
            None => match key {
                Key::Type(class)
                    if self.config.fallback.allows(path.is_empty())
                        && self.catalog.is_injectable(class) =>
                {
                    trace!(class = %class, "constructing unregistered injectable");
                    self.construct(key, class, path)
                }
                _ => Err(InjectError::NoProvider {
                    key: key.display_name(),
                }),
            },
        }
    }

    fn construct(
        &self,
        key: &Key,
        class: &TypeKey,
        path: &mut ResolutionPath,
    ) -> Result<Instance, InjectError> {
        let descriptor = self
            .catalog
            .descriptor(class)
            .ok_or_else(|| InjectError::NotInjectable {
                requested: key.display_name(),
                class: class.display_name(),
            })?;
        let parameters = descriptor.parameters();
        path.frames.push(Frame {
            key: key.clone(),
            class: *class,
            index: 0,
        });
        let mut values = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            if let Some(frame) = path.frames.last_mut() {
                frame.index = index;
            }
            let effective = parameter.effective_key();
            // Report the frame where the cycle starts, not the one closing it.
            if let Some(start) = path.position(effective) {
                let frame = &path.frames[start];
                return Err(InjectError::CircularDependency {
                    class: frame.class.display_name(),
                    index: frame.index,
                });
            }
            values.push((effective.clone(), self.resolve(effective, path)?));
        }
        path.frames.pop();
        descriptor.construct(Arguments::new(*class, values))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
