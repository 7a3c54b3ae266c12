//! Wiring core: provider registry, injectable catalog and the resolution engine.

pub mod catalog;
pub mod config;
pub mod container;
pub mod into_inject_error;
pub mod key;
pub mod module;
pub mod provider;
pub mod registry;

pub use catalog::{Arguments, Catalog, ClassDescriptor, Injectable, InjectableClass, Parameter};
pub use config::{ConfigError, ContainerConfig, FallbackPolicy};
pub use container::Container;
pub use into_inject_error::IntoInjectError;
pub use key::{InjectionToken, Key, TokenKey, TypeKey};
pub use module::Module;
pub use provider::{ClassBinding, Instance, Provider, ProviderSource};
pub use registry::Registry;

pub use inventory;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// A class provider names a class that isn't injectable.
    #[error("Cannot provide {requested} using class {class}, {class} isn't injectable")]
    NotInjectable { requested: String, class: String },
    #[error("No provider for type {key}")]
    NoProvider { key: String },
    /// `class` re-requests, at parameter `index`, a key still being constructed.
    #[error("Injection error. Recursive dependency detected in constructor for type {class} with parameter at index {index}")]
    CircularDependency { class: String, index: usize },
    #[error("provider for {key} produced a value that is not of type {expected}")]
    TypeMismatch { key: String, expected: String },
    #[error("constructor for {class} took more arguments than it declared (index {index})")]
    MissingArgument { class: String, index: usize },
    #[error("construction failed: {0}")]
    Construction(String),
}

impl InjectError {
    pub(crate) fn type_mismatch<T: ?Sized + 'static>(key: &Key) -> Self {
        InjectError::TypeMismatch {
            key: key.display_name(),
            expected: TypeKey::of::<T>().display_name(),
        }
    }
}
