//! Wiring for Rust: dependency injection container with `#[derive(Injectable)]`.
//!
//! ```
//! use std::sync::Arc;
//! use wiring_rs::prelude::*;
//!
//! struct Settings {
//!     greeting: &'static str,
//! }
//!
//! #[derive(Injectable)]
//! struct Greeter {
//!     settings: Arc<Settings>,
//! }
//!
//! let mut container = Container::new();
//! container
//!     .add_provider(Provider::value(Key::of::<Settings>(), Settings { greeting: "hello" }))
//!     .unwrap();
//! let greeter = container.inject::<Greeter>().unwrap();
//! assert_eq!(greeter.settings.greeting, "hello");
//! ```

pub mod prelude;

pub use wiring_core::{
    inventory, Arguments, Catalog, ClassBinding, ClassDescriptor, ConfigError, Container, ContainerConfig,
    FallbackPolicy, InjectError, Injectable, InjectableClass, InjectionToken, Instance,
    IntoInjectError, Key, Module, Parameter, Provider, ProviderSource, Registry, TokenKey,
    TypeKey,
};
pub use wiring_rs_macros::Injectable;
