//! Injectable metadata: constructor manifests and the side-table indexing them by type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::key::{Key, TypeKey};
use crate::provider::Instance;
use crate::InjectError;

/// A type the container may construct. `parameters` is the constructor manifest,
/// `construct` receives the resolved values in the same order.
///
/// Usually derived with `#[derive(Injectable)]`; hand-written impls must be
/// added to a [`Catalog`] (or submitted as an [`InjectableClass`]) to be found.
pub trait Injectable: Any + Send + Sync + Sized {
    fn parameters() -> Vec<Parameter>;

    fn construct(args: Arguments) -> Result<Self, InjectError>;
}

/// One constructor parameter: the declared key and an optional override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    declared: Key,
    inject: Option<Key>,
}

impl Parameter {
    pub fn new(declared: impl Into<Key>) -> Self {
        Self {
            declared: declared.into(),
            inject: None,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(Key::of::<T>())
    }

    /// Resolve this parameter through `key` instead of its declared type.
    pub fn inject(mut self, key: impl Into<Key>) -> Self {
        self.inject = Some(key.into());
        self
    }

    pub fn declared(&self) -> &Key {
        &self.declared
    }

    pub fn override_key(&self) -> Option<&Key> {
        self.inject.as_ref()
    }

    pub fn effective_key(&self) -> &Key {
        self.inject.as_ref().unwrap_or(&self.declared)
    }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    class: TypeKey,
    values: std::vec::IntoIter<(Key, Instance)>,
    index: usize,
}

impl Arguments {
    pub fn new(class: TypeKey, values: Vec<(Key, Instance)>) -> Self {
        Self {
            class,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Take the next argument as `Arc<T>`; `T` may be a trait object.
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, InjectError> {
        let index = self.index;
        self.index += 1;
        let (key, value) = self
            .values
            .next()
            .ok_or_else(|| InjectError::MissingArgument {
                class: self.class.display_name(),
                index,
            })?;
        value
            .downcast::<T>()
            .ok_or_else(|| InjectError::type_mismatch::<T>(&key))
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Type-erased record of an [`Injectable`] type.
#[derive(Clone, Copy)]
pub struct ClassDescriptor {
    type_key: fn() -> TypeKey,
    parameters: fn() -> Vec<Parameter>,
    construct: fn(Arguments) -> Result<Instance, InjectError>,
}

impl ClassDescriptor {
    pub const fn of<T: Injectable>() -> Self {
        Self {
            type_key: TypeKey::of::<T>,
            parameters: T::parameters,
            construct: construct_erased::<T>,
        }
    }

    pub fn type_key(&self) -> TypeKey {
        (self.type_key)()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        (self.parameters)()
    }

    pub fn construct(&self, args: Arguments) -> Result<Instance, InjectError> {
        (self.construct)(args)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassDescriptor").field(&self.type_key()).finish()
    }
}

fn construct_erased<T: Injectable>(args: Arguments) -> Result<Instance, InjectError> {
    T::construct(args).map(|value| Instance::new(Arc::new(value)))
}

/// Entry collected by `inventory`; `#[derive(Injectable)]` submits one per type.
pub struct InjectableClass(ClassDescriptor);

impl InjectableClass {
    pub const fn new(descriptor: ClassDescriptor) -> Self {
        Self(descriptor)
    }

    pub fn descriptor(&self) -> ClassDescriptor {
        self.0
    }
}

inventory::collect!(InjectableClass);

fn discovered_classes() -> &'static HashMap<TypeId, ClassDescriptor> {
    static DISCOVERED: OnceLock<HashMap<TypeId, ClassDescriptor>> = OnceLock::new();
    DISCOVERED.get_or_init(|| {
        let classes: HashMap<_, _> = inventory::iter::<InjectableClass>
            .into_iter()
            .map(|entry| {
                let descriptor = entry.descriptor();
                (descriptor.type_key().id(), descriptor)
            })
            .collect();
        debug!(count = classes.len(), "discovered injectable classes");
        classes
    })
}

/// Side-table of injectable types: answers `is_injectable`, parameter types and overrides.
#[derive(Clone, Default, Debug)]
pub struct Catalog {
    classes: HashMap<TypeId, ClassDescriptor>,
}

impl Catalog {
    /// Empty catalog; nothing is injectable until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with every type submitted through `inventory`.
    pub fn discovered() -> Self {
        Self {
            classes: discovered_classes().clone(),
        }
    }

    /// Mark `T` injectable.
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.insert(ClassDescriptor::of::<T>())
    }

    pub fn insert(&mut self, descriptor: ClassDescriptor) -> &mut Self {
        self.classes.insert(descriptor.type_key().id(), descriptor);
        self
    }

    pub fn is_injectable(&self, class: &TypeKey) -> bool {
        self.classes.contains_key(&class.id())
    }

    pub fn descriptor(&self, class: &TypeKey) -> Option<&ClassDescriptor> {
        self.classes.get(&class.id())
    }

    /// Declared constructor parameter keys, or `None` if `class` isn't injectable.
    pub fn param_types(&self, class: &TypeKey) -> Option<Vec<Key>> {
        self.descriptor(class).map(|d| {
            d.parameters()
                .into_iter()
                .map(|p| p.declared)
                .collect()
        })
    }

    pub fn param_override(&self, class: &TypeKey, index: usize) -> Option<Key> {
        self.descriptor(class)?
            .parameters()
            .into_iter()
            .nth(index)?
            .override_key()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
