//! Providers: how a key is satisfied (fixed value, factory or class).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::{Key, TypeKey};
use crate::InjectError;

/// A resolved value: an erased `Arc<T>`, where `T` may be unsized (`dyn Trait`).
///
/// Value providers hand out clones of the same `Arc`.
#[derive(Clone)]
pub struct Instance(Arc<dyn Any + Send + Sync>);

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self(Arc::new(value))
    }

    /// The wrapped `Arc<T>`, or `None` if this instance holds another type.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.0.downcast_ref::<Arc<T>>().cloned()
    }

    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.0.is::<Arc<T>>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Instance(..)")
    }
}

type FactoryFn = Arc<dyn Fn() -> Instance + Send + Sync>;
type AdaptFn = Arc<dyn Fn(Instance) -> Result<Instance, InjectError> + Send + Sync>;

/// Class to construct for a class provider, and how to present it.
#[derive(Clone)]
pub struct ClassBinding {
    class: TypeKey,
    adapt: Option<AdaptFn>,
}

impl ClassBinding {
    pub fn class(&self) -> &TypeKey {
        &self.class
    }

    /// Whether the constructed class is converted before being handed out.
    pub fn is_bound(&self) -> bool {
        self.adapt.is_some()
    }

    pub(crate) fn adapt(&self, instance: Instance) -> Result<Instance, InjectError> {
        match &self.adapt {
            Some(adapt) => adapt(instance),
            None => Ok(instance),
        }
    }
}

/// What a provider produces when its key is requested.
#[derive(Clone)]
pub enum ProviderSource {
    Value(Instance),
    /// Invoked once per resolution; nothing is cached.
    Factory(FactoryFn),
    /// Constructed through the catalog; the class must be injectable.
    Class(ClassBinding),
}

/// Declaration of how to satisfy requests for `provide`.
#[derive(Clone)]
pub struct Provider {
    provide: Key,
    source: ProviderSource,
}

impl Provider {
    /// Provide a fixed value. Every resolution returns the same `Arc`.
    pub fn value<T: Any + Send + Sync>(provide: impl Into<Key>, value: T) -> Self {
        Self::shared(provide, Arc::new(value))
    }

    /// Provide an already shared value, possibly a trait object.
    pub fn shared<T: ?Sized + Send + Sync + 'static>(
        provide: impl Into<Key>,
        value: Arc<T>,
    ) -> Self {
        Self {
            provide: provide.into(),
            source: ProviderSource::Value(Instance::new(value)),
        }
    }

    /// Provide the result of `factory`, called on every resolution.
    pub fn factory<T, F>(provide: impl Into<Key>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::shared_factory(provide, move || Arc::new(factory()))
    }

    /// Like [`Provider::factory`], for factories that already return an `Arc`.
    pub fn shared_factory<T, F>(provide: impl Into<Key>, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move || Instance::new(factory()));
        Self {
            provide: provide.into(),
            source: ProviderSource::Factory(factory),
        }
    }

    /// Provide by constructing `class`; the instance keeps the class's own type.
    /// Checked for injectability on registration.
    pub fn class(provide: impl Into<Key>, class: TypeKey) -> Self {
        Self {
            provide: provide.into(),
            source: ProviderSource::Class(ClassBinding { class, adapt: None }),
        }
    }

    pub fn use_class<C: Any>(provide: impl Into<Key>) -> Self {
        Self::class(provide, TypeKey::of::<C>())
    }

    /// Provide an `A` by constructing the class `C` and converting it with `coerce`.
    ///
    /// For trait objects the conversion is the unsizing coercion:
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wiring_core::{Key, Provider};
    ///
    /// trait Repo: Send + Sync {}
    /// struct PgRepo;
    /// impl Repo for PgRepo {}
    ///
    /// let provider = Provider::bind::<dyn Repo, PgRepo, _>(Key::of::<dyn Repo>(), |repo| repo);
    /// assert!(provider.is_class());
    /// ```
    pub fn bind<A, C, F>(provide: impl Into<Key>, coerce: F) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        C: Any + Send + Sync,
        F: Fn(Arc<C>) -> Arc<A> + Send + Sync + 'static,
    {
        let class = TypeKey::of::<C>();
        let adapt: AdaptFn = Arc::new(move |instance: Instance| {
            instance
                .downcast::<C>()
                .map(|built| Instance::new(coerce(built)))
                .ok_or_else(|| InjectError::type_mismatch::<C>(&Key::Type(class)))
        });
        Self {
            provide: provide.into(),
            source: ProviderSource::Class(ClassBinding {
                class,
                adapt: Some(adapt),
            }),
        }
    }

    pub fn provide(&self) -> &Key {
        &self.provide
    }

    pub fn source(&self) -> &ProviderSource {
        &self.source
    }

    pub fn is_value(&self) -> bool {
        matches!(self.source, ProviderSource::Value(_))
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.source, ProviderSource::Factory(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.source, ProviderSource::Class(_))
    }

    pub fn kind(&self) -> &'static str {
        match self.source {
            ProviderSource::Value(_) => "value",
            ProviderSource::Factory(_) => "factory",
            ProviderSource::Class(_) => "class",
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Provider");
        s.field("provide", &self.provide);
        match &self.source {
            ProviderSource::Class(binding) => s
                .field("use_class", &binding.class)
                .field("bound", &binding.is_bound()),
            _ => s.field("kind", &self.kind()),
        };
        s.finish()
    }
}
