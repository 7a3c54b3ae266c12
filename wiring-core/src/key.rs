//! Resolution keys: a Rust type or an opaque injection token.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Key for a Rust type. Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name without module paths, used in error messages.
    pub fn display_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Opaque symbolic key. Each token gets its own identity; the label is only for messages.
#[derive(Clone)]
pub struct TokenKey {
    id: u64,
    label: Arc<str>,
}

impl TokenKey {
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for TokenKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenKey {}

impl Hash for TokenKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenKey(#{}, {:?})", self.id, self.label)
    }
}

/// Registry lookup key.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Type(TypeKey),
    Token(TokenKey),
}

impl Key {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key::Type(TypeKey::of::<T>())
    }

    /// Short type name for type keys, the label for token keys.
    pub fn display_name(&self) -> String {
        match self {
            Key::Type(t) => t.display_name(),
            Key::Token(t) => t.label().to_owned(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(t) => fmt::Display::fmt(t, f),
            Key::Token(t) => f.write_str(t.label()),
        }
    }
}

impl From<TypeKey> for Key {
    fn from(key: TypeKey) -> Self {
        Key::Type(key)
    }
}

impl From<TokenKey> for Key {
    fn from(key: TokenKey) -> Self {
        Key::Token(key)
    }
}

/// Typed injection token: resolving it yields `Arc<T>`.
///
/// ```
/// use std::sync::LazyLock;
/// use wiring_core::InjectionToken;
///
/// static DATABASE_URL: LazyLock<InjectionToken<String>> =
///     LazyLock::new(|| InjectionToken::new("database-url"));
///
/// assert_eq!(DATABASE_URL.key().display_name(), "database-url");
/// ```
pub struct InjectionToken<T: ?Sized> {
    token: TokenKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> InjectionToken<T> {
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            token: TokenKey::new(label),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        Key::Token(self.token.clone())
    }

    pub fn label(&self) -> &str {
        self.token.label()
    }
}

impl<T: ?Sized> Clone for InjectionToken<T> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for InjectionToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InjectionToken({:?})", self.token.label())
    }
}

impl<T: ?Sized> From<&InjectionToken<T>> for Key {
    fn from(token: &InjectionToken<T>) -> Self {
        token.key()
    }
}

/// Strip module paths from a `type_name` string, keeping generics and `dyn`/`&` markers.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    // Start of the path segment currently being written to `out`.
    let mut segment_start = 0;
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("::") {
            out.truncate(segment_start);
            rest = &rest[2..];
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}
