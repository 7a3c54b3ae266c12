//! Container behaviour with `#[derive(Injectable)]` types discovered through the catalog.

use std::sync::{Arc, LazyLock};

use rstest::rstest;
use wiring_rs::prelude::*;
use wiring_rs::TypeKey;

#[derive(Debug, PartialEq)]
struct BasicClass {
    x: u32,
}

#[derive(Injectable)]
struct InjectableClass {
    basic_class: Arc<BasicClass>,
}

#[derive(Injectable)]
struct ACircularClass {
    _other: Arc<BCircularClass>,
}

#[derive(Injectable)]
struct BCircularClass {
    _other: Arc<ACircularClass>,
}

#[derive(Debug, PartialEq, Injectable)]
struct AnotherBasicClass;

trait HasX: Send + Sync {
    fn x(&self) -> u32;
}

impl HasX for BasicClass {
    fn x(&self) -> u32 {
        self.x
    }
}

impl HasX for AnotherBasicClass {
    fn x(&self) -> u32 {
        10
    }
}

#[derive(Injectable)]
struct TokenOverrideClass {
    #[inject(AnotherBasicClass)]
    basic_class: Arc<dyn HasX>,
}

trait Repo: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Injectable)]
struct PgRepo;

impl Repo for PgRepo {
    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Injectable)]
struct MemoryRepo;

impl Repo for MemoryRepo {
    fn name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Injectable)]
struct OrderService {
    repo: Arc<dyn Repo>,
}

#[derive(Injectable)]
struct AuditService {
    #[inject(MemoryRepo)]
    repo: Arc<dyn Repo>,
    orders: Arc<OrderService>,
}

static SPECIAL_STRING_TOKEN: LazyLock<InjectionToken<String>> =
    LazyLock::new(|| InjectionToken::new("some-identifer"));

#[derive(Injectable)]
struct TokenStringOverrideClass {
    #[inject(token = SPECIAL_STRING_TOKEN)]
    some_value: Arc<String>,
}

trait SomeInterface: Send + Sync {}

struct InterfaceHolder;

impl Injectable for InterfaceHolder {
    fn parameters() -> Vec<wiring_rs::Parameter> {
        vec![wiring_rs::Parameter::of::<dyn SomeInterface>()]
    }

    fn construct(_args: wiring_rs::Arguments) -> Result<Self, InjectError> {
        Ok(Self)
    }
}

#[derive(Injectable)]
struct Pair(Arc<BasicClass>, #[inject(token = SPECIAL_STRING_TOKEN)] Arc<String>);

#[derive(Injectable)]
struct Nested {
    inner: Arc<InjectableClass>,
    pair: Arc<Pair>,
}

#[test]
fn injects_using_a_value_provider() {
    let mut container = Container::new();
    let input = Arc::new(BasicClass { x: 200 });
    container
        .add_provider(Provider::shared(Key::of::<BasicClass>(), Arc::clone(&input)))
        .unwrap();
    let output = container.inject::<BasicClass>().unwrap();
    assert!(Arc::ptr_eq(&input, &output));
}

#[test]
fn injects_using_a_factory_provider() {
    let mut container = Container::new();
    let input = Arc::new(BasicClass { x: 200 });
    let shared = Arc::clone(&input);
    container
        .add_provider(Provider::shared_factory(Key::of::<BasicClass>(), move || {
            Arc::clone(&shared)
        }))
        .unwrap();
    assert!(Arc::ptr_eq(&container.inject::<BasicClass>().unwrap(), &input));
}

#[test]
fn injects_using_a_class_provider() {
    let mut container = Container::new();
    let basic = Arc::new(BasicClass { x: 200 });
    container
        .add_provider(Provider::shared(Key::of::<BasicClass>(), Arc::clone(&basic)))
        .unwrap();
    container
        .add_provider(Provider::use_class::<InjectableClass>(Key::of::<InjectableClass>()))
        .unwrap();
    let injected = container.inject::<InjectableClass>().unwrap();
    assert!(Arc::ptr_eq(&injected.basic_class, &basic));
}

#[test]
fn defaults_to_a_class_provider_for_injectable_types() {
    let mut container = Container::new();
    container
        .add_provider(Provider::value(Key::of::<BasicClass>(), BasicClass { x: 200 }))
        .unwrap();
    let injected = container.inject::<InjectableClass>().unwrap();
    assert_eq!(*injected.basic_class, BasicClass { x: 200 });
}

#[test]
fn detects_circular_dependencies() {
    let mut container = Container::new();
    container
        .add_provider(Provider::use_class::<ACircularClass>(Key::of::<ACircularClass>()))
        .unwrap();
    container
        .add_provider(Provider::use_class::<BCircularClass>(Key::of::<BCircularClass>()))
        .unwrap();
    let err = container.inject::<ACircularClass>().err().unwrap();
    assert_eq!(
        err.to_string(),
        "Injection error. Recursive dependency detected in constructor for type ACircularClass with parameter at index 0"
    );
}

#[test]
fn rejects_class_provider_for_non_injectable_class() {
    let mut container = Container::new();
    let err = container
        .add_provider(Provider::use_class::<BasicClass>(Key::of::<BasicClass>()))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot provide BasicClass using class BasicClass, BasicClass isn't injectable"
    );
    assert!(container.is_empty());
}

#[test]
fn injects_a_class_provider_with_an_override() {
    let mut container = Container::new();
    container
        .add_provider(Provider::use_class::<AnotherBasicClass>(Key::of::<AnotherBasicClass>()))
        .unwrap();
    container
        .add_provider(Provider::value(Key::of::<BasicClass>(), BasicClass { x: 200 }))
        .unwrap();
    container
        .add_provider(Provider::use_class::<TokenOverrideClass>(Key::of::<TokenOverrideClass>()))
        .unwrap();
    let output = container.inject::<TokenOverrideClass>().unwrap();
    assert_eq!(output.basic_class.x(), 10);
}

#[test]
fn injects_a_token_value_through_an_override() {
    let mut container = Container::new();
    container
        .add_provider(Provider::use_class::<TokenStringOverrideClass>(
            Key::of::<TokenStringOverrideClass>(),
        ))
        .unwrap();
    container
        .add_provider(Provider::value(
            &*SPECIAL_STRING_TOKEN,
            String::from("the special value"),
        ))
        .unwrap();
    let output = container.inject::<TokenStringOverrideClass>().unwrap();
    assert_eq!(output.some_value.as_str(), "the special value");
}

#[test]
fn fails_when_a_token_has_no_value() {
    let mut container = Container::new();
    container
        .add_provider(Provider::use_class::<TokenStringOverrideClass>(
            Key::of::<TokenStringOverrideClass>(),
        ))
        .unwrap();
    let err = container.inject::<TokenStringOverrideClass>().err().unwrap();
    assert_eq!(err.to_string(), "No provider for type some-identifer");
}

#[test]
fn fails_to_inject_an_interface() {
    let mut container = Container::new();
    container.register_injectable::<InterfaceHolder>();
    let err = container.inject::<InterfaceHolder>().err().unwrap();
    assert_eq!(err.to_string(), "No provider for type dyn SomeInterface");
}

#[test]
fn tuple_structs_resolve_positionally() {
    let mut container = Container::new();
    container
        .add_provider(Provider::value(Key::of::<BasicClass>(), BasicClass { x: 5 }))
        .unwrap();
    container
        .add_provider(Provider::value(&*SPECIAL_STRING_TOKEN, String::from("five")))
        .unwrap();
    let nested = container.inject::<Nested>().unwrap();
    assert_eq!(nested.inner.basic_class.x, 5);
    assert_eq!(nested.pair.0.x, 5);
    assert_eq!(nested.pair.1.as_str(), "five");
}

#[rstest]
#[case::injectable_class(TypeKey::of::<InjectableClass>(), true)]
#[case::unit_struct(TypeKey::of::<AnotherBasicClass>(), true)]
#[case::tuple_struct(TypeKey::of::<Pair>(), true)]
#[case::plain_struct(TypeKey::of::<BasicClass>(), false)]
#[case::hand_written_impl(TypeKey::of::<InterfaceHolder>(), false)]
fn derived_types_are_discovered(#[case] class: TypeKey, #[case] injectable: bool) {
    assert_eq!(Container::new().is_injectable(&class), injectable);
}

#[test]
fn derived_parameters_follow_declaration_order() {
    let parameters = <Pair as Injectable>::parameters();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].effective_key(), &Key::of::<BasicClass>());
    assert_eq!(parameters[1].declared(), &Key::of::<String>());
    assert_eq!(parameters[1].effective_key(), &SPECIAL_STRING_TOKEN.key());
}

struct AppModule {
    x: u32,
}

impl Module for AppModule {
    fn register_into(&self, container: &mut Container) -> Result<(), InjectError> {
        container.add_provider(Provider::value(Key::of::<BasicClass>(), BasicClass { x: self.x }))?;
        container.add_provider(Provider::use_class::<InjectableClass>(Key::of::<InjectableClass>()))
    }
}

#[test]
fn modules_register_providers() {
    let mut container = Container::new();
    container.register(&AppModule { x: 42 }).unwrap();
    assert_eq!(container.inject::<InjectableClass>().unwrap().basic_class.x, 42);
}

#[test]
fn bound_implementation_fills_abstract_fields() {
    let mut container = Container::new();
    container
        .add_provider(Provider::bind::<dyn Repo, PgRepo, _>(Key::of::<dyn Repo>(), |repo| repo))
        .unwrap();
    assert_eq!(container.inject::<dyn Repo>().unwrap().name(), "postgres");
    let service = container.inject::<OrderService>().unwrap();
    assert_eq!(service.repo.name(), "postgres");
}

#[test]
fn type_override_coerces_into_abstract_field() {
    let mut container = Container::new();
    container
        .add_provider(Provider::bind::<dyn Repo, PgRepo, _>(Key::of::<dyn Repo>(), |repo| repo))
        .unwrap();
    let audit = container.inject::<AuditService>().unwrap();
    assert_eq!(audit.repo.name(), "memory");
    assert_eq!(audit.orders.repo.name(), "postgres");
}

#[test]
fn rebinding_switches_the_implementation() {
    let mut container = Container::new();
    container
        .add_provider(Provider::bind::<dyn Repo, PgRepo, _>(Key::of::<dyn Repo>(), |repo| repo))
        .unwrap();
    container
        .add_provider(Provider::bind::<dyn Repo, MemoryRepo, _>(Key::of::<dyn Repo>(), |repo| {
            repo
        }))
        .unwrap();
    assert_eq!(container.inject::<OrderService>().unwrap().repo.name(), "memory");
}

#[test]
fn abstract_field_without_binding_fails() {
    let container = Container::new();
    let err = container.inject::<OrderService>().err().unwrap();
    assert_eq!(err.to_string(), "No provider for type dyn Repo");
}

#[test]
fn bound_substitute_for_a_concrete_type() {
    let mut container = Container::new();
    container
        .add_provider(Provider::bind::<BasicClass, AnotherBasicClass, _>(
            Key::of::<BasicClass>(),
            |another| Arc::new(BasicClass { x: another.x() }),
        ))
        .unwrap();
    assert_eq!(*container.inject::<BasicClass>().unwrap(), BasicClass { x: 10 });
    assert_eq!(container.inject::<InjectableClass>().unwrap().basic_class.x, 10);
}
