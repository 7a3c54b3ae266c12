//! Common imports: `use wiring_rs::prelude::*;`.

pub use crate::{
    Container, InjectError, Injectable, InjectionToken, IntoInjectError, Key, Module, Provider,
};
