//! Module: a group of provider registrations applied to a container in one call.

use crate::container::Container;
use crate::InjectError;

/// Registers related providers into a container.
pub trait Module {
    fn register_into(&self, container: &mut Container) -> Result<(), InjectError>;
}

impl<F> Module for F
where
    F: Fn(&mut Container) -> Result<(), InjectError>,
{
    fn register_into(&self, container: &mut Container) -> Result<(), InjectError> {
        self(container)
    }
}
