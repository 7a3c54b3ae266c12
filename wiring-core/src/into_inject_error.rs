//! Fallible constructors: a hand-written `Injectable::construct` that parses or
//! opens something can surface its failure as `InjectError::Construction`.

use crate::InjectError;

/// Wraps the display text of any error in `InjectError::Construction`.
///
/// ```
/// use wiring_core::{InjectError, IntoInjectError};
///
/// fn port(raw: &str) -> Result<u16, InjectError> {
///     raw.parse().map_err(IntoInjectError::into_inject_error)
/// }
///
/// assert!(matches!(port("http"), Err(InjectError::Construction(_))));
/// ```
pub trait IntoInjectError {
    fn into_inject_error(self) -> InjectError;
}

impl<E> IntoInjectError for E
where
    E: std::error::Error,
{
    fn into_inject_error(self) -> InjectError {
        InjectError::Construction(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_error_text() {
        let err = "x".parse::<u32>().unwrap_err().into_inject_error();
        assert_eq!(err.to_string(), "construction failed: invalid digit found in string");
    }
}
