//! Macros for conversion error handling.
//!
//! Provides convenience macros for creating and returning
//! [`crate::error::ScandocError`] instances with reduced boilerplate.

/// Creates a [`crate::error::ScandocError`] from error kind and description.
///
/// Supports an optional dynamic detail (any `Display` value, or `detail =` to
/// move an owned [`String`]) and an optional source error.
#[macro_export]
macro_rules! scandoc_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::ScandocError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::ScandocError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        $crate::error::ScandocError::from(($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr, source: $source:expr) => {
        $crate::error::ScandocError::from(($kind, $desc, $detail)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::ScandocError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::ScandocError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Creates and returns a [`crate::error::ScandocError`] from the current function.
///
/// Combines error creation with early return. Supports the same optional
/// detail and source arguments as [`scandoc_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::scandoc_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::scandoc_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        return ::core::result::Result::Err($crate::scandoc_error!($kind, $desc, detail = $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::scandoc_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::scandoc_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
