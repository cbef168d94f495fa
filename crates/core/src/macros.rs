// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`pattern!`] — build a `CommandPattern` from mixed literal/wildcard items
//! - [`setters!`] — setter methods for production builder/config structs

/// Build a [`CommandPattern`](crate::CommandPattern) from heterogeneous items.
///
/// Every item is converted with `Matcher::from`, so string literals, paths,
/// [`Any`](crate::Any) wildcards and prebuilt matchers can be mixed.
///
/// ```ignore
/// let p = fakeproc_core::pattern!["cp", Any::new().min(2)];
/// let q = fakeproc_core::pattern![Matcher::program("ls"), Any::new()];
/// ```
#[macro_export]
macro_rules! pattern {
    ($($item:expr),* $(,)?) => {
        $crate::CommandPattern::new(::std::vec![$($crate::Matcher::from($item)),*])
    };
}

/// Generate setter methods inside an existing `impl` block.
///
/// Field groups:
/// - `into { field: Type }` — setter uses `impl Into<Type>`
/// - `set { field: Type }` — setter takes `Type` directly
/// - `option { field: Type }` — field is `Option<Type>`, setter wraps in `Some(v.into())`
///
/// ```ignore
/// impl SpawnOptions {
///     fakeproc_core::setters! {
///         set { text: bool }
///         option { cwd: PathBuf }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into {
            $( $into_field:ident : $into_ty:ty ),* $(,)?
        })?
        $(set {
            $( $set_field:ident : $set_ty:ty ),* $(,)?
        })?
        $(option {
            $( $opt_field:ident : $opt_ty:ty ),* $(,)?
        })?
    ) => {
        $($(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*)?

        $($(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*)?

        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?
    };
}
