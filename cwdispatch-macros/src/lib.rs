//! Procedural macros for cwdispatch.
//!
//! - `#[derive(DetailType)]` - binds a payload type to its source and
//!   detail-type patterns

use proc_macro::TokenStream;

mod detail_type;

/// Derive macro for implementing the `DetailType` trait.
///
/// ```rust,ignore
/// #[derive(Deserialize, DetailType)]
/// #[detail_type("EC2 Instance State-change Notification")]
/// struct StateChange { /* ... */ }
///
/// #[derive(Deserialize, DetailType)]
/// #[detail_type(name = "Object Created", source = "aws.s3")]
/// struct ObjectCreated { /* ... */ }
/// ```
///
/// Without `source`, the type matches events from every source.
#[proc_macro_derive(DetailType, attributes(detail_type))]
pub fn derive_detail_type(input: TokenStream) -> TokenStream {
    detail_type::derive_detail_type_impl(input)
}
