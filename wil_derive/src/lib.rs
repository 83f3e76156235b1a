//! Derive macros for the wil entity-component store.
//!
//! This crate provides procedural macros to reduce boilerplate when declaring
//! component types.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for the Component trait.
///
/// Implements `wil_ecs::Component` for the annotated type and records its
/// source name, which the registry uses in log lines and error messages.
/// Generic types are supported as long as every parameter is `'static`.
///
/// # Example
///
/// ```ignore
/// use wil_ecs::Component;
///
/// #[derive(Component)]
/// struct PointLight {
///     color: [f32; 3],
/// }
/// ```
///
/// This will expand to:
///
/// ```ignore
/// impl ::wil_ecs::Component for PointLight {
///     fn name() -> &'static str {
///         "PointLight"
///     }
/// }
/// ```
#[proc_macro_derive(Component)]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    TokenStream::from(expand_component(&input))
}

fn expand_component(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // The absolute path resolves inside wil_ecs too, which declares
    // `extern crate self as wil_ecs`.
    quote! {
        impl #impl_generics ::wil_ecs::Component for #name #ty_generics #where_clause {
            fn name() -> &'static str {
                #name_str
            }
        }
    }
}
