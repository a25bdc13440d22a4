//! # Tabby Derive Macros
//!
//! Procedural macros that generate the document mapping and the schema of a
//! record struct.
//!
//! - `Convertible` maps a struct with named fields to and from a document.
//!   Fields missing from a document decode to their `Default`, and fields
//!   encoding to null (`None`) are left out of the document. Declare fields
//!   that may be absent as `Option`.
//! - `Entity` names the model, optionally its collection, and builds the
//!   schema from the field types. Use it together with `Convertible` and
//!   `Default`.
//!
//! Field attribute `#[field(name = "...")]` renames the document key and
//! `#[field(skip)]` leaves a field out of the document and the schema.
//!
//! ```rust,ignore
//! use tabby_derive::{Convertible, Entity};
//!
//! #[derive(Default, Convertible, Entity)]
//! #[entity(name = "Cat")]
//! pub struct Cat {
//!     pub name: Option<String>,
//!     pub owner: Option<String>,
//!     pub age: Option<f64>,
//!     #[field(name = "favoriteFoods")]
//!     pub favorite_foods: Vec<String>,
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod entity;
mod fields;

use crate::convertible::generate_convertible_for_struct;
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `tabby::common::Convertible` for a struct with named fields.
#[proc_macro_derive(Convertible, attributes(field))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_convertible_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => e.to_compile_error().into(),
        },
        _ => syn::Error::new_spanned(
            &ast,
            "Convertible can only be derived for structs with named fields",
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `tabby::model::Entity` for a struct with named fields.
///
/// `#[entity(name = "Cat")]` sets the model name (the struct name by
/// default) and `#[entity(collection = "...")]` overrides the pluralized
/// collection name.
#[proc_macro_derive(Entity, attributes(entity, field))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!("Failed to derive Entity for struct '{}': {}", ast.ident, e),
                );
                error.to_compile_error().into()
            }
        },
        _ => syn::Error::new_spanned(&ast, "Entity can only be derived for structs")
            .to_compile_error()
            .into(),
    }
}
