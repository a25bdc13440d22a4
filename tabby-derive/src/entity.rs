use crate::fields::mapped_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, LitStr, Result};

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut model_name = name.to_string();
    let mut collection_name: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    model_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("collection") {
                    let s: LitStr = meta.value()?.parse()?;
                    collection_name = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown entity attribute, expected `name` or `collection`"))
                }
            })?;
        }
    }

    if model_name.is_empty() {
        return Err(syn::Error::new_spanned(ast, "entity name cannot be empty"));
    }

    let fields = mapped_fields(ast, data)?;
    let schema_fields: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .filter(|f| !f.skipped)
        .map(|f| {
            let key = f.key.as_str();
            let ty = f.ty;
            quote! { .field(#key, <#ty as tabby::common::Convertible>::field_type()) }
        })
        .collect();

    let collection_code = match collection_name {
        Some(collection) => quote! { Some(#collection.to_string()) },
        None => quote! { None },
    };

    let gen = quote! {
        impl #impl_generics tabby::model::Entity for #name #ty_generics #where_clause {
            fn model_name() -> String {
                #model_name.to_string()
            }

            fn collection_name() -> Option<String> {
                #collection_code
            }

            fn schema() -> tabby::errors::TabbyResult<tabby::schema::Schema> {
                tabby::schema::Schema::builder()
                    #(#schema_fields)*
                    .build()
            }
        }
    };

    Ok(TokenStream::from(gen))
}
