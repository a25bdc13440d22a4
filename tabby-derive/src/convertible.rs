use crate::fields::mapped_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Result};

pub(crate) fn generate_convertible_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let fields = mapped_fields(ast, data)?;

    let stored: Vec<_> = fields.iter().filter(|f| !f.skipped).collect();
    let stored_idents: Vec<_> = stored.iter().map(|f| f.ident).collect();
    let stored_keys: Vec<_> = stored.iter().map(|f| f.key.as_str()).collect();

    // skipped fields come back as their default, null fields are left out on encode
    let initializers: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .map(|f| {
            let ident = f.ident;
            let ty = f.ty;
            let key = f.key.as_str();
            if f.skipped {
                quote! { #ident: ::core::default::Default::default() }
            } else {
                quote! { #ident: tabby::common::from_value_or_default::<#ty>(&doc.get(#key)?)? }
            }
        })
        .collect();

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics tabby::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> tabby::errors::TabbyResult<tabby::common::Value> {
                let mut doc = tabby::collection::Document::new();
                #(
                    let value = tabby::common::Convertible::to_value(&self.#stored_idents)?;
                    if !value.is_null() {
                        doc.put(#stored_keys, value)?;
                    }
                )*
                Ok(tabby::common::Value::Document(doc))
            }

            fn from_value(value: &tabby::common::Value) -> tabby::errors::TabbyResult<Self::Output> {
                match value {
                    tabby::common::Value::Document(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => Err(tabby::errors::TabbyError::new(
                        &format!("Value of type {} is not a {} document", value.type_name(), #type_name),
                        tabby::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }

            fn field_type() -> tabby::schema::FieldType {
                tabby::schema::FieldType::Document
            }
        }
    };

    Ok(TokenStream::from(gen))
}
