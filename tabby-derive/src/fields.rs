use syn::{DataStruct, DeriveInput, Fields, Ident, LitStr, Result, Type};

/// A struct field as seen by the document mapping.
pub(crate) struct MappedField<'a> {
    pub(crate) ident: &'a Ident,
    pub(crate) ty: &'a Type,
    /// Document key, the field name unless renamed with `#[field(name = "...")]`.
    pub(crate) key: String,
    pub(crate) skipped: bool,
}

pub(crate) fn mapped_fields<'a>(
    ast: &'a DeriveInput,
    data: &'a DataStruct,
) -> Result<Vec<MappedField<'a>>> {
    let named = match &data.fields {
        Fields::Named(fields) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "only structs with named fields are supported",
            ))
        }
    };

    let mut mapped = Vec::with_capacity(named.len());
    for field in named {
        // named fields always carry an ident
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let mut key = ident.to_string();
        let mut skipped = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("field") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    key = s.value();
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skipped = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown field attribute, expected `name` or `skip`"))
                }
            })?;
        }

        if !skipped && (key.is_empty() || key == "_id" || key.starts_with('$') || key.contains('.')) {
            return Err(syn::Error::new_spanned(
                field,
                format!("'{}' cannot be used as a document key", key),
            ));
        }
        if !skipped && mapped.iter().any(|f: &MappedField| !f.skipped && f.key == key) {
            return Err(syn::Error::new_spanned(
                field,
                format!("document key '{}' is used twice", key),
            ));
        }

        mapped.push(MappedField {
            ident,
            ty: &field.ty,
            key,
            skipped,
        });
    }
    Ok(mapped)
}
