use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, Path};

struct DocumentArgs {
    collection: String,
    validate: Option<Path>,
}

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    let args = match parse_args(&input) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let collection = &args.collection;

    let validate = args.validate.map(|path| {
        quote! {
            fn validate(&self) -> ::std::result::Result<(), ::std::string::String> {
                #path(self)
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::procure_mockdb::Document for #name #ty_generics #where_clause {
            const COLLECTION: &'static str = #collection;

            #validate
        }
    };

    TokenStream::from(expanded)
}

fn parse_args(input: &DeriveInput) -> syn::Result<DocumentArgs> {
    let mut collection = None;
    let mut validate = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("collection name must not be empty"));
                }
                collection = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("validate") {
                let value: LitStr = meta.value()?.parse()?;
                validate = Some(value.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported document attribute"))
            }
        })?;
    }

    // Default: snake_case struct name + "s"
    let collection =
        collection.unwrap_or_else(|| format!("{}s", to_snake_case(&input.ident.to_string())));

    Ok(DocumentArgs {
        collection,
        validate,
    })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
