//! Derive macros for `reqbind`.
//!
//! `#[derive(Record)]` lists the public fields of a struct together with
//! their `#[bind("...")]` tags, so the decoder can walk them without any
//! runtime type inspection.

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Visibility, parse_macro_input};

const ORIGINS: [&str; 4] = ["path", "query", "body", "header"];

#[proc_macro_derive(Record, attributes(bind))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct ContainerAttrs {
    rename_all: Option<Rename>,
    text: bool,
}

#[derive(Clone, Copy)]
enum Rename {
    Lower,
    Upper,
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl Rename {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        let rename = match lit.value().as_str() {
            "lowercase" => Rename::Lower,
            "UPPERCASE" => Rename::Upper,
            "camelCase" => Rename::Camel,
            "PascalCase" => Rename::Pascal,
            "snake_case" => Rename::Snake,
            "SCREAMING_SNAKE_CASE" => Rename::ScreamingSnake,
            "kebab-case" => Rename::Kebab,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!("unsupported `rename_all` value `{other}`"),
                ));
            }
        };
        Ok(rename)
    }

    fn apply(self, ident: &str) -> String {
        match self {
            Rename::Lower => ident.to_lowercase(),
            Rename::Upper => ident.to_uppercase(),
            Rename::Camel => ident.to_case(Case::Camel),
            Rename::Pascal => ident.to_case(Case::Pascal),
            Rename::Snake => ident.to_case(Case::Snake),
            Rename::ScreamingSnake => ident.to_case(Case::Snake).to_uppercase(),
            Rename::Kebab => ident.to_case(Case::Kebab),
        }
    }
}

fn container_attrs(input: &DeriveInput) -> syn::Result<ContainerAttrs> {
    let mut attrs = ContainerAttrs::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("text") {
                attrs.text = true;
                Ok(())
            } else if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.rename_all = Some(Rename::from_lit(&lit)?);
                Ok(())
            } else {
                Err(meta.error("expected `text` or `rename_all = \"...\"`"))
            }
        })?;
    }
    Ok(attrs)
}

/// The `#[bind("...")]` tag of a field, if any.
fn field_tag(field: &syn::Field) -> syn::Result<Option<LitStr>> {
    let mut tag = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        if tag.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate `bind` attribute"));
        }
        tag = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(tag)
}

/// Whether the last origin token of `tag` is `body`.
fn is_body(tag: &str) -> bool {
    tag.split(',')
        .skip(1)
        .map(str::trim)
        .filter(|token| ORIGINS.contains(token))
        .last()
        == Some("body")
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let attrs = container_attrs(input)?;

    if attrs.text {
        return Ok(quote! {
            #[automatically_derived]
            impl #impl_generics ::reqbind::Bindable for #name #ty_generics #where_clause {
                fn slot(&mut self) -> ::reqbind::Slot<'_> {
                    ::reqbind::Slot::Text(self)
                }
            }
        });
    }

    let unsupported = "`Record` can only be derived for structs with named fields. \
        Use `#[bind(text)]` for types implementing `TextDecode`.";
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, unsupported));
    };
    let fields: Vec<&syn::Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => return Err(syn::Error::new_spanned(name, unsupported)),
    };

    let mut entries = Vec::new();
    for field in fields {
        let tag = field_tag(field)?;
        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }

        let Some(member) = &field.ident else {
            continue;
        };
        let raw = member.to_string();
        let ident = raw.strip_prefix("r#").unwrap_or(&raw).to_string();

        let mut tag_value = tag.as_ref().map(LitStr::value).unwrap_or_default();
        let tag_name = tag_value.split(',').next().unwrap_or_default().trim();
        if tag_name == "-" {
            continue;
        }
        if tag_name.is_empty() {
            if let Some(rename) = attrs.rename_all {
                tag_value = format!("{}{}", rename.apply(&ident), tag_value.trim_start());
            }
        }

        let constructor = if is_body(&tag_value) {
            quote!(body)
        } else {
            quote!(value)
        };
        entries.push(quote! {
            ::reqbind::FieldRef::#constructor(#ident, #tag_value, &mut self.#member)
        });
    }

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::reqbind::Record for #name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::reqbind::FieldRef<'_>> {
                ::std::vec![#(#entries),*]
            }
        }

        #[automatically_derived]
        impl #impl_generics ::reqbind::Bindable for #name #ty_generics #where_clause {
            fn slot(&mut self) -> ::reqbind::Slot<'_> {
                ::reqbind::Slot::Record(self)
            }
        }
    })
}
