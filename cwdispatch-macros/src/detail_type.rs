//! `#[derive(DetailType)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of `#[detail_type(...)]`.
struct DetailTypeArgs {
    name: LitStr,
    source: Option<LitStr>,
}

impl Parse for DetailTypeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut source = None;

        if input.peek(LitStr) {
            name = Some(input.parse::<LitStr>()?);
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let lit: LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "name" if name.is_none() => name = Some(lit),
                "source" if source.is_none() => source = Some(lit),
                "name" | "source" => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("`{ident}` is given more than once"),
                    ));
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {other}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let name = name.ok_or_else(|| input.error("missing detail-type name"))?;
        check_pattern(&name)?;
        if let Some(source) = &source {
            check_pattern(source)?;
        }

        Ok(DetailTypeArgs { name, source })
    }
}

/// Reject patterns the registry would refuse at startup.
fn check_pattern(lit: &LitStr) -> syn::Result<()> {
    let value = lit.value();
    if value.is_empty() {
        return Err(syn::Error::new(lit.span(), "pattern is empty"));
    }
    match value.find('*') {
        Some(at) if at != value.len() - 1 => Err(syn::Error::new(
            lit.span(),
            "`*` is only allowed once, as the last character",
        )),
        _ => Ok(()),
    }
}

/// Implementation of `#[derive(DetailType)]`.
pub fn derive_detail_type_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attr = input
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("detail_type"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                name,
                format!("`{name}` needs `#[detail_type(\"...\")]` to derive `DetailType`"),
            )
        })?;
    let args = attr.parse_args::<DetailTypeArgs>()?;

    let detail_type = &args.name;
    let source = args.source.as_ref().map(|source| {
        quote! {
            const SOURCE: &'static str = #source;
        }
    });

    Ok(quote! {
        impl #impl_generics ::cwdispatch::DetailType for #name #ty_generics #where_clause {
            #source
            const DETAIL_TYPE: &'static str = #detail_type;
        }
    })
}
