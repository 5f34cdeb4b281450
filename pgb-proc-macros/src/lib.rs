extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Ident};

/// Collect the variant names of a fieldless enum, or a compile error pointing at whatever is not
/// a fieldless enum variant.
fn fieldless_variants<'a>(ast: &'a DeriveInput, macro_name: &str) -> syn::Result<Vec<&'a Ident>> {
    let name = &ast.ident;

    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            name,
            format!("{macro_name} can only be derived for enums; {name} is not an enum"),
        ));
    };

    data.variants
        .iter()
        .map(|variant| {
            if variant.fields.is_empty() {
                Ok(&variant.ident)
            } else {
                Err(syn::Error::new_spanned(
                    variant,
                    format!(
                        "{macro_name} only supports fieldless variants; {name}::{} has fields",
                        variant.ident
                    ),
                ))
            }
        })
        .collect()
}

/// Implement `std::fmt::Display` for a fieldless enum, writing each variant's name.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let variants = match fieldless_variants(&ast, "EnumDisplay") {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error().into(),
    };

    let name = &ast.ident;
    let variant_strs = variants.iter().map(ToString::to_string);

    let gen = quote! {
        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = match self {
                    #(Self::#variants => #variant_strs,)*
                };
                f.write_str(s)
            }
        }
    };

    gen.into()
}

/// Implement `std::str::FromStr` for a fieldless enum, matching variant names case-insensitively.
/// `FromStr::Err` is `String`.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let variants = match fieldless_variants(&ast, "EnumFromStr") {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error().into(),
    };

    let name = &ast.ident;
    let lowercase_strs = variants.iter().map(|variant| variant.to_string().to_ascii_lowercase());
    let err_fmt_string = format!("invalid {name} string: '{{}}'");

    let gen = quote! {
        impl std::str::FromStr for #name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    #(#lowercase_strs => Ok(Self::#variants),)*
                    _ => Err(format!(#err_fmt_string, s)),
                }
            }
        }
    };

    gen.into()
}

/// Implement `serde::Serialize` by serializing the `Display` string.
#[proc_macro_derive(StrSerialize)]
pub fn str_serialize(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);
    let ident = &ast.ident;

    let gen = quote! {
        impl serde::Serialize for #ident {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }
    };

    gen.into()
}

/// Implement `serde::Deserialize` by parsing a string through `FromStr`.
#[proc_macro_derive(StrDeserialize)]
pub fn str_deserialize(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);
    let ident = &ast.ident;

    let visitor_name = format_ident!("{}StrVisitor", ident);
    let expecting = format!("a string naming a {ident}");

    // The visitor lives inside an anonymous const so it cannot collide with user items
    let gen = quote! {
        const _: () = {
            struct #visitor_name;

            impl<'de> serde::de::Visitor<'de> for #visitor_name {
                type Value = #ident;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str(#expecting)
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    v.parse().map_err(E::custom)
                }
            }

            impl<'de> serde::Deserialize<'de> for #ident {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    deserializer.deserialize_str(#visitor_name)
                }
            }
        };
    };

    gen.into()
}
