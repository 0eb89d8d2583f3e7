use proc_macro2::{Span, TokenStream};
use proc_macro_error::{abort, abort_call_site};
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident};

pub fn derive_opcode(input: DeriveInput) -> TokenStream {
    let data = match input.data {
        Data::Enum(data) => data,
        _ => abort_call_site!("#[derive(Opcode)] only supports enums"),
    };
    if !input.generics.params.is_empty() {
        abort!(input.generics.params, "generics are not allowed");
    }

    let vis = &input.vis;
    let name = &input.ident;
    let opcode_name = if name == "Inst" {
        Ident::new("Opcode", Span::call_site())
    } else {
        Ident::new(&format!("{name}Opcode"), Span::call_site())
    };
    let opcode_doc = format!("Opcode for [`{name}`], without its operand.");
    let len = data.variants.len();

    let mut variants = Vec::with_capacity(len);
    let mut opcode_arms = Vec::with_capacity(len);
    let mut arg_variants = Vec::new();
    for variant in &data.variants {
        let ident = &variant.ident;
        let params = match &variant.fields {
            Fields::Unit => quote! {},
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                arg_variants.push(ident);
                quote! { (_) }
            }
            fields => abort!(fields, "only unit variants and variants with one operand are supported"),
        };
        opcode_arms.push(quote! { #name::#ident #params => #opcode_name::#ident });
        variants.push(ident);
    }

    let has_arg = if arg_variants.is_empty() {
        quote! { false }
    } else {
        quote! { matches!(self, #(#opcode_name::#arg_variants)|*) }
    };

    quote! {
        #[doc = #opcode_doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::strum::Display)]
        #[strum(serialize_all = "snake_case")]
        #vis enum #opcode_name {
            #(#variants),*
        }

        impl #opcode_name {
            /// Every opcode, in declaration order.
            #vis const ALL: [#opcode_name; #len] = [#(#opcode_name::#variants),*];

            /// Whether the instruction is followed by a number or label
            /// operand.
            #[inline]
            #vis const fn has_arg(self) -> bool {
                #has_arg
            }
        }

        impl #name {
            #[inline]
            #vis fn opcode(&self) -> #opcode_name {
                match self {
                    #(#opcode_arms),*
                }
            }
        }
    }
}
