use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;
use syn::{
    parse_macro_input, AttributeArgs, FnArg, Ident, ItemFn, Lit, LitStr, Meta, NestedMeta, Pat,
    Type,
};

/// Resolve the host crate path (equivalent to `$crate`).
fn host_crate() -> proc_macro2::TokenStream {
    match crate_name("research-agent") {
        Ok(FoundCrate::Itself) => quote!(crate),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::research_agent),
    }
}

#[derive(Default)]
struct ToolAttrs {
    name: Option<String>,
    description: Option<String>,
    params: Vec<(String, String)>,
}

struct ToolParam {
    ident: Ident,
    ty: Type,
}

fn parse_attrs(args: AttributeArgs) -> ToolAttrs {
    let mut attrs = ToolAttrs::default();
    for nested in args {
        match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) => {
                let (Some(ident), Lit::Str(s)) = (nv.path.get_ident(), nv.lit) else {
                    continue;
                };
                match ident.to_string().as_str() {
                    "name" => attrs.name = Some(s.value()),
                    "description" => attrs.description = Some(s.value()),
                    _ => {}
                }
            }
            NestedMeta::Meta(Meta::List(list)) if list.path.is_ident("params") => {
                for nm in list.nested {
                    if let NestedMeta::Meta(Meta::NameValue(nv)) = nm {
                        if let (Some(ident), Lit::Str(s)) = (nv.path.get_ident(), &nv.lit) {
                            attrs.params.push((ident.to_string(), s.value()));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    attrs
}

/// Generate a `Tool` implementation from a plain function.
///
/// ```ignore
/// #[tool(name = "word_count", description = "...", params(text = "input text"))]
/// fn count_words(text: String) -> usize { ... }
/// ```
///
/// The function becomes `CountWordsTool`. Every parameter is required and
/// the return value is rendered with `to_string()`.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input_fn = parse_macro_input!(item as ItemFn);
    let attrs = parse_attrs(args);

    let Some(description) = attrs.description else {
        return syn::Error::new_spanned(
            &input_fn.sig.ident,
            "tool requires `description = \"...\"`",
        )
        .to_compile_error()
        .into();
    };

    let fn_ident = input_fn.sig.ident.clone();
    let fn_name = fn_ident.to_string();
    let tool_name = attrs.name.unwrap_or_else(|| fn_name.clone());

    let mut params = Vec::new();
    for arg in &input_fn.sig.inputs {
        match arg {
            FnArg::Typed(pt) => {
                let Pat::Ident(pi) = &*pt.pat else {
                    return syn::Error::new_spanned(&pt.pat, "only simple identifiers are supported")
                        .to_compile_error()
                        .into();
                };
                params.push(ToolParam {
                    ident: pi.ident.clone(),
                    ty: (*pt.ty).clone(),
                });
            }
            FnArg::Receiver(_) => {
                return syn::Error::new_spanned(arg, "methods with self are not supported")
                    .to_compile_error()
                    .into();
            }
        }
    }

    for (k, _) in &attrs.params {
        if !params.iter().any(|p| p.ident == k.as_str()) {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                format!("param '{}' not found in function signature", k),
            )
            .to_compile_error()
            .into();
        }
    }

    let params_struct_ident =
        Ident::new(&format!("{}Params", pascal_case(&fn_name)), fn_ident.span());
    let tool_struct_ident = Ident::new(&format!("{}Tool", pascal_case(&fn_name)), fn_ident.span());

    let host = host_crate();

    let field_defs = params.iter().map(|p| {
        let ident = &p.ident;
        let ty = &p.ty;
        quote!(pub #ident: #ty)
    });

    let args_entries = params.iter().map(|p| {
        let ident = &p.ident;
        let Some(desc) = attrs
            .params
            .iter()
            .find(|(k, _)| p.ident == k.as_str())
            .map(|(_, v)| v.clone())
            .filter(|d| !d.is_empty())
        else {
            return syn::Error::new_spanned(
                ident,
                format!("missing description for param '{}'", ident),
            )
            .to_compile_error();
        };

        let arg_type = infer_json_type(&p.ty);
        let name_lit = LitStr::new(&ident.to_string(), ident.span());
        let desc_lit = LitStr::new(&desc, ident.span());

        quote! {
            #host::tools::traits::ArgSchema {
                name: #name_lit.into(),
                arg_type: #arg_type.into(),
                description: #desc_lit.into(),
                required: true,
            }
        }
    });

    let call_args = params.iter().map(|p| {
        let ident = &p.ident;
        quote!(params.#ident)
    });
    let call = if input_fn.sig.asyncness.is_some() {
        quote!(#fn_ident(#(#call_args),*).await)
    } else {
        quote!(#fn_ident(#(#call_args),*))
    };

    let expanded = quote! {
        #input_fn

        #[derive(#host::serde::Deserialize)]
        pub struct #params_struct_ident {
            #(#field_defs,)*
        }

        pub struct #tool_struct_ident;

        #[#host::async_trait::async_trait]
        impl #host::tools::traits::Tool for #tool_struct_ident {
            fn name(&self) -> &str { #tool_name }
            fn description(&self) -> &str { #description }
            fn args(&self) -> Vec<#host::tools::traits::ArgSchema> {
                vec![#(#args_entries),*]
            }
            async fn run(
                &self,
                input: #host::serde_json::Value,
            ) -> Result<String, #host::tools::error::ToolError> {
                let params: #params_struct_ident = #host::serde_json::from_value(input)
                    .map_err(|e| #host::tools::error::ToolError::ParamsNotMatched(e.to_string()))?;
                Ok(#call.to_string())
            }
        }
    };

    TokenStream::from(expanded)
}

fn pascal_case(s: &str) -> String {
    s.split('_')
        .map(|p| {
            let mut c = p.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect()
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) => p.path.segments.last(),
        _ => None,
    }
}

fn infer_json_type(ty: &Type) -> &'static str {
    let Some(seg) = last_segment(ty) else {
        return "object";
    };
    match seg.ident.to_string().as_str() {
        "String" | "str" => "string",
        "bool" => "boolean",
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize" | "isize" => {
            "integer"
        }
        "f32" | "f64" => "number",
        "Vec" => "array",
        _ => "object",
    }
}
