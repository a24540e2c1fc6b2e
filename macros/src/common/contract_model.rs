//! Parsed and validated contract declarations.
//!
//! ```text
//! #[doc = ".."] pub Shape {           ContractDef { attrs, vis, name,
//!     fn area(&self) -> f64;              methods: [ MethodDef { receiver: Shared, .. },
//!     fn scale(&mut self, f: f64);                   MethodDef { receiver: Exclusive, .. } ] }
//! }
//! ```
//!
//! Everything the expansion cannot express is rejected here, at the span of
//! the offending tokens.

use std::collections::HashSet;

use syn::{
    braced,
    parse::{Parse, ParseStream},
    visit::{self, Visit},
    Attribute, FnArg, Ident, Pat, ReturnType, TraitItemFn, Type, Visibility,
};

/// One contract: `[attrs] vis Name { fn ..; .. }`.
pub struct ContractDef {
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub name: Ident,
    pub methods: Vec<MethodDef>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

pub struct MethodDef {
    pub attrs: Vec<Attribute>,
    pub name: Ident,
    pub receiver: Receiver,
    pub args: Vec<(Ident, Type)>,
    pub output: ReturnType,
}

impl Parse for ContractDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;

        let content;
        braced!(content in input);

        let mut methods = Vec::new();
        let mut seen = HashSet::new();
        while !content.is_empty() {
            let item: TraitItemFn = content.parse()?;
            let method = MethodDef::from_item(item)?;
            if !seen.insert(method.name.to_string()) {
                return Err(syn::Error::new(
                    method.name.span(),
                    format!("duplicate method `{}` in contract `{}`", method.name, name),
                ));
            }
            methods.push(method);
        }

        Ok(ContractDef { attrs, vis, name, methods })
    }
}

impl MethodDef {
    fn from_item(item: TraitItemFn) -> syn::Result<Self> {
        let sig = &item.sig;

        if let Some(body) = &item.default {
            return Err(syn::Error::new_spanned(body, "contract methods cannot have a body"));
        }
        if let Some(token) = &sig.constness {
            return Err(syn::Error::new_spanned(token, "contract methods cannot be `const`"));
        }
        if let Some(token) = &sig.asyncness {
            return Err(syn::Error::new_spanned(token, "contract methods cannot be `async`"));
        }
        if let Some(token) = &sig.unsafety {
            return Err(syn::Error::new_spanned(token, "contract methods cannot be `unsafe`"));
        }
        if let Some(abi) = &sig.abi {
            return Err(syn::Error::new_spanned(abi, "contract methods cannot declare an ABI"));
        }
        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "contract methods cannot be generic",
            ));
        }
        if let Some(variadic) = &sig.variadic {
            return Err(syn::Error::new_spanned(variadic, "contract methods cannot be variadic"));
        }

        let mut inputs = sig.inputs.iter();
        let receiver = match inputs.next() {
            Some(FnArg::Receiver(recv)) => parse_receiver(recv)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    sig,
                    "contract methods take `&self` or `&mut self` first",
                ));
            }
        };

        let mut args = Vec::new();
        let mut forbidden = Forbidden::default();
        for input in inputs {
            let FnArg::Typed(arg) = input else {
                return Err(syn::Error::new_spanned(input, "unexpected `self` argument"));
            };
            let name = match &*arg.pat {
                Pat::Ident(pat) if pat.by_ref.is_none() && pat.mutability.is_none() && pat.subpat.is_none() => {
                    pat.ident.clone()
                }
                pat => {
                    return Err(syn::Error::new_spanned(
                        pat,
                        "contract arguments must be plain identifiers",
                    ));
                }
            };
            forbidden.visit_type(&arg.ty);
            args.push((name, (*arg.ty).clone()));
        }
        forbidden.in_output = true;
        forbidden.visit_return_type(&sig.output);

        if let Some(err) = forbidden.error {
            return Err(err);
        }

        Ok(MethodDef {
            attrs: item.attrs,
            name: sig.ident.clone(),
            receiver,
            args,
            output: sig.output.clone(),
        })
    }
}

fn parse_receiver(recv: &syn::Receiver) -> syn::Result<Receiver> {
    if recv.colon_token.is_some() {
        return Err(syn::Error::new_spanned(
            recv,
            "typed receivers are not supported; use `&self` or `&mut self`",
        ));
    }
    match &recv.reference {
        None => Err(syn::Error::new_spanned(
            recv,
            "contract methods cannot take `self` by value; use `&self` or `&mut self`",
        )),
        Some((_, Some(lifetime))) => Err(syn::Error::new_spanned(
            lifetime,
            "receiver lifetimes are implied; write `&self` or `&mut self`",
        )),
        Some((_, None)) if recv.mutability.is_some() => Ok(Receiver::Exclusive),
        Some((_, None)) => Ok(Receiver::Shared),
    }
}

// =============================================================================
// Signature Checks
// =============================================================================

/// Library types that borrow, so an output `Cow<str>` elides a lifetime the
/// dispatch slot has no receiver to elide onto.
const BORROWING_TYPES: &[&str] = &[
    "Cow",
    "Formatter",
    "Arguments",
    "Ref",
    "RefMut",
    "Chars",
    "CharIndices",
    "Lines",
    "SplitWhitespace",
    "Drain",
    "MutexGuard",
    "RwLockReadGuard",
    "RwLockWriteGuard",
];

fn hides_lifetime(segment: &syn::PathSegment) -> bool {
    if !BORROWING_TYPES.iter().any(|name| segment.ident == name) {
        return false;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => {
            !args.args.iter().any(|arg| matches!(arg, syn::GenericArgument::Lifetime(_)))
        }
        _ => true,
    }
}

/// Collects every construct a dispatch slot cannot name.
#[derive(Default)]
struct Forbidden {
    error: Option<syn::Error>,
    in_output: bool,
}

impl Forbidden {
    fn push(&mut self, err: syn::Error) {
        match &mut self.error {
            Some(existing) => existing.combine(err),
            None => self.error = Some(err),
        }
    }
}

impl<'ast> Visit<'ast> for Forbidden {
    fn visit_type_impl_trait(&mut self, node: &'ast syn::TypeImplTrait) {
        self.push(syn::Error::new_spanned(
            node,
            "`impl Trait` is not supported in contract signatures",
        ));
    }

    fn visit_type_path(&mut self, node: &'ast syn::TypePath) {
        let path = &node.path;
        if node.qself.is_none() && path.segments.len() > 1 && path.segments[0].ident == "Self" {
            self.push(syn::Error::new_spanned(
                node,
                "paths through `Self` are not supported in contract signatures",
            ));
        }
        if self.in_output {
            if let Some(segment) = path.segments.last() {
                if hides_lifetime(segment) {
                    self.push(syn::Error::new_spanned(
                        node,
                        format!(
                            "`{0}` borrows with a hidden lifetime; write `{0}<'_, ..>`",
                            segment.ident
                        ),
                    ));
                }
            }
        }
        visit::visit_type_path(self, node);
    }

    // Own elision scopes.
    fn visit_type_bare_fn(&mut self, node: &'ast syn::TypeBareFn) {
        let in_output = std::mem::replace(&mut self.in_output, false);
        visit::visit_type_bare_fn(self, node);
        self.in_output = in_output;
    }

    fn visit_parenthesized_generic_arguments(
        &mut self,
        node: &'ast syn::ParenthesizedGenericArguments,
    ) {
        let in_output = std::mem::replace(&mut self.in_output, false);
        visit::visit_parenthesized_generic_arguments(self, node);
        self.in_output = in_output;
    }

    fn visit_lifetime(&mut self, node: &'ast syn::Lifetime) {
        if node.ident != "static" && node.ident != "_" {
            self.push(syn::Error::new_spanned(
                node,
                "named lifetimes are not supported in contract signatures; \
                 returned borrows are tied to the receiver by elision",
            ));
        }
    }
}
