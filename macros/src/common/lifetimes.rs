//! Elided lifetime binding for dispatch slot types.
//!
//! `fn name(&self) -> &str` elides the output lifetime onto `&self`. A slot
//! `for<'s> unsafe fn(Ref<'s, 'a>) -> &str` has no `&self` to elide onto, so
//! every elided or `'_` lifetime in the output is rewritten to the receiver
//! lifetime explicitly:
//!
//! ```text
//! &str              -> &'s str
//! Option<&'_ [u8]>  -> Option<&'s [u8]>
//! fn(&str) -> &str  -> unchanged (own elision scope)
//! ```
//!
//! Handles of the same invocation carry their lifetime explicitly too.
//! `Self` names the contract being expanded:
//!
//! ```text
//! Self              -> Node<'a>
//! Option<Leaf>      -> Option<Leaf<'a>>
//! Leaf<'_>          -> unchanged (bound by the elision pass)
//! ```

use syn::{
    punctuated::Punctuated,
    visit_mut::{self, VisitMut},
    AngleBracketedGenericArguments, GenericArgument, Ident, Lifetime, PathArguments, ReturnType,
    Type, TypePath,
};

struct BindElided<'l> {
    lifetime: &'l Lifetime,
}

impl VisitMut for BindElided<'_> {
    fn visit_type_reference_mut(&mut self, node: &mut syn::TypeReference) {
        if node.lifetime.is_none() {
            node.lifetime = Some(self.lifetime.clone());
        }
        visit_mut::visit_type_reference_mut(self, node);
    }

    fn visit_lifetime_mut(&mut self, node: &mut Lifetime) {
        if node.ident == "_" {
            *node = self.lifetime.clone();
        }
    }

    // Function pointers and `Fn(..)` sugar open their own elision scope.
    fn visit_type_bare_fn_mut(&mut self, _: &mut syn::TypeBareFn) {}

    fn visit_parenthesized_generic_arguments_mut(
        &mut self,
        _: &mut syn::ParenthesizedGenericArguments,
    ) {
    }
}

/// Contract handles declared by one `interface!` invocation.
pub struct Handles<'h> {
    /// The contract being expanded, named by `Self`.
    pub current: &'h Ident,
    pub all: &'h [Ident],
}

struct BindHandles<'h, 'l> {
    handles: &'h Handles<'h>,
    lifetime: &'l Lifetime,
}

impl VisitMut for BindHandles<'_, '_> {
    fn visit_type_path_mut(&mut self, node: &mut TypePath) {
        if node.qself.is_none() && node.path.leading_colon.is_none() && node.path.segments.len() == 1 {
            let segment = &mut node.path.segments[0];
            if segment.ident == "Self" {
                segment.ident = Ident::new(&self.handles.current.to_string(), segment.ident.span());
            }
            let is_handle = self.handles.all.iter().any(|name| segment.ident == *name);
            if is_handle && matches!(segment.arguments, PathArguments::None) {
                let mut args = Punctuated::new();
                args.push(GenericArgument::Lifetime(self.lifetime.clone()));
                segment.arguments = PathArguments::AngleBracketed(AngleBracketedGenericArguments {
                    colon2_token: None,
                    lt_token: Default::default(),
                    args,
                    gt_token: Default::default(),
                });
            }
        }
        visit_mut::visit_type_path_mut(self, node);
    }
}

/// Give `Self` and bare handle names in `ty` the handle lifetime `lifetime`.
pub fn bind_handles(ty: &Type, handles: &Handles<'_>, lifetime: &Lifetime) -> Type {
    let mut ty = ty.clone();
    BindHandles { handles, lifetime }.visit_type_mut(&mut ty);
    ty
}

/// Rewrite elided lifetimes in a return type to `lifetime`.
pub fn bind_elided(output: &ReturnType, lifetime: &Lifetime) -> ReturnType {
    let mut output = output.clone();
    if let ReturnType::Type(_, ty) = &mut output {
        BindElided { lifetime }.visit_type_mut(ty);
    }
    output
}
