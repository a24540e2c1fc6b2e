//! `interface!` expansion.
//!
//! For a contract `Shape { fn area(&self) -> f64; fn scale(&mut self, f: f64); }`
//! this generates:
//!
//! ```text
//! struct __ShapeTable<'a>      dispatch table, one fn-pointer slot per method
//!   + const VACANT             slots that panic with Error::Empty
//!   + Provides<{id("area")}>   one impl per slot, keyed by method name
//! struct Shape<'a>             RawHandle + table
//!   + fn __erase::<U, F..>     builds the trampolines for U
//!   + fn area / fn scale       one indirect call each
//!   + Default, Clone, PartialEq, Debug, Interface, NarrowFrom<S>
//! macro_rules! Shape           wrap-site constructor: Shape!(value)
//! ```
//!
//! The constructor macro is where structural satisfaction happens: it writes
//! one non-capturing closure per method, `|this, ..| this.area(..)`, which
//! only type-checks if the concrete value has the method. Each closure's
//! zero-sized type is then baked into a trampoline.

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    Ident, Lifetime, ReturnType, Type,
};

use crate::common::{bind_elided, bind_handles, ContractDef, Handles, MethodDef, Receiver};

// =============================================================================
// Input
// =============================================================================

/// One or more contracts.
pub struct InterfaceInput {
    pub contracts: Vec<ContractDef>,
}

impl Parse for InterfaceInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut contracts: Vec<ContractDef> = Vec::new();
        while !input.is_empty() {
            let def: ContractDef = input.parse()?;
            if contracts.iter().any(|c| c.name == def.name) {
                return Err(syn::Error::new(
                    def.name.span(),
                    format!("duplicate contract `{}`", def.name),
                ));
            }
            contracts.push(def);
        }
        Ok(InterfaceInput { contracts })
    }
}

pub fn expand_interface(input: InterfaceInput) -> TokenStream2 {
    let names: Vec<Ident> = input.contracts.iter().map(|c| c.name.clone()).collect();
    input
        .contracts
        .iter()
        .map(|def| expand_contract(def, &Handles { current: &def.name, all: &names }))
        .collect()
}

// =============================================================================
// Slot Types
// =============================================================================

fn lifetime(name: &str) -> Lifetime {
    Lifetime::new(name, Span::call_site())
}

fn receiver_path(receiver: Receiver) -> TokenStream2 {
    match receiver {
        Receiver::Shared => quote! { ::tola_dyn::Ref },
        Receiver::Exclusive => quote! { ::tola_dyn::Mut },
    }
}

/// Argument and output types of a method, written where the handle
/// lifetime is `handle`.
struct Signature {
    args: Vec<Type>,
    output: ReturnType,
}

/// Binds `Self` and handle names to `handle`, then, given a `receiver`
/// lifetime, elided output lifetimes to it.
fn signature(
    method: &MethodDef,
    handles: &Handles<'_>,
    handle: &Lifetime,
    receiver: Option<&Lifetime>,
) -> Signature {
    let args = method.args.iter().map(|(_, ty)| bind_handles(ty, handles, handle)).collect();
    let output = match &method.output {
        ReturnType::Default => ReturnType::Default,
        ReturnType::Type(arrow, ty) => {
            ReturnType::Type(*arrow, Box::new(bind_handles(ty, handles, handle)))
        }
    };
    let output = match receiver {
        Some(receiver) => bind_elided(&output, receiver),
        None => output,
    };
    Signature { args, output }
}

/// `for<'__s> unsafe fn(Ref<'__s, 'a>, A..) -> R['__s]`
fn slot_type(method: &MethodDef, handles: &Handles<'_>, handle: &Lifetime) -> TokenStream2 {
    let recv = receiver_path(method.receiver);
    let Signature { args: tys, output } = signature(method, handles, handle, Some(&lifetime("'__s")));
    quote! { for<'__s> unsafe fn(#recv<'__s, #handle>, #(#tys),*) #output }
}

/// Bound on the wrap-site closure: `for<'__r> Fn(&'__r U, A..) -> R['__r] + Copy`
fn closure_bound(
    method: &MethodDef,
    handles: &Handles<'_>,
    handle: &Lifetime,
    payload: &Ident,
) -> TokenStream2 {
    let this = match method.receiver {
        Receiver::Shared => quote! { &'__r #payload },
        Receiver::Exclusive => quote! { &'__r mut #payload },
    };
    let Signature { args: tys, output } = signature(method, handles, handle, Some(&lifetime("'__r")));
    quote! {
        for<'__r> ::core::ops::Fn(#this, #(#tys),*) #output + ::core::marker::Copy
    }
}

fn positional_args(method: &MethodDef) -> Vec<Ident> {
    (0..method.args.len()).map(|i| format_ident!("__arg{}", i)).collect()
}

// =============================================================================
// Per-method Pieces
// =============================================================================

/// The function stored in a slot of a table built for payload `__U`.
fn trampoline(method: &MethodDef, handles: &Handles<'_>) -> TokenStream2 {
    let tramp = format_ident!("__trampoline_{}", method.name);
    let recv = receiver_path(method.receiver);
    let handle = lifetime("'__a");
    let bound = closure_bound(method, handles, &handle, &format_ident!("__U"));
    let Signature { args: tys, output } = signature(method, handles, &handle, Some(&lifetime("'__s")));
    let args = positional_args(method);

    quote! {
        unsafe fn #tramp<'__s, '__a, __U: '__a, __F>(
            __this: #recv<'__s, '__a>,
            #(#args: #tys),*
        ) #output
        where
            __F: #bound,
        {
            let __f: __F = unsafe { ::tola_dyn::__private::conjure::<__F>() };
            __f(unsafe { __this.cast::<__U>() }, #(#args),*)
        }
    }
}

/// The function stored in a slot of the vacant table.
fn vacant(contract: &str, method: &MethodDef, handles: &Handles<'_>) -> TokenStream2 {
    let vac = format_ident!("__vacant_{}", method.name);
    let recv = receiver_path(method.receiver);
    let Signature { args: tys, output } =
        signature(method, handles, &lifetime("'__a"), Some(&lifetime("'__s")));
    let name = method.name.to_string();

    quote! {
        unsafe fn #vac<'__s, '__a>(_: #recv<'__s, '__a>, #(_: #tys),*) #output {
            ::tola_dyn::__private::vacant(#contract, #name)
        }
    }
}

/// The contract method on the handle.
fn inherent(vis: &syn::Visibility, method: &MethodDef, handles: &Handles<'_>) -> TokenStream2 {
    let MethodDef { attrs, name, receiver, args, .. } = method;
    let names: Vec<&Ident> = args.iter().map(|(name, _)| name).collect();
    let Signature { args: tys, output } = signature(method, handles, &lifetime("'a"), None);

    let (this, call) = match receiver {
        Receiver::Shared => (quote! { &self }, quote! { self.raw.receiver() }),
        Receiver::Exclusive => (quote! { &mut self }, quote! { self.raw.receiver_mut() }),
    };

    quote! {
        #(#attrs)*
        #[inline]
        #vis fn #name(#this, #(#names: #tys),*) #output {
            unsafe { (self.table.#name)(#call, #(#names),*) }
        }
    }
}

/// `|__this, __arg0, ..| __this.method(__arg0, ..)`
fn forwarding_closure(method: &MethodDef) -> TokenStream2 {
    let name = &method.name;
    let args = positional_args(method);
    quote! { |__this, #(#args),*| __this.#name(#(#args),*) }
}

// =============================================================================
// Contract Expansion
// =============================================================================

fn expand_contract(def: &ContractDef, handles: &Handles<'_>) -> TokenStream2 {
    let ContractDef { attrs, vis, name, methods } = def;
    let name_str = name.to_string();
    let table = format_ident!("__{}Table", name);
    let handle_lt = lifetime("'a");

    let slots: Vec<&Ident> = methods.iter().map(|m| &m.name).collect();
    let keys: Vec<String> = methods.iter().map(|m| m.name.to_string()).collect();
    let slot_tys: Vec<TokenStream2> = methods.iter().map(|m| slot_type(m, handles, &handle_lt)).collect();

    // -------------------------------------------------------------------------
    // Dispatch table
    // -------------------------------------------------------------------------

    let vacant_fns = methods.iter().map(|m| vacant(&name_str, m, handles));
    let vacant_names = methods.iter().map(|m| format_ident!("__vacant_{}", m.name));

    let table_def = quote! {
        #[doc(hidden)]
        #[derive(Clone, Copy)]
        #vis struct #table<'a> {
            #(#slots: #slot_tys,)*
            __marker: ::core::marker::PhantomData<&'a ()>,
        }

        impl<'a> #table<'a> {
            const VACANT: Self = {
                #(#vacant_fns)*
                #table {
                    #(#slots: #vacant_names,)*
                    __marker: ::core::marker::PhantomData,
                }
            };
        }

        #(
            impl<'a> ::tola_dyn::Provides<{ ::tola_dyn::method_id(#keys) }> for #table<'a> {
                type Slot = #slot_tys;

                #[inline]
                fn slot(&self) -> Self::Slot {
                    self.#slots
                }
            }
        )*
    };

    // -------------------------------------------------------------------------
    // Handle
    // -------------------------------------------------------------------------

    let closure_params: Vec<Ident> = (0..methods.len()).map(|i| format_ident!("__F{}", i)).collect();
    let closure_bounds = methods
        .iter()
        .map(|m| closure_bound(m, handles, &handle_lt, &format_ident!("__U")));
    let trampolines = methods.iter().map(|m| trampoline(m, handles));
    let trampoline_names = methods.iter().map(|m| format_ident!("__trampoline_{}", m.name));
    let inherents = methods.iter().map(|m| inherent(vis, m, handles));

    let handle_def = quote! {
        #(#attrs)*
        #vis struct #name<'a> {
            raw: ::tola_dyn::RawHandle<'a>,
            table: #table<'a>,
        }

        impl<'a> #name<'a> {
            /// Wrap `value`, with one zero-sized forwarding closure per
            /// contract method. Use the constructor macro instead.
            #[doc(hidden)]
            #[allow(dead_code)]
            pub fn __erase<__U: 'a, #(#closure_params),*>(
                value: __U,
                descriptor: ::tola_dyn::Descriptor<__U>,
                #(_: #closure_params),*
            ) -> Self
            where
                #(#closure_params: #closure_bounds,)*
            {
                #(#trampolines)*

                let table = #table {
                    #(#slots: #trampoline_names::<__U, #closure_params>,)*
                    __marker: ::core::marker::PhantomData,
                };
                #name { raw: ::tola_dyn::RawHandle::new(value, descriptor), table }
            }

            #(#inherents)*
        }

        impl<'a> ::core::default::Default for #name<'a> {
            fn default() -> Self {
                #name { raw: ::tola_dyn::RawHandle::empty(), table: #table::VACANT }
            }
        }

        impl<'a> ::core::clone::Clone for #name<'a> {
            fn clone(&self) -> Self {
                match ::tola_dyn::Interface::try_clone(self) {
                    ::core::result::Result::Ok(handle) => handle,
                    ::core::result::Result::Err(err) => ::core::panic!("{}", err),
                }
            }
        }

        impl<'a> ::core::cmp::PartialEq for #name<'a> {
            fn eq(&self, other: &Self) -> bool {
                self.raw == other.raw
            }
        }

        impl<'a> ::core::fmt::Debug for #name<'a> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_tuple(#name_str).field(&self.raw).finish()
            }
        }

        impl<'a> ::tola_dyn::Interface<'a> for #name<'a> {
            const NAME: &'static str = #name_str;

            type Table = #table<'a>;

            fn raw(&self) -> &::tola_dyn::RawHandle<'a> {
                &self.raw
            }

            unsafe fn raw_mut(&mut self) -> &mut ::tola_dyn::RawHandle<'a> {
                &mut self.raw
            }

            fn table(&self) -> &Self::Table {
                &self.table
            }

            fn into_parts(self) -> (::tola_dyn::RawHandle<'a>, Self::Table) {
                (self.raw, self.table)
            }

            unsafe fn from_parts(raw: ::tola_dyn::RawHandle<'a>, table: Self::Table) -> Self {
                #name { raw, table }
            }
        }

        impl<'a, __S> ::tola_dyn::NarrowFrom<'a, __S> for #name<'a>
        where
            __S: ::tola_dyn::Interface<'a>,
            <__S as ::tola_dyn::Interface<'a>>::Table:
                #(::tola_dyn::Provides<{ ::tola_dyn::method_id(#keys) }, Slot = #slot_tys>)+*,
        {
            fn narrow_table(source: &<__S as ::tola_dyn::Interface<'a>>::Table) -> #table<'a> {
                #table {
                    #(
                        #slots: <<__S as ::tola_dyn::Interface<'a>>::Table
                            as ::tola_dyn::Provides<{ ::tola_dyn::method_id(#keys) }>>::slot(source),
                    )*
                    __marker: ::core::marker::PhantomData,
                }
            }
        }
    };

    // -------------------------------------------------------------------------
    // Constructor macro
    // -------------------------------------------------------------------------

    let closures = methods.iter().map(forwarding_closure);

    let constructor = quote! {
        #[allow(unused_macros)]
        macro_rules! #name {
            ($value:expr $(,)?) => {{
                #[allow(unused_imports)]
                use ::tola_dyn::__private::ValueMode as _;
                let __value = $value;
                let __descriptor = ::tola_dyn::__private::Select::of(&__value).descriptor();
                #name::__erase(__value, __descriptor, #(#closures),*)
            }};
        }
    };

    quote! {
        #table_def
        #handle_def
        #constructor
    }
}
