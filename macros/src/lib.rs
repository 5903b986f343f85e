//! Derive macro for fetch stores
//!
//! `#[derive(FetchStore)]` turns a state struct whose fields are all
//! `RequestState<T>` into a complete fetch store: one endpoint, one getter and
//! one action per field, with names fixed at compile time.
//!
//! # Example
//!
//! ```ignore
//! use fetch_store_core::RequestState;
//! use fetch_store_macros::FetchStore;
//!
//! #[derive(FetchStore, Clone, Debug)]
//! pub struct TodosState {
//!     #[endpoint(arg = CreateTodo)]
//!     pub create: RequestState<Todo>,
//!     #[endpoint(arg = String)]
//!     pub retrieve: RequestState<Todo>,
//!     pub list: RequestState<Vec<Todo>>,
//! }
//!
//! // Generated:
//! // - TodosEndpoints { create, retrieve, list }       (one Endpoint per field)
//! // - TodosActions::{create_action, retrieve_action, list_action}
//! // - TodosGetters::{create_computed, retrieve_computed, list_computed}
//! // - impl FetchStore for TodosState
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident,
    PathArguments, Type, Visibility,
};

/// Derive macro for fetch store state structs
///
/// Every field must be typed `RequestState<T>`; the field name is the endpoint
/// name. For a field `name` the macro generates:
///
/// - `Endpoints::name`: an `Endpoint<Actions, T, Arg>` to fill in when
///   creating the store definition
/// - `Actions::name_action(arg)`: drives the request lifecycle for the slice
///   (no argument when `Arg` is `()`)
/// - `Getters::name_computed(state)`: projects the slice into a `Computed<T>`
///
/// plus `impl FetchStore` for the struct.
///
/// Getters clone the slice's data, so every `T` must implement `Clone`.
///
/// # Attributes
///
/// - `#[endpoint(arg = Type)]` on a field: request argument type (default `()`)
/// - `#[fetch_store(endpoints = Ident, actions = Ident, getters = Ident)]` on
///   the struct: override generated type names. Defaults strip a trailing
///   `State` from the struct name and append `Endpoints`, `Actions`, `Getters`.
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to anything but a struct with named fields
/// - The struct is generic
/// - A field is not typed `RequestState<T>`
/// - An attribute is malformed
#[proc_macro_derive(FetchStore, attributes(endpoint, fetch_store))]
pub fn derive_fetch_store(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One `RequestState<T>` field
struct EndpointField {
    ident: Ident,
    name: String,
    data: Type,
    arg: Type,
}

impl EndpointField {
    fn takes_arg(&self) -> bool {
        !matches!(&self.arg, Type::Tuple(tuple) if tuple.elems.is_empty())
    }
}

/// Names of the generated types
struct GeneratedNames {
    endpoints: Ident,
    actions: Ident,
    getters: Ident,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(FetchStore)] does not support generic structs",
        ));
    }

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(FetchStore)] can only be used on structs",
        ));
    };

    let Fields::Named(named) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &data_struct.fields,
            "#[derive(FetchStore)] requires a struct with named fields",
        ));
    };

    let names = generated_names(name, &input.attrs)?;
    let fields = named
        .named
        .iter()
        .map(|field| {
            let Some(ident) = field.ident.clone() else {
                return Err(syn::Error::new_spanned(field, "endpoint field must be named"));
            };
            Ok(EndpointField {
                name: ident.unraw().to_string(),
                data: request_state_data(&field.ty)?,
                arg: endpoint_arg(&field.attrs)?,
                ident,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let endpoints = expand_endpoints(name, vis, &names, &fields);
    let actions = expand_actions(name, vis, &names, &fields);
    let getters = expand_getters(name, vis, &names, &fields);
    let store = expand_fetch_store(name, &names, &fields);

    Ok(quote! {
        #endpoints
        #actions
        #getters
        #store
    })
}

fn generated_names(name: &Ident, attrs: &[Attribute]) -> syn::Result<GeneratedNames> {
    let full = name.unraw().to_string();
    let base = match full.strip_suffix("State") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => full,
    };

    let mut names = GeneratedNames {
        endpoints: format_ident!("{}Endpoints", base),
        actions: format_ident!("{}Actions", base),
        getters: format_ident!("{}Getters", base),
    };

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("fetch_store")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("endpoints") {
                names.endpoints = meta.value()?.parse()?;
            } else if meta.path.is_ident("actions") {
                names.actions = meta.value()?.parse()?;
            } else if meta.path.is_ident("getters") {
                names.getters = meta.value()?.parse()?;
            } else {
                return Err(meta.error(
                    "unsupported fetch_store option, expected `endpoints`, `actions` or `getters`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(names)
}

/// Extract `T` from `RequestState<T>`
fn request_state_data(ty: &Type) -> syn::Result<Type> {
    let error = || syn::Error::new_spanned(ty, "endpoint fields must be typed `RequestState<T>`");

    let Type::Path(type_path) = ty else {
        return Err(error());
    };
    let segment = type_path.path.segments.last().ok_or_else(error)?;
    if segment.ident != "RequestState" {
        return Err(error());
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Err(error());
    };

    let mut types = arguments.args.iter().filter_map(|argument| match argument {
        GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    });
    match (types.next(), types.next()) {
        (Some(data), None) => Ok(data),
        _ => Err(error()),
    }
}

/// Read `#[endpoint(arg = Type)]`, defaulting to `()`
fn endpoint_arg(attrs: &[Attribute]) -> syn::Result<Type> {
    let mut arg: Type = syn::parse_quote!(());

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("endpoint")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("arg") {
                arg = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported endpoint option, expected `arg`"))
            }
        })?;
    }

    Ok(arg)
}

fn expand_endpoints(
    name: &Ident,
    vis: &Visibility,
    names: &GeneratedNames,
    fields: &[EndpointField],
) -> TokenStream2 {
    let GeneratedNames {
        endpoints, actions, ..
    } = names;
    let doc = format!("Endpoint definitions for [`{name}`], one per slice.");

    let members = fields.iter().map(|field| {
        let EndpointField {
            ident, data, arg, ..
        } = field;
        let field_doc = format!("Request function of the `{}` endpoint.", field.name);
        quote! {
            #[doc = #field_doc]
            #vis #ident: ::fetch_store_core::Endpoint<#actions, #data, #arg>,
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #endpoints {
            #(#members)*
        }
    }
}

fn expand_actions(
    name: &Ident,
    vis: &Visibility,
    names: &GeneratedNames,
    fields: &[EndpointField],
) -> TokenStream2 {
    let GeneratedNames {
        endpoints, actions, ..
    } = names;
    let doc = format!(
        "Actions of [`{name}`]: one `<endpoint>_action` per slice, bound to a shared state."
    );
    let actions_name = actions.to_string();

    let methods = fields.iter().map(|field| {
        let EndpointField {
            ident,
            name: endpoint_name,
            data,
            arg,
        } = field;
        let method = format_ident!("{}_action", ident);
        let method_doc = format!(
            "Run the `{endpoint_name}` request unless one is already in flight, recording its outcome in the `{endpoint_name}` slice."
        );

        let (params, arg_value) = if field.takes_arg() {
            (quote! { arg: #arg }, quote! { arg })
        } else {
            (quote! {}, quote! { () })
        };

        quote! {
            #[doc = #method_doc]
            #[must_use = "the request only settles when the returned future is awaited"]
            #vis fn #method(&self, #params) -> ::fetch_store_core::ActionFuture {
                fn slice(state: &mut #name) -> &mut ::fetch_store_core::RequestState<#data> {
                    &mut state.#ident
                }
                ::fetch_store_core::dispatch(
                    &self.state,
                    #endpoint_name,
                    slice,
                    &self.endpoints.#ident,
                    ::std::clone::Clone::clone(self),
                    #arg_value,
                )
            }
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(Clone)]
        #vis struct #actions {
            state: ::fetch_store_core::SharedState<#name>,
            endpoints: ::std::sync::Arc<#endpoints>,
        }

        impl #actions {
            #(#methods)*

            /// The shared state these actions write to.
            #[must_use]
            #vis fn state(&self) -> &::fetch_store_core::SharedState<#name> {
                &self.state
            }
        }

        #[automatically_derived]
        impl ::std::fmt::Debug for #actions {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(#actions_name)
                    .field(
                        "endpoints",
                        &<#name as ::fetch_store_core::FetchStore>::ENDPOINTS,
                    )
                    .finish_non_exhaustive()
            }
        }
    }
}

fn expand_getters(
    name: &Ident,
    vis: &Visibility,
    names: &GeneratedNames,
    fields: &[EndpointField],
) -> TokenStream2 {
    let getters = &names.getters;
    let doc = format!("Getters of [`{name}`]: one `<endpoint>_computed` selector per slice.");

    let methods = fields.iter().map(|field| {
        let EndpointField {
            ident,
            name: endpoint_name,
            data,
            ..
        } = field;
        let method = format_ident!("{}_computed", ident);
        let method_doc = format!(
            "The four request-state fields of the `{endpoint_name}` slice; all `None` when `state` is `None`."
        );
        // A missing `Clone` impl is reported at the field's type.
        let project = quote_spanned! {data.span()=>
            ::fetch_store_core::Computed::<#data>::project
        };

        quote! {
            #[doc = #method_doc]
            #[must_use]
            #vis fn #method<'a>(
                self,
                state: impl ::std::convert::Into<::std::option::Option<&'a #name>>,
            ) -> ::fetch_store_core::Computed<#data> {
                #project(state.into().map(|state| &state.#ident))
            }
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        #vis struct #getters;

        impl #getters {
            #(#methods)*
        }
    }
}

fn expand_fetch_store(name: &Ident, names: &GeneratedNames, fields: &[EndpointField]) -> TokenStream2 {
    let GeneratedNames {
        endpoints,
        actions,
        getters,
    } = names;
    let idents: Vec<_> = fields.iter().map(|field| &field.ident).collect();
    let endpoint_names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();

    quote! {
        #[automatically_derived]
        impl ::fetch_store_core::FetchStore for #name {
            type Endpoints = #endpoints;
            type Actions = #actions;
            type Getters = #getters;

            const ENDPOINTS: &'static [&'static str] = &[#(#endpoint_names),*];

            fn idle() -> Self {
                Self {
                    #(#idents: ::fetch_store_core::RequestState::idle(),)*
                }
            }

            fn getters() -> Self::Getters {
                #getters
            }

            fn bind(
                state: ::fetch_store_core::SharedState<Self>,
                endpoints: ::std::sync::Arc<Self::Endpoints>,
            ) -> Self::Actions {
                #actions { state, endpoints }
            }

            fn phase(&self, endpoint: &str) -> ::std::option::Option<::fetch_store_core::RequestPhase> {
                match endpoint {
                    #(#endpoint_names => ::std::option::Option::Some(self.#idents.phase()),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn reset_settled(&mut self) -> usize {
                0 #(+ usize::from(self.#idents.reset_unless_loading()))*
            }
        }
    }
}
