// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for the Ardent ECS.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// A derive macro that implements the `ardent_data::ecs::Component` trait.
///
/// The generated impl carries the struct's own generics and `where` clause,
/// so the compiler still checks the trait's supertrait bounds
/// (`Send`, `Sync`, `'static`) against the annotated type.
#[proc_macro_derive(Component)]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // `ardent_data` re-exports itself under its own name, so the path also
    // resolves inside the ECS crate.
    let expanded = quote! {
        impl #impl_generics ::ardent_data::ecs::Component for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}
