#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Blueprint Sync crates.
//!
//! * [`bsync_error`] turns a named-field enum into a `thiserror` error with context support.
//! * [`api_model`] / [`api_handler`] keep DTOs and Axum handlers consistent with `OpenAPI`.
//! * [`bsync_slice`] wraps feature state into an `Arc` handle registrable in the kernel.
//!
//! The examples below are `ignore`d because they only compile in consuming crates.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to define a standard API data model.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize` and `Deserialize` unless already derived.
/// * **`OpenAPI`**: `utoipa::ToSchema` when the consuming crate enables its `server` feature.
/// * **Serde Policy**: `rename_all = "camelCase"` and `deny_unknown_fields` by default.
///
/// # Arguments
///
/// * `rename_all = "snake_case"` - Overrides the default rename policy.
/// * `deny_unknown_fields = false` - Accepts payloads carrying extra fields.
///
/// # Example
///
/// ```rust,ignore
/// use bsync_derive::api_model;
///
/// #[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
/// pub struct SyncRequest {
///     pub repo: String,
///     pub branch: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro bridging Axum handlers with `utoipa::path`.
///
/// Accepts the regular `utoipa::path` arguments. The path metadata is only emitted
/// when the consuming crate enables its `server` feature.
///
/// ```rust,ignore
/// use bsync_derive::api_handler;
///
/// #[api_handler(get, path = "/api/health", responses((status = OK, body = HealthResponse)))]
/// pub async fn health_handler() -> Json<HealthResponse> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for domain error enums.
///
/// # Features
///
/// * **Automatic Derives**: `Debug` and `thiserror::Error` unless already derived.
/// * **Context Support**: a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every variant with a source.
/// * **Conversions**: `From<Source>` for variants with a `source` field (or `#[source]`/`#[from]`),
///   so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * **Formatting**: a module-level `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. `context` fields must be `Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[bsync_derive::bsync_error]
/// pub enum DocumentError {
///     #[error("YAML error{}: {source}", format_context(.context))]
///     Yaml { source: serde_yaml::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn parse(text: &str) -> Result<serde_yaml::Value, DocumentError> {
///     serde_yaml::from_str(text).context("Parsing registry document")
/// }
/// ```
#[proc_macro_attribute]
pub fn bsync_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// Generates `<Name>Inner` holding the declared fields, an `Arc`-backed `<Name>` wrapper
/// with `Deref` to the inner state, and the kernel `FeatureSlice` implementation.
///
/// ```rust,ignore
/// #[bsync_derive::bsync_slice]
/// pub struct Registry {
///     pub sync: RegistrySync,
/// }
///
/// let slice = Registry::new(RegistryInner { sync });
/// ```
#[proc_macro_attribute]
pub fn bsync_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
