//! Procedural macro support for record schemas.
//!
//! This crate provides the `#[derive(Record)]` macro, which implements `qbe::Record`, the static
//! schema of a struct, from its named fields. Use it through the `qbe` crate, which re-exports it.

use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Result,
    Type, ext::IdentExt as _, parse_macro_input,
};

/// Derive macro generating the static schema of a record type.
///
/// Every named field becomes a schema field of the same name. The field type decides the kind:
/// `String` is text, `i8` to `i64` and `u8` to `u32` are integers, and wrapping either in
/// `Option` makes the field nullable.
///
/// # Attributes
///
/// - `#[record(entity = "books")]` on the struct sets the entity (table) name. Defaults to the
///   struct name in lowercase.
/// - `#[record(id)]` on a field marks the identity field. Defaults to the field named `id`. The
///   identity field must be an `i64`.
/// - `#[record(mode = "exact")]`, `"contains"` or `"contains_ignore_case"` on a text field sets
///   how example values are compared. Defaults to `"contains_ignore_case"`. Integer fields are
///   always compared exactly.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Record)]
/// #[record(entity = "book")]
/// struct Book {
///     id: i64,
///     #[record(mode = "exact")]
///     isbn: String,
///     title: Option<String>,
///     published_year: Option<i32>,
/// }
/// ```
///
/// Unsupported shapes (enums, unions, tuple structs, other field types, a missing identity field)
/// are reported as compile errors at the offending item.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// The kind of values a field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    /// An integer type.
    Int,
    /// `String`.
    Text,
}

/// Comparison mode of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// `exact`.
    Exact,
    /// `contains`.
    Contains,
    /// `contains_ignore_case`.
    ContainsIgnoreCase,
}

/// One analysed field.
struct FieldSpec<'a> {
    /// The field as written.
    ident: &'a Ident,
    /// The schema name: the identifier without any `r#` prefix.
    name: String,
    /// The kind of the bare type.
    kind: Kind,
    /// The comparison mode.
    mode: Mode,
    /// The type is an `Option`.
    nullable: bool,
    /// Marked with `#[record(id)]`.
    is_id: bool,
    /// The bare, non-optional type is `i64`.
    is_i64: bool,
}

/// The analysed schema of a struct.
struct Schema<'a> {
    /// The entity (table) name.
    entity: String,
    /// Every field, in declaration order.
    fields: Vec<FieldSpec<'a>>,
    /// Index of the identity field in `fields`.
    id: usize,
}

/// Check the shape of `input` and collect its schema.
fn analyse(input: &DeriveInput) -> Result<Schema<'_>> {
    let struct_name = &input.ident;
    let entity =
        entity(&input.attrs)?.unwrap_or_else(|| struct_name.unraw().to_string().to_lowercase());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(Error::new_spanned(
                    struct_name,
                    "Record can only be derived for structs with named fields",
                ));
            },
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(Error::new_spanned(
                struct_name,
                "Record can only be derived for struct types",
            ));
        },
    };

    let fields = fields
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;
            field_spec(ident, &field.ty, &field.attrs)
        })
        .collect::<Result<Vec<_>>>()?;
    let id = identity(struct_name, &fields)?;

    Ok(Schema { entity, fields, id })
}

/// Generate the `Record` implementation for `input`.
fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let Schema { entity, fields, id } = analyse(input)?;
    let struct_name = &input.ident;
    let id_ident = fields[id].ident;
    let id_name = &fields[id].name;

    let descriptors = fields.iter().map(|spec| {
        let FieldSpec {
            name,
            kind,
            mode,
            nullable,
            ..
        } = spec;
        let kind = match kind {
            Kind::Int => quote!(Int),
            Kind::Text => quote!(Text),
        };
        let mode = match mode {
            Mode::Exact => quote!(Exact),
            Mode::Contains => quote!(Contains),
            Mode::ContainsIgnoreCase => quote!(ContainsIgnoreCase),
        };
        quote! {
            ::qbe::record::Field {
                name: #name,
                kind: ::qbe::record::Kind::#kind,
                mode: ::qbe::record::MatchMode::#mode,
                nullable: #nullable,
            }
        }
    });

    let getters = fields.iter().map(|FieldSpec { ident, name, .. }| {
        quote! {
            #name => ::core::option::Option::Some(::qbe::record::Value::from(
                ::core::clone::Clone::clone(&self.#ident)
            )),
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::qbe::record::Record for #struct_name #ty_generics #where_clause {
            const ENTITY: &'static str = #entity;
            const FIELDS: &'static [::qbe::record::Field] = &[#(#descriptors),*];
            const ID: &'static str = #id_name;

            #[inline]
            fn id(&self) -> ::qbe::record::Id {
                self.#id_ident
            }

            #[inline]
            fn with_id(self, id: ::qbe::record::Id) -> Self {
                Self { #id_ident: id, ..self }
            }

            #[inline]
            fn get(&self, field: &str) -> ::core::option::Option<::qbe::record::Value> {
                match field {
                    #(#getters)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Read `#[record(entity = "...")]` from the struct attributes.
fn entity(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut entity = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("entity") {
                let name = meta.value()?.parse::<LitStr>()?;
                if name.value().is_empty() {
                    return Err(Error::new_spanned(name, "entity name must not be empty"));
                }
                entity = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `entity`"))
            }
        })?;
    }
    Ok(entity)
}

/// Analyse one field: its type and its `#[record(...)]` attributes.
fn field_spec<'a>(ident: &'a Ident, ty: &Type, attrs: &[Attribute]) -> Result<FieldSpec<'a>> {
    let (inner, nullable) = match option_inner(ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };
    let kind = kind_of(inner).ok_or_else(|| {
        Error::new_spanned(
            ty,
            "unsupported field type, expected `String`, an integer type up to `i64`/`u32`, or an \
             `Option` of one",
        )
    })?;
    let is_i64 = !nullable && last_ident(inner).is_some_and(|ident| ident == "i64");

    let mut is_id = false;
    let mut mode = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                is_id = true;
                Ok(())
            } else if meta.path.is_ident("mode") {
                let value = meta.value()?.parse::<LitStr>()?;
                mode = Some(match value.value().as_str() {
                    "exact" => Mode::Exact,
                    "contains" => Mode::Contains,
                    "contains_ignore_case" => Mode::ContainsIgnoreCase,
                    _ => {
                        return Err(Error::new_spanned(
                            value,
                            "expected `exact`, `contains` or `contains_ignore_case`",
                        ));
                    },
                });
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `id` or `mode`"))
            }
        })?;
    }

    let mode = match (kind, mode) {
        (Kind::Int, None | Some(Mode::Exact)) => Mode::Exact,
        (Kind::Int, Some(_)) => {
            return Err(Error::new_spanned(
                ident,
                "integer fields only support the `exact` mode",
            ));
        },
        (Kind::Text, mode) => mode.unwrap_or(Mode::ContainsIgnoreCase),
    };

    Ok(FieldSpec {
        ident,
        name: ident.unraw().to_string(),
        kind,
        mode,
        nullable,
        is_id,
        is_i64,
    })
}

/// Find the identity field: the one marked `#[record(id)]`, else the one named `id`.
fn identity(struct_name: &Ident, fields: &[FieldSpec<'_>]) -> Result<usize> {
    let mut marked = fields
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.is_id);
    let id = match (marked.next(), marked.next()) {
        (Some(_), Some((_, second))) => {
            return Err(Error::new_spanned(
                second.ident,
                "only one field may be marked `#[record(id)]`",
            ));
        },
        (Some((index, _)), None) => index,
        (None, _) => fields
            .iter()
            .position(|spec| spec.name == "id")
            .ok_or_else(|| {
                Error::new_spanned(
                    struct_name,
                    "no identity field, add a field `id: i64` or mark one with `#[record(id)]`",
                )
            })?,
    };
    if fields[id].is_i64 {
        Ok(id)
    } else {
        Err(Error::new_spanned(
            fields[id].ident,
            "the identity field must be an `i64`",
        ))
    }
}

/// The `T` of an `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// The last path segment of a plain type path, e.g. `String` for `std::string::String`.
fn last_ident(ty: &Type) -> Option<&Ident> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    matches!(segment.arguments, PathArguments::None).then_some(&segment.ident)
}

/// The kind of a non-optional field type, if supported.
fn kind_of(ty: &Type) -> Option<Kind> {
    let ident = last_ident(ty)?.to_string();
    match ident.as_str() {
        "String" => Some(Kind::Text),
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Some(Kind::Int),
        _ => None,
    }
}
