//! Derive macro for typed row metadata.
//!
//! `#[derive(Row)]` turns a plain struct into a row type: a static table
//! description, one zero-sized column type per field, and the conversions
//! between the struct and SQL values.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, Meta, Type,
    Visibility,
};

/// Derives `RowType` for a struct with named fields.
///
/// # Attributes
///
/// - `#[table(name = "WIDGET")]` - SQL table name (optional, defaults to the
///   upper snake case of the struct name)
/// - `#[table(schema = "TEST")]` - schema (optional, defaults to the
///   database's default schema)
///
/// # Field Attributes
///
/// - `#[column(name = "WIDGET_ID")]` - SQL column name (optional, defaults to
///   the upper-cased field name)
/// - `#[column(primary_key)]` - part of the primary key
/// - `#[column(length = 100)]` - `varchar(100)` instead of the type default
/// - `#[column(sql_type = "xml")]` - a type spelled verbatim
/// - `#[column(references = "MANUFACTURER(MANUFACTURER_ID)")]` - foreign key;
///   the table may be schema-qualified
/// - `#[column(foreign_key = "FK_NAME")]` - constraint name for `references`
///   (defaults to `FK_<TABLE>_<REFERENCED TABLE>`); columns sharing a name form
///   one composite key
///
/// # Generated Items
///
/// For a struct `Widget`, this macro generates:
///
/// - `WidgetColumns` - a module with one column type per field (`WidgetId`,
///   `Name`, ...)
/// - `Widget::widget_id()`, ... - column accessors
/// - `impl RowType for Widget`
#[proc_macro_derive(Row, attributes(table, column))]
pub fn derive_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_row_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Row derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Row derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Row derive only supports structs",
            ));
        }
    };

    let table_attrs = parse_table_attrs(&input.attrs)?;
    let table_name = table_attrs
        .name
        .unwrap_or_else(|| to_snake_case(&struct_name.to_string()).to_uppercase());

    let mut columns: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        let column_name = attrs
            .name
            .clone()
            .unwrap_or_else(|| field_name.to_string().to_uppercase());
        columns.push(ColumnInfo {
            type_name: format_ident!("{}", to_pascal_case(&field_name.to_string())),
            field_name,
            field_type: field.ty.clone(),
            column_name,
            attrs,
        });
    }

    let foreign_keys = collect_foreign_keys(&table_name, &columns)?;
    let columns_mod_name = format_ident!("{}Columns", struct_name);
    let core = quote!(::oxide_query_core);
    let column_vis = nested_visibility(vis);

    let column_structs = columns.iter().map(|info| {
        let type_name = &info.type_name;
        let field_type = &info.field_type;
        let column_name = &info.column_name;
        quote! {
            /// Column type for compile-time checked queries.
            #[derive(Debug, Clone, Copy)]
            #column_vis struct #type_name;

            impl #core::schema::Column for #type_name {
                type Row = super::#struct_name;
                type Type = #field_type;

                const NAME: &'static str = #column_name;
            }
        }
    });

    let column_accessors = columns.iter().map(|info| {
        let method_name = &info.field_name;
        let type_name = &info.type_name;
        quote! {
            /// Returns the column type for type-safe queries.
            #[inline]
            #vis const fn #method_name() -> #columns_mod_name::#type_name {
                #columns_mod_name::#type_name
            }
        }
    });

    let column_defs = columns.iter().map(|info| {
        let column_name = &info.column_name;
        let field_type = &info.field_type;
        let data_type = match (&info.attrs.sql_type, info.attrs.length) {
            (Some(sql_type), _) => quote! {
                #core::schema::DataType::Custom(::std::borrow::Cow::Borrowed(#sql_type))
            },
            (None, Some(length)) => quote! { #core::schema::DataType::Varchar(#length) },
            (None, None) => quote! { <#field_type as #core::schema::SqlType>::DATA_TYPE },
        };
        quote! {
            #core::schema::ColumnDef {
                name: #column_name,
                data_type: #data_type,
                nullable: <#field_type as #core::schema::SqlType>::NULLABLE,
            }
        }
    });

    let primary_key: Vec<&str> = columns
        .iter()
        .filter(|c| c.attrs.primary_key)
        .map(|c| c.column_name.as_str())
        .collect();

    let foreign_key_defs = foreign_keys.iter().map(|fk| {
        let name = &fk.name;
        let fk_columns = &fk.columns;
        let referenced_table = &fk.referenced_table;
        let referenced_columns = &fk.referenced_columns;
        let referenced_schema = option_tokens(fk.referenced_schema.as_deref());
        quote! {
            #core::schema::ForeignKeyDef {
                name: #name,
                columns: &[#(#fk_columns),*],
                referenced_schema: #referenced_schema,
                referenced_table: #referenced_table,
                referenced_columns: &[#(#referenced_columns),*],
            }
        }
    });

    let schema = option_tokens(table_attrs.schema.as_deref());

    let values = columns.iter().map(|info| {
        let field_name = &info.field_name;
        quote! {
            #core::builder::ToSqlValue::to_sql_value(::std::clone::Clone::clone(&self.#field_name))
        }
    });

    let from_row_fields = columns.iter().map(|info| {
        let field_name = &info.field_name;
        let field_type = &info.field_type;
        let column_name = &info.column_name;
        quote! {
            #field_name: row.get::<#field_type>(&#core::schema::column_label(prefix, #column_name))?
        }
    });

    let expanded = quote! {
        /// Column types, one per field.
        #[allow(non_snake_case)]
        #vis mod #columns_mod_name {
            #[allow(unused_imports)]
            use super::*;

            #(#column_structs)*
        }

        impl #struct_name {
            #(#column_accessors)*
        }

        impl #core::schema::RowType for #struct_name {
            fn table() -> &'static #core::schema::TableDef {
                static TABLE: #core::schema::TableDef = #core::schema::TableDef {
                    schema: #schema,
                    name: #table_name,
                    columns: &[#(#column_defs),*],
                    primary_key: &[#(#primary_key),*],
                    foreign_keys: &[#(#foreign_key_defs),*],
                };
                &TABLE
            }

            fn values(&self) -> ::std::vec::Vec<#core::builder::SqlValue> {
                ::std::vec![#(#values),*]
            }

            fn from_row(
                row: &#core::executor::SqlRow,
                prefix: &str,
            ) -> #core::error::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#from_row_fields),*
                })
            }
        }
    };

    Ok(expanded)
}

/// The visibility that, written one module down, matches `vis` in the
/// struct's own module.
fn nested_visibility(vis: &Visibility) -> TokenStream2 {
    match vis {
        Visibility::Public(_) => quote!(pub),
        Visibility::Inherited => quote!(pub(super)),
        Visibility::Restricted(restricted) => {
            let path = &restricted.path;
            if path.is_ident("crate") {
                quote!(pub(crate))
            } else if path.is_ident("self") {
                quote!(pub(super))
            } else if path.leading_colon.is_none()
                && path.segments.first().is_some_and(|s| s.ident == "crate")
            {
                quote!(pub(in #path))
            } else {
                quote!(pub(in super::#path))
            }
        }
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(v) => quote! { ::std::option::Option::Some(#v) },
        None => quote! { ::std::option::Option::None },
    }
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    type_name: Ident,
    column_name: String,
    attrs: ColumnAttrs,
}

#[derive(Default)]
struct TableAttrs {
    name: Option<String>,
    schema: Option<String>,
}

#[derive(Default, Clone)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    length: Option<u32>,
    sql_type: Option<String>,
    references: Option<LitStr>,
    foreign_key: Option<String>,
}

struct ForeignKeyInfo {
    name: String,
    columns: Vec<String>,
    referenced_schema: Option<String>,
    referenced_table: String,
    referenced_columns: Vec<String>,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<LitStr> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_table_attrs(attrs: &[Attribute]) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?.value());
                } else if meta.path.is_ident("schema") {
                    result.schema = Some(string_value(&meta)?.value());
                } else {
                    return Err(meta.error("unknown table attribute"));
                }
                Ok(())
            })?;
        }
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?.value());
                } else if meta.path.is_ident("length") {
                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(syn::ExprLit {
                            lit: Lit::Int(n), ..
                        }) => result.length = Some(n.base10_parse()?),
                        other => {
                            return Err(syn::Error::new_spanned(other, "expected an integer"));
                        }
                    }
                } else if meta.path.is_ident("sql_type") {
                    result.sql_type = Some(string_value(&meta)?.value());
                } else if meta.path.is_ident("references") {
                    result.references = Some(string_value(&meta)?);
                } else if meta.path.is_ident("foreign_key") {
                    result.foreign_key = Some(string_value(&meta)?.value());
                } else {
                    return Err(meta.error("unknown column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

/// Parses `TABLE(COL)` or `SCHEMA.TABLE(COL)`.
fn parse_reference(reference: &LitStr) -> syn::Result<(Option<String>, String, String)> {
    let value = reference.value();
    let error = || {
        syn::Error::new_spanned(
            reference,
            "expected `TABLE(COLUMN)` or `SCHEMA.TABLE(COLUMN)`",
        )
    };
    let (table, column) = value.split_once('(').ok_or_else(error)?;
    let column = column.strip_suffix(')').ok_or_else(error)?.trim();
    let table = table.trim();
    if table.is_empty() || column.is_empty() {
        return Err(error());
    }
    match table.split_once('.') {
        Some((schema, table)) => Ok((
            Some(schema.to_string()),
            table.to_string(),
            column.to_string(),
        )),
        None => Ok((None, table.to_string(), column.to_string())),
    }
}

fn collect_foreign_keys(table_name: &str, columns: &[ColumnInfo]) -> syn::Result<Vec<ForeignKeyInfo>> {
    let mut keys: Vec<ForeignKeyInfo> = Vec::new();
    for info in columns {
        let Some(reference) = &info.attrs.references else {
            if info.attrs.foreign_key.is_some() {
                return Err(syn::Error::new_spanned(
                    &info.field_name,
                    "`foreign_key` needs `references`",
                ));
            }
            continue;
        };
        let (schema, table, column) = parse_reference(reference)?;
        let name = info
            .attrs
            .foreign_key
            .clone()
            .unwrap_or_else(|| format!("FK_{table_name}_{table}"));

        if let Some(existing) = keys.iter_mut().find(|k| k.name == name) {
            if existing.referenced_table != table || existing.referenced_schema != schema {
                return Err(syn::Error::new_spanned(
                    reference,
                    format!("foreign key `{name}` references more than one table"),
                ));
            }
            existing.columns.push(info.column_name.clone());
            existing.referenced_columns.push(column);
        } else {
            keys.push(ForeignKeyInfo {
                name,
                columns: vec![info.column_name.clone()],
                referenced_schema: schema,
                referenced_table: table,
                referenced_columns: vec![column],
            });
        }
    }
    Ok(keys)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
