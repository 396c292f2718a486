use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{
    Expr, ExprLit, Field, Fields, Ident, ItemStruct, Lit, Meta, Path, Token, parse_macro_input,
    parse_str, punctuated::Punctuated,
};

struct BaseEntityConfig {
    traits_path: Path,
    active_model_ident: Ident,
    id_field: Ident,
    created_at_field: Ident,
    updated_at_field: Ident,
    audited: bool,
}

impl Default for BaseEntityConfig {
    fn default() -> Self {
        Self {
            traits_path: parse_str("crate::db::dao::base_traits")
                .expect("default traits path should parse"),
            active_model_ident: ident("ActiveModel"),
            id_field: ident("id"),
            created_at_field: ident("created_at"),
            updated_at_field: ident("updated_at"),
            audited: false,
        }
    }
}

fn ident(name: &str) -> Ident {
    Ident::new(name, proc_macro2::Span::call_site())
}

/// Injects the primary key and timestamp columns shared by every table.
///
/// `#[base_entity(audited)]` additionally injects `created_by`, `updated_by`
/// and a soft-delete `is_active` flag, and implements `AuditedActiveModel`.
#[proc_macro_attribute]
pub fn base_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated<Meta, Token![,]>::parse_terminated);
    let mut config = BaseEntityConfig::default();
    if let Err(err) = apply_args(&mut config, args) {
        return err.to_compile_error().into();
    }

    let mut input = parse_macro_input!(item as ItemStruct);
    let fields = match &mut input.fields {
        Fields::Named(fields) => fields,
        _ => {
            return syn::Error::new_spanned(
                input,
                "base_entity requires a struct with named fields",
            )
            .to_compile_error()
            .into();
        }
    };

    let existing: HashSet<String> = fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
        .collect();
    let missing = |name: &Ident| !existing.contains(&name.to_string());

    let mut leading: Vec<Field> = Vec::new();
    let mut trailing: Vec<Field> = Vec::new();

    if missing(&config.id_field) {
        let id_ident = &config.id_field;
        leading.push(syn::parse_quote! {
            #[sea_orm(primary_key, auto_increment = false)]
            pub #id_ident: uuid::Uuid
        });
    }

    for name in [&config.created_at_field, &config.updated_at_field] {
        if missing(name) {
            leading.push(syn::parse_quote! {
                #[sea_orm(default_expr = "Expr::current_timestamp()")]
                pub #name: sea_orm::entity::prelude::DateTimeWithTimeZone
            });
        }
    }

    if config.audited {
        for name in ["created_by", "updated_by"] {
            let name = ident(name);
            if missing(&name) {
                trailing.push(syn::parse_quote! {
                    pub #name: Option<uuid::Uuid>
                });
            }
        }
        let active = ident("is_active");
        if missing(&active) {
            trailing.push(syn::parse_quote! {
                #[sea_orm(default_value = true)]
                pub #active: bool
            });
        }
    }

    // Relation fields stay last so the generated columns precede them.
    let (relations, columns): (Vec<Field>, Vec<Field>) =
        fields.named.iter().cloned().partition(is_relation_field);

    let mut new_fields = Punctuated::new();
    for field in leading
        .into_iter()
        .chain(columns)
        .chain(trailing)
        .chain(relations)
    {
        new_fields.push(field);
    }
    fields.named = new_fields;

    let traits_path = config.traits_path;
    let active_model = config.active_model_ident;
    let id_field = config.id_field;
    let created_at_field = config.created_at_field;
    let updated_at_field = config.updated_at_field;

    let audit_impl = if config.audited {
        quote! {
            impl #traits_path::AuditedActiveModel for #active_model {
                fn set_created_by(&mut self, actor: Option<uuid::Uuid>) {
                    self.created_by = sea_orm::ActiveValue::Set(actor);
                }

                fn set_updated_by(&mut self, actor: Option<uuid::Uuid>) {
                    self.updated_by = sea_orm::ActiveValue::Set(actor);
                }

                fn set_is_active(&mut self, active: bool) {
                    self.is_active = sea_orm::ActiveValue::Set(active);
                }
            }
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        #input

        impl #traits_path::HasIdActiveModel for #active_model {
            fn set_id(&mut self, id: uuid::Uuid) {
                self.#id_field = sea_orm::ActiveValue::Set(id);
            }
        }

        impl #traits_path::TimestampedActiveModel for #active_model {
            fn set_created_at(
                &mut self,
                ts: sea_orm::entity::prelude::DateTimeWithTimeZone,
            ) {
                self.#created_at_field = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(
                &mut self,
                ts: sea_orm::entity::prelude::DateTimeWithTimeZone,
            ) {
                self.#updated_at_field = sea_orm::ActiveValue::Set(ts);
            }
        }

        impl #traits_path::HasCreatedAtColumn for Entity {
            fn created_at_column() -> Column {
                Column::CreatedAt
            }
        }

        #audit_impl
    };

    expanded.into()
}

fn is_relation_field(field: &Field) -> bool {
    let syn::Type::Path(type_path) = &field.ty else {
        return false;
    };
    type_path
        .path
        .segments
        .last()
        .map(|segment| segment.ident == "HasOne" || segment.ident == "HasMany")
        .unwrap_or(false)
}

fn apply_args(
    config: &mut BaseEntityConfig,
    args: Punctuated<Meta, Token![,]>,
) -> Result<(), syn::Error> {
    for meta in args {
        let name_value = match meta {
            Meta::Path(path) if path.is_ident("audited") => {
                config.audited = true;
                continue;
            }
            Meta::NameValue(name_value) => name_value,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected `audited` or a name-value pair, e.g. traits = \"path::to::traits\"",
                ));
            }
        };

        let Some(key) = name_value.path.get_ident() else {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "expected simple identifier for attribute key",
            ));
        };

        let value = match name_value.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) => lit_str,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected string literal for attribute value",
                ));
            }
        };

        match key.to_string().as_str() {
            "traits" => {
                config.traits_path = value.parse::<Path>().map_err(|err| {
                    syn::Error::new(value.span(), format!("invalid traits path: {err}"))
                })?;
            }
            "active_model" => {
                config.active_model_ident = Ident::new(&value.value(), value.span());
            }
            "id" => {
                config.id_field = Ident::new(&value.value(), value.span());
            }
            "created_at" => {
                config.created_at_field = Ident::new(&value.value(), value.span());
            }
            "updated_at" => {
                config.updated_at_field = Ident::new(&value.value(), value.span());
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    key,
                    "unknown base_entity attribute key",
                ));
            }
        }
    }

    Ok(())
}
