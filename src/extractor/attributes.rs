//! Attribute parsing: from `#[...]` on items, fields and parameters to [`Marker`]s.

use crate::model::Marker;
use crate::types::{RenameRule, TypeRef};
use log::{debug, warn};
use syn::{Attribute, LitStr, Meta};

/// Attributes with no meaning for documentation
const IGNORED_ATTRIBUTES: [&str; 8] = [
    "doc", "derive", "allow", "warn", "deny", "cfg", "cfg_attr", "must_use",
];

/// Parameter binding attributes that may carry a `name = "..."` override
const BINDING_ATTRIBUTES: [&str; 5] = [
    "from_query",
    "from_form",
    "from_route",
    "from_header",
    "from_body",
];

/// What a `#[serde(...)]` list says about a field, variant or container
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SerdeAttributes {
    pub rename: Option<String>,
    pub rename_all: Option<RenameRule>,
    pub default: bool,
    pub flatten: bool,
    pub skip: bool,
}

/// Converts attributes into markers. Unrecognized attributes become [`Marker::Custom`].
pub fn parse_markers(attrs: &[Attribute]) -> Vec<Marker> {
    let mut markers = Vec::new();

    for attr in attrs {
        let Some(name) = attr_name(attr) else {
            continue;
        };
        match name.as_str() {
            n if IGNORED_ATTRIBUTES.contains(&n) => {}
            "route" => match attr.parse_args::<LitStr>() {
                Ok(template) => markers.push(Marker::Route(template.value())),
                Err(e) => warn!("Ignoring malformed #[route]: {}", e),
            },
            "http_post" | "post" => markers.push(Marker::HttpPost),
            "authorize" => markers.push(Marker::Authorize),
            "generate_doc" => markers.push(Marker::GenerateDoc),
            "produces" => match attr.parse_args::<syn::Type>() {
                Ok(ty) => markers.push(Marker::Produces(TypeRef::from_syn(&ty))),
                Err(e) => warn!("Ignoring malformed #[produces]: {}", e),
            },
            "non_action" => markers.push(Marker::NonAction),
            "deprecated" => markers.push(Marker::Obsolete),
            "example_ignore" => markers.push(Marker::ExampleIgnore),
            "required" => markers.push(Marker::Required),
            "default_value" => markers.push(Marker::Default),
            n if BINDING_ATTRIBUTES.contains(&n) => match binding_name(attr) {
                Some(bound) => markers.push(Marker::NameOverride(bound)),
                None => markers.push(Marker::Custom(name.clone())),
            },
            "serde" => {
                let serde = parse_serde(std::slice::from_ref(attr));
                if let Some(rename) = serde.rename {
                    markers.push(Marker::NameOverride(rename));
                }
                if serde.default {
                    markers.push(Marker::Default);
                }
                if serde.flatten {
                    markers.push(Marker::Flatten);
                }
                if serde.skip {
                    markers.push(Marker::SerdeSkip);
                }
            }
            _ => markers.push(Marker::Custom(name.clone())),
        }
    }

    markers
}

/// Merges every `#[serde(...)]` attribute in `attrs`.
///
/// Unknown keys are skipped. Only the serialize side of `rename(serialize = "..")` counts.
pub fn parse_serde(attrs: &[Attribute]) -> SerdeAttributes {
    let mut serde = SerdeAttributes::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    serde.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        let value = inner.value()?.parse::<LitStr>()?.value();
                        if inner.path.is_ident("serialize") {
                            serde.rename = Some(value);
                        }
                        Ok(())
                    })?;
                }
            } else if meta.path.is_ident("rename_all") {
                let value = meta.value()?.parse::<LitStr>()?.value();
                serde.rename_all = RenameRule::from_serde(&value);
                if serde.rename_all.is_none() {
                    warn!("Unknown serde rename_all rule: {}", value);
                }
            } else if meta.path.is_ident("default") {
                serde.default = true;
                skip_value(&meta)?;
            } else if meta.path.is_ident("flatten") {
                serde.flatten = true;
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde.skip = true;
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        });

        if let Err(e) = result {
            debug!("Could not fully parse serde attribute: {}", e);
        }
    }

    serde
}

/// Consumes `= value` or `(...)` after a key we do not interpret
fn skip_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}

/// `name = "..."` inside a binding attribute such as `#[from_query(name = "q")]`
fn binding_name(attr: &Attribute) -> Option<String> {
    if !matches!(attr.meta, Meta::List(_)) {
        return None;
    }
    let mut name = None;
    let result = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?.value());
        } else {
            skip_value(&meta)?;
        }
        Ok(())
    });
    if let Err(e) = result {
        warn!("Ignoring malformed binding attribute: {}", e);
    }
    name
}

fn attr_name(attr: &Attribute) -> Option<String> {
    attr.path().segments.last().map(|s| s.ident.to_string())
}
