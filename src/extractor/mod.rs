//! Handler extraction from parsed Rust sources.
//!
//! Source code stands in for runtime reflection here. Structs and enums become type definitions
//! in the [`TypeRegistry`](crate::types::TypeRegistry); structs and impl blocks become handler
//! candidates with their methods, parameters and markers (see [`attributes`]). Which candidates
//! are real handlers is decided later by [`Discovery`](crate::discovery::Discovery).
//!
//! # Example
//!
//! ```no_run
//! use apidoc_from_source::extractor::{HandlerExtractor, SourceExtractor};
//! use apidoc_from_source::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/controllers/home.rs")).unwrap();
//! let handlers = SourceExtractor.extract_handlers(&[parsed]);
//! println!("Found {} candidate types", handlers.handlers().len());
//! ```

pub mod attributes;

use crate::model::{HandlerMethod, HandlerSet, MethodOrigin, Param, Receiver, Visibility};
use crate::parser::ParsedFile;
use crate::types::{EnumDef, FieldDef, StructDef, StructShape, TypeRef, VariantDef};
use attributes::{parse_markers, parse_serde};
use log::debug;
use syn::visit::Visit;

/// Trait for building the candidate handler set from parsed files.
pub trait HandlerExtractor {
    /// Extracts handlers and type definitions from all files, in file order.
    fn extract_handlers(&self, parsed_files: &[ParsedFile]) -> HandlerSet;
}

/// Extracts handlers declared with the attribute vocabulary of this crate
pub struct SourceExtractor;

impl HandlerExtractor for SourceExtractor {
    fn extract_handlers(&self, parsed_files: &[ParsedFile]) -> HandlerSet {
        let mut visitor = HandlerVisitor::default();
        for parsed_file in parsed_files {
            debug!("Extracting handlers from {}", parsed_file.path.display());
            visitor.visit_file(&parsed_file.syntax_tree);
        }
        debug!(
            "Extracted {} candidate types and {} type definitions",
            visitor.set.handlers().len(),
            visitor.set.types().len()
        );
        visitor.set
    }
}

#[derive(Default)]
struct HandlerVisitor {
    set: HandlerSet,
}

impl HandlerVisitor {
    fn record_struct(&mut self, item: &syn::ItemStruct) {
        let name = item.ident.to_string();
        let serde = parse_serde(&item.attrs);

        let (shape, fields) = match &item.fields {
            syn::Fields::Named(named) => (
                StructShape::Named,
                named.named.iter().enumerate().map(convert_field).collect(),
            ),
            syn::Fields::Unnamed(unnamed) => (
                if unnamed.unnamed.len() == 1 {
                    StructShape::Newtype
                } else {
                    StructShape::Tuple
                },
                unnamed.unnamed.iter().enumerate().map(convert_field).collect(),
            ),
            syn::Fields::Unit => (StructShape::Unit, Vec::new()),
        };

        let mut def = StructDef::new(&name).with_shape(shape);
        def.fields = fields;
        def.rename_all = serde.rename_all;
        def.generics = item
            .generics
            .type_params()
            .map(|param| param.ident.to_string())
            .collect();
        self.set.types_mut().register_struct(def);

        let handler = self.set.entry(&name);
        handler.visibility = convert_visibility(&item.vis);
        handler.markers.extend(parse_markers(&item.attrs));
    }

    fn record_enum(&mut self, item: &syn::ItemEnum) {
        let serde = parse_serde(&item.attrs);
        let mut def = EnumDef::new(item.ident.to_string(), &[]);
        def.rename_all = serde.rename_all;
        def.variants = item
            .variants
            .iter()
            .filter_map(|variant| {
                let serde = parse_serde(&variant.attrs);
                (!serde.skip).then(|| VariantDef {
                    name: variant.ident.to_string(),
                    rename: serde.rename,
                })
            })
            .collect();
        self.set.types_mut().register_enum(def);
    }

    fn record_impl(&mut self, item: &syn::ItemImpl) {
        let Some(type_name) = self_type_name(&item.self_ty) else {
            return;
        };

        let origin = match &item.trait_ {
            Some((_, path, _)) => {
                if let Some(segment) = path.segments.last() {
                    let trait_name = segment.ident.to_string();
                    debug!("{} implements {}", type_name, trait_name);
                    let handler = self.set.entry(&type_name);
                    if !handler.implements(&trait_name) {
                        handler.traits.push(trait_name);
                    }
                }
                MethodOrigin::TraitImpl
            }
            None => MethodOrigin::Inherent,
        };

        let methods: Vec<HandlerMethod> = item
            .items
            .iter()
            .filter_map(|impl_item| match impl_item {
                syn::ImplItem::Fn(method) => Some(convert_method(method, origin, &type_name)),
                _ => None,
            })
            .collect();

        self.set.entry(&type_name).methods.extend(methods);
    }
}

impl<'ast> Visit<'ast> for HandlerVisitor {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.record_struct(node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.record_enum(node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        self.record_impl(node);
    }

    // Items nested in function bodies are not part of the API surface
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}
}

fn convert_visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        _ => Visibility::Restricted,
    }
}

fn convert_field((index, field): (usize, &syn::Field)) -> FieldDef {
    let name = match &field.ident {
        Some(ident) => ident.to_string(),
        None => index.to_string(),
    };
    let mut def = FieldDef::new(name, TypeRef::from_syn(&field.ty));
    def.is_public = matches!(field.vis, syn::Visibility::Public(_));
    def.markers = parse_markers(&field.attrs);
    def
}

fn convert_method(method: &syn::ImplItemFn, origin: MethodOrigin, type_name: &str) -> HandlerMethod {
    let sig = &method.sig;
    let receiver = if sig.receiver().is_some() {
        Receiver::Instance
    } else {
        Receiver::Static
    };

    let params = sig
        .inputs
        .iter()
        .enumerate()
        .filter_map(|(index, input)| match input {
            syn::FnArg::Typed(pat_type) => {
                let name = pattern_name(&pat_type.pat).unwrap_or_else(|| format!("arg{}", index));
                let mut param = Param::new(name, TypeRef::from_syn(&pat_type.ty));
                param.markers = parse_markers(&pat_type.attrs);
                Some(param)
            }
            syn::FnArg::Receiver(_) => None,
        })
        .collect();

    HandlerMethod {
        name: sig.ident.to_string(),
        visibility: convert_visibility(&method.vis),
        receiver,
        origin,
        is_constructor: receiver == Receiver::Static && returns_self(sig, type_name),
        markers: parse_markers(&method.attrs),
        params,
    }
}

/// The binding name of a parameter pattern, looking through `Query(q)`-style destructuring
fn pattern_name(pat: &syn::Pat) -> Option<String> {
    match pat {
        syn::Pat::Ident(ident) => Some(ident.ident.to_string()),
        syn::Pat::TupleStruct(tuple) if tuple.elems.len() == 1 => pattern_name(&tuple.elems[0]),
        syn::Pat::Type(typed) => pattern_name(&typed.pat),
        syn::Pat::Reference(reference) => pattern_name(&reference.pat),
        _ => None,
    }
}

fn returns_self(sig: &syn::Signature, type_name: &str) -> bool {
    match &sig.output {
        syn::ReturnType::Type(_, ty) => match TypeRef::from_syn(ty) {
            TypeRef::Named { name, .. } => name == "Self" || name == type_name,
            _ => false,
        },
        syn::ReturnType::Default => false,
    }
}

fn self_type_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}
