use crate::model::{self, Marker, Param};
use crate::types::{ScalarType, StructShape, TypeRef, TypeRegistry};
use log::debug;
use serde::Serialize;

/// Framework wrappers whose inner type carries the actual arguments
const EXTRACTOR_WRAPPERS: [&str; 5] = ["Query", "Form", "Json", "Path", "Header"];

/// Semantic kind of an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArgumentKind {
    Text,
    Number,
    Boolean,
    Datetime,
    Collection,
    Unknown,
}

/// One documented input of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Argument {
    pub name: String,
    pub required: bool,
    #[serde(rename = "Type")]
    pub kind: ArgumentKind,
}

/// Maps a type to its argument kind. Total: anything unmapped is `Unknown`.
pub fn classify_kind(ty: &TypeRef) -> ArgumentKind {
    match ty.without_option() {
        TypeRef::Seq(inner) if inner.scalar() == Some(ScalarType::Text) => ArgumentKind::Collection,
        other => match other.scalar() {
            Some(ScalarType::Integer) => ArgumentKind::Number,
            Some(ScalarType::Text) => ArgumentKind::Text,
            Some(ScalarType::Bool) => ArgumentKind::Boolean,
            Some(scalar) if scalar.is_datetime() => ArgumentKind::Datetime,
            _ => ArgumentKind::Unknown,
        },
    }
}

/// Non-optional integers, date-times and booleans must always be supplied.
fn is_required_by_type(ty: &TypeRef) -> bool {
    match ty.scalar() {
        Some(ScalarType::Integer) | Some(ScalarType::Bool) => true,
        Some(scalar) => scalar.is_datetime(),
        None => false,
    }
}

/// Required unless a default is declared; then by marker or by the value-type rule.
pub fn judge_required(ty: &TypeRef, markers: &[Marker]) -> bool {
    if model::has_marker(markers, &Marker::Default) {
        return false;
    }
    model::has_marker(markers, &Marker::Required) || is_required_by_type(ty)
}

/// Strips `Query<T>`, `Form<T>`, `Json<T>`, `Path<T>` and `Header<T>`.
pub fn unwrap_extractor(ty: &TypeRef) -> &TypeRef {
    match ty {
        TypeRef::Named { name, args }
            if args.len() == 1 && EXTRACTOR_WRAPPERS.contains(&name.as_str()) =>
        {
            &args[0]
        }
        _ => ty,
    }
}

/// Turns handler parameters into documented arguments.
///
/// Scalar-like parameters become one argument each. A parameter whose type is a struct with
/// named fields is flattened one level into its public fields; fields of composite type are not
/// expanded further and classify as `Unknown`.
pub struct ArgumentClassifier<'a> {
    types: &'a TypeRegistry,
}

impl<'a> ArgumentClassifier<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self { types }
    }

    pub fn classify(&self, params: &[Param]) -> Vec<Argument> {
        let mut arguments = Vec::new();
        for param in params {
            self.classify_param(param, &mut arguments);
        }
        arguments
    }

    fn classify_param(&self, param: &Param, arguments: &mut Vec<Argument>) {
        let ty = unwrap_extractor(&param.ty);

        match self.types.resolve_struct(ty) {
            Some(def) if def.shape == StructShape::Named => {
                debug!("Flattening parameter {} of type {}", param.name, ty);
                let type_args = match ty.without_option() {
                    TypeRef::Named { args, .. } => args.as_slice(),
                    _ => &[],
                };
                let bindings = def.bindings_for(type_args);

                for field in def.fields.iter().filter(|f| f.is_public && !f.is_skipped()) {
                    let field_ty = field.ty.substitute(&bindings);
                    arguments.push(Argument {
                        name: def.wire_name(field),
                        required: judge_required(&field_ty, &field.markers),
                        kind: classify_kind(&field_ty),
                    });
                }
            }
            _ => {
                let name = model::name_override(&param.markers).unwrap_or(&param.name);
                arguments.push(Argument {
                    name: name.to_string(),
                    required: judge_required(ty, &param.markers),
                    kind: classify_kind(ty),
                });
            }
        }
    }
}
