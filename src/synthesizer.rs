use crate::model::{self, Marker};
use crate::types::{EnumDef, ScalarType, StructDef, StructShape, TypeDef, TypeRef, TypeRegistry};
use chrono::Utc;
use log::debug;
use serde_json::{json, Map, Value};
use std::fmt;
use uuid::Uuid;

/// The literal every text value is synthesized as
pub const EXAMPLE_STRING: &str = "an example string.";

/// Every duration is synthesized as 37 minutes
pub const EXAMPLE_DURATION_SECS: u64 = 37 * 60;

/// How many composite types may nest inside one example
pub const DEFAULT_DEPTH_LIMIT: usize = 16;

/// Largest depth limit settings accept; deeper recursion risks the stack
pub const MAX_DEPTH_LIMIT: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// A named type that is neither a known scalar nor registered
    UnknownType(String),
    /// Composite nesting went past the configured limit
    DepthExceeded { type_name: String, limit: usize },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::UnknownType(name) => {
                write!(f, "type '{}' is neither a known scalar nor registered", name)
            }
            SynthesisError::DepthExceeded { type_name, limit } => write!(
                f,
                "nesting deeper than {} levels while building '{}'",
                limit, type_name
            ),
        }
    }
}

impl std::error::Error for SynthesisError {}

/// `hh:mm:ss` rendition of [`EXAMPLE_DURATION_SECS`]
pub fn example_duration() -> String {
    let secs = EXAMPLE_DURATION_SECS;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn scalar_example(scalar: ScalarType) -> Value {
    match scalar {
        ScalarType::Text => json!(EXAMPLE_STRING),
        ScalarType::Integer => json!(0),
        ScalarType::Float => json!(0.0),
        ScalarType::Bool => json!(true),
        ScalarType::Char => json!("a"),
        ScalarType::Uuid => json!(Uuid::new_v4().to_string()),
        ScalarType::DateTime => json!(Utc::now().to_rfc3339()),
        ScalarType::NaiveDateTime => json!(Utc::now()
            .naive_utc()
            .format("%Y-%m-%dT%H:%M:%S%.f")
            .to_string()),
        ScalarType::Date => json!(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        ScalarType::Duration => json!(example_duration()),
        ScalarType::Json => Value::Null,
    }
}

/// JSON object keys must be strings; other key examples use their JSON text.
fn map_key(key: Value) -> String {
    match key {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Builds representative example values for types, the way serde would serialize them.
///
/// Composite types are looked up in the registry and populated field by field. Sequences and
/// maps receive exactly one element. Fields marked `#[example_ignore]` or `#[serde(skip)]` are
/// left out, which is also the only way to stop a self-referential type before the depth limit.
pub struct InstanceMaker<'a> {
    types: &'a TypeRegistry,
    depth_limit: usize,
}

impl<'a> InstanceMaker<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self {
            types,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    /// Synthesizes an example of `ty`
    pub fn make(&self, ty: &TypeRef) -> Result<Value, SynthesisError> {
        debug!("Synthesizing example for {}", ty);
        self.make_at(ty, 0)
    }

    fn make_at(&self, ty: &TypeRef, depth: usize) -> Result<Value, SynthesisError> {
        match ty {
            TypeRef::Option(inner) => self.make_at(inner, depth),
            TypeRef::Seq(inner) => Ok(Value::Array(vec![self.make_at(inner, depth)?])),
            TypeRef::Map(key, value) => {
                let mut object = Map::new();
                object.insert(
                    map_key(self.make_at(key, depth)?),
                    self.make_at(value, depth)?,
                );
                Ok(Value::Object(object))
            }
            TypeRef::Tuple(elems) if elems.is_empty() => Ok(Value::Null),
            TypeRef::Tuple(elems) => elems
                .iter()
                .map(|elem| self.make_at(elem, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            // Registered definitions shadow scalars of the same name
            TypeRef::Named { name, args } => match self.types.resolve(name) {
                Some(TypeDef::Struct(def)) => self.make_struct(def, args, depth + 1),
                Some(TypeDef::Enum(def)) => Ok(enum_example(def)),
                None => match ScalarType::from_name(name) {
                    Some(scalar) => Ok(scalar_example(scalar)),
                    None => Err(SynthesisError::UnknownType(name.clone())),
                },
            },
        }
    }

    fn make_struct(
        &self,
        def: &StructDef,
        args: &[TypeRef],
        depth: usize,
    ) -> Result<Value, SynthesisError> {
        if depth > self.depth_limit {
            return Err(SynthesisError::DepthExceeded {
                type_name: def.name.clone(),
                limit: self.depth_limit,
            });
        }

        let bindings = def.bindings_for(args);
        let mut fields = def
            .fields
            .iter()
            .filter(|f| !f.is_skipped() && !model::has_marker(&f.markers, &Marker::ExampleIgnore));

        match def.shape {
            StructShape::Unit => Ok(Value::Null),
            StructShape::Newtype => match fields.next() {
                Some(field) => self.make_at(&field.ty.substitute(&bindings), depth),
                None => Ok(Value::Null),
            },
            StructShape::Tuple => fields
                .map(|field| self.make_at(&field.ty.substitute(&bindings), depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            StructShape::Named => {
                let mut object = Map::new();
                for field in fields {
                    let value = self.make_at(&field.ty.substitute(&bindings), depth)?;
                    match value {
                        Value::Object(inner)
                            if model::has_marker(&field.markers, &Marker::Flatten) =>
                        {
                            object.extend(inner);
                        }
                        value => {
                            object.insert(def.wire_name(field), value);
                        }
                    }
                }
                Ok(Value::Object(object))
            }
        }
    }
}

fn enum_example(def: &EnumDef) -> Value {
    match def.variants.first() {
        Some(variant) => Value::String(def.wire_name(variant)),
        None => Value::Null,
    }
}
