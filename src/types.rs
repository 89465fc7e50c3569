use crate::model::{self, Marker};
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// A type expression as written at a handler parameter, a struct field or a `#[produces]` marker.
///
/// Smart pointers and references are transparent: `Box<T>`, `Arc<T>` and `&T` all become `T`.
/// Sequences (`Vec<T>`, arrays, slices, sets) collapse into [`TypeRef::Seq`] and the common map
/// types into [`TypeRef::Map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A named type with its generic arguments, e.g. `AiurValue<i32>`
    Named { name: String, args: Vec<TypeRef> },
    /// `Option<T>`
    Option(Box<TypeRef>),
    /// `Vec<T>`, `[T; N]`, `&[T]`, `HashSet<T>`, ...
    Seq(Box<TypeRef>),
    /// `HashMap<K, V>` and `BTreeMap<K, V>`
    Map(Box<TypeRef>, Box<TypeRef>),
    /// Tuples; the empty tuple is the unit type
    Tuple(Vec<TypeRef>),
}

/// Leaf types the classifier and the synthesizer know without a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Bool,
    Char,
    Uuid,
    /// Zoned date-time (`DateTime<Tz>`, `OffsetDateTime`, `SystemTime`)
    DateTime,
    /// Date-time without an offset (`NaiveDateTime`, `PrimitiveDateTime`)
    NaiveDateTime,
    Date,
    Duration,
    /// An arbitrary JSON value
    Json,
}

impl TypeRef {
    /// Create a named type without generic arguments
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a named generic type, e.g. `AiurCollection<i32>`
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Create an `Option<T>`
    pub fn option(inner: TypeRef) -> Self {
        TypeRef::Option(Box::new(inner))
    }

    /// Create a sequence of `T`
    pub fn seq(inner: TypeRef) -> Self {
        TypeRef::Seq(Box::new(inner))
    }

    /// Create a map from `K` to `V`
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map(Box::new(key), Box::new(value))
    }

    /// The unit type `()`
    pub fn unit() -> Self {
        TypeRef::Tuple(Vec::new())
    }

    /// Parses Rust type syntax such as `"Option<Vec<String>>"`.
    pub fn parse(source: &str) -> syn::Result<TypeRef> {
        let ty: syn::Type = syn::parse_str(source)?;
        Ok(Self::from_syn(&ty))
    }

    /// Converts a `syn` type into a `TypeRef`.
    pub fn from_syn(ty: &syn::Type) -> TypeRef {
        match ty {
            syn::Type::Path(type_path) => Self::from_path(&type_path.path),
            syn::Type::Reference(type_ref) => Self::from_syn(&type_ref.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Slice(slice) => TypeRef::seq(Self::from_syn(&slice.elem)),
            syn::Type::Array(array) => TypeRef::seq(Self::from_syn(&array.elem)),
            syn::Type::Tuple(tuple) => TypeRef::Tuple(tuple.elems.iter().map(Self::from_syn).collect()),
            _ => {
                debug!("Unsupported type syntax, treating as Unknown");
                TypeRef::named("Unknown")
            }
        }
    }

    fn from_path(path: &syn::Path) -> TypeRef {
        let Some(segment) = path.segments.last() else {
            return TypeRef::named("Unknown");
        };
        let name = segment.ident.to_string();

        let mut args: Vec<TypeRef> = match &segment.arguments {
            syn::PathArguments::AngleBracketed(bracketed) => bracketed
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(inner) => Some(Self::from_syn(inner)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        match name.as_str() {
            "Option" if args.len() == 1 => TypeRef::option(args.remove(0)),
            "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet" | "BinaryHeap"
                if args.len() == 1 =>
            {
                TypeRef::seq(args.remove(0))
            }
            "Box" | "Rc" | "Arc" | "Cow" | "Cell" | "RefCell" | "Mutex" | "RwLock"
                if args.len() == 1 =>
            {
                args.remove(0)
            }
            "HashMap" | "BTreeMap" | "IndexMap" if args.len() == 2 => {
                let value = args.remove(1);
                let key = args.remove(0);
                TypeRef::map(key, value)
            }
            _ => TypeRef::Named {
                name: segment.ident.to_string(),
                args,
            },
        }
    }

    /// Strips every `Option` layer.
    pub fn without_option(&self) -> &TypeRef {
        let mut current = self;
        while let TypeRef::Option(inner) = current {
            current = inner;
        }
        current
    }

    pub fn is_option(&self) -> bool {
        matches!(self, TypeRef::Option(_))
    }

    /// The name of a `Named` type, if this is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Recognizes leaf types by their last path segment. `Option` is not unwrapped here.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            TypeRef::Named { name, .. } => ScalarType::from_name(name),
            _ => None,
        }
    }

    /// Replaces generic parameter names by their bound types.
    pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> TypeRef {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Named { name, args } if args.is_empty() => bindings
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeRef::Option(inner) => TypeRef::option(inner.substitute(bindings)),
            TypeRef::Seq(inner) => TypeRef::seq(inner.substitute(bindings)),
            TypeRef::Map(key, value) => {
                TypeRef::map(key.substitute(bindings), value.substitute(bindings))
            }
            TypeRef::Tuple(elems) => {
                TypeRef::Tuple(elems.iter().map(|e| e.substitute(bindings)).collect())
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Option(inner) => write!(f, "Option<{}>", inner),
            TypeRef::Seq(inner) => write!(f, "Vec<{}>", inner),
            TypeRef::Map(key, value) => write!(f, "HashMap<{}, {}>", key, value),
            TypeRef::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl ScalarType {
    /// Looks up a leaf type by its simple name
    pub fn from_name(name: &str) -> Option<ScalarType> {
        match name {
            "String" | "str" => Some(ScalarType::Text),
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => Some(ScalarType::Integer),
            "f32" | "f64" => Some(ScalarType::Float),
            "bool" => Some(ScalarType::Bool),
            "char" => Some(ScalarType::Char),
            "Uuid" => Some(ScalarType::Uuid),
            "DateTime" | "OffsetDateTime" | "SystemTime" => Some(ScalarType::DateTime),
            "NaiveDateTime" | "PrimitiveDateTime" => Some(ScalarType::NaiveDateTime),
            "NaiveDate" | "Date" => Some(ScalarType::Date),
            "Duration" | "TimeDelta" => Some(ScalarType::Duration),
            "Value" | "JsonValue" => Some(ScalarType::Json),
            _ => None,
        }
    }

    /// Date and date-time types
    pub fn is_datetime(self) -> bool {
        matches!(
            self,
            ScalarType::DateTime | ScalarType::NaiveDateTime | ScalarType::Date
        )
    }
}

/// A serde `rename_all` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    /// Parses the string serde accepts in `#[serde(rename_all = "...")]`
    pub fn from_serde(value: &str) -> Option<RenameRule> {
        match value {
            "lowercase" => Some(RenameRule::Lower),
            "UPPERCASE" => Some(RenameRule::Upper),
            "PascalCase" => Some(RenameRule::Pascal),
            "camelCase" => Some(RenameRule::Camel),
            "snake_case" => Some(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnake),
            "kebab-case" => Some(RenameRule::Kebab),
            "SCREAMING-KEBAB-CASE" => Some(RenameRule::ScreamingKebab),
            _ => None,
        }
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => field
                .split('_')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(""),
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply_to_field(field);
                lower_first(&pascal)
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }

    /// Applies the rule to a PascalCase variant name.
    pub fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => lower_first(variant),
            RenameRule::Snake => {
                let mut snake = String::new();
                for (i, ch) in variant.char_indices() {
                    if i > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.push(ch.to_ascii_lowercase());
                }
                snake
            }
            RenameRule::ScreamingSnake => RenameRule::Snake
                .apply_to_variant(variant)
                .to_ascii_uppercase(),
            RenameRule::Kebab => RenameRule::Snake.apply_to_variant(variant).replace('_', "-"),
            RenameRule::ScreamingKebab => RenameRule::ScreamingSnake
                .apply_to_variant(variant)
                .replace('_', "-"),
        }
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Definition of a composite type.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Struct(StructDef),
    Enum(EnumDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct(def) => &def.name,
            TypeDef::Enum(def) => &def.name,
        }
    }
}

/// How a struct's fields are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructShape {
    Named,
    /// Exactly one unnamed field; serialized as the field itself
    Newtype,
    Tuple,
    Unit,
}

/// Struct definition with fields
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Generic type parameter names, in declaration order
    pub generics: Vec<String>,
    pub shape: StructShape,
    pub fields: Vec<FieldDef>,
    /// `#[serde(rename_all = "...")]` on the struct
    pub rename_all: Option<RenameRule>,
}

impl StructDef {
    /// Starts a struct with named fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
            shape: StructShape::Named,
            fields: Vec::new(),
            rename_all: None,
        }
    }

    pub fn with_generic(mut self, param: impl Into<String>) -> Self {
        self.generics.push(param.into());
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_shape(mut self, shape: StructShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_rename_all(mut self, rule: RenameRule) -> Self {
        self.rename_all = Some(rule);
        self
    }

    /// Binds the generic parameters to the arguments of `ty`. Missing arguments stay unbound.
    pub fn bindings_for(&self, args: &[TypeRef]) -> HashMap<String, TypeRef> {
        self.generics
            .iter()
            .zip(args.iter())
            .map(|(param, arg)| (param.clone(), arg.clone()))
            .collect()
    }

    /// The name this field carries on the wire
    pub fn wire_name(&self, field: &FieldDef) -> String {
        if let Some(name) = model::name_override(&field.markers) {
            return name.to_string();
        }
        match self.rename_all {
            Some(rule) => rule.apply_to_field(&field.name),
            None => field.name.clone(),
        }
    }
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name; tuple fields are named by position ("0", "1", ...)
    pub name: String,
    pub ty: TypeRef,
    pub is_public: bool,
    pub markers: Vec<Marker>,
}

impl FieldDef {
    /// Creates a public field without markers
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_public: true,
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Whether serde leaves the field out entirely
    pub fn is_skipped(&self) -> bool {
        model::has_marker(&self.markers, &Marker::SerdeSkip)
    }
}

/// A single enum variant
#[derive(Debug, Clone)]
pub struct VariantDef {
    pub name: String,
    /// `#[serde(rename = "...")]` on the variant
    pub rename: Option<String>,
}

/// Enum definition with variants
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<VariantDef>,
    pub rename_all: Option<RenameRule>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            name: name.into(),
            variants: variants
                .iter()
                .map(|v| VariantDef {
                    name: v.to_string(),
                    rename: None,
                })
                .collect(),
            rename_all: None,
        }
    }

    /// Serialized name of a variant
    pub fn wire_name(&self, variant: &VariantDef) -> String {
        if let Some(rename) = &variant.rename {
            return rename.clone();
        }
        match self.rename_all {
            Some(rule) => rule.apply_to_variant(&variant.name),
            None => variant.name.clone(),
        }
    }
}

/// Registry of composite type definitions, keyed by simple name.
///
/// The first definition registered under a name wins; later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    defs: HashMap<String, TypeDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition. Returns `false` if the name was already taken.
    pub fn register(&mut self, def: TypeDef) -> bool {
        let name = def.name().to_string();
        if self.defs.contains_key(&name) {
            debug!("Type {} already registered, keeping the first definition", name);
            return false;
        }
        debug!("Registering type {}", name);
        self.defs.insert(name, def);
        true
    }

    pub fn register_struct(&mut self, def: StructDef) -> bool {
        self.register(TypeDef::Struct(def))
    }

    pub fn register_enum(&mut self, def: EnumDef) -> bool {
        self.register(TypeDef::Enum(def))
    }

    pub fn resolve(&self, name: &str) -> Option<&TypeDef> {
        self.defs.get(name)
    }

    /// Resolves `ty` (after stripping `Option`) to a struct definition, if it names one.
    pub fn resolve_struct(&self, ty: &TypeRef) -> Option<&StructDef> {
        match ty.without_option() {
            TypeRef::Named { name, .. } => match self.defs.get(name) {
                Some(TypeDef::Struct(def)) => Some(def),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
