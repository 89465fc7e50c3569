//! Explicit handler metadata.
//!
//! A [`HandlerSet`] is the candidate set the generator works on: handler types with their
//! methods, parameters and declarative [`Marker`]s, plus the [`TypeRegistry`] of composite types
//! those methods mention. It can be registered by hand through the builder-style methods below or
//! extracted from source with [`crate::extractor::SourceExtractor`].
//!
//! # Example
//!
//! ```
//! use apidoc_from_source::model::{HandlerMethod, HandlerSet, HandlerType, Marker, Param};
//! use apidoc_from_source::types::TypeRef;
//!
//! let mut set = HandlerSet::new();
//! set.add_handler(
//!     HandlerType::new("HomeController")
//!         .implementing("Controller")
//!         .with_marker(Marker::GenerateDoc)
//!         .with_method(
//!             HandlerMethod::new("query_something")
//!                 .with_param(Param::new("question", TypeRef::named("String"))),
//!         ),
//! );
//! assert_eq!(set.handlers().len(), 1);
//! ```

use crate::types::{EnumDef, StructDef, TypeRef, TypeRegistry};
use log::debug;

/// Declarative tags attached to handler types, methods, parameters and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `#[route("template")]`
    Route(String),
    /// `#[http_post]`
    HttpPost,
    /// `#[authorize]`
    Authorize,
    /// `#[generate_doc]`
    GenerateDoc,
    /// `#[produces(Type)]`
    Produces(TypeRef),
    /// `#[non_action]`
    NonAction,
    /// `#[deprecated]`
    Obsolete,
    /// `#[example_ignore]`
    ExampleIgnore,
    /// `#[required]`
    Required,
    /// `#[default_value]` on a parameter, `#[serde(default)]` on a field
    Default,
    /// `#[from_query(name = "...")]` and friends, `#[serde(rename = "...")]`
    NameOverride(String),
    /// `#[serde(flatten)]`
    Flatten,
    /// `#[serde(skip)]`
    SerdeSkip,
    /// Any other attribute, by name
    Custom(String),
}

pub fn has_marker(markers: &[Marker], wanted: &Marker) -> bool {
    markers.iter().any(|m| m == wanted)
}

/// Whether a `Custom` marker with this name is present
pub fn has_custom(markers: &[Marker], name: &str) -> bool {
    markers
        .iter()
        .any(|m| matches!(m, Marker::Custom(custom) if custom == name))
}

/// The first non-blank naming override.
pub fn name_override(markers: &[Marker]) -> Option<&str> {
    markers.iter().find_map(|m| match m {
        Marker::NameOverride(name) if !name.trim().is_empty() => Some(name.as_str()),
        _ => None,
    })
}

/// Route templates in declaration order
pub fn route_templates(markers: &[Marker]) -> impl Iterator<Item = &str> {
    markers.iter().filter_map(|m| match m {
        Marker::Route(template) => Some(template.as_str()),
        _ => None,
    })
}

/// Types named by `#[produces]`, in declaration order
pub fn produced_types(markers: &[Marker]) -> impl Iterator<Item = &TypeRef> {
    markers.iter().filter_map(|m| match m {
        Marker::Produces(ty) => Some(ty),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `pub`
    Public,
    /// Private or `pub(crate)`/`pub(super)`/`pub(in ..)`
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Takes `self` in some form
    Instance,
    /// Associated function without `self`
    Static,
}

/// Where a method was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOrigin {
    /// An inherent `impl Type { .. }` block
    Inherent,
    /// An `impl Trait for Type { .. }` block
    TraitImpl,
}

/// A handler method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub markers: Vec<Marker>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// A method declared on a handler type
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerMethod {
    pub name: String,
    pub visibility: Visibility,
    pub receiver: Receiver,
    pub origin: MethodOrigin,
    pub is_constructor: bool,
    pub markers: Vec<Marker>,
    pub params: Vec<Param>,
}

impl HandlerMethod {
    /// A public inherent instance method without markers or parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            receiver: Receiver::Instance,
            origin: MethodOrigin::Inherent,
            is_constructor: false,
            markers: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Restricted;
        self
    }

    /// Marks the method as an associated function without `self`
    pub fn associated(mut self) -> Self {
        self.receiver = Receiver::Static;
        self
    }

    pub fn constructor(mut self) -> Self {
        self.receiver = Receiver::Static;
        self.is_constructor = true;
        self
    }

    pub fn from_trait_impl(mut self) -> Self {
        self.origin = MethodOrigin::TraitImpl;
        self
    }

    pub fn has_marker(&self, marker: &Marker) -> bool {
        has_marker(&self.markers, marker)
    }
}

/// A candidate handler type
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerType {
    pub name: String,
    pub visibility: Visibility,
    /// Names of the traits this type implements
    pub traits: Vec<String>,
    pub markers: Vec<Marker>,
    pub methods: Vec<HandlerMethod>,
}

impl HandlerType {
    /// A public type with no traits, markers or methods
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            traits: Vec::new(),
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn implementing(mut self, trait_name: impl Into<String>) -> Self {
        self.traits.push(trait_name.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_method(mut self, method: HandlerMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Restricted;
        self
    }

    pub fn has_marker(&self, marker: &Marker) -> bool {
        has_marker(&self.markers, marker)
    }

    pub fn implements(&self, trait_name: &str) -> bool {
        self.traits.iter().any(|t| t == trait_name)
    }

    /// The type-level route template; only the first one counts
    pub fn route_template(&self) -> Option<&str> {
        route_templates(&self.markers).next()
    }
}

/// The candidate handler set plus the composite types it refers to.
#[derive(Debug, Clone, Default)]
pub struct HandlerSet {
    handlers: Vec<HandlerType>,
    types: TypeRegistry,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(&mut self, handler: HandlerType) {
        debug!("Adding handler candidate: {}", handler.name);
        self.handlers.push(handler);
    }

    pub fn with_handler(mut self, handler: HandlerType) -> Self {
        self.add_handler(handler);
        self
    }

    pub fn with_struct(mut self, def: StructDef) -> Self {
        self.types.register_struct(def);
        self
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.types.register_enum(def);
        self
    }

    /// Returns the handler named `name`, creating a restricted placeholder at the end if absent.
    ///
    /// Source extraction sees impl blocks and struct items in any order; this keeps one entry per
    /// type at the position where it was first mentioned.
    pub fn entry(&mut self, name: &str) -> &mut HandlerType {
        let index = match self.handlers.iter().position(|h| h.name == name) {
            Some(index) => index,
            None => {
                self.handlers.push(HandlerType::new(name).private());
                self.handlers.len() - 1
            }
        };
        &mut self.handlers[index]
    }

    pub fn handlers(&self) -> &[HandlerType] {
        &self.handlers
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }
}
