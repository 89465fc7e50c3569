use crate::model::{HandlerMethod, HandlerSet, HandlerType, Marker, MethodOrigin, Receiver, Visibility};
use crate::settings::DocSettings;
use log::debug;
use std::collections::HashSet;

/// A documentable method together with the handler type that declares it
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub handler: &'a HandlerType,
    pub method: &'a HandlerMethod,
}

/// Selects the documentable handler methods of a [`HandlerSet`].
///
/// A type is a handler when it is `pub`, its name ends with the configured suffix without being
/// the bare suffix, and it implements one of the configured handler traits. Its actions are the
/// public instance methods of its inherent impl blocks that are neither `#[non_action]` nor
/// `#[deprecated]`. The settings' documentable predicate makes the final choice.
pub struct Discovery<'a> {
    settings: &'a DocSettings,
}

impl<'a> Discovery<'a> {
    pub fn new(settings: &'a DocSettings) -> Self {
        Self { settings }
    }

    /// Whether a candidate type follows the handler convention
    pub fn is_handler(&self, handler: &HandlerType) -> bool {
        let suffix = self.settings.handler_suffix();
        handler.visibility == Visibility::Public
            && handler.name.ends_with(suffix)
            && handler.name != suffix
            && self
                .settings
                .handler_traits()
                .iter()
                .any(|t| handler.implements(t))
    }

    /// Whether a method can be an endpoint at all
    pub fn is_action(method: &HandlerMethod) -> bool {
        method.visibility == Visibility::Public
            && method.receiver == Receiver::Instance
            && method.origin == MethodOrigin::Inherent
            && !method.is_constructor
            && !method.has_marker(&Marker::NonAction)
            && !method.has_marker(&Marker::Obsolete)
    }

    /// Returns the documentable (type, method) pairs in scan order, without duplicates.
    pub fn discover<'s>(&self, set: &'s HandlerSet) -> Vec<Candidate<'s>> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut candidates = Vec::new();

        for handler in set.handlers() {
            if !self.is_handler(handler) {
                debug!("Skipping non-handler type: {}", handler.name);
                continue;
            }

            for method in &handler.methods {
                if !Self::is_action(method) {
                    debug!("Skipping non-action {}::{}", handler.name, method.name);
                    continue;
                }
                if !self.settings.is_documentable(method, handler) {
                    continue;
                }
                if !seen.insert((handler.name.as_str(), method.name.as_str())) {
                    debug!("Duplicate action {}::{} ignored", handler.name, method.name);
                    continue;
                }
                candidates.push(Candidate { handler, method });
            }
        }

        debug!("Discovered {} documentable actions", candidates.len());
        candidates
    }
}
