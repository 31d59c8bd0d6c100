//! Type knowledge shared between the files of one run.
//!
//! Parsing a header teaches the compiler which classes are QObjects or
//! gadgets, which interfaces have ids and which types were declared as
//! metatypes. Later files rely on that knowledge (superclass checks, enum
//! scoping, argument registration), so the table is threaded explicitly
//! through every parse call instead of living in a global.

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    /// Simple and qualified names of `Q_OBJECT` classes, mapped to the
    /// qualified name
    pub qobject_classes: FxHashMap<String, String>,

    /// Same for `Q_GADGET` classes and `Q_NAMESPACE` namespaces
    pub gadgets: FxHashMap<String, String>,

    /// `Q_DECLARE_INTERFACE` class name to the interface id expression
    pub interface_ids: FxHashMap<String, String>,

    /// Types named in `Q_DECLARE_METATYPE`
    pub metatypes: FxHashSet<String>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a QObject class under both its simple and qualified name.
    pub fn add_qobject_class(&mut self, name: &str, qualified: &str) {
        self.qobject_classes.insert(name.to_string(), qualified.to_string());
        self.qobject_classes.insert(qualified.to_string(), qualified.to_string());
    }

    /// Record a gadget or namespace under both its simple and qualified name.
    pub fn add_gadget(&mut self, name: &str, qualified: &str) {
        self.gadgets.insert(name.to_string(), qualified.to_string());
        self.gadgets.insert(qualified.to_string(), qualified.to_string());
    }

    pub fn is_qobject_class(&self, name: &str) -> bool {
        self.qobject_classes.contains_key(name)
    }

    pub fn is_gadget(&self, name: &str) -> bool {
        self.gadgets.contains_key(name)
    }

    /// Qualified name of a known QObject class or gadget.
    pub fn qualified(&self, name: &str) -> Option<&str> {
        self.qobject_classes
            .get(name)
            .or_else(|| self.gadgets.get(name))
            .map(String::as_str)
    }

    /// Whether values of `ty` can be registered with the metatype system
    /// without further declarations.
    pub fn is_registerable(&self, ty: &str) -> bool {
        if self.metatypes.contains(ty) {
            return true;
        }
        if let Some(pointee) = ty.strip_suffix('*') {
            if self.is_qobject_class(pointee) {
                return true;
            }
        }
        for smart in ["QSharedPointer", "QWeakPointer", "QPointer"] {
            if let Some(inner) = ty.strip_prefix(smart).and_then(|t| t.strip_prefix('<')) {
                if ty.ends_with('&') {
                    return false;
                }
                return inner.strip_suffix('>').is_some_and(|c| self.is_qobject_class(c));
            }
        }
        for container in ["QList", "QQueue", "QStack", "QSet"] {
            if let Some(inner) = ty.strip_prefix(container).and_then(|t| t.strip_prefix('<')) {
                return inner.strip_suffix('>').is_some_and(|c| self.is_registerable(c));
            }
        }
        false
    }
}
