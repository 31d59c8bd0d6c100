//! Declaration model produced by the parser and consumed by the generator.
//!
//! A [`ClassDef`] is created when the parser opens a declaration's brace
//! block and is complete once the matching brace is consumed. Cross
//! references inside a declaration (property to notify signal, enum alias to
//! enum) are positions into the owning declaration's lists.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::parser::token::TokenKind;

// ============================================================================
// Types and arguments
// ============================================================================

/// How a type is referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceKind {
    #[default]
    NoReference,
    Reference,
    RValueReference,
    Pointer,
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Type {
    /// Type as written, cv-qualifiers and `*`/`&` included
    pub name: String,
    /// Spelling retained for diagnostics when `name` was rewritten
    pub raw_name: String,
    /// Canonical spelling used for metadata and comparisons
    pub normalized: String,
    pub reference: ReferenceKind,
    pub is_volatile: bool,
    /// Written as a qualified name (`A::B`)
    pub is_scoped: bool,
    /// Kind of the first token of the type, `None` for synthesized types
    pub first_token: Option<TokenKind>,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw_name: name.clone(),
            normalized: crate::parser::normalize::normalize_type(&name),
            name,
            ..Default::default()
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "void"
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentDef {
    pub ty: Type,
    /// Trailing declarator parts: array extents, trailing cv
    pub right_type: String,
    pub normalized_type: String,
    pub name: String,
    /// `std::add_pointer_t<T>` spelling used to unpack `void **` arguments
    pub type_name_for_cast: String,
    pub is_default: bool,
}

// ============================================================================
// Methods
// ============================================================================

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum Access {
    Private,
    Protected,
    #[default]
    Public,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Public => "public",
        }
    }
}

/// The category a method was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    #[default]
    Method,
    Signal,
    Slot,
    Constructor,
    Destructor,
}

/// A member function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionDef {
    pub ty: Type,
    pub normalized_type: String,
    pub tag: String,
    pub name: String,
    pub arguments: Vec<ArgumentDef>,
    pub access: Access,
    pub kind: MethodKind,
    /// Encoded revision, 0 when unrevisioned
    pub revision: i32,

    pub is_const: bool,
    pub is_virtual: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub inline_code: bool,
    pub was_cloned: bool,
    pub is_compat: bool,
    pub is_invokable: bool,
    pub is_scriptable: bool,
    pub is_signal: bool,
    pub is_slot: bool,
    pub is_private_signal: bool,
    pub is_raw_slot: bool,
    pub is_constructor: bool,
    pub is_destructor: bool,

    /// Accessor expression for slots living in a private class (`d_func()`)
    pub in_private_class: String,
    /// Line the declaration started on
    pub line: u32,
}

impl FunctionDef {
    /// Number of trailing arguments with default values.
    pub fn default_argument_count(&self) -> usize {
        self.arguments.iter().rev().take_while(|a| a.is_default).count()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// How the READ accessor hands out the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Specification {
    #[default]
    ValueSpec,
    ReferenceSpec,
    PointerSpec,
}

/// A `Q_PROPERTY` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: String,
    pub member: String,
    pub read: String,
    pub write: String,
    pub bind: String,
    pub reset: String,
    /// "true", "false", an accessor name, or empty for the default
    pub designable: String,
    pub scriptable: String,
    pub stored: String,
    pub user: String,
    pub notify: String,
    pub in_private_class: String,
    /// Signal index, -1 for none, `-2 - k` for entry `k` of the non-local
    /// signal list
    pub notify_id: i32,
    pub constant: bool,
    pub final_: bool,
    pub required: bool,
    pub relative_index: usize,
    pub revision: i32,
    pub gspec: Specification,
    pub line: u32,
}

impl Default for PropertyDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: String::new(),
            member: String::new(),
            read: String::new(),
            write: String::new(),
            bind: String::new(),
            reset: String::new(),
            designable: String::new(),
            scriptable: String::new(),
            stored: String::new(),
            user: String::new(),
            notify: String::new(),
            in_private_class: String::new(),
            notify_id: -1,
            constant: false,
            final_: false,
            required: false,
            relative_index: 0,
            revision: 0,
            gspec: Specification::ValueSpec,
            line: 0,
        }
    }
}

impl PropertyDef {
    /// True when WRITE follows the `setFoo` naming pattern for property `foo`.
    pub fn std_cpp_set(&self) -> bool {
        if self.name.is_empty() {
            return false;
        }
        let mut chars = self.name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let expected = format!("set{}{}", first.to_ascii_uppercase(), chars.as_str());
        self.write == expected
    }
}

// ============================================================================
// Enums and class info
// ============================================================================

/// An enum or flag type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDef {
    pub name: String,
    /// The underlying enum when exposed under a `Q_DECLARE_FLAGS` alias
    pub enum_name: String,
    /// Explicit underlying type (`enum E : quint8`)
    pub ty: String,
    pub values: Vec<String>,
    pub is_enum_class: bool,
    pub is_flag: bool,
}

impl EnumDef {
    /// Name the values are qualified with in generated code.
    pub fn qualifier(&self) -> &str {
        if self.enum_name.is_empty() {
            &self.name
        } else {
            &self.enum_name
        }
    }
}

/// A `Q_CLASSINFO` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfoDef {
    pub name: String,
    pub value: String,
}

// ============================================================================
// Declarations
// ============================================================================

/// What kind of declaration carries the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclKind {
    /// `Q_OBJECT` class
    #[default]
    Object,
    /// `Q_GADGET` class or struct
    Gadget,
    /// `Q_NAMESPACE` namespace
    Namespace,
}

/// A base class in the superclass list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperClass {
    pub name: String,
    pub qualified: String,
    pub access: Access,
}

/// One link of an interface chain in `Q_INTERFACES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub class_name: String,
    pub interface_id: String,
}

/// `Q_PLUGIN_METADATA` contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginData {
    pub iid: String,
    pub uri: String,
    /// Object read from the `FILE` argument
    pub meta_data: Map<String, Value>,
    /// Extra `-M key=value` arguments
    pub meta_args: BTreeMap<String, Vec<String>>,
}

impl PluginData {
    pub fn is_declared(&self) -> bool {
        !self.iid.is_empty()
    }
}

/// A class, struct or namespace that needs metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDef {
    pub kind: DeclKind,
    pub classname: String,
    pub qualified: String,
    pub super_class_list: Vec<SuperClass>,
    pub interface_list: Vec<Vec<Interface>>,
    pub class_info_list: Vec<ClassInfoDef>,
    /// Enum names marked reflectable, mapped to their flag bit
    pub enum_declarations: BTreeMap<String, bool>,
    /// Enum name to its `Q_DECLARE_FLAGS` alias
    pub flag_aliases: BTreeMap<String, String>,
    pub enum_list: Vec<EnumDef>,
    pub constructor_list: Vec<FunctionDef>,
    pub signal_list: Vec<FunctionDef>,
    pub slot_list: Vec<FunctionDef>,
    pub method_list: Vec<FunctionDef>,
    /// Public member functions, used to resolve property getters
    pub public_list: Vec<FunctionDef>,
    pub property_list: Vec<PropertyDef>,
    /// NOTIFY signals not declared in this class
    pub non_class_signal_list: Vec<String>,
    pub plugin_data: PluginData,
    pub revisioned_methods: usize,
    pub has_q_object: bool,
    pub has_q_gadget: bool,
    pub has_q_namespace: bool,
    /// Token positions of the opening and one past the closing brace
    pub begin: usize,
    pub end: usize,
    pub line: u32,
}

impl ClassDef {
    pub fn is_namespace(&self) -> bool {
        self.kind == DeclKind::Namespace
    }

    /// Signals, slots and methods in table order.
    pub fn methods(&self) -> impl Iterator<Item = &FunctionDef> {
        self.signal_list.iter().chain(&self.slot_list).chain(&self.method_list)
    }

    /// C identifier derived from the qualified name.
    pub fn identifier(&self) -> String {
        self.qualified.replace("::", "__").replace(':', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(is_default: bool) -> ArgumentDef {
        ArgumentDef {
            ty: Type::new("int"),
            normalized_type: "int".into(),
            is_default,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_argument_count_only_counts_trailing() {
        let f = FunctionDef {
            arguments: vec![arg(true), arg(false), arg(true), arg(true)],
            ..Default::default()
        };
        assert_eq!(f.default_argument_count(), 2);
    }

    #[test]
    fn test_std_cpp_set() {
        let mut p = PropertyDef {
            name: "value".into(),
            write: "setValue".into(),
            ..Default::default()
        };
        assert!(p.std_cpp_set());
        p.write = "updateValue".into();
        assert!(!p.std_cpp_set());
    }

    #[test]
    fn test_identifier_replaces_scope() {
        let def = ClassDef {
            qualified: "Outer::Inner".into(),
            ..Default::default()
        };
        assert_eq!(def.identifier(), "Outer__Inner");
    }

    #[test]
    fn test_enum_qualifier_prefers_original_enum() {
        let flags = EnumDef {
            name: "Options".into(),
            enum_name: "Option".into(),
            ..Default::default()
        };
        assert_eq!(flags.qualifier(), "Option");
    }
}
