//! Declaration parser.
//!
//! Recursive descent over a [`TokenCursor`] that finds the annotated
//! classes, gadgets and namespaces of a translation unit. Everything else in
//! the input is skipped. Speculative parses (member functions) are undone by
//! resetting the cursor index.
//!
//! # Example
//!
//! ```ignore
//! use moc_engine::parser::{Lexer, Parser, FsLoader};
//! use moc_engine::{KnownTypes, MocOptions};
//!
//! let tokens = Lexer::new(source, "widget.h").tokenize()?;
//! let mut known = KnownTypes::new();
//! let options = MocOptions::default();
//! let output = Parser::new(tokens, "widget.h", &mut known, &options, &FsLoader).parse()?;
//! ```

pub mod annotations;
pub mod class;
pub mod cursor;
pub mod error;
pub mod function;
pub mod lexer;
pub mod normalize;
pub mod property;
pub mod token;
pub mod ty;

pub use annotations::{FsLoader, MetaDataLoader};
pub use cursor::TokenCursor;
pub use error::{ParseError, ParseResult};
pub use lexer::{LexError, Lexer};
pub use token::{Span, Token, TokenKind};

use crate::config::MocOptions;
use crate::diagnostic::Diagnostic;
use crate::known::KnownTypes;
use crate::model::{ClassDef, DeclKind};
use annotations::{
    parse_class_info, parse_declare_interface, parse_declare_metatype, parse_enum, parse_enum_or_flag,
    parse_flag, parse_moc_include, skip_export_macro,
};

/// A namespace seen in the input, with its prefix-qualified name.
#[derive(Debug, Clone)]
struct NamespaceDef {
    /// `qualified` holds the enclosing prefix (`Outer::`) until the final
    /// merge appends the namespace's own name
    def: ClassDef,
    do_generate: bool,
}

/// Everything one parse produces.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Declarations needing metadata, in source order, namespaces last
    pub classes: Vec<ClassDef>,
    pub diagnostics: Vec<Diagnostic>,
    /// Files entered through line markers and plugin metadata files,
    /// first-seen order
    pub dependencies: Vec<String>,
    /// `Q_MOC_INCLUDE` requests
    pub moc_includes: Vec<String>,
}

/// Parser state for one translation unit.
pub struct Parser<'a> {
    pub(crate) cursor: TokenCursor,
    pub(crate) known: &'a mut KnownTypes,
    pub(crate) options: &'a MocOptions,
    pub(crate) loader: &'a dyn MetaDataLoader,

    diagnostics: Vec<Diagnostic>,
    dependencies: Vec<String>,
    pub(crate) moc_includes: Vec<String>,

    namespaces: Vec<NamespaceDef>,
    classes: Vec<ClassDef>,

    /// Set by `template`, cleared at `;` and `}`
    pub(crate) template_class: bool,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: Vec<Token>,
        file_name: impl Into<String>,
        known: &'a mut KnownTypes,
        options: &'a MocOptions,
        loader: &'a dyn MetaDataLoader,
    ) -> Self {
        Self {
            cursor: TokenCursor::new(tokens, file_name),
            known,
            options,
            loader,
            diagnostics: Vec::new(),
            dependencies: Vec::new(),
            moc_includes: Vec::new(),
            namespaces: Vec::new(),
            classes: Vec::new(),
            template_class: false,
        }
    }

    // ========================================================================
    // Diagnostics and bookkeeping
    // ========================================================================

    /// Record a warning at the last consumed token.
    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        let diagnostic = self.cursor.warning(message);
        self.diagnostics.push(diagnostic);
    }

    /// Record a warning at a line of the current file.
    pub(crate) fn warning_at_line(&mut self, line: u32, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(self.cursor.current_file(), line, message);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn add_dependency(&mut self, path: String) {
        if !self.dependencies.contains(&path) {
            self.dependencies.push(path);
        }
    }

    fn in_range(&self, begin: usize, end: usize) -> bool {
        let index = self.cursor.index();
        index > begin && index + 1 < end
    }

    /// True while the cursor is inside the body of `def`.
    pub(crate) fn in_class(&self, def: &ClassDef) -> bool {
        self.in_range(def.begin, def.end)
    }

    fn in_namespace(&self, ns: &NamespaceDef) -> bool {
        self.in_range(ns.def.begin, ns.def.end)
    }

    /// Prefix `def.qualified` with every namespace enclosing the cursor.
    pub(crate) fn prepend_namespaces(&self, def: &mut ClassDef) {
        for ns in self.namespaces.iter().rev() {
            if self.in_namespace(ns) {
                def.qualified.insert_str(0, &format!("{}::", ns.def.classname));
            }
        }
    }

    // ========================================================================
    // Translation unit
    // ========================================================================

    /// Parse the whole translation unit.
    pub fn parse(mut self) -> ParseResult<ParseOutput> {
        let main_file = self.cursor.current_file().to_string();
        self.add_dependency(main_file);

        while self.cursor.has_next() {
            let kind = self.cursor.next();
            match kind {
                TokenKind::Namespace => self.parse_namespace()?,
                TokenKind::Semicolon | TokenKind::RBrace => self.template_class = false,
                TokenKind::Template => self.template_class = true,
                TokenKind::IncludeBegin => {
                    let file = self.cursor.lexem().to_string();
                    if !file.starts_with('<') {
                        self.add_dependency(file.clone());
                    }
                    self.cursor.push_file(file);
                }
                TokenKind::IncludeEnd => self.cursor.pop_file(),
                TokenKind::QDeclareInterface => parse_declare_interface(&mut self)?,
                TokenKind::QDeclareMetatype => parse_declare_metatype(&mut self)?,
                TokenKind::QMocInclude => parse_moc_include(&mut self)?,
                TokenKind::Using => {
                    if self.cursor.test(TokenKind::Namespace) {
                        while self.cursor.test(TokenKind::Scope) || self.cursor.test(TokenKind::Identifier) {}
                        self.cursor.next_expect(TokenKind::Semicolon)?;
                    }
                }
                TokenKind::Class | TokenKind::Struct => {
                    if self.cursor.include_depth() > 1 {
                        class::scan_included_class(&mut self)?;
                    } else if let Some(def) = class::parse_class(&mut self, kind == TokenKind::Struct)? {
                        self.classes.push(def);
                    }
                }
                _ => {}
            }
        }

        self.merge_namespaces();
        Ok(ParseOutput {
            classes: self.classes,
            diagnostics: self.diagnostics,
            dependencies: self.dependencies,
            moc_includes: self.moc_includes,
        })
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Handle a namespace after the `namespace` keyword: learn its
    /// annotations in a first pass, then rewind so that the main loop
    /// replays the body with the namespace on the stack.
    fn parse_namespace(&mut self) -> ParseResult<()> {
        let rewind = self.cursor.index();
        if !self.cursor.test(TokenKind::Identifier) {
            return Ok(());
        }

        let mut name = self.cursor.lexem().to_string();
        let mut parents = Vec::new();
        while self.cursor.test(TokenKind::Scope) {
            // `namespace A::inline B` is treated as `A::B`
            self.cursor.test(TokenKind::Inline);
            self.cursor.next_expect(TokenKind::Identifier)?;
            parents.push(std::mem::replace(&mut name, self.cursor.lexem().to_string()));
        }

        if self.cursor.test(TokenKind::Eq) {
            // namespace alias
            self.cursor.until(TokenKind::Semicolon);
            return Ok(());
        }
        if self.cursor.test(TokenKind::LParen) {
            self.cursor.until(TokenKind::RParen);
            return Ok(());
        }
        if self.cursor.test(TokenKind::Semicolon) {
            return Ok(());
        }

        let mut ns = NamespaceDef {
            def: ClassDef {
                kind: DeclKind::Namespace,
                classname: name,
                line: self.cursor.line(),
                ..Default::default()
            },
            do_generate: self.cursor.include_depth() <= 1,
        };
        self.cursor.next_expect(TokenKind::LBrace)?;
        ns.def.begin = self.cursor.index() - 1;
        self.cursor.until(TokenKind::RBrace);
        ns.def.end = self.cursor.index();
        self.cursor.set_index(ns.def.begin + 1);

        self.prepend_namespaces(&mut ns.def);
        for parent in parents {
            let parent_def = ClassDef {
                kind: DeclKind::Namespace,
                qualified: ns.def.qualified.clone(),
                begin: ns.def.begin,
                end: ns.def.end,
                line: ns.def.line,
                classname: parent.clone(),
                ..Default::default()
            };
            ns.def.qualified.push_str(&parent);
            ns.def.qualified.push_str("::");
            self.namespaces.push(NamespaceDef {
                def: parent_def,
                do_generate: ns.do_generate,
            });
        }

        while self.in_namespace(&ns) && self.cursor.has_next() {
            match self.cursor.next() {
                TokenKind::Namespace => {
                    if self.cursor.test(TokenKind::Identifier) {
                        while self.cursor.test(TokenKind::Scope) {
                            self.cursor.test(TokenKind::Inline);
                            self.cursor.next_expect(TokenKind::Identifier)?;
                        }
                        if self.cursor.test(TokenKind::Eq) {
                            self.cursor.until(TokenKind::Semicolon);
                        } else if !self.cursor.test(TokenKind::Semicolon) {
                            self.cursor.until(TokenKind::RBrace);
                        }
                    }
                }
                TokenKind::QNamespace => ns.def.has_q_namespace = true,
                TokenKind::QNamespaceExport => {
                    skip_export_macro(&mut self.cursor)?;
                    ns.def.has_q_namespace = true;
                }
                TokenKind::QEnums | TokenKind::QEnumNs => parse_enum_or_flag(&mut self.cursor, &mut ns.def, false)?,
                TokenKind::QEnum => {
                    return Err(self
                        .cursor
                        .error("Q_ENUM can't be used in a Q_NAMESPACE, use Q_ENUM_NS instead"));
                }
                TokenKind::QFlags | TokenKind::QFlagNs => parse_enum_or_flag(&mut self.cursor, &mut ns.def, true)?,
                TokenKind::QFlag => {
                    return Err(self
                        .cursor
                        .error("Q_FLAG can't be used in a Q_NAMESPACE, use Q_FLAG_NS instead"));
                }
                TokenKind::QDeclareFlags => parse_flag(&mut self.cursor, &mut ns.def)?,
                TokenKind::QClassInfo => parse_class_info(&mut self.cursor, &mut ns.def)?,
                TokenKind::QMocInclude => {
                    // recorded when the body is replayed
                    self.cursor.next_expect(TokenKind::LParen)?;
                    self.cursor.lexem_until(TokenKind::RParen);
                }
                TokenKind::Enum => {
                    if let Some(enum_def) = parse_enum(&mut self.cursor)? {
                        ns.def.enum_list.push(enum_def);
                    }
                }
                TokenKind::Class | TokenKind::Struct => {
                    let mut skipped = ClassDef::default();
                    if class::parse_class_head(self, &mut skipped)? {
                        while self.in_class(&skipped) && self.cursor.has_next() {
                            self.cursor.next();
                        }
                    }
                }
                _ => {}
            }
        }

        let lacks_macro = !ns.def.has_q_namespace
            && (!ns.def.class_info_list.is_empty() || !ns.def.enum_declarations.is_empty());
        self.namespaces.push(ns);
        self.cursor.set_index(rewind);
        if lacks_macro {
            return Err(self.cursor.error("Namespace declaration lacks Q_NAMESPACE macro."));
        }
        Ok(())
    }

    /// Turn every `Q_NAMESPACE` namespace into a declaration. A namespace
    /// reopened in the same file extends the declaration made for its first
    /// occurrence.
    fn merge_namespaces(&mut self) {
        for ns in std::mem::take(&mut self.namespaces) {
            if !ns.def.has_q_namespace {
                continue;
            }
            let mut def = ns.def;
            def.qualified.push_str(&def.classname);

            let existing = self
                .classes
                .iter_mut()
                .find(|c| c.classname == def.classname && c.qualified == def.qualified);
            match existing {
                Some(target) => {
                    target.class_info_list.append(&mut def.class_info_list);
                    target.enum_declarations.append(&mut def.enum_declarations);
                    target.enum_list.append(&mut def.enum_list);
                    target.flag_aliases.append(&mut def.flag_aliases);
                }
                None => {
                    self.known.add_gadget(&def.classname, &def.qualified);
                    if ns.do_generate {
                        self.classes.push(def);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Access;

    fn parse_with(source: &str, known: &mut KnownTypes) -> ParseResult<ParseOutput> {
        let tokens = Lexer::new(source, "test.h").tokenize().unwrap();
        let options = MocOptions::default();
        Parser::new(tokens, "test.h", known, &options, &FsLoader).parse()
    }

    fn parse(source: &str) -> ParseResult<ParseOutput> {
        parse_with(source, &mut KnownTypes::new())
    }

    fn error_of(source: &str) -> String {
        parse(source).unwrap_err().message
    }

    #[test]
    fn test_plain_class_is_skipped() {
        let out = parse("class Plain { public: void f(); };").unwrap();
        assert!(out.classes.is_empty());
    }

    #[test]
    fn test_object_with_members() {
        let out = parse(
            "class Counter : public QObject {\n\
               Q_OBJECT\n\
               Q_PROPERTY(int value READ value WRITE setValue NOTIFY valueChanged)\n\
             public:\n\
               Counter(QObject *parent = nullptr);\n\
               ~Counter();\n\
               int value() const;\n\
               Q_INVOKABLE void reset(int to = 0);\n\
             public slots:\n\
               void setValue(int value);\n\
             signals:\n\
               void valueChanged(int newValue);\n\
             };",
        )
        .unwrap();
        assert_eq!(out.classes.len(), 1);
        let def = &out.classes[0];
        assert_eq!(def.kind, DeclKind::Object);
        assert_eq!(def.classname, "Counter");
        assert_eq!(def.super_class_list[0].name, "QObject");
        assert_eq!(def.signal_list.len(), 1);
        assert_eq!(def.slot_list.len(), 1);
        assert_eq!(def.slot_list[0].access, Access::Public);
        assert_eq!(def.method_list.len(), 2);
        assert!(def.method_list[1].was_cloned);
        assert!(def.constructor_list.is_empty());
        assert_eq!(def.property_list[0].notify_id, 0);
    }

    #[test]
    fn test_gadget_struct_defaults_to_public() {
        let out = parse("struct Point { Q_GADGET Q_PROPERTY(int x MEMBER x) int x; Q_INVOKABLE int len() const; };")
            .unwrap();
        let def = &out.classes[0];
        assert_eq!(def.kind, DeclKind::Gadget);
        assert_eq!(def.method_list[0].access, Access::Public);
    }

    #[test]
    fn test_namespace_prefix_and_q_namespace() {
        let mut known = KnownTypes::new();
        let out = parse_with(
            "namespace Outer { namespace Inner {\n\
               Q_NAMESPACE\n\
               enum class Color { Red, Green };\n\
               Q_ENUM_NS(Color)\n\
               class Item : public QObject { Q_OBJECT };\n\
             } }",
            &mut known,
        )
        .unwrap();
        assert_eq!(out.classes.len(), 2);
        assert_eq!(out.classes[0].qualified, "Outer::Inner::Item");
        let ns = &out.classes[1];
        assert_eq!(ns.kind, DeclKind::Namespace);
        assert_eq!(ns.qualified, "Outer::Inner");
        assert_eq!(ns.enum_list[0].values, vec!["Red", "Green"]);
        assert!(known.is_gadget("Outer::Inner"));
        assert!(known.is_qobject_class("Item"));
    }

    #[test]
    fn test_nested_namespace_syntax() {
        let out = parse("namespace A::inline B { Q_NAMESPACE enum E { X }; Q_ENUM_NS(E) }").unwrap();
        assert_eq!(out.classes.len(), 1);
        assert_eq!(out.classes[0].qualified, "A::B");
    }

    #[test]
    fn test_reopened_namespace_is_merged() {
        let out = parse(
            "namespace N { Q_NAMESPACE enum A { X }; Q_ENUM_NS(A) }\n\
             namespace N { Q_NAMESPACE enum B { Y }; Q_ENUM_NS(B) }",
        )
        .unwrap();
        assert_eq!(out.classes.len(), 1);
        assert_eq!(out.classes[0].enum_list.len(), 2);
    }

    #[test]
    fn test_included_classes_are_only_registered() {
        let mut known = KnownTypes::new();
        let source = "# 1 \"main.h\"\n\
                      # 1 \"base.h\" 1\n\
                      class Base : public QObject { Q_OBJECT };\n\
                      # 2 \"main.h\" 2\n\
                      class Derived : public Base { Q_OBJECT };\n";
        let out = parse_with(source, &mut known).unwrap();
        assert_eq!(out.classes.len(), 1);
        assert_eq!(out.classes[0].classname, "Derived");
        assert!(known.is_qobject_class("Base"));
        assert_eq!(out.dependencies, vec!["test.h".to_string(), "base.h".to_string()]);
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            error_of("class A { Q_OBJECT };"),
            "Class contains Q_OBJECT macro but does not inherit from QObject"
        );
        assert_eq!(
            error_of("template <typename T> class A : public QObject { Q_OBJECT };"),
            "Template classes not supported by Q_OBJECT"
        );
        assert_eq!(
            error_of("class A : public QObject { Q_OBJECT public signals: void s(); };"),
            "Signals cannot have access specifier"
        );
        assert_eq!(
            error_of("class A : public QObject { Q_OBJECT slots: void s(); };"),
            "Missing access specifier for slots"
        );
        assert_eq!(
            error_of("class A : public B { signals: void s(); };"),
            "Class declaration lacks Q_OBJECT macro."
        );
        assert_eq!(
            error_of("class A : public QObject { Q_OBJECT class N { Q_OBJECT }; };"),
            "Meta object features not supported for nested classes"
        );
        assert_eq!(
            error_of("namespace N { enum E { X }; Q_ENUM_NS(E) }"),
            "Namespace declaration lacks Q_NAMESPACE macro."
        );
        assert_eq!(
            error_of("namespace N { Q_NAMESPACE enum E { X }; Q_ENUM(E) }"),
            "Q_ENUM can't be used in a Q_NAMESPACE, use Q_ENUM_NS instead"
        );
        assert_eq!(
            error_of("class A : public QObject { Q_OBJECT Q_INTERFACES(Missing) };"),
            "Undefined interface"
        );
    }

    #[test]
    fn test_interface_warnings() {
        let mut known = KnownTypes::new();
        known.add_qobject_class("QObject", "QObject");
        let out = parse_with(
            "Q_DECLARE_INTERFACE(Plugin, \"org.example.Plugin\")\n\
             class Impl : public QObject, public Plugin { Q_OBJECT };",
            &mut known,
        )
        .unwrap();
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("does not list it in Q_INTERFACES"));
        assert_eq!(known.interface_ids.get("Plugin").map(String::as_str), Some("\"org.example.Plugin\""));
    }

    #[test]
    fn test_declare_metatype_and_moc_include() {
        let mut known = KnownTypes::new();
        let out = parse_with(
            "Q_DECLARE_METATYPE(QList<MyType *>)\nQ_MOC_INCLUDE(\"extra.h\")",
            &mut known,
        )
        .unwrap();
        assert!(known.metatypes.contains("QList<MyType*>"));
        assert_eq!(out.moc_includes, vec!["\"extra.h\"".to_string()]);
    }

    #[test]
    fn test_speculative_parse_rewinds() {
        let out = parse(
            "class A : public QObject { Q_OBJECT\n\
               int field = 3; typedef int (*Fn)(int); friend class B;\n\
             public:\n\
               Q_INVOKABLE void f();\n\
             };",
        )
        .unwrap();
        assert_eq!(out.classes[0].method_list.len(), 1);
        assert_eq!(out.classes[0].method_list[0].name, "f");
    }
}
