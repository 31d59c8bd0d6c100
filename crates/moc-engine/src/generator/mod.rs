//! Generated source for parsed declarations.
//!
//! Each declaration gets its string data, metadata array, `staticMetaObject`
//! and dispatch code. Classes with `Q_PLUGIN_METADATA` also get the encoded
//! plugin blob. The file-level prologue carries the output revision the
//! runtime headers check against.

pub mod builtin;
pub mod metacall;
pub mod strings;
pub mod table;

use std::fmt::{self, Write};

use crate::cbor::{encode_plugin_metadata, write_blob_bytes};
use crate::config::MocOptions;
use crate::interner::StringTable;
use crate::known::KnownTypes;
use crate::model::{ClassDef, DeclKind, EnumDef};

pub use strings::register_strings;
pub use table::{build_table, metatype_entries, Cell, MetaTable, MetaTypeEntry, CONTENT_REVISION};

/// Revision of the generated source, checked by `#error` guards.
pub const OUTPUT_REVISION: u32 = 68;

/// Enums as exposed in the metadata: declared enums in declaration order,
/// each followed by its flag alias when the alias was declared instead.
pub fn declared_enums(def: &ClassDef) -> Vec<EnumDef> {
    let mut enums = Vec::new();
    for e in &def.enum_list {
        if let Some(&is_flag) = def.enum_declarations.get(&e.name) {
            enums.push(EnumDef {
                is_flag,
                ..e.clone()
            });
        }
        let Some(alias) = def.flag_aliases.get(&e.name) else {
            continue;
        };
        if let Some(&is_flag) = def.enum_declarations.get(alias) {
            enums.push(EnumDef {
                name: alias.clone(),
                enum_name: e.name.clone(),
                is_flag,
                ..e.clone()
            });
        }
    }
    enums
}

/// Generates the source for one declaration.
pub struct Generator<'a> {
    def: &'a ClassDef,
    known: &'a KnownTypes,
    ident: String,
    enums: Vec<EnumDef>,
    strings: StringTable,
    table: MetaTable,
}

impl<'a> Generator<'a> {
    pub fn new(def: &'a ClassDef, known: &'a KnownTypes) -> Self {
        let enums = declared_enums(def);
        let strings = register_strings(def, &enums);
        let table = build_table(def, &enums, &strings);
        Self {
            def,
            known,
            ident: def.identifier(),
            enums,
            strings,
            table,
        }
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn table(&self) -> &MetaTable {
        &self.table
    }

    pub fn enums(&self) -> &[EnumDef] {
        &self.enums
    }

    /// Classes whose meta-objects the properties' enum types live in.
    pub fn related_meta_objects(&self) -> Vec<String> {
        let mut related: Vec<String> = Vec::new();
        for p in &self.def.property_list {
            let Some((scope, _)) = p.ty.rsplit_once("::") else {
                continue;
            };
            if scope == "Qt" || scope == self.def.qualified || scope == self.def.classname {
                continue;
            }
            let Some(qualified) = self.known.qualified(scope) else {
                continue;
            };
            if !related.iter().any(|r| r == qualified) {
                related.push(qualified.to_string());
            }
        }
        related
    }

    fn write_extradata(&self, out: &mut impl Write, related: &[String]) -> fmt::Result {
        writeln!(
            out,
            "Q_CONSTINIT static const QMetaObject::SuperData qt_meta_extradata_{}[] = {{",
            self.ident
        )?;
        for name in related {
            writeln!(out, "    QMetaObject::SuperData::link<{name}::staticMetaObject>(),")?;
        }
        writeln!(out, "    nullptr")?;
        writeln!(out, "}};")
    }

    fn super_data(&self) -> String {
        let def = self.def;
        if def.kind == DeclKind::Namespace {
            return "nullptr".to_string();
        }
        match def.super_class_list.first() {
            None => "nullptr".to_string(),
            Some(base) if def.kind == DeclKind::Object || self.known.is_gadget(&base.qualified) => {
                format!("QMetaObject::SuperData::link<{}::staticMetaObject>()", base.qualified)
            }
            Some(base) => format!("QtPrivate::MetaObjectForType<{}>::value", base.qualified),
        }
    }

    fn write_static_meta_object(&self, out: &mut impl Write, has_extradata: bool) -> fmt::Result {
        let ident = &self.ident;
        let static_metacall = if metacall::has_static_metacall(self.def) {
            "qt_static_metacall"
        } else {
            "nullptr"
        };
        let extradata = if has_extradata {
            format!("qt_meta_extradata_{ident}")
        } else {
            "nullptr".to_string()
        };

        writeln!(
            out,
            "Q_CONSTINIT const QMetaObject {}::staticMetaObject = {{ {{",
            self.def.qualified
        )?;
        writeln!(out, "    {},", self.super_data())?;
        writeln!(out, "    qt_meta_stringdata_{ident}.offsetsAndSizes,")?;
        writeln!(out, "    qt_meta_data_{ident},")?;
        writeln!(out, "    {static_metacall},")?;
        writeln!(out, "    {extradata},")?;
        writeln!(out, "    qt_incomplete_metaTypeArray<qt_meta_stringdata_{ident}_t,")?;
        let entries = metatype_entries(self.def, &self.enums);
        let last = entries.len().saturating_sub(1);
        for (i, entry) in entries.iter().enumerate() {
            if let Some(label) = &entry.label {
                writeln!(out, "        // {label}")?;
            }
            let complete = if entry.force_complete { "true" } else { "false" };
            let comma = if i == last { "" } else { "," };
            writeln!(
                out,
                "        QtPrivate::TypeAndForceComplete<{}, std::{complete}_type>{comma}",
                entry.type_name
            )?;
        }
        writeln!(out, "    >,")?;
        writeln!(out, "    nullptr")?;
        writeln!(out, "}} }};")
    }

    fn write_plugin(&self, out: &mut impl Write) -> fmt::Result {
        let def = self.def;
        let ident = &self.ident;
        let blob = encode_plugin_metadata(def);

        writeln!(out, "#ifdef QT_MOC_EXPORT_PLUGIN_V2")?;
        writeln!(out, "static constexpr unsigned char qt_pluginMetaDataV2_{ident}[] = {{")?;
        write_blob_bytes(out, &blob)?;
        writeln!(out, "}};")?;
        writeln!(
            out,
            "QT_MOC_EXPORT_PLUGIN_V2({}, {}, qt_pluginMetaDataV2_{ident})",
            def.qualified, def.classname
        )?;
        writeln!(out, "#else")?;
        writeln!(out, "QT_PLUGIN_METADATA_SECTION")?;
        writeln!(out, "Q_CONSTINIT static constexpr unsigned char qt_pluginMetaData_{ident}[] = {{")?;
        writeln!(out, "    'Q', 'T', 'M', 'E', 'T', 'A', 'D', 'A', 'T', 'A', ' ', '!',")?;
        writeln!(out, "    // metadata version, Qt version, architectural requirements")?;
        writeln!(out, "    0, QT_VERSION_MAJOR, QT_VERSION_MINOR, qPluginArchRequirements(),")?;
        write_blob_bytes(out, &blob)?;
        writeln!(out, "}};")?;
        writeln!(out, "QT_MOC_EXPORT_PLUGIN({}, {})", def.qualified, def.classname)?;
        writeln!(out, "#endif  // QT_MOC_EXPORT_PLUGIN_V2")
    }

    /// Write everything generated for the declaration.
    pub fn generate(&self, out: &mut impl Write) -> fmt::Result {
        let def = self.def;
        writeln!(out)?;
        strings::write_string_data(out, &self.ident, &self.strings)?;
        writeln!(out)?;
        self.table.write(out, &self.ident)?;
        writeln!(out)?;

        let related = self.related_meta_objects();
        if !related.is_empty() {
            self.write_extradata(out, &related)?;
            writeln!(out)?;
        }
        self.write_static_meta_object(out, !related.is_empty())?;

        if metacall::has_static_metacall(def) {
            writeln!(out)?;
            metacall::write_static_metacall(out, def, self.known)?;
        }
        if def.kind == DeclKind::Object {
            writeln!(out)?;
            metacall::write_object_functions(out, def, self.known)?;
            metacall::write_signals(out, def)?;
        }
        if def.plugin_data.is_declared() {
            writeln!(out)?;
            self.write_plugin(out)?;
        }
        Ok(())
    }
}

// ============================================================================
// File level
// ============================================================================

/// Write the comment banner, includes and revision guards.
pub fn write_prologue(
    out: &mut impl Write,
    input_name: &str,
    options: &MocOptions,
    moc_includes: &[String],
    has_plugin: bool,
) -> fmt::Result {
    writeln!(out, "/****************************************************************************")?;
    writeln!(out, "** Meta object code from reading C++ file '{input_name}'")?;
    writeln!(out, "**")?;
    writeln!(
        out,
        "** Created by: The Qt Meta Object Compiler version {OUTPUT_REVISION} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "**")?;
    writeln!(out, "** WARNING! All changes made in this file will be lost!")?;
    writeln!(out, "*****************************************************************************/")?;
    writeln!(out)?;

    if !options.no_include {
        let include = options.include_name.as_deref().unwrap_or(input_name);
        writeln!(out, "#include \"{include}\"")?;
    }
    for include in moc_includes {
        writeln!(out, "#include {include}")?;
    }
    writeln!(out, "#include <QtCore/qmetatype.h>")?;
    if has_plugin {
        writeln!(out, "#include <QtCore/qplugin.h>")?;
    }
    writeln!(out, "#include <memory>")?;
    writeln!(out)?;

    writeln!(out, "#if !defined(Q_MOC_OUTPUT_REVISION)")?;
    writeln!(out, "#error \"The header file '{input_name}' doesn't include <QObject>.\"")?;
    writeln!(out, "#elif Q_MOC_OUTPUT_REVISION != {OUTPUT_REVISION}")?;
    writeln!(out, "#error \"This file was generated using a moc for output revision {OUTPUT_REVISION}.\"")?;
    writeln!(out, "#error \"It cannot be used with the include files from this version of Qt.\"")?;
    writeln!(out, "#error \"(The moc has changed too much.)\"")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "#ifndef Q_CONSTINIT")?;
    writeln!(out, "#define Q_CONSTINIT")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "QT_WARNING_PUSH")?;
    writeln!(out, "QT_WARNING_DISABLE_DEPRECATED")?;
    writeln!(out, "QT_WARNING_DISABLE_GCC(\"-Wuseless-cast\")")?;
    writeln!(out, "QT_BEGIN_MOC_NAMESPACE")
}

pub fn write_epilogue(out: &mut impl Write) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "QT_WARNING_POP")?;
    writeln!(out, "QT_END_MOC_NAMESPACE")
}

/// Write the complete generated file for `classes`.
pub fn write_file(
    out: &mut impl Write,
    input_name: &str,
    classes: &[ClassDef],
    known: &KnownTypes,
    options: &MocOptions,
    moc_includes: &[String],
) -> fmt::Result {
    let has_plugin = classes.iter().any(|c| c.plugin_data.is_declared());
    write_prologue(out, input_name, options, moc_includes, has_plugin)?;
    for def in classes {
        Generator::new(def, known).generate(out)?;
    }
    write_epilogue(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn flags_class() -> ClassDef {
        let mut enum_declarations = BTreeMap::new();
        enum_declarations.insert("Options".to_string(), true);
        enum_declarations.insert("Mode".to_string(), false);
        let mut flag_aliases = BTreeMap::new();
        flag_aliases.insert("Option".to_string(), "Options".to_string());
        ClassDef {
            kind: DeclKind::Gadget,
            classname: "Style".into(),
            qualified: "Style".into(),
            has_q_gadget: true,
            enum_declarations,
            flag_aliases,
            enum_list: vec![
                EnumDef {
                    name: "Option".into(),
                    values: vec!["Bold".into(), "Italic".into()],
                    ..Default::default()
                },
                EnumDef {
                    name: "Mode".into(),
                    values: vec!["Light".into()],
                    is_enum_class: true,
                    ..Default::default()
                },
                EnumDef {
                    name: "Hidden".into(),
                    values: vec!["X".into()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_declared_enums_apply_aliases() {
        let enums = declared_enums(&flags_class());
        let names: Vec<(&str, &str, bool)> = enums
            .iter()
            .map(|e| (e.name.as_str(), e.enum_name.as_str(), e.is_flag))
            .collect();
        assert_eq!(names, vec![("Options", "Option", true), ("Mode", "", false)]);
    }

    #[test]
    fn test_alias_values_use_original_enum() {
        let def = flags_class();
        let known_types = KnownTypes::new();
        let generator = Generator::new(&def, &known_types);
        let mut out = String::new();
        generator.generate(&mut out).unwrap();
        assert!(out.contains("uint(Style::Bold)"));
        assert!(out.contains("uint(Style::Mode::Light)"));
        assert!(!out.contains("Hidden"));
        assert!(out.contains("QtPrivate::TypeAndForceComplete<Style::Options, std::true_type>"));
        // no methods or properties: gadget without dispatcher
        assert!(out.contains("    nullptr,\n    nullptr,\n    qt_incomplete_metaTypeArray"));
    }

    #[test]
    fn test_prologue_guards() {
        let mut out = String::new();
        let options = MocOptions::default();
        write_prologue(&mut out, "counter.h", &options, &["\"extra.h\"".to_string()], false).unwrap();
        assert!(out.contains("#include \"counter.h\"\n#include \"extra.h\""));
        assert!(out.contains("#elif Q_MOC_OUTPUT_REVISION != 68"));
        assert!(!out.contains("qplugin.h"));

        let mut out = String::new();
        let options = MocOptions {
            no_include: true,
            ..Default::default()
        };
        write_prologue(&mut out, "counter.h", &options, &[], true).unwrap();
        assert!(!out.contains("#include \"counter.h\""));
        assert!(out.contains("#include <QtCore/qplugin.h>"));
    }

    #[test]
    fn test_gadget_super_data() {
        let mut known = KnownTypes::new();
        known.add_gadget("Base", "Base");
        let mut def = ClassDef {
            kind: DeclKind::Gadget,
            classname: "Derived".into(),
            qualified: "Derived".into(),
            super_class_list: vec![crate::model::SuperClass {
                name: "Base".into(),
                qualified: "Base".into(),
                access: crate::model::Access::Public,
            }],
            ..Default::default()
        };
        assert_eq!(
            Generator::new(&def, &known).super_data(),
            "QMetaObject::SuperData::link<Base::staticMetaObject>()"
        );

        def.super_class_list[0].qualified = "Plain".into();
        assert_eq!(
            Generator::new(&def, &known).super_data(),
            "QtPrivate::MetaObjectForType<Plain>::value"
        );

        def.super_class_list.clear();
        assert_eq!(Generator::new(&def, &known).super_data(), "nullptr");
    }

    #[test]
    fn test_related_meta_objects() {
        let mut known = KnownTypes::new();
        known.add_gadget("Style", "Style");
        let def = ClassDef {
            qualified: "Label".into(),
            classname: "Label".into(),
            property_list: vec![crate::model::PropertyDef {
                name: "mode".into(),
                ty: "Style::Mode".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let generator = Generator::new(&def, &known);
        assert_eq!(generator.related_meta_objects(), vec!["Style".to_string()]);
        let mut out = String::new();
        generator.generate(&mut out).unwrap();
        assert!(out.contains("QMetaObject::SuperData::link<Style::staticMetaObject>(),\n    nullptr\n};"));
        assert!(out.contains("    qt_meta_extradata_Label,"));
    }
}
