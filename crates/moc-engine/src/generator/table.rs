//! The flat metadata array.
//!
//! The array is laid out in two passes: a sizing pass computes the start of
//! every block so that the header and the rows can carry offsets, then the
//! rows are emitted in block order. Cells keep their symbolic form
//! (`QMetaType::Int`, `uint(Color::Red)`) because that is what the generated
//! source spells; [`Cell::value`] gives the number where it is known.

use std::fmt::{self, Write};

use super::builtin::builtin_type;
use crate::interner::StringTable;
use crate::model::{Access, ClassDef, DeclKind, EnumDef, FunctionDef, MethodKind, PropertyDef};

/// Layout revision of the metadata array.
pub const CONTENT_REVISION: u32 = 12;

pub const HEADER_SIZE: usize = 14;
pub const METHOD_ROW_SIZE: usize = 6;
pub const PROPERTY_ROW_SIZE: usize = 5;
pub const ENUM_ROW_SIZE: usize = 5;

/// Set in a type cell when the rest is a string index, not a metatype id.
pub const IS_UNRESOLVED_TYPE: u32 = 0x8000_0000;
/// Set in a notify cell when the rest is the string index of a signal
/// declared elsewhere.
pub const IS_UNRESOLVED_SIGNAL: u32 = 0x7000_0000;

/// Header flag for gadgets and namespaces.
pub const PROPERTY_ACCESS_IN_STATIC_META_CALL: u32 = 0x04;

pub mod method_flags {
    pub const ACCESS_PRIVATE: u32 = 0x00;
    pub const ACCESS_PROTECTED: u32 = 0x01;
    pub const ACCESS_PUBLIC: u32 = 0x02;
    pub const METHOD_METHOD: u32 = 0x00;
    pub const METHOD_SIGNAL: u32 = 0x04;
    pub const METHOD_SLOT: u32 = 0x08;
    pub const METHOD_CONSTRUCTOR: u32 = 0x0c;
    pub const METHOD_COMPATIBILITY: u32 = 0x10;
    pub const METHOD_CLONED: u32 = 0x20;
    pub const METHOD_SCRIPTABLE: u32 = 0x40;
    pub const METHOD_REVISIONED: u32 = 0x80;
    pub const METHOD_IS_CONST: u32 = 0x100;
}

pub mod property_flags {
    pub const READABLE: u32 = 0x0000_0001;
    pub const WRITABLE: u32 = 0x0000_0002;
    pub const RESETTABLE: u32 = 0x0000_0004;
    pub const ENUM_OR_FLAG: u32 = 0x0000_0008;
    pub const STD_CPP_SET: u32 = 0x0000_0100;
    pub const CONSTANT: u32 = 0x0000_0400;
    pub const FINAL: u32 = 0x0000_0800;
    pub const DESIGNABLE: u32 = 0x0000_1000;
    pub const SCRIPTABLE: u32 = 0x0000_4000;
    pub const STORED: u32 = 0x0001_0000;
    pub const USER: u32 = 0x0010_0000;
    pub const REQUIRED: u32 = 0x0100_0000;
    pub const BINDABLE: u32 = 0x0200_0000;
}

pub mod enum_flags {
    pub const IS_FLAG: u32 = 0x1;
    pub const IS_SCOPED: u32 = 0x2;
}

// ============================================================================
// Cells and rows
// ============================================================================

/// One `uint` of the metadata array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Num(u32),
    /// Flags, printed in hex with the given digit count
    Hex(u32, usize),
    /// Builtin metatype enumerator and id
    Builtin(&'static str, u32),
    /// Non-builtin type by string index
    Unresolved(u32),
    /// Notify signal index, `None` for no signal
    Notify(Option<u32>),
    /// Signal declared outside the class, by string index
    UnresolvedSignal(u32),
    /// An enumerator, only known to the C++ compiler
    EnumValue(String),
}

impl Cell {
    /// Numeric value, `None` for enumerator values.
    pub fn value(&self) -> Option<u32> {
        match self {
            Cell::Num(v) | Cell::Hex(v, _) | Cell::Builtin(_, v) => Some(*v),
            Cell::Unresolved(index) => Some(IS_UNRESOLVED_TYPE | index),
            Cell::Notify(index) => Some(index.unwrap_or(u32::MAX)),
            Cell::UnresolvedSignal(index) => Some(IS_UNRESOLVED_SIGNAL | index),
            Cell::EnumValue(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Num(v) => write!(f, "{v:4}"),
            Cell::Hex(v, width) => write!(f, "0x{v:0width$x}"),
            Cell::Builtin(name, _) => write!(f, "QMetaType::{name}"),
            Cell::Unresolved(index) => write!(f, "0x{IS_UNRESOLVED_TYPE:08x} | {index}"),
            Cell::Notify(Some(index)) => write!(f, "uint({index})"),
            Cell::Notify(None) => write!(f, "uint(-1)"),
            Cell::UnresolvedSignal(index) => write!(f, "0x{IS_UNRESOLVED_SIGNAL:08x} | {index}"),
            Cell::EnumValue(code) => write!(f, "uint({code})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub comment: Option<String>,
}

impl Row {
    fn new(cells: Vec<Cell>) -> Self {
        Self { cells, comment: None }
    }

    fn with_comment(cells: Vec<Cell>, comment: impl Into<String>) -> Self {
        Self {
            cells,
            comment: Some(comment.into()),
        }
    }
}

/// A block of rows introduced by a comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

/// Start index of every block, from the sizing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offsets {
    pub class_info: usize,
    pub methods: usize,
    pub revisions: usize,
    pub parameters: usize,
    pub properties: usize,
    pub enums: usize,
    pub enum_data: usize,
    pub constructors: usize,
    /// Index of the terminating zero
    pub end: usize,
}

/// The laid-out metadata array of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTable {
    pub offsets: Offsets,
    pub sections: Vec<Section>,
}

impl MetaTable {
    /// All cells in array order, without the terminator.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.sections.iter().flat_map(|s| s.rows.iter()).flat_map(|r| r.cells.iter())
    }

    /// Number of `uint`s including the terminator.
    pub fn len(&self) -> usize {
        self.cells().count() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Values by position; `None` where the value is an enumerator.
    pub fn values(&self) -> Vec<Option<u32>> {
        self.cells().map(Cell::value).chain(std::iter::once(Some(0))).collect()
    }

    /// Write the `qt_meta_data_<ident>` array.
    pub fn write(&self, out: &mut impl Write, ident: &str) -> fmt::Result {
        writeln!(out, "Q_CONSTINIT static const uint qt_meta_data_{ident}[] = {{")?;
        for section in &self.sections {
            writeln!(out)?;
            writeln!(out, " // {}", section.title)?;
            for row in &section.rows {
                let cells: Vec<String> = row.cells.iter().map(|c| format!("{c:>4}")).collect();
                match &row.comment {
                    Some(comment) => writeln!(out, "    {}, // {}", cells.join(", "), comment)?,
                    None => writeln!(out, "    {},", cells.join(", "))?,
                }
            }
        }
        writeln!(out)?;
        writeln!(out, "       0        // eod")?;
        writeln!(out, "}};")
    }
}

// ============================================================================
// Building
// ============================================================================

fn type_cell(strings: &StringTable, type_name: &str) -> Cell {
    match builtin_type(type_name) {
        Some(builtin) => Cell::Builtin(builtin.enumerator, builtin.id),
        None => Cell::Unresolved(strings.index(type_name) as u32),
    }
}

fn str_cell(strings: &StringTable, s: &str) -> Cell {
    Cell::Num(strings.index(s) as u32)
}

fn method_flags(f: &FunctionDef) -> (u32, String) {
    use method_flags::*;

    let (mut flags, mut comment) = match f.access {
        Access::Private => (ACCESS_PRIVATE, String::from("Private")),
        Access::Protected => (ACCESS_PROTECTED, String::from("Protected")),
        Access::Public => (ACCESS_PUBLIC, String::from("Public")),
    };
    flags |= match f.kind {
        MethodKind::Signal => METHOD_SIGNAL,
        MethodKind::Slot => METHOD_SLOT,
        MethodKind::Constructor => METHOD_CONSTRUCTOR,
        MethodKind::Method | MethodKind::Destructor => METHOD_METHOD,
    };
    for (set, flag, text) in [
        (f.is_compat, METHOD_COMPATIBILITY, "MethodCompatibility"),
        (f.was_cloned, METHOD_CLONED, "MethodCloned"),
        (f.is_scriptable, METHOD_SCRIPTABLE, "isScriptable"),
        (f.revision > 0, METHOD_REVISIONED, "MethodRevisioned"),
        (f.is_const, METHOD_IS_CONST, "MethodIsConst"),
    ] {
        if set {
            flags |= flag;
            comment.push_str(" | ");
            comment.push_str(text);
        }
    }
    (flags, comment)
}

/// Flags of a property row.
pub fn property_flags(p: &PropertyDef) -> u32 {
    use property_flags::*;

    let mut flags = 0;
    if builtin_type(&p.ty).is_none() {
        flags |= ENUM_OR_FLAG;
    }
    if !p.member.is_empty() && !p.constant {
        flags |= WRITABLE;
    }
    if !p.read.is_empty() || !p.member.is_empty() {
        flags |= READABLE;
    }
    if !p.write.is_empty() {
        flags |= WRITABLE;
        if p.std_cpp_set() {
            flags |= STD_CPP_SET;
        }
    }
    if !p.reset.is_empty() {
        flags |= RESETTABLE;
    }
    if p.designable != "false" {
        flags |= DESIGNABLE;
    }
    if p.scriptable != "false" {
        flags |= SCRIPTABLE;
    }
    if p.stored != "false" {
        flags |= STORED;
    }
    if p.user != "false" {
        flags |= USER;
    }
    if p.constant {
        flags |= CONSTANT;
    }
    if p.final_ {
        flags |= FINAL;
    }
    if p.required {
        flags |= REQUIRED;
    }
    if !p.bind.is_empty() {
        flags |= BINDABLE;
    }
    flags
}

/// Index of the first method's return type in the metatype array:
/// properties, enums and the class itself come first.
pub fn first_method_metatype(def: &ClassDef, enums: &[EnumDef]) -> usize {
    def.property_list.len() + enums.len() + 1
}

fn compute_offsets(def: &ClassDef, enums: &[EnumDef]) -> Offsets {
    let methods: Vec<&FunctionDef> = def.methods().collect();
    let mut offsets = Offsets::default();
    let mut index = HEADER_SIZE;

    offsets.class_info = index;
    index += def.class_info_list.len() * 2;

    offsets.methods = index;
    index += methods.len() * METHOD_ROW_SIZE;

    offsets.revisions = index;
    if def.revisioned_methods > 0 {
        index += methods.len();
    }

    offsets.parameters = index;
    for f in &methods {
        index += 1 + f.arguments.len() * 2;
    }
    for f in &def.constructor_list {
        index += 1 + f.arguments.len();
    }

    offsets.properties = index;
    index += def.property_list.len() * PROPERTY_ROW_SIZE;

    offsets.enums = index;
    index += enums.len() * ENUM_ROW_SIZE;

    offsets.enum_data = index;
    index += enums.iter().map(|e| e.values.len() * 2).sum::<usize>();

    offsets.constructors = index;
    index += def.constructor_list.len() * METHOD_ROW_SIZE;

    offsets.end = index;
    offsets
}

fn count_and_offset(count: usize, offset: usize, comment: &str) -> Row {
    let offset = if count > 0 { offset } else { 0 };
    Row::with_comment(vec![Cell::Num(count as u32), Cell::Num(offset as u32)], comment)
}

fn method_rows(
    functions: &[FunctionDef],
    strings: &StringTable,
    params_index: &mut usize,
    metatype_offset: &mut usize,
) -> Vec<Row> {
    let mut rows = Vec::with_capacity(functions.len());
    for f in functions {
        let (flags, comment) = method_flags(f);
        let argc = f.arguments.len();
        rows.push(Row::with_comment(
            vec![
                str_cell(strings, &f.name),
                Cell::Num(argc as u32),
                Cell::Num(*params_index as u32),
                str_cell(strings, &f.tag),
                Cell::Hex(flags, 2),
                Cell::Num(*metatype_offset as u32),
            ],
            comment,
        ));
        if f.kind == MethodKind::Constructor {
            *params_index += 1 + argc;
            *metatype_offset += argc;
        } else {
            *params_index += 1 + argc * 2;
            *metatype_offset += 1 + argc;
        }
    }
    rows
}

fn parameter_rows(functions: &[FunctionDef], strings: &StringTable) -> Vec<Row> {
    functions
        .iter()
        .map(|f| {
            let mut cells = vec![type_cell(strings, &f.normalized_type)];
            cells.extend(f.arguments.iter().map(|a| type_cell(strings, &a.normalized_type)));
            if f.kind != MethodKind::Constructor {
                cells.extend(f.arguments.iter().map(|a| str_cell(strings, &a.name)));
            }
            Row::new(cells)
        })
        .collect()
}

fn push_section(sections: &mut Vec<Section>, title: &str, rows: Vec<Row>) {
    if !rows.is_empty() {
        sections.push(Section {
            title: title.to_string(),
            rows,
        });
    }
}

/// Enumerator expression for a value of `e` declared in `def`.
fn enum_value_code(def: &ClassDef, e: &EnumDef, value: &str) -> String {
    if e.is_enum_class {
        format!("{}::{}::{}", def.qualified, e.qualifier(), value)
    } else {
        format!("{}::{}", def.qualified, value)
    }
}

/// Lay out the metadata array of `def`. Every string it refers to must be
/// registered in `strings`.
pub fn build_table(def: &ClassDef, enums: &[EnumDef], strings: &StringTable) -> MetaTable {
    let offsets = compute_offsets(def, enums);
    let method_count = def.signal_list.len() + def.slot_list.len() + def.method_list.len();
    let mut sections = Vec::new();

    let flags = if def.kind == DeclKind::Object {
        0
    } else {
        PROPERTY_ACCESS_IN_STATIC_META_CALL
    };
    sections.push(Section {
        title: "content:".to_string(),
        rows: vec![
            Row::with_comment(vec![Cell::Num(CONTENT_REVISION)], "revision"),
            Row::with_comment(vec![str_cell(strings, &def.qualified)], "classname"),
            count_and_offset(def.class_info_list.len(), offsets.class_info, "classinfo"),
            count_and_offset(method_count, offsets.methods, "methods"),
            count_and_offset(def.property_list.len(), offsets.properties, "properties"),
            count_and_offset(enums.len(), offsets.enums, "enums/sets"),
            count_and_offset(def.constructor_list.len(), offsets.constructors, "constructors"),
            Row::with_comment(vec![Cell::Num(flags)], "flags"),
            Row::with_comment(vec![Cell::Num(def.signal_list.len() as u32)], "signalCount"),
        ],
    });

    let class_info = def
        .class_info_list
        .iter()
        .map(|info| Row::new(vec![str_cell(strings, &info.name), str_cell(strings, &info.value)]))
        .collect();
    push_section(&mut sections, "classinfo: key, value", class_info);

    let mut params_index = offsets.parameters;
    let mut metatype_offset = first_method_metatype(def, enums);
    for (title, list) in [
        ("signals", &def.signal_list),
        ("slots", &def.slot_list),
        ("methods", &def.method_list),
    ] {
        let rows = method_rows(list, strings, &mut params_index, &mut metatype_offset);
        push_section(
            &mut sections,
            &format!("{title}: name, argc, parameters, tag, flags, initial metatype offsets"),
            rows,
        );
    }

    if def.revisioned_methods > 0 {
        for (title, list) in [
            ("signals", &def.signal_list),
            ("slots", &def.slot_list),
            ("methods", &def.method_list),
        ] {
            let rows = list.iter().map(|f| Row::new(vec![Cell::Num(f.revision as u32)])).collect();
            push_section(&mut sections, &format!("{title}: revision"), rows);
        }
    }

    for (title, list) in [
        ("signals", &def.signal_list),
        ("slots", &def.slot_list),
        ("methods", &def.method_list),
        ("constructors", &def.constructor_list),
    ] {
        push_section(&mut sections, &format!("{title}: parameters"), parameter_rows(list, strings));
    }

    let properties = def
        .property_list
        .iter()
        .map(|p| {
            let notify = if p.notify_id < -1 {
                Cell::UnresolvedSignal(strings.index(&p.notify) as u32)
            } else if p.notify_id >= 0 {
                Cell::Notify(Some(p.notify_id as u32))
            } else {
                Cell::Notify(None)
            };
            Row::new(vec![
                str_cell(strings, &p.name),
                type_cell(strings, &p.ty),
                Cell::Hex(property_flags(p), 8),
                notify,
                Cell::Num(p.revision as u32),
            ])
        })
        .collect();
    push_section(&mut sections, "properties: name, type, flags, notifyId, revision", properties);

    let mut data_index = offsets.enum_data;
    let mut enum_rows = Vec::with_capacity(enums.len());
    for e in enums {
        let mut flags = 0;
        if e.is_flag {
            flags |= enum_flags::IS_FLAG;
        }
        if e.is_enum_class {
            flags |= enum_flags::IS_SCOPED;
        }
        let alias = if e.enum_name.is_empty() { &e.name } else { &e.enum_name };
        enum_rows.push(Row::new(vec![
            str_cell(strings, &e.name),
            str_cell(strings, alias),
            Cell::Hex(flags, 1),
            Cell::Num(e.values.len() as u32),
            Cell::Num(data_index as u32),
        ]));
        data_index += e.values.len() * 2;
    }
    push_section(&mut sections, "enums: name, alias, flags, count, data", enum_rows);

    let enum_data = enums
        .iter()
        .flat_map(|e| {
            e.values.iter().map(move |value| {
                Row::new(vec![str_cell(strings, value), Cell::EnumValue(enum_value_code(def, e, value))])
            })
        })
        .collect();
    push_section(&mut sections, "enum data: key, value", enum_data);

    let constructors = method_rows(&def.constructor_list, strings, &mut params_index, &mut metatype_offset);
    push_section(
        &mut sections,
        "constructors: name, argc, parameters, tag, flags, initial metatype offsets",
        constructors,
    );

    MetaTable { offsets, sections }
}

// ============================================================================
// Metatype array
// ============================================================================

/// One entry of the metatype array referenced by the method rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTypeEntry {
    /// Comment introducing a group of entries
    pub label: Option<String>,
    pub type_name: String,
    /// Whether the type must be complete where the array is instantiated
    pub force_complete: bool,
}

impl MetaTypeEntry {
    fn new(label: Option<String>, type_name: impl Into<String>, force_complete: bool) -> Self {
        Self {
            label,
            type_name: type_name.into(),
            force_complete,
        }
    }
}

/// Metatype array in offset order: properties, enums, the declaration
/// itself (`void` for namespaces), method return and argument types, then
/// constructor argument types.
pub fn metatype_entries(def: &ClassDef, enums: &[EnumDef]) -> Vec<MetaTypeEntry> {
    let mut entries = Vec::new();
    for p in &def.property_list {
        entries.push(MetaTypeEntry::new(Some(format!("property '{}'", p.name)), &p.ty, true));
    }
    for e in enums {
        entries.push(MetaTypeEntry::new(
            Some(format!("enum '{}'", e.name)),
            format!("{}::{}", def.qualified, e.name),
            true,
        ));
    }
    let own = if def.is_namespace() { "void" } else { def.qualified.as_str() };
    entries.push(MetaTypeEntry::new(Some("Q_OBJECT / Q_GADGET".to_string()), own, true));

    for f in def.methods() {
        entries.push(MetaTypeEntry::new(Some(format!("method '{}'", f.name)), &f.ty.name, false));
        for arg in &f.arguments {
            entries.push(MetaTypeEntry::new(None, &arg.ty.name, false));
        }
    }
    for f in &def.constructor_list {
        for (i, arg) in f.arguments.iter().enumerate() {
            let label = (i == 0).then(|| format!("constructor '{}'", f.name));
            entries.push(MetaTypeEntry::new(label, &arg.ty.name, false));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::strings::register_strings;
    use crate::model::{ArgumentDef, Type};

    fn arg(ty: &str, name: &str) -> ArgumentDef {
        ArgumentDef {
            ty: Type::new(ty),
            normalized_type: ty.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn function(name: &str, kind: MethodKind, args: Vec<ArgumentDef>) -> FunctionDef {
        FunctionDef {
            name: name.into(),
            ty: Type::new("void"),
            normalized_type: "void".into(),
            kind,
            arguments: args,
            ..Default::default()
        }
    }

    fn sample() -> ClassDef {
        ClassDef {
            classname: "Counter".into(),
            qualified: "Counter".into(),
            signal_list: vec![function("valueChanged", MethodKind::Signal, vec![arg("int", "v")])],
            slot_list: vec![function("setLabel", MethodKind::Slot, vec![arg("Label", "l"), arg("int", "n")])],
            property_list: vec![PropertyDef {
                name: "value".into(),
                ty: "int".into(),
                read: "value".into(),
                write: "setValue".into(),
                notify: "valueChanged".into(),
                notify_id: 0,
                designable: "true".into(),
                scriptable: "true".into(),
                stored: "true".into(),
                user: "false".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_offsets_match_layout() {
        let def = sample();
        let strings = register_strings(&def, &[]);
        let table = build_table(&def, &[], &strings);
        let values = table.values();

        assert_eq!(values[0], Some(CONTENT_REVISION));
        assert_eq!(values[4], Some(2));
        assert_eq!(values[5], Some(table.offsets.methods as u32));
        assert_eq!(values[7], Some(table.offsets.properties as u32));
        assert_eq!(values.len(), table.offsets.end + 1);

        // signal parameters start where its row says
        let params = values[table.offsets.methods + 2].unwrap() as usize;
        assert_eq!(params, table.offsets.parameters);
        assert_eq!(values[params], Some(43));
        assert_eq!(values[params + 1], Some(2));

        // second method: after 1 + 2 * argc cells
        let slot_params = values[table.offsets.methods + METHOD_ROW_SIZE + 2].unwrap() as usize;
        assert_eq!(slot_params, params + 3);
        assert_eq!(values[slot_params + 1], Some(IS_UNRESOLVED_TYPE | strings.index("Label") as u32));
    }

    #[test]
    fn test_metatype_offsets() {
        let def = sample();
        let strings = register_strings(&def, &[]);
        let table = build_table(&def, &[], &strings);
        let values = table.values();
        let entries = metatype_entries(&def, &[]);

        let signal_offset = values[table.offsets.methods + 5].unwrap() as usize;
        let slot_offset = values[table.offsets.methods + METHOD_ROW_SIZE + 5].unwrap() as usize;
        assert_eq!(signal_offset, 2);
        assert_eq!(slot_offset, 4);
        assert_eq!(entries[signal_offset].label.as_deref(), Some("method 'valueChanged'"));
        assert_eq!(entries[slot_offset + 1].type_name, "Label");
        assert_eq!(entries.len(), 7);
    }

    #[test]
    fn test_property_flags() {
        let def = sample();
        assert_eq!(property_flags(&def.property_list[0]), 0x0001_5103);
        let constant = PropertyDef {
            ty: "Custom".into(),
            member: "m".into(),
            constant: true,
            designable: "false".into(),
            scriptable: "true".into(),
            stored: "true".into(),
            user: "false".into(),
            ..Default::default()
        };
        let flags = property_flags(&constant);
        assert_eq!(flags & property_flags::WRITABLE, 0);
        assert_ne!(flags & property_flags::CONSTANT, 0);
        assert_ne!(flags & property_flags::ENUM_OR_FLAG, 0);
        assert_eq!(flags & property_flags::DESIGNABLE, 0);
    }

    #[test]
    fn test_enum_rows_and_values() {
        let mut def = sample();
        def.qualified = "Ns::Counter".into();
        let enums = vec![EnumDef {
            name: "Mode".into(),
            values: vec!["A".into(), "B".into()],
            is_enum_class: true,
            ..Default::default()
        }];
        let strings = register_strings(&def, &enums);
        let table = build_table(&def, &enums, &strings);
        let values = table.values();
        let row = table.offsets.enums;
        assert_eq!(values[row + 2], Some(enum_flags::IS_SCOPED));
        assert_eq!(values[row + 3], Some(2));
        assert_eq!(values[row + 4], Some(table.offsets.enum_data as u32));
        assert_eq!(values[table.offsets.enum_data + 1], None);
        let cells: Vec<&Cell> = table.cells().collect();
        assert_eq!(
            cells[table.offsets.enum_data + 1],
            &Cell::EnumValue("Ns::Counter::Mode::A".into())
        );
    }

    #[test]
    fn test_rendering() {
        let def = sample();
        let strings = register_strings(&def, &[]);
        let table = build_table(&def, &[], &strings);
        let mut out = String::new();
        table.write(&mut out, "Counter").unwrap();
        assert!(out.starts_with("Q_CONSTINIT static const uint qt_meta_data_Counter[] = {"));
        assert!(out.contains("      12, // revision"));
        assert!(out.contains("QMetaType::Void, QMetaType::Int,"));
        assert!(out.contains("0x00015103, uint(0),"));
        assert!(out.contains("// eod"));
    }
}
