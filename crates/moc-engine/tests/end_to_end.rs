//! End-to-end tests: source text in, metadata and generated code out
//!
//! Tests cover:
//! - Property, signal and enum wiring in the metadata array
//! - Default-argument clones in the dispatcher
//! - Header offsets against the laid-out sections
//! - Deterministic output and cross-file knowledge
//! - Warnings and fatal errors

use std::collections::HashSet;

use moc_engine::generator::table::{Cell, MetaTable, METHOD_ROW_SIZE, PROPERTY_ROW_SIZE};
use moc_engine::generator::Generator;
use moc_engine::{compile_source, FsLoader, KnownTypes, MocError, MocOptions, MocOutput, Severity};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn compile(source: &str) -> MocOutput {
    compile_source(source, "test.h", &mut KnownTypes::new(), &MocOptions::default(), &FsLoader)
        .expect("compilation failed")
}

fn compile_err(source: &str) -> MocError {
    compile_source(source, "test.h", &mut KnownTypes::new(), &MocOptions::default(), &FsLoader)
        .expect_err("compilation should fail")
}

fn table_for(output: &MocOutput, index: usize) -> MetaTable {
    let known = KnownTypes::new();
    Generator::new(&output.classes[index], &known).table().clone()
}

const COUNTER: &str = r#"
class Counter : public QObject
{
    Q_OBJECT
    Q_PROPERTY(int value READ value NOTIFY valueChanged)
public:
    enum Mode { Fast, Slow };
    Q_ENUM(Mode)

    int value() const;

signals:
    void valueChanged(int value);
};
"#;

// =============================================================================
// PROPERTY / SIGNAL / ENUM SCENARIO
// =============================================================================

#[test]
fn test_property_references_notify_signal() {
    let output = compile(COUNTER);
    assert_eq!(output.classes.len(), 1);
    let def = &output.classes[0];
    assert_eq!(def.signal_list.len(), 1);
    assert_eq!(def.signal_list[0].name, "valueChanged");
    assert_eq!(def.property_list[0].notify_id, 0);

    let table = table_for(&output, 0);
    let values = table.values();
    let row = table.offsets.properties;
    // name, type, flags, notify, revision
    assert_eq!(values[row + 3], Some(0));
    assert!(output.code.contains("uint(0)"));
}

#[test]
fn test_enum_block_in_declaration_order() {
    let output = compile(COUNTER);
    let table = table_for(&output, 0);
    let cells: Vec<&Cell> = table.cells().collect();

    let enum_row = table.offsets.enums;
    assert_eq!(cells[enum_row + 3], &Cell::Num(2));
    assert_eq!(cells[enum_row + 4], &Cell::Num(table.offsets.enum_data as u32));

    // exactly two (name, value) pairs
    assert_eq!(table.offsets.constructors - table.offsets.enum_data, 4);
    let data = table.offsets.enum_data;
    assert_eq!(cells[data + 1], &Cell::EnumValue("Counter::Fast".into()));
    assert_eq!(cells[data + 3], &Cell::EnumValue("Counter::Slow".into()));

    let strings = Generator::new(&output.classes[0], &KnownTypes::new()).strings().clone();
    assert_eq!(cells[data], &Cell::Num(strings.index("Fast") as u32));
    assert_eq!(cells[data + 2], &Cell::Num(strings.index("Slow") as u32));
}

#[test]
fn test_generated_code_pieces() {
    let output = compile(COUNTER);
    let code = &output.code;
    assert!(code.contains("Q_MOC_OUTPUT_REVISION != 68"));
    assert!(code.contains("#include \"test.h\""));
    assert!(code.contains("Q_CONSTINIT static const uint qt_meta_data_Counter[] = {"));
    assert!(code.contains("QMetaObject::SuperData::link<QObject::staticMetaObject>(),"));
    assert!(code.contains("case 0: *reinterpret_cast< int*>(_v) = _t->value(); break;"));
    assert!(code.contains("void Counter::valueChanged(int _t1)"));
    assert!(code.contains("QMetaObject::activate(this, &staticMetaObject, 0, _a);"));
    assert!(code.contains("uint(Counter::Fast)"));
}

// =============================================================================
// DEFAULT ARGUMENTS
// =============================================================================

const PRINTER: &str = r#"
class Printer : public QObject
{
    Q_OBJECT
public slots:
    void print(const QString &text, int copies = 1, bool duplex = false);
};
"#;

#[test]
fn test_default_arguments_produce_three_cases() {
    let output = compile(PRINTER);
    let def = &output.classes[0];
    assert_eq!(def.slot_list.len(), 3);
    let arities: Vec<usize> = def.slot_list.iter().map(|f| f.arguments.len()).collect();
    assert_eq!(arities, vec![3, 2, 1]);
    assert_eq!(def.slot_list.iter().filter(|f| f.was_cloned).count(), 2);
    assert!(!def.slot_list[0].was_cloned);

    let code = &output.code;
    let text = "(*reinterpret_cast< std::add_pointer_t<QString>>(_a[1]))";
    assert!(code.contains(&format!(
        "case 0: _t->print({text},(*reinterpret_cast< std::add_pointer_t<int>>(_a[2])),(*reinterpret_cast< std::add_pointer_t<bool>>(_a[3]))); break;"
    )));
    assert!(code.contains(&format!(
        "case 1: _t->print({text},(*reinterpret_cast< std::add_pointer_t<int>>(_a[2]))); break;"
    )));
    assert!(code.contains(&format!("case 2: _t->print({text}); break;")));
    assert!(!code.contains("case 3:"));
}

#[test]
fn test_shortest_clone_is_flagged_cloned() {
    let output = compile(PRINTER);
    let table = table_for(&output, 0);
    let values = table.values();
    let third = table.offsets.methods + 2 * METHOD_ROW_SIZE;
    assert_eq!(values[third + 1], Some(1));
    // public slot, cloned
    assert_eq!(values[third + 4], Some(0x2a));
    let first = table.offsets.methods;
    assert_eq!(values[first + 4], Some(0x0a));
}

// =============================================================================
// OFFSETS
// =============================================================================

const GADGET: &str = r#"
struct Style
{
    Q_GADGET
    Q_CLASSINFO("author", "someone")
    Q_PROPERTY(int size MEMBER size)
    Q_PROPERTY(Mode mode MEMBER mode)
public:
    enum class Mode { Light, Dark, System };
    Q_ENUM(Mode)
    enum Option { Bold = 1, Italic = 2 };
    Q_DECLARE_FLAGS(Options, Option)
    Q_FLAG(Options)

    Q_INVOKABLE Style(int size = 10);
    Q_INVOKABLE void apply(const QString &target);

    int size;
    Mode mode;
};
"#;

#[test]
fn test_header_offsets_resolve_to_sections() {
    let output = compile(GADGET);
    let def = &output.classes[0];
    let table = table_for(&output, 0);
    let values = table.values();
    let o = table.offsets;

    assert_eq!(values[1], Some(0));
    assert_eq!(values[2], Some(def.class_info_list.len() as u32));
    assert_eq!(values[3], Some(o.class_info as u32));
    assert_eq!(values[4], Some(1));
    assert_eq!(values[5], Some(o.methods as u32));
    assert_eq!(values[6], Some(2));
    assert_eq!(values[7], Some(o.properties as u32));
    assert_eq!(values[8], Some(2));
    assert_eq!(values[9], Some(o.enums as u32));
    assert_eq!(values[10], Some(2));
    assert_eq!(values[11], Some(o.constructors as u32));
    // gadgets access properties through the static metacall
    assert_eq!(values[12], Some(4));

    let section_sizes = 2 * def.class_info_list.len()
        + METHOD_ROW_SIZE
        + (1 + 2)
        + (1 + 1)
        + (1 + 0)
        + 2 * PROPERTY_ROW_SIZE
        + 2 * 5
        + 2 * (3 + 2)
        + 2 * METHOD_ROW_SIZE;
    assert_eq!(values.len(), 14 + section_sizes + 1);
    assert_eq!(values.len(), o.end + 1);
    assert_eq!(values.last(), Some(&Some(0)));
}

#[test]
fn test_flag_alias_and_scoped_enum() {
    let output = compile(GADGET);
    let known_types = KnownTypes::new();
    let generator = Generator::new(&output.classes[0], &known_types);
    let names: Vec<&str> = generator.enums().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Mode", "Options"]);
    assert!(output.code.contains("uint(Style::Mode::Light)"));
    assert!(output.code.contains("uint(Style::Bold)"));
    assert!(output.code.contains("{ Style *_r = new Style((*reinterpret_cast< std::add_pointer_t<int>>(_a[1])));"));
    assert!(output.code.contains("case 1: { Style *_r = new Style();"));
    assert!(output.code.contains("auto *_t = reinterpret_cast<Style *>(_o);"));
    assert!(!output.code.contains("qt_metacast"));
}

// =============================================================================
// DETERMINISM AND CROSS-FILE STATE
// =============================================================================

#[test]
fn test_output_is_deterministic() {
    let first = compile(GADGET);
    let second = compile(GADGET);
    assert_eq!(first.code, second.code);
    assert_eq!(compile(COUNTER).code, compile(COUNTER).code);
}

#[test]
fn test_known_classes_carry_across_files() {
    let mut known = KnownTypes::new();
    let options = MocOptions::default();
    compile_source(COUNTER, "counter.h", &mut known, &options, &FsLoader).unwrap();
    assert!(known.is_qobject_class("Counter"));

    let source = r#"
class Watcher : public QObject
{
    Q_OBJECT
signals:
    void watched(Counter *counter);
};
"#;
    let output = compile_source(source, "watcher.h", &mut known, &options, &FsLoader).unwrap();
    assert!(output.code.contains("QMetaType::fromType< Counter* >()"));
}

const SHARED_NAMES: &str = r#"
class Sender : public QObject
{
    Q_OBJECT
signals:
    void changed(QObject *source);
};

class Receiver : public QObject
{
    Q_OBJECT
public slots:
    void update();
signals:
    void changed(QObject *source);
};
"#;

#[test]
fn test_string_tables_stay_duplicate_free_across_declarations() {
    let output = compile(SHARED_NAMES);
    assert_eq!(output.classes.len(), 2);
    let known = KnownTypes::new();

    for def in &output.classes {
        let generator = Generator::new(def, &known);
        let strings = generator.strings();
        let all: Vec<&str> = strings.iter().collect();
        let unique: HashSet<&str> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len(), "duplicate string in table of {}", def.classname);

        for shared in ["changed", "QObject*", "source"] {
            assert_eq!(all.iter().filter(|s| **s == shared).count(), 1);
        }

        // rebuilding gives the same positions
        let again = Generator::new(def, &known);
        for s in &all {
            assert_eq!(again.strings().index(s), strings.index(s));
        }

        // the signal row names the shared string
        let values = generator.table().values();
        let signal_row = generator.table().offsets.methods;
        assert_eq!(values[signal_row], Some(strings.index("changed") as u32));
    }

    let sender = Generator::new(&output.classes[0], &known).strings().clone();
    let receiver = Generator::new(&output.classes[1], &known).strings().clone();
    assert_eq!(sender.index("Sender"), 0);
    assert_eq!(receiver.index("Receiver"), 0);
    assert_eq!(sender.index("changed"), 1);
    assert_eq!(receiver.index("changed"), 1);
    assert!(receiver.index("update") > receiver.index("QObject*"));
}

#[test]
fn test_byte_escapes_keep_c_string_lengths() {
    let source = r#"
class Info : public QObject
{
    Q_OBJECT
    Q_CLASSINFO("author", "caf\xc3\xa9")
};
"#;
    let output = compile(source);
    assert_eq!(output.classes[0].class_info_list[0].value, "café");
    // "Info\0author\0" precede the value
    assert!(output.code.contains("QT_MOC_LITERAL(12, 5)"));
    assert!(output.code.contains("\"caf\\303\\251\""));
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

#[test]
fn test_property_conflict_warns_and_repairs() {
    let source = r#"
class Config : public QObject
{
    Q_OBJECT
    Q_PROPERTY(int level READ level WRITE setLevel CONSTANT)
public:
    int level() const;
    void setLevel(int);
};
"#;
    let output = compile(source);
    assert!(!output.classes[0].property_list[0].constant);
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning && d.line > 0));
}

#[test]
fn test_duplicate_property_warns() {
    let source = r#"
class Config : public QObject
{
    Q_OBJECT
    Q_PROPERTY(int level MEMBER m_level)
    Q_PROPERTY(int level MEMBER m_other)
    int m_level;
    int m_other;
};
"#;
    let output = compile(source);
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.message == "The property 'level' is defined multiple times in class Config."));

    let quiet = MocOptions {
        no_warnings: true,
        ..Default::default()
    };
    let output = compile_source(source, "test.h", &mut KnownTypes::new(), &quiet, &FsLoader).unwrap();
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_structural_errors() {
    let err = compile_err("class A { signals: void s(); };");
    assert!(err.to_string().contains("Class declaration lacks Q_OBJECT macro."));

    let err = compile_err("class A : public QObject { Q_OBJECT class B { Q_OBJECT }; };");
    assert!(err.to_string().contains("Meta object features not supported for nested classes"));

    let err = compile_err("template <typename T> class A : public QObject { Q_OBJECT };");
    assert!(err.to_string().contains("Template classes not supported by Q_OBJECT"));
}

#[test]
fn test_error_line_numbers() {
    let source = "\n\nclass A\n{\n    Q_OBJECT\n};\n";
    match compile_err(source) {
        MocError::Parse(err) => {
            assert_eq!(err.file, "test.h");
            assert_eq!(err.line, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}
