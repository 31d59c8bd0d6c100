//! Dispatch code: `qt_static_metacall`, the QObject virtuals and signal
//! emitters.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use super::builtin::is_builtin;
use crate::known::KnownTypes;
use crate::model::{Access, ClassDef, DeclKind, FunctionDef, PropertyDef, Specification};

/// Whether the declaration needs a `qt_static_metacall`.
pub fn has_static_metacall(def: &ClassDef) -> bool {
    def.kind == DeclKind::Object
        || def.methods().next().is_some()
        || !def.property_list.is_empty()
        || !def.constructor_list.is_empty()
}

/// Argument types the runtime cannot resolve by itself, by method index and
/// argument position.
pub fn automatic_method_types(def: &ClassDef, known: &KnownTypes) -> BTreeMap<usize, BTreeMap<usize, String>> {
    let mut types: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();
    for (index, f) in def.methods().enumerate() {
        for (position, arg) in f.arguments.iter().enumerate() {
            if !is_builtin(&arg.normalized_type) && known.is_registerable(&arg.normalized_type) {
                types
                    .entry(index)
                    .or_default()
                    .insert(position, arg.normalized_type.clone());
            }
        }
    }
    types
}

/// Property types registered on demand, by property index.
pub fn automatic_property_types(def: &ClassDef, known: &KnownTypes) -> BTreeMap<usize, String> {
    def.property_list
        .iter()
        .enumerate()
        .filter(|(_, p)| !is_builtin(&p.ty) && known.is_registerable(&p.ty))
        .map(|(i, p)| (i, p.ty.clone()))
        .collect()
}

fn argument_list(f: &FunctionDef) -> String {
    let mut args: Vec<String> = f
        .arguments
        .iter()
        .enumerate()
        .map(|(j, arg)| format!("(*reinterpret_cast< {}>(_a[{}]))", arg.type_name_for_cast, j + 1))
        .collect();
    if f.is_private_signal {
        args.push("QPrivateSignal()".to_string());
    }
    args.join(",")
}

fn object_cast(def: &ClassDef) -> String {
    if def.kind == DeclKind::Object {
        format!("static_cast<{} *>(_o)", def.qualified)
    } else {
        format!("reinterpret_cast<{} *>(_o)", def.qualified)
    }
}

fn receiver(in_private_class: &str) -> String {
    if in_private_class.is_empty() {
        "_t->".to_string()
    } else {
        format!("_t->{in_private_class}->")
    }
}

// ============================================================================
// qt_static_metacall
// ============================================================================

fn write_constructors(out: &mut impl Write, def: &ClassDef) -> fmt::Result {
    let instance = if def.kind == DeclKind::Object { "QObject" } else { "void" };

    writeln!(out, "    if (_c == QMetaObject::CreateInstance) {{")?;
    writeln!(out, "        switch (_id) {{")?;
    for (i, ctor) in def.constructor_list.iter().enumerate() {
        writeln!(
            out,
            "        case {i}: {{ {q} *_r = new {q}({args});",
            q = def.qualified,
            args = argument_list(ctor)
        )?;
        writeln!(out, "            if (_a[0]) *reinterpret_cast<{instance}**>(_a[0]) = _r; }} break;")?;
    }
    writeln!(out, "        default: break;")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    writeln!(out, "    if (_c == QMetaObject::ConstructInPlace) {{")?;
    writeln!(out, "        switch (_id) {{")?;
    for (i, ctor) in def.constructor_list.iter().enumerate() {
        writeln!(
            out,
            "        case {i}: {{ new (_a[0]) {}({}); }} break;",
            def.qualified,
            argument_list(ctor)
        )?;
    }
    writeln!(out, "        default: break;")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

fn write_invoke(out: &mut impl Write, def: &ClassDef) -> fmt::Result {
    writeln!(out, "    if (_c == QMetaObject::InvokeMetaMethod) {{")?;
    writeln!(out, "        auto *_t = {};", object_cast(def))?;
    writeln!(out, "        (void)_t;")?;
    writeln!(out, "        switch (_id) {{")?;
    for (index, f) in def.methods().enumerate() {
        let call = if f.is_raw_slot {
            format!("{}{}(QMethodRawArguments{{ _a }})", receiver(&f.in_private_class), f.name)
        } else {
            format!("{}{}({})", receiver(&f.in_private_class), f.name, argument_list(f))
        };
        if f.normalized_type == "void" {
            writeln!(out, "        case {index}: {call}; break;")?;
        } else {
            writeln!(out, "        case {index}: {{ {} _r = {call};", f.ty.name)?;
            writeln!(
                out,
                "            if (_a[0]) *reinterpret_cast< {}*>(_a[0]) = std::move(_r); }}  break;",
                f.ty.name
            )?;
        }
    }
    writeln!(out, "        default: ;")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

fn write_register_method_types(
    out: &mut impl Write,
    types: &BTreeMap<usize, BTreeMap<usize, String>>,
) -> fmt::Result {
    writeln!(out, "    if (_c == QMetaObject::RegisterMethodArgumentMetaType) {{")?;
    writeln!(out, "        switch (_id) {{")?;
    writeln!(out, "        default: *reinterpret_cast<QMetaType *>(_a[0]) = QMetaType(); break;")?;
    for (method, args) in types {
        writeln!(out, "        case {method}:")?;
        writeln!(out, "            switch (*reinterpret_cast<int*>(_a[1])) {{")?;
        writeln!(out, "            default: *reinterpret_cast<QMetaType *>(_a[0]) = QMetaType(); break;")?;
        for (position, ty) in args {
            writeln!(out, "            case {position}:")?;
            writeln!(
                out,
                "                *reinterpret_cast<QMetaType *>(_a[0]) = QMetaType::fromType< {ty} >(); break;"
            )?;
        }
        writeln!(out, "            }}")?;
        writeln!(out, "            break;")?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

fn write_index_of_method(out: &mut impl Write, def: &ClassDef) -> fmt::Result {
    writeln!(out, "    if (_c == QMetaObject::IndexOfMethod) {{")?;
    writeln!(out, "        int *result = reinterpret_cast<int *>(_a[0]);")?;
    for (index, f) in def.signal_list.iter().enumerate() {
        if f.was_cloned || !f.in_private_class.is_empty() || f.is_static {
            continue;
        }
        let mut params: Vec<String> = f
            .arguments
            .iter()
            .map(|a| format!("{} {}", a.ty.name, a.right_type).trim_end().to_string())
            .collect();
        if f.is_private_signal {
            params.push("QPrivateSignal".to_string());
        }
        let constness = if f.is_const { " const" } else { "" };
        writeln!(out, "        {{")?;
        writeln!(
            out,
            "            using _t = {} ({}::*)({}){constness};",
            f.ty.name,
            def.qualified,
            params.join(", ")
        )?;
        writeln!(
            out,
            "            if (_t _q_method = &{}::{}; *reinterpret_cast<_t *>(_a[1]) == _q_method) {{",
            def.qualified, f.name
        )?;
        writeln!(out, "                *result = {index};")?;
        writeln!(out, "                return;")?;
        writeln!(out, "            }}")?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "    }}")
}

fn write_register_property_types(out: &mut impl Write, types: &BTreeMap<usize, String>) -> fmt::Result {
    writeln!(out, "    if (_c == QMetaObject::RegisterPropertyMetaType) {{")?;
    writeln!(out, "        switch (_id) {{")?;
    writeln!(out, "        default: *reinterpret_cast<int*>(_a[0]) = -1; break;")?;
    for (index, ty) in types {
        writeln!(out, "        case {index}:")?;
        writeln!(out, "            *reinterpret_cast<int*>(_a[0]) = qRegisterMetaType< {ty} >(); break;")?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

fn read_case(p: &PropertyDef) -> Option<String> {
    let on = receiver(&p.in_private_class);
    if !p.read.is_empty() {
        let line = match p.gspec {
            Specification::PointerSpec => format!(
                "_a[0] = const_cast<void*>(reinterpret_cast<const void*>({on}{}())); break;",
                p.read
            ),
            Specification::ReferenceSpec => format!(
                "_a[0] = const_cast<void*>(reinterpret_cast<const void*>(&{on}{}())); break;",
                p.read
            ),
            Specification::ValueSpec => {
                format!("*reinterpret_cast< {}*>(_v) = {on}{}(); break;", p.ty, p.read)
            }
        };
        return Some(line);
    }
    if !p.member.is_empty() {
        return Some(format!("*reinterpret_cast< {}*>(_v) = {on}{}; break;", p.ty, p.member));
    }
    if !p.bind.is_empty() {
        return Some(format!("*reinterpret_cast< {}*>(_v) = {on}{}().value(); break;", p.ty, p.bind));
    }
    None
}

fn write_property_switch<F>(out: &mut impl Write, call: &str, def: &ClassDef, with_value: bool, mut case: F) -> fmt::Result
where
    F: FnMut(&mut String, &PropertyDef) -> Result<bool, fmt::Error>,
{
    let mut cases = Vec::new();
    for (index, p) in def.property_list.iter().enumerate() {
        let mut body = String::new();
        if case(&mut body, p)? {
            cases.push((index, body));
        }
    }
    if cases.is_empty() {
        return Ok(());
    }
    writeln!(out, "    if (_c == QMetaObject::{call}) {{")?;
    writeln!(out, "        auto *_t = {};", object_cast(def))?;
    writeln!(out, "        (void)_t;")?;
    if with_value {
        writeln!(out, "        void *_v = _a[0];")?;
    }
    writeln!(out, "        switch (_id) {{")?;
    for (index, body) in cases {
        if body.starts_with('\n') {
            write!(out, "        case {index}:{body}")?;
        } else {
            writeln!(out, "        case {index}: {body}")?;
        }
    }
    writeln!(out, "        default: break;")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")
}

fn write_member_assignment(body: &mut String, def: &ClassDef, p: &PropertyDef) -> fmt::Result {
    let on = receiver(&p.in_private_class);
    writeln!(body)?;
    writeln!(body, "            if ({on}{m} != *reinterpret_cast< {t}*>(_v)) {{", m = p.member, t = p.ty)?;
    writeln!(body, "                {on}{m} = *reinterpret_cast< {t}*>(_v);", m = p.member, t = p.ty)?;
    if p.notify_id >= 0 {
        let signal = &def.signal_list[p.notify_id as usize];
        if signal.arguments.is_empty() {
            writeln!(body, "                Q_EMIT _t->{}();", p.notify)?;
        } else {
            writeln!(body, "                Q_EMIT _t->{}({on}{});", p.notify, p.member)?;
        }
    }
    writeln!(body, "            }}")?;
    writeln!(body, "            break;")
}

fn write_property_access(out: &mut impl Write, def: &ClassDef) -> fmt::Result {
    write_property_switch(out, "ReadProperty", def, true, |body, p| match read_case(p) {
        Some(line) => {
            body.push_str(&line);
            Ok(true)
        }
        None => Ok(false),
    })?;

    write_property_switch(out, "WriteProperty", def, true, |body, p| {
        if !p.write.is_empty() {
            let on = receiver(&p.in_private_class);
            write!(body, "{on}{}(*reinterpret_cast< {}*>(_v)); break;", p.write, p.ty)?;
            Ok(true)
        } else if !p.member.is_empty() && !p.constant {
            write_member_assignment(body, def, p)?;
            Ok(true)
        } else {
            Ok(false)
        }
    })?;

    write_property_switch(out, "ResetProperty", def, false, |body, p| {
        if p.reset.is_empty() {
            return Ok(false);
        }
        write!(body, "{}{}(); break;", receiver(&p.in_private_class), p.reset)?;
        Ok(true)
    })?;

    write_property_switch(out, "BindableProperty", def, false, |body, p| {
        if p.bind.is_empty() {
            return Ok(false);
        }
        write!(
            body,
            "*static_cast<QUntypedBindable *>(_a[0]) = {}{}(); break;",
            receiver(&p.in_private_class),
            p.bind
        )?;
        Ok(true)
    })
}

/// Write `qt_static_metacall`.
pub fn write_static_metacall(out: &mut impl Write, def: &ClassDef, known: &KnownTypes) -> fmt::Result {
    writeln!(
        out,
        "void {}::qt_static_metacall(QObject *_o, QMetaObject::Call _c, int _id, void **_a)",
        def.qualified
    )?;
    writeln!(out, "{{")?;

    if !def.constructor_list.is_empty() {
        write_constructors(out, def)?;
    }
    if def.methods().next().is_some() {
        write_invoke(out, def)?;
        let method_types = automatic_method_types(def, known);
        if !method_types.is_empty() {
            write_register_method_types(out, &method_types)?;
        }
    }
    if def.signal_list.iter().any(|f| !f.was_cloned) && def.kind == DeclKind::Object {
        write_index_of_method(out, def)?;
    }
    if !def.property_list.is_empty() {
        let property_types = automatic_property_types(def, known);
        if !property_types.is_empty() {
            write_register_property_types(out, &property_types)?;
        }
        write_property_access(out, def)?;
    }

    writeln!(out, "    (void)_o; (void)_id; (void)_c; (void)_a;")?;
    writeln!(out, "}}")
}

// ============================================================================
// QObject virtuals
// ============================================================================

fn primary_super(def: &ClassDef) -> Option<&str> {
    def.super_class_list.first().map(|s| s.qualified.as_str())
}

/// Write `metaObject`, `qt_metacast` and `qt_metacall` for a `Q_OBJECT` class.
pub fn write_object_functions(out: &mut impl Write, def: &ClassDef, known: &KnownTypes) -> fmt::Result {
    let ident = def.identifier();
    let q = &def.qualified;

    writeln!(out, "const QMetaObject *{q}::metaObject() const")?;
    writeln!(out, "{{")?;
    writeln!(
        out,
        "    return QObject::d_ptr->metaObject ? QObject::d_ptr->dynamicMetaObject() : &staticMetaObject;"
    )?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "void *{q}::qt_metacast(const char *_clname)")?;
    writeln!(out, "{{")?;
    writeln!(out, "    if (!_clname) return nullptr;")?;
    writeln!(out, "    if (!strcmp(_clname, qt_meta_stringdata_{ident}.stringdata0))")?;
    writeln!(out, "        return static_cast<void*>(this);")?;
    for base in def.super_class_list.iter().skip(1) {
        if base.access == Access::Private {
            continue;
        }
        writeln!(out, "    if (!strcmp(_clname, \"{}\"))", base.name)?;
        writeln!(out, "        return static_cast< {}*>(this);", base.name)?;
    }
    for chain in &def.interface_list {
        for j in (0..chain.len()).rev() {
            writeln!(out, "    if (!strcmp(_clname, {}))", chain[j].interface_id)?;
            let mut cast = String::new();
            for link in chain[..=j].iter().rev() {
                write!(cast, "static_cast< {}*>(", link.class_name)?;
            }
            writeln!(out, "        return {cast}this{};", ")".repeat(j + 1))?;
        }
    }
    match primary_super(def) {
        Some(base) => writeln!(out, "    return {base}::qt_metacast(_clname);")?,
        None => writeln!(out, "    return nullptr;")?,
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    let method_count = def.methods().count();
    let property_count = def.property_list.len();
    writeln!(out, "int {q}::qt_metacall(QMetaObject::Call _c, int _id, void **_a)")?;
    writeln!(out, "{{")?;
    if let Some(base) = primary_super(def) {
        writeln!(out, "    _id = {base}::qt_metacall(_c, _id, _a);")?;
    }
    writeln!(out, "    if (_id < 0)")?;
    writeln!(out, "        return _id;")?;
    if method_count > 0 {
        writeln!(out, "    if (_c == QMetaObject::InvokeMetaMethod) {{")?;
        writeln!(out, "        if (_id < {method_count})")?;
        writeln!(out, "            qt_static_metacall(this, _c, _id, _a);")?;
        writeln!(out, "        _id -= {method_count};")?;
        writeln!(out, "    }}")?;
        writeln!(out, "    if (_c == QMetaObject::RegisterMethodArgumentMetaType) {{")?;
        writeln!(out, "        if (_id < {method_count})")?;
        if automatic_method_types(def, known).is_empty() {
            writeln!(out, "            *reinterpret_cast<QMetaType *>(_a[0]) = QMetaType();")?;
        } else {
            writeln!(out, "            qt_static_metacall(this, _c, _id, _a);")?;
        }
        writeln!(out, "        _id -= {method_count};")?;
        writeln!(out, "    }}")?;
    }
    if property_count > 0 {
        writeln!(out, "    if (_c == QMetaObject::ReadProperty || _c == QMetaObject::WriteProperty")?;
        writeln!(out, "            || _c == QMetaObject::ResetProperty || _c == QMetaObject::BindableProperty")?;
        writeln!(out, "            || _c == QMetaObject::RegisterPropertyMetaType) {{")?;
        writeln!(out, "        qt_static_metacall(this, _c, _id, _a);")?;
        writeln!(out, "        _id -= {property_count};")?;
        writeln!(out, "    }}")?;
    }
    writeln!(out, "    return _id;")?;
    writeln!(out, "}}")
}

// ============================================================================
// Signals
// ============================================================================

fn write_signal(out: &mut impl Write, def: &ClassDef, f: &FunctionDef, index: usize) -> fmt::Result {
    let q = &def.qualified;
    let this = if f.is_const {
        format!("const_cast< {q} *>(this)")
    } else {
        "this".to_string()
    };
    let constness = if f.is_const { "const" } else { "" };

    let mut params: Vec<String> = f
        .arguments
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{} _t{}{}", a.ty.name, i + 1, a.right_type))
        .collect();
    if f.is_private_signal {
        params.push(format!("QPrivateSignal _t{}", f.arguments.len() + 1));
    }

    writeln!(out, "// SIGNAL {index}")?;
    writeln!(out, "{} {q}::{}({}){constness}", f.ty.name, f.name, params.join(", "))?;
    writeln!(out, "{{")?;

    let returns = f.normalized_type != "void";
    if f.arguments.is_empty() && !returns {
        writeln!(out, "    QMetaObject::activate({this}, &staticMetaObject, {index}, nullptr);")?;
        return writeln!(out, "}}");
    }

    let mut slots = Vec::with_capacity(f.arguments.len() + 1);
    if returns {
        writeln!(out, "    {} _t0{{}};", f.ty.name)?;
        slots.push("const_cast<void*>(reinterpret_cast<const void*>(std::addressof(_t0)))".to_string());
    } else {
        slots.push("nullptr".to_string());
    }
    for i in 1..=f.arguments.len() {
        slots.push(format!(
            "const_cast<void*>(reinterpret_cast<const void*>(std::addressof(_t{i})))"
        ));
    }
    writeln!(out, "    void *_a[] = {{ {} }};", slots.join(", "))?;
    writeln!(out, "    QMetaObject::activate({this}, &staticMetaObject, {index}, _a);")?;
    if returns {
        writeln!(out, "    return _t0;")?;
    }
    writeln!(out, "}}")
}

/// Write the bodies of all emitted signals. Cloned overloads and abstract
/// signals are declared by the user and have no body here; the index still
/// counts them.
pub fn write_signals(out: &mut impl Write, def: &ClassDef) -> fmt::Result {
    for (index, f) in def.signal_list.iter().enumerate() {
        if f.was_cloned || f.is_abstract {
            continue;
        }
        writeln!(out)?;
        write_signal(out, def, f, index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArgumentDef, MethodKind, SuperClass, Type};

    fn arg(ty: &str, default: bool) -> ArgumentDef {
        ArgumentDef {
            ty: Type::new(ty),
            normalized_type: ty.into(),
            type_name_for_cast: format!("std::add_pointer_t<{ty}>"),
            is_default: default,
            ..Default::default()
        }
    }

    fn signal(name: &str, args: Vec<ArgumentDef>) -> FunctionDef {
        FunctionDef {
            name: name.into(),
            ty: Type::new("void"),
            normalized_type: "void".into(),
            kind: MethodKind::Signal,
            access: Access::Public,
            arguments: args,
            ..Default::default()
        }
    }

    fn object() -> ClassDef {
        ClassDef {
            kind: DeclKind::Object,
            classname: "Counter".into(),
            qualified: "Counter".into(),
            has_q_object: true,
            super_class_list: vec![SuperClass {
                name: "QObject".into(),
                qualified: "QObject".into(),
                access: Access::Public,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_signal_emitter_with_arguments() {
        let mut def = object();
        def.signal_list.push(signal("valueChanged", vec![arg("int", false)]));
        let mut out = String::new();
        write_signals(&mut out, &def).unwrap();
        assert!(out.contains("// SIGNAL 0\nvoid Counter::valueChanged(int _t1)"));
        assert!(out.contains(
            "void *_a[] = { nullptr, const_cast<void*>(reinterpret_cast<const void*>(std::addressof(_t1))) };"
        ));
        assert!(out.contains("QMetaObject::activate(this, &staticMetaObject, 0, _a);"));
    }

    #[test]
    fn test_cloned_signals_keep_their_index() {
        let mut def = object();
        def.signal_list.push(signal("a", vec![arg("int", true)]));
        let mut clone = signal("a", vec![]);
        clone.was_cloned = true;
        def.signal_list.push(clone);
        def.signal_list.push(signal("b", vec![]));
        let mut out = String::new();
        write_signals(&mut out, &def).unwrap();
        assert!(!out.contains("// SIGNAL 1"));
        assert!(out.contains("// SIGNAL 2\nvoid Counter::b()"));
        assert!(out.contains("QMetaObject::activate(this, &staticMetaObject, 2, nullptr);"));
    }

    #[test]
    fn test_invoke_cases_follow_method_order() {
        let mut def = object();
        def.signal_list.push(signal("changed", vec![]));
        let mut slot = signal("setValue", vec![arg("int", false)]);
        slot.kind = MethodKind::Slot;
        def.slot_list.push(slot);
        let mut getter = signal("value", vec![]);
        getter.kind = MethodKind::Method;
        getter.ty = Type::new("int");
        getter.normalized_type = "int".into();
        def.method_list.push(getter);

        let mut out = String::new();
        write_static_metacall(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains("case 0: _t->changed(); break;"));
        assert!(out.contains("case 1: _t->setValue((*reinterpret_cast< std::add_pointer_t<int>>(_a[1]))); break;"));
        assert!(out.contains("case 2: { int _r = _t->value();"));
        assert!(out.contains("using _t = void (Counter::*)();"));
        assert!(!out.contains("RegisterMethodArgumentMetaType"));
    }

    #[test]
    fn test_registerable_arguments() {
        let mut known = KnownTypes::new();
        known.add_qobject_class("Counter", "Counter");
        let mut def = object();
        def.signal_list.push(signal("peer", vec![arg("int", false), arg("Counter*", false)]));
        let types = automatic_method_types(&def, &known);
        assert_eq!(types.len(), 1);
        assert_eq!(types[&0].get(&1).map(String::as_str), Some("Counter*"));

        let mut out = String::new();
        write_static_metacall(&mut out, &def, &known).unwrap();
        assert!(out.contains("QMetaType::fromType< Counter* >()"));
    }

    #[test]
    fn test_property_cases() {
        let mut def = object();
        def.signal_list.push(signal("valueChanged", vec![]));
        def.property_list.push(PropertyDef {
            name: "value".into(),
            ty: "int".into(),
            member: "m_value".into(),
            notify: "valueChanged".into(),
            notify_id: 0,
            ..Default::default()
        });
        def.property_list.push(PropertyDef {
            name: "name".into(),
            ty: "QString".into(),
            read: "name".into(),
            reset: "resetName".into(),
            gspec: Specification::ReferenceSpec,
            ..Default::default()
        });
        let mut out = String::new();
        write_static_metacall(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains("case 0: *reinterpret_cast< int*>(_v) = _t->m_value; break;"));
        assert!(out.contains("if (_t->m_value != *reinterpret_cast< int*>(_v)) {"));
        assert!(out.contains("Q_EMIT _t->valueChanged();"));
        assert!(out.contains("reinterpret_cast<const void*>(&_t->name())"));
        assert!(out.contains("case 1: _t->resetName(); break;"));
        assert!(!out.contains("BindableProperty"));
    }

    #[test]
    fn test_write_and_bindable_cases() {
        let mut def = object();
        def.property_list.push(PropertyDef {
            name: "level".into(),
            ty: "int".into(),
            read: "level".into(),
            write: "setLevel".into(),
            bind: "bindableLevel".into(),
            in_private_class: "d_func()".into(),
            ..Default::default()
        });
        let mut out = String::new();
        write_static_metacall(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains("case 0: _t->d_func()->setLevel(*reinterpret_cast< int*>(_v)); break;"));
        assert!(out.contains(
            "case 0: *static_cast<QUntypedBindable *>(_a[0]) = _t->d_func()->bindableLevel(); break;"
        ));
        assert!(!out.contains("ResetProperty"));
    }

    #[test]
    fn test_metacast_walks_interface_chain() {
        let mut def = object();
        def.interface_list.push(vec![
            crate::model::Interface {
                class_name: "Reader".into(),
                interface_id: "\"org.example.Reader\"".into(),
            },
            crate::model::Interface {
                class_name: "Device".into(),
                interface_id: "\"org.example.Device\"".into(),
            },
        ]);
        let mut out = String::new();
        write_object_functions(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains(
            "if (!strcmp(_clname, \"org.example.Device\"))\n        return static_cast< Device*>(static_cast< Reader*>(this));"
        ));
        assert!(out.contains(
            "if (!strcmp(_clname, \"org.example.Reader\"))\n        return static_cast< Reader*>(this);"
        ));
    }

    #[test]
    fn test_metacast_and_metacall() {
        let mut def = object();
        def.super_class_list.push(SuperClass {
            name: "Plugin".into(),
            qualified: "Plugin".into(),
            access: Access::Public,
        });
        def.interface_list.push(vec![crate::model::Interface {
            class_name: "Plugin".into(),
            interface_id: "\"org.example.Plugin\"".into(),
        }]);
        def.signal_list.push(signal("changed", vec![]));
        let mut out = String::new();
        write_object_functions(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains("if (!strcmp(_clname, \"Plugin\"))\n        return static_cast< Plugin*>(this);"));
        assert!(out.contains("if (!strcmp(_clname, \"org.example.Plugin\"))\n        return static_cast< Plugin*>(this);"));
        assert!(out.contains("return QObject::qt_metacast(_clname);"));
        assert!(out.contains("_id = QObject::qt_metacall(_c, _id, _a);"));
        assert!(out.contains("_id -= 1;"));
    }

    #[test]
    fn test_gadget_uses_reinterpret_cast() {
        let mut def = object();
        def.kind = DeclKind::Gadget;
        def.property_list.push(PropertyDef {
            name: "x".into(),
            ty: "int".into(),
            member: "x".into(),
            ..Default::default()
        });
        assert!(has_static_metacall(&def));
        let mut out = String::new();
        write_static_metacall(&mut out, &def, &KnownTypes::new()).unwrap();
        assert!(out.contains("auto *_t = reinterpret_cast<Counter *>(_o);"));
        assert!(!out.contains("IndexOfMethod"));
    }
}
