//! JSON side document describing the parsed declarations.
//!
//! Build tools read this instead of the generated C++ to learn about the
//! reflected types. Empty lists and unset accessors are left out.

use serde::Serialize;

use crate::generator::{declared_enums, OUTPUT_REVISION};
use crate::model::{ClassDef, DeclKind, EnumDef, FunctionDef, PropertyDef};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDocument<'a> {
    pub output_revision: u32,
    pub input_file: &'a str,
    pub classes: Vec<JsonClass<'a>>,
}

impl<'a> JsonDocument<'a> {
    pub fn new(input_file: &'a str, classes: &'a [ClassDef]) -> Self {
        Self {
            output_revision: OUTPUT_REVISION,
            input_file,
            classes: classes.iter().map(JsonClass::from_def).collect(),
        }
    }

    pub fn to_string_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonClass<'a> {
    pub class_name: &'a str,
    pub qualified_class_name: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub object: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub gadget: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub namespace: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub super_classes: Vec<JsonSuperClass<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub class_infos: Vec<JsonClassInfo<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<JsonEnum>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<JsonProperty<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<JsonMethod<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<JsonMethod<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<JsonMethod<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<JsonMethod<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Vec<JsonInterface<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct JsonSuperClass<'a> {
    pub access: &'static str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct JsonClassInfo<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEnum {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub ty: String,
    pub is_flag: bool,
    pub is_class: bool,
    pub values: Vec<String>,
}

impl From<EnumDef> for JsonEnum {
    fn from(e: EnumDef) -> Self {
        Self {
            name: e.name,
            alias: e.enum_name,
            ty: e.ty,
            is_flag: e.is_flag,
            is_class: e.is_enum_class,
            values: e.values,
        }
    }
}

fn skip_empty(s: &&str) -> bool {
    s.is_empty()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonProperty<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub ty: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub member: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub read: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub write: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub reset: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub notify: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub bindable: &'a str,
    #[serde(skip_serializing_if = "skip_empty")]
    pub private_class: &'a str,
    pub designable: bool,
    pub scriptable: bool,
    pub stored: bool,
    pub user: bool,
    pub constant: bool,
    #[serde(rename = "final")]
    pub final_: bool,
    pub required: bool,
    pub index: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub revision: i32,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

impl<'a> JsonProperty<'a> {
    fn from_def(p: &'a PropertyDef) -> Self {
        Self {
            name: &p.name,
            ty: &p.ty,
            member: &p.member,
            read: &p.read,
            write: &p.write,
            reset: &p.reset,
            notify: &p.notify,
            bindable: &p.bind,
            private_class: &p.in_private_class,
            designable: p.designable != "false",
            scriptable: p.scriptable != "false",
            stored: p.stored != "false",
            user: p.user != "false" && !p.user.is_empty(),
            constant: p.constant,
            final_: p.final_,
            required: p.required,
            index: p.relative_index,
            revision: p.revision,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonArgument<'a> {
    #[serde(skip_serializing_if = "skip_empty")]
    pub name: &'a str,
    #[serde(rename = "type")]
    pub ty: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonMethod<'a> {
    pub name: &'a str,
    pub access: &'static str,
    pub return_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<JsonArgument<'a>>,
    #[serde(skip_serializing_if = "skip_empty")]
    pub tag: &'a str,
    #[serde(skip_serializing_if = "is_zero")]
    pub revision: i32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_cloned: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    pub index: usize,
}

impl<'a> JsonMethod<'a> {
    fn list(functions: &'a [FunctionDef]) -> Vec<Self> {
        functions
            .iter()
            .enumerate()
            .map(|(index, f)| Self {
                name: &f.name,
                access: f.access.as_str(),
                return_type: &f.normalized_type,
                arguments: f
                    .arguments
                    .iter()
                    .map(|a| JsonArgument {
                        name: &a.name,
                        ty: &a.normalized_type,
                    })
                    .collect(),
                tag: &f.tag,
                revision: f.revision,
                is_cloned: f.was_cloned,
                is_const: f.is_const,
                index,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonInterface<'a> {
    pub class_name: &'a str,
    pub id: &'a str,
}

impl<'a> JsonClass<'a> {
    pub fn from_def(def: &'a ClassDef) -> Self {
        Self {
            class_name: &def.classname,
            qualified_class_name: &def.qualified,
            object: def.kind == DeclKind::Object,
            gadget: def.kind == DeclKind::Gadget,
            namespace: def.kind == DeclKind::Namespace,
            super_classes: def
                .super_class_list
                .iter()
                .map(|s| JsonSuperClass {
                    access: s.access.as_str(),
                    name: &s.name,
                })
                .collect(),
            class_infos: def
                .class_info_list
                .iter()
                .map(|c| JsonClassInfo {
                    name: &c.name,
                    value: &c.value,
                })
                .collect(),
            enums: declared_enums(def).into_iter().map(JsonEnum::from).collect(),
            properties: def.property_list.iter().map(JsonProperty::from_def).collect(),
            signals: JsonMethod::list(&def.signal_list),
            slots: JsonMethod::list(&def.slot_list),
            methods: JsonMethod::list(&def.method_list),
            constructors: JsonMethod::list(&def.constructor_list),
            interfaces: def
                .interface_list
                .iter()
                .map(|chain| {
                    chain
                        .iter()
                        .map(|i| JsonInterface {
                            class_name: &i.class_name,
                            id: &i.interface_id,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
