//! CBOR encoding of plugin metadata.
//!
//! The blob is a top-level indefinite-length map with text keys: `IID`,
//! `className`, `MetaData` (the object read from the `FILE` argument, when
//! non-empty), `URI` (when set), then one array of strings per extra `-M`
//! key. Everything below the top level uses definite lengths.

use std::fmt::{self, Write};

use serde_json::{Map, Number, Value};

use crate::model::ClassDef;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

const SIMPLE_FALSE: u8 = 0xf4;
const SIMPLE_TRUE: u8 = 0xf5;
const SIMPLE_NULL: u8 = 0xf6;
const FLOAT64: u8 = 0xfb;
const INDEFINITE_MAP: u8 = 0xbf;
const BREAK: u8 = 0xff;

/// Largest magnitude a double can have and still be encoded as an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Encoded bytes plus comments anchored at byte positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CborBlob {
    pub bytes: Vec<u8>,
    pub comments: Vec<(usize, String)>,
}

/// Writer for CBOR data items.
#[derive(Debug, Default)]
pub struct CborWriter {
    blob: CborBlob,
}

impl CborWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor a comment before the next emitted byte.
    pub fn mark(&mut self, comment: impl Into<String>) {
        self.blob.comments.push((self.blob.bytes.len(), comment.into()));
    }

    /// Emit an initial byte with its argument in the shortest form.
    pub fn emit_head(&mut self, major: u8, value: u64) {
        let major = major << 5;
        let bytes = &mut self.blob.bytes;
        if value < 24 {
            bytes.push(major | value as u8);
        } else if value <= u64::from(u8::MAX) {
            bytes.push(major | 24);
            bytes.push(value as u8);
        } else if value <= u64::from(u16::MAX) {
            bytes.push(major | 25);
            bytes.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u64::from(u32::MAX) {
            bytes.push(major | 26);
            bytes.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            bytes.push(major | 27);
            bytes.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn emit_int(&mut self, value: i64) {
        if value >= 0 {
            self.emit_head(MAJOR_UNSIGNED, value as u64);
        } else {
            // -1 - n without overflow for i64::MIN
            self.emit_head(MAJOR_NEGATIVE, !(value as u64));
        }
    }

    pub fn emit_f64(&mut self, value: f64) {
        self.blob.bytes.push(FLOAT64);
        self.blob.bytes.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn emit_text(&mut self, s: &str) {
        self.emit_head(MAJOR_TEXT, s.len() as u64);
        self.blob.bytes.extend_from_slice(s.as_bytes());
    }

    pub fn emit_raw(&mut self, byte: u8) {
        self.blob.bytes.push(byte);
    }

    fn emit_number(&mut self, n: &Number) {
        if let Some(i) = n.as_i64() {
            self.emit_int(i);
        } else if let Some(u) = n.as_u64() {
            self.emit_head(MAJOR_UNSIGNED, u);
        } else if let Some(d) = n.as_f64() {
            // -0.0 stays a float so the sign survives
            let negative_zero = d == 0.0 && d.is_sign_negative();
            if d.fract() == 0.0 && d.abs() <= MAX_EXACT_INTEGER && !negative_zero {
                self.emit_int(d as i64);
            } else {
                self.emit_f64(d);
            }
        }
    }

    fn emit_object(&mut self, object: &Map<String, Value>) {
        self.emit_head(MAJOR_MAP, object.len() as u64);
        for (key, value) in object {
            self.emit_text(key);
            self.emit_value(value);
        }
    }

    /// Emit a JSON value with definite-length containers.
    pub fn emit_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.emit_raw(SIMPLE_NULL),
            Value::Bool(true) => self.emit_raw(SIMPLE_TRUE),
            Value::Bool(false) => self.emit_raw(SIMPLE_FALSE),
            Value::Number(n) => self.emit_number(n),
            Value::String(s) => self.emit_text(s),
            Value::Array(items) => {
                self.emit_head(MAJOR_ARRAY, items.len() as u64);
                for item in items {
                    self.emit_value(item);
                }
            }
            Value::Object(object) => self.emit_object(object),
        }
    }

    pub fn finish(self) -> CborBlob {
        self.blob
    }
}

/// Encode the plugin metadata of `def`.
pub fn encode_plugin_metadata(def: &ClassDef) -> CborBlob {
    let plugin = &def.plugin_data;
    let mut writer = CborWriter::new();
    writer.emit_raw(INDEFINITE_MAP);

    writer.mark("\"IID\"");
    writer.emit_text("IID");
    writer.emit_text(&plugin.iid);

    writer.mark("\"className\"");
    writer.emit_text("className");
    writer.emit_text(&def.classname);

    if !plugin.meta_data.is_empty() {
        writer.mark("\"MetaData\"");
        writer.emit_text("MetaData");
        writer.emit_object(&plugin.meta_data);
    }

    if !plugin.uri.is_empty() {
        writer.mark("\"URI\"");
        writer.emit_text("URI");
        writer.emit_text(&plugin.uri);
    }

    for (key, values) in &plugin.meta_args {
        writer.mark(format!("\"{key}\""));
        writer.emit_text(key);
        writer.emit_head(MAJOR_ARRAY, values.len() as u64);
        for value in values {
            writer.emit_text(value);
        }
    }

    writer.emit_raw(BREAK);
    writer.finish()
}

fn byte_literal(byte: u8) -> String {
    match byte {
        b'\'' | b'\\' => format!("0x{byte:02x}"),
        0x20..=0x7e => format!(" '{}'", byte as char),
        _ => format!("0x{byte:02x}"),
    }
}

/// Write the bytes of `blob` as the body of a C `unsigned char` array,
/// sixteen per line, with its comments.
pub fn write_blob_bytes(out: &mut impl Write, blob: &CborBlob) -> fmt::Result {
    let mut comments = blob.comments.iter().peekable();
    let mut column = 0;
    for (position, &byte) in blob.bytes.iter().enumerate() {
        while let Some((_, comment)) = comments.next_if(|(at, _)| *at == position) {
            if column > 0 {
                writeln!(out)?;
            }
            writeln!(out, "    // {comment}")?;
            column = 0;
        }
        let indent = if column == 0 { "    " } else { " " };
        write!(out, "{indent}{},", byte_literal(byte))?;
        column += 1;
        if column == 16 {
            writeln!(out)?;
            column = 0;
        }
    }
    if column > 0 {
        writeln!(out)?;
    }
    Ok(())
}
