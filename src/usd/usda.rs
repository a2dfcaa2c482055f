//! `.usda` text serialization.
//!
//! Layer metadata is written in alphabetical order, prims and attributes in
//! definition order. Attributes are written as an optional declaration line
//! (default value and metadata) followed by a `.timeSamples` block.

use std::fmt::{self, Write};

use super::attribute::Attribute;
use super::prim::Prim;
use super::stage::Stage;
use super::value::Value;
use crate::core::TimeCode;

const INDENT: &str = "    ";

/// Render a whole stage.
pub fn render(stage: &Stage) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_stage(&mut out, stage);
    out
}

fn write_stage(w: &mut impl Write, stage: &Stage) -> fmt::Result {
    let meta = stage.metadata();
    writeln!(w, "#usda 1.0")?;
    writeln!(w, "(")?;
    if let Some(prim) = &meta.default_prim {
        writeln!(w, "{}defaultPrim = {}", INDENT, quoted(prim))?;
    }
    if let Some(doc) = &meta.doc {
        writeln!(w, "{}doc = {}", INDENT, quoted(doc))?;
    }
    writeln!(w, "{}endTimeCode = {}", INDENT, time_code(meta.end_time_code))?;
    writeln!(w, "{}framesPerSecond = {}", INDENT, double(meta.frames_per_second))?;
    writeln!(w, "{}metersPerUnit = {}", INDENT, double(meta.meters_per_unit))?;
    writeln!(w, "{}startTimeCode = {}", INDENT, time_code(meta.start_time_code))?;
    writeln!(w, "{}timeCodesPerSecond = {}", INDENT, double(meta.time_codes_per_second))?;
    writeln!(w, "{}upAxis = {}", INDENT, quoted(meta.up_axis.token()))?;
    writeln!(w, ")")?;

    for prim in stage.root_prims() {
        writeln!(w)?;
        write_prim(w, prim, 0)?;
    }
    Ok(())
}

fn write_prim(w: &mut impl Write, prim: &Prim, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    if prim.type_name().is_empty() {
        writeln!(w, "{}def {}", pad, quoted(prim.name()))?;
    } else {
        writeln!(w, "{}def {} {}", pad, prim.type_name(), quoted(prim.name()))?;
    }
    writeln!(w, "{}{{", pad)?;

    let inner = INDENT.repeat(depth + 1);
    for attr in prim.attributes() {
        write_attribute(w, attr, &inner)?;
    }
    for (i, child) in prim.children().iter().enumerate() {
        if i > 0 || !prim.attributes().is_empty() {
            writeln!(w)?;
        }
        write_prim(w, child, depth + 1)?;
    }

    writeln!(w, "{}}}", pad)
}

fn write_attribute(w: &mut impl Write, attr: &Attribute, pad: &str) -> fmt::Result {
    let decl = format!("{} {}", attr.value_type().usda_name(), attr.name());
    let has_meta = !attr.metadata_fields().is_empty();

    if attr.default_value().is_some() || has_meta || !attr.has_time_samples() {
        write!(w, "{}{}", pad, decl)?;
        if let Some(value) = attr.default_value() {
            write!(w, " = ")?;
            write_value(w, value)?;
        }
        if has_meta {
            writeln!(w, " (")?;
            for (key, value) in attr.metadata_fields() {
                write!(w, "{}{}{} = ", pad, INDENT, key)?;
                write_value(w, value)?;
                writeln!(w)?;
            }
            write!(w, "{})", pad)?;
        }
        writeln!(w)?;
    }

    if attr.has_time_samples() {
        writeln!(w, "{}{}.timeSamples = {{", pad, decl)?;
        for (time, value) in attr.time_samples() {
            write!(w, "{}{}{}: ", pad, INDENT, time_code(*time))?;
            write_value(w, value)?;
            writeln!(w, ",")?;
        }
        writeln!(w, "{}}}", pad)?;
    }
    Ok(())
}

fn write_value(w: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::Token(t) => w.write_str(&quoted(t)),
        Value::Double(d) => w.write_str(&double(*d)),
        Value::IntArray(v) => write_list(w, v, |w, x| write!(w, "{}", x)),
        Value::FloatArray(v) => write_list(w, v, |w, x| w.write_str(&float(*x))),
        Value::Float2Array(v) => write_list(w, v, |w, x| write_tuple(w, &x.to_array())),
        Value::Float3Array(v) => write_list(w, v, |w, x| write_tuple(w, &x.to_array())),
        Value::Float4Array(v) => write_list(w, v, |w, x| write_tuple(w, &x.to_array())),
    }
}

fn write_list<W: Write, T>(
    w: &mut W,
    items: &[T],
    mut item: impl FnMut(&mut W, &T) -> fmt::Result,
) -> fmt::Result {
    w.write_char('[')?;
    for (i, x) in items.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        item(w, x)?;
    }
    w.write_char(']')
}

fn write_tuple(w: &mut impl Write, components: &[f32]) -> fmt::Result {
    w.write_char('(')?;
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        w.write_str(&float(*c))?;
    }
    w.write_char(')')
}

fn float(v: f32) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        non_finite(v.is_nan(), v > 0.0)
    }
}

fn double(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        non_finite(v.is_nan(), v > 0.0)
    }
}

fn non_finite(nan: bool, positive: bool) -> String {
    match (nan, positive) {
        (true, _) => "nan",
        (false, true) => "inf",
        (false, false) => "-inf",
    }
    .to_string()
}

fn time_code(t: TimeCode) -> String {
    double(t.value())
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
