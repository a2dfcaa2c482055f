//! AGX writer.
//!
//! Builds an AGX file from owned parameters. Used to produce fixtures and
//! test inputs for the converter.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use bytemuck::Pod;

use super::format::*;
use super::param::ParamView;
use crate::util::{Error, Result, TypeTag};

/// An owned parameter to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct OParam {
    pub name: String,
    pub is_array: bool,
    pub value_type: TypeTag,
    pub element_type: TypeTag,
    pub element_count: u64,
    pub data: Vec<u8>,
}

impl OParam {
    /// Array parameter from typed values.
    ///
    /// `values` is viewed as raw bytes; the element count is derived from the
    /// element type's stride (for stride 0 tags, from `values.len()`).
    pub fn array<T: Pod>(name: impl Into<String>, element_type: TypeTag, values: &[T]) -> Self {
        let data = bytemuck::cast_slice::<T, u8>(values).to_vec();
        let element_count = match element_type.stride() {
            0 => values.len() as u64,
            stride => (data.len() / stride) as u64,
        };
        Self {
            name: name.into(),
            is_array: true,
            value_type: TypeTag::Array1D,
            element_type,
            element_count,
            data,
        }
    }

    /// Scalar parameter from a typed value.
    pub fn scalar<T: Pod>(name: impl Into<String>, value_type: TypeTag, value: T) -> Self {
        Self {
            name: name.into(),
            is_array: false,
            value_type,
            element_type: TypeTag::Unknown,
            element_count: 1,
            data: bytemuck::bytes_of(&value).to_vec(),
        }
    }

    /// Borrow as a parameter view.
    pub fn view(&self) -> ParamView<'_> {
        ParamView {
            name: &self.name,
            is_array: self.is_array,
            value_type: self.value_type,
            element_type: self.element_type,
            element_count: self.element_count,
            data: &self.data,
        }
    }
}

/// One time step to be written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OTimeStep {
    pub index: u32,
    pub params: Vec<OParam>,
}

impl OTimeStep {
    /// Add a parameter.
    pub fn push(&mut self, param: OParam) -> &mut Self {
        self.params.push(param);
        self
    }
}

/// AGX file writer.
#[derive(Clone, Debug)]
pub struct AgxWriter {
    object_type: TypeTag,
    subtype: String,
    declared_time_steps: Option<u32>,
    constants: Vec<OParam>,
    time_steps: Vec<OTimeStep>,
}

impl AgxWriter {
    /// Create a writer for an object of the given type and subtype.
    pub fn new(object_type: TypeTag, subtype: impl Into<String>) -> Self {
        Self {
            object_type,
            subtype: subtype.into(),
            declared_time_steps: None,
            constants: Vec::new(),
            time_steps: Vec::new(),
        }
    }

    /// Writer for a triangle geometry, the common case.
    pub fn triangles() -> Self {
        Self::new(TypeTag::Geometry, "triangle")
    }

    /// Override the time step count stored in the header
    /// (defaults to the number of added time steps).
    pub fn set_declared_time_steps(&mut self, count: u32) {
        self.declared_time_steps = Some(count);
    }

    /// Add a constant parameter.
    pub fn add_constant(&mut self, param: OParam) {
        self.constants.push(param);
    }

    /// Append a time step numbered after the previous one and return it.
    pub fn add_time_step(&mut self) -> &mut OTimeStep {
        let index = self.time_steps.last().map_or(0, |s| s.index + 1);
        self.add_time_step_at(index)
    }

    /// Append a time step with an explicit index and return it.
    pub fn add_time_step_at(&mut self, index: u32) -> &mut OTimeStep {
        self.time_steps.push(OTimeStep { index, params: Vec::new() });
        let last = self.time_steps.len() - 1;
        &mut self.time_steps[last]
    }

    /// Encode the whole file.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        let time_steps = match self.declared_time_steps {
            Some(n) => n,
            None => u32::try_from(self.time_steps.len())
                .map_err(|_| Error::other("Too many time steps"))?,
        };
        let constant_count = u32::try_from(self.constants.len())
            .map_err(|_| Error::other("Too many constants"))?;

        w.write_all(AGX_MAGIC)?;
        w.write_u32::<LittleEndian>(CURRENT_VERSION)?;
        w.write_u32::<LittleEndian>(self.object_type.code())?;
        w.write_u32::<LittleEndian>(time_steps)?;
        w.write_u32::<LittleEndian>(constant_count)?;
        w.write_u32::<LittleEndian>(self.subtype.len() as u32)?;
        w.write_all(self.subtype.as_bytes())?;

        for param in &self.constants {
            write_record(w, param)?;
        }

        for step in &self.time_steps {
            w.write_u32::<LittleEndian>(step.index)?;
            w.write_u32::<LittleEndian>(step.params.len() as u32)?;
            for param in &step.params {
                write_record(w, param)?;
            }
        }
        Ok(())
    }

    /// Encode into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Write the file to disk.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        self.encode(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn write_record<W: Write>(w: &mut W, param: &OParam) -> Result<()> {
    if param.name.is_empty() || param.name.len() > MAX_NAME_LEN as usize {
        return Err(Error::invalid(format!("Invalid parameter name '{}'", param.name)));
    }
    w.write_u32::<LittleEndian>(param.name.len() as u32)?;
    w.write_all(param.name.as_bytes())?;
    w.write_u8(u8::from(param.is_array))?;
    w.write_u32::<LittleEndian>(param.value_type.code())?;
    w.write_u32::<LittleEndian>(param.element_type.code())?;
    w.write_u64::<LittleEndian>(param.element_count)?;
    w.write_u64::<LittleEndian>(param.data.len() as u64)?;
    w.write_all(&param.data)?;
    Ok(())
}
