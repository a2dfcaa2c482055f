//! AGX stream reader.
//!
//! [`AgxReader`] owns the opened file. Enumeration goes through cursors the
//! caller owns: [`ParamCursor`] for the constant parameters and
//! [`TimeStepCursor`] for the time steps. Asking the reader for a new cursor
//! is the only way to restart an enumeration.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::Mmap;
use parking_lot::RwLock;

use super::format::*;
use super::param::ParamView;
use crate::util::{Error, Result, TypeTag};

/// Input stream for reading AGX data.
/// Supports both memory-mapped and buffered I/O modes.
pub struct IStreams {
    inner: StreamsInner,
    size: u64,
}

enum StreamsInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Buffered file access (fallback)
    File(RwLock<File>),
}

impl IStreams {
    /// Open a file for reading, memory mapped when the `mmap` feature is on.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();

        // Zero-length files cannot be mapped.
        let inner = if use_mmap && size > 0 {
            // Safety: the file is opened read-only and every access is bounds checked.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            StreamsInner::Mmap(mmap)
        } else {
            StreamsInner::File(RwLock::new(file))
        };

        Ok(Self { inner, size })
    }

    /// Get the total file size.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Check if the stream is memory mapped.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self.inner, StreamsInner::Mmap(_))
    }

    /// Read bytes into an existing buffer.
    pub fn read_into(&self, pos: u64, buf: &mut [u8]) -> Result<()> {
        let end = pos
            .checked_add(buf.len() as u64)
            .ok_or(Error::UnexpectedEof(u64::MAX))?;
        if end > self.size {
            return Err(Error::UnexpectedEof(end));
        }

        match &self.inner {
            StreamsInner::Mmap(mmap) => {
                buf.copy_from_slice(&mmap[pos as usize..end as usize]);
                Ok(())
            }
            StreamsInner::File(file) => {
                let mut f = file.write();
                f.seek(SeekFrom::Start(pos))?;
                f.read_exact(buf)?;
                Ok(())
            }
        }
    }

    /// Read a u64 value at the given position.
    pub fn read_u64(&self, pos: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(pos, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a u32 value at the given position.
    pub fn read_u32(&self, pos: u64) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_into(pos, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a u8 value at the given position.
    pub fn read_u8(&self, pos: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_into(pos, &mut buf)?;
        Ok(buf[0])
    }
}

/// Parsed AGX file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgxHeader {
    pub version: u32,
    /// Type of the object the stream describes (normally `Geometry`).
    pub object_type: TypeTag,
    /// Declared number of time steps.
    pub time_steps: u32,
    /// Number of constant parameters.
    pub constant_param_count: u32,
}

/// Index and parameter count of the time step a cursor has entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeStepInfo {
    pub index: u32,
    pub param_count: u32,
}

/// AGX file reader.
pub struct AgxReader {
    streams: IStreams,
    header: Option<AgxHeader>,
    subtype: String,
    constants_pos: u64,
}

impl AgxReader {
    /// Open an AGX file. The header is not parsed until [`read_header`](Self::read_header).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_streams(IStreams::open(path)?))
    }

    /// Open an AGX file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        Ok(Self::from_streams(IStreams::open_opts(path, use_mmap)?))
    }

    fn from_streams(streams: IStreams) -> Self {
        Self {
            streams,
            header: None,
            subtype: String::new(),
            constants_pos: 0,
        }
    }

    /// Parse and validate the header. Subsequent calls return the cached header.
    pub fn read_header(&mut self) -> Result<&AgxHeader> {
        if self.header.is_none() {
            let mut fixed = [0u8; HEADER_FIXED_SIZE];
            self.streams.read_into(0, &mut fixed)?;
            let (header, subtype_len) = parse_header(&fixed)?;

            let mut subtype = vec![0u8; subtype_len as usize];
            self.streams.read_into(HEADER_FIXED_SIZE as u64, &mut subtype)?;
            self.subtype = String::from_utf8(subtype)?;
            self.constants_pos = (HEADER_FIXED_SIZE as u64) + subtype_len as u64;
            self.header = Some(header);
        }
        self.header.as_ref().ok_or_else(|| Error::other("AGX header unavailable"))
    }

    /// The parsed header, if [`read_header`](Self::read_header) succeeded.
    #[inline]
    pub fn header(&self) -> Option<&AgxHeader> {
        self.header.as_ref()
    }

    /// Object subtype (e.g. `triangle`), if the file declares one.
    pub fn subtype(&self) -> Option<&str> {
        if self.subtype.is_empty() {
            None
        } else {
            Some(&self.subtype)
        }
    }

    /// Get access to the underlying streams.
    #[inline]
    pub fn streams(&self) -> &IStreams {
        &self.streams
    }

    /// Start a fresh enumeration of the constant parameters.
    pub fn constants(&self) -> Result<ParamCursor<'_>> {
        let header = self.require_header()?;
        Ok(ParamCursor {
            records: RecordReader::new(&self.streams, self.constants_pos),
            remaining: header.constant_param_count,
        })
    }

    /// Start a fresh enumeration of the time steps.
    ///
    /// Locating the first time step walks the constant records, so a
    /// malformed constant section fails here as well.
    pub fn time_steps(&self) -> Result<TimeStepCursor<'_>> {
        let header = self.require_header()?;
        let mut records = RecordReader::new(&self.streams, self.constants_pos);
        for _ in 0..header.constant_param_count {
            records.skip()?;
        }
        Ok(TimeStepCursor {
            records,
            remaining: 0,
        })
    }

    fn require_header(&self) -> Result<&AgxHeader> {
        self.header
            .as_ref()
            .ok_or_else(|| Error::other("AGX header has not been read"))
    }
}

/// Parse the fixed header fields, returning the header and the subtype length.
fn parse_header(data: &[u8]) -> Result<(AgxHeader, u32)> {
    if data.len() < HEADER_FIXED_SIZE {
        return Err(Error::UnexpectedEof(data.len() as u64));
    }

    if &data[0..4] != AGX_MAGIC {
        return Err(Error::InvalidMagic);
    }

    let u32_at = |off: usize| u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]]);

    let version = u32_at(VERSION_OFFSET);
    if version != CURRENT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let subtype_len = u32_at(SUBTYPE_LEN_OFFSET);
    if subtype_len > MAX_NAME_LEN {
        return Err(Error::invalid(format!("Subtype length {} too large", subtype_len)));
    }

    let header = AgxHeader {
        version,
        object_type: TypeTag::from_code(u32_at(OBJECT_TYPE_OFFSET)),
        time_steps: u32_at(TIME_STEPS_OFFSET),
        constant_param_count: u32_at(CONSTANT_COUNT_OFFSET),
    };
    Ok((header, subtype_len))
}

/// Reads parameter records sequentially into reusable buffers.
struct RecordReader<'a> {
    streams: &'a IStreams,
    pos: u64,
    name: Vec<u8>,
    data: Vec<u8>,
}

/// Fixed fields of a record, read ahead of its data.
struct RecordHead {
    name_pos: u64,
    name_len: u32,
    is_array: bool,
    value_type: TypeTag,
    element_type: TypeTag,
    element_count: u64,
    data_pos: u64,
    data_bytes: u64,
}

impl<'a> RecordReader<'a> {
    fn new(streams: &'a IStreams, pos: u64) -> Self {
        Self {
            streams,
            pos,
            name: Vec::new(),
            data: Vec::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.streams.size()
    }

    fn read_u32(&mut self) -> Result<u32> {
        let v = self.streams.read_u32(self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    fn read_head(&self) -> Result<RecordHead> {
        let s = self.streams;
        let name_len = s.read_u32(self.pos)?;
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(Error::invalid(format!(
                "Parameter name length {} at {} is invalid",
                name_len, self.pos
            )));
        }
        let name_pos = self.pos + 4;
        let mut p = name_pos + name_len as u64;

        let is_array = match s.read_u8(p)? {
            0 => false,
            1 => true,
            other => {
                return Err(Error::invalid(format!("Invalid array flag {} at {}", other, p)));
            }
        };
        p += 1;
        let value_type = TypeTag::from_code(s.read_u32(p)?);
        p += 4;
        let element_type = TypeTag::from_code(s.read_u32(p)?);
        p += 4;
        let element_count = s.read_u64(p)?;
        p += 8;
        let data_bytes = s.read_u64(p)?;
        p += 8;

        let data_end = p.checked_add(data_bytes).ok_or(Error::UnexpectedEof(u64::MAX))?;
        if data_end > s.size() {
            return Err(Error::UnexpectedEof(data_end));
        }

        Ok(RecordHead {
            name_pos,
            name_len,
            is_array,
            value_type,
            element_type,
            element_count,
            data_pos: p,
            data_bytes,
        })
    }

    /// Read the next record into the internal buffers.
    fn read(&mut self) -> Result<ParamView<'_>> {
        let head = self.read_head()?;

        self.name.resize(head.name_len as usize, 0);
        self.streams.read_into(head.name_pos, &mut self.name)?;
        let data_len = usize::try_from(head.data_bytes)
            .map_err(|_| Error::invalid("Parameter data too large"))?;
        self.data.resize(data_len, 0);
        self.streams.read_into(head.data_pos, &mut self.data)?;
        self.pos = head.data_pos + head.data_bytes;

        let name = std::str::from_utf8(&self.name)
            .map_err(|e| Error::other(format!("Invalid UTF-8 in parameter name: {}", e)))?;

        Ok(ParamView {
            name,
            is_array: head.is_array,
            value_type: head.value_type,
            element_type: head.element_type,
            element_count: head.element_count,
            data: &self.data,
        })
    }

    /// Advance past the next record without copying its data.
    fn skip(&mut self) -> Result<()> {
        let head = self.read_head()?;
        self.pos = head.data_pos + head.data_bytes;
        Ok(())
    }
}

/// Forward-only cursor over a run of parameter records.
pub struct ParamCursor<'a> {
    records: RecordReader<'a>,
    remaining: u32,
}

impl<'a> ParamCursor<'a> {
    /// Number of parameters not yet read.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Read the next parameter, or `None` when the run is exhausted.
    ///
    /// The view borrows the cursor; copy what you need before calling again.
    pub fn next_param(&mut self) -> Result<Option<ParamView<'_>>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.records.read().map(Some)
    }
}

/// Forward-only cursor over time steps and their parameters.
pub struct TimeStepCursor<'a> {
    records: RecordReader<'a>,
    remaining: u32,
}

impl<'a> TimeStepCursor<'a> {
    /// Enter the next time step, skipping any unread parameters of the
    /// current one. Returns `None` at the end of the file.
    pub fn begin_next(&mut self) -> Result<Option<TimeStepInfo>> {
        while self.remaining > 0 {
            self.remaining -= 1;
            self.records.skip()?;
        }
        if self.records.at_end() {
            return Ok(None);
        }

        let index = self.records.read_u32()?;
        let param_count = self.records.read_u32()?;
        self.remaining = param_count;
        Ok(Some(TimeStepInfo { index, param_count }))
    }

    /// Read the next parameter of the current time step, or `None` when the
    /// step is exhausted.
    pub fn next_param(&mut self) -> Result<Option<ParamView<'_>>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.records.read().map(Some)
    }
}
