//! AGX format constants.
//!
//! ```text
//! header
//!   magic            4 bytes   "AGX\0"
//!   version          u32
//!   object type      u32       TypeTag code
//!   time steps       u32
//!   constant count   u32
//!   subtype length   u32       followed by subtype bytes
//! parameter record
//!   name length      u32       followed by name bytes
//!   is array         u8
//!   value type       u32       TypeTag code
//!   element type     u32       TypeTag code
//!   element count    u64
//!   data bytes       u64       followed by data
//! time step
//!   step index       u32
//!   param count      u32       followed by param count records
//! ```
//!
//! All integers are little-endian. Constants follow the header; time steps
//! follow the constants and run to the end of the file.

/// Magic bytes at the start of an AGX file.
pub const AGX_MAGIC: &[u8; 4] = b"AGX\0";

/// Current AGX format version.
pub const CURRENT_VERSION: u32 = 1;

/// Size of the fixed part of the header (everything before the subtype bytes).
pub const HEADER_FIXED_SIZE: usize = 24;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 4;

/// Offset of the object type in the header.
pub const OBJECT_TYPE_OFFSET: usize = 8;

/// Offset of the declared time step count in the header.
pub const TIME_STEPS_OFFSET: usize = 12;

/// Offset of the constant parameter count in the header.
pub const CONSTANT_COUNT_OFFSET: usize = 16;

/// Offset of the subtype length in the header.
pub const SUBTYPE_LEN_OFFSET: usize = 20;

/// Size of a record's fixed fields after the name bytes
/// (is_array + value type + element type + element count + data bytes).
pub const RECORD_FIXED_SIZE: usize = 1 + 4 + 4 + 8 + 8;

/// Size of a time step header (step index + param count).
pub const TIME_STEP_HEADER_SIZE: usize = 8;

/// Upper bound on parameter and subtype name lengths.
pub const MAX_NAME_LEN: u32 = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(AGX_MAGIC, b"AGX\0");
        assert_eq!(AGX_MAGIC.len(), 4);
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(SUBTYPE_LEN_OFFSET + 4, HEADER_FIXED_SIZE);
        assert_eq!(RECORD_FIXED_SIZE, 25);
    }
}
