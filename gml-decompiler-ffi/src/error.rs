use thiserror::Error;

/// Validation faults raised while reading host-owned buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FfiError {
    #[error("negative index {0}")]
    NegativeIndex(i32),

    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("array length {len} exceeds its capacity {cap}")]
    LengthExceedsCapacity { len: usize, cap: usize },

    #[error("null data pointer for {what} of length {len}")]
    NullPointer { what: &'static str, len: usize },

    #[error("data pointer {addr:#x} is not aligned to {align} bytes")]
    Misaligned { addr: usize, align: usize },

    #[error("invalid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid {field}: {raw} is not a valid {enumeration}")]
    InvalidTag {
        field: &'static str,
        enumeration: &'static str,
        raw: i64,
    },

    #[error("invalid {field}: boolean byte must be 0 or 1, got {raw}")]
    InvalidBool { field: &'static str, raw: u8 },

    #[error("unknown asset type tag {tag} in asset reference {raw:#010x}")]
    UnknownAssetType { tag: u32, raw: i32 },

    #[error("unknown LTS branch tag {0}")]
    InvalidBranch(u8),

    #[error("input pointer `{0}` is null")]
    NullInput(&'static str),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

pub type FfiResult<T> = std::result::Result<T, FfiError>;

/// Narrows a raw tag into a closed enumeration, naming the field on failure.
pub(crate) fn narrow<T>(field: &'static str, raw: impl Into<i64>) -> FfiResult<T>
where
    T: num_traits::FromPrimitive,
{
    let raw = raw.into();
    T::from_i64(raw).ok_or(FfiError::InvalidTag {
        field,
        enumeration: short_type_name::<T>(),
        raw,
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use gml_decompiler::{DataType, Opcode};

    use super::*;

    #[test]
    fn narrowing_names_field_and_enumeration() {
        assert_eq!(narrow::<Opcode>("opcode", 0xC0u8), Ok(Opcode::Push));

        let err = narrow::<DataType>("type2", 9u8).unwrap_err();
        assert_eq!(
            err,
            FfiError::InvalidTag {
                field: "type2",
                enumeration: "DataType",
                raw: 9
            }
        );
        assert_eq!(err.to_string(), "invalid type2: 9 is not a valid DataType");
    }
}
