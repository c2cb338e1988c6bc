//! Closed enumerations shared between the decompiler and whatever feeds it.
//!
//! Discriminants are the raw values found in GameMaker bytecode (format 15+),
//! so a projection can narrow a raw tag with [`num_traits::FromPrimitive`].

use num_derive::FromPrimitive;
use strum::{Display, IntoStaticStr};

/// Main instruction opcodes.
#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Convert = 0x07,
    Multiply = 0x08,
    Divide = 0x09,
    GMLDivRem = 0x0A,
    GMLModulo = 0x0B,
    Add = 0x0C,
    Subtract = 0x0D,
    And = 0x0E,
    Or = 0x0F,
    Xor = 0x10,
    Negate = 0x11,
    Not = 0x12,
    ShiftLeft = 0x13,
    ShiftRight = 0x14,
    Compare = 0x15,
    Pop = 0x45,
    PushImmediate = 0x84,
    Duplicate = 0x86,
    CallVariable = 0x99,
    Return = 0x9C,
    Exit = 0x9D,
    PopDelete = 0x9E,
    Branch = 0xB6,
    BranchTrue = 0xB7,
    BranchFalse = 0xB8,
    PushWithContext = 0xBA,
    PopWithContext = 0xBB,
    Push = 0xC0,
    PushLocal = 0xC1,
    PushGlobal = 0xC2,
    PushBuiltin = 0xC3,
    Call = 0xD9,
    Extended = 0xFF,
}

/// Sub-opcodes of [`Opcode::Extended`] (the `break` instruction family).
#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ExtendedOpcode {
    CheckArrayIndex = -1,
    PushArrayFinal = -2,
    PopArrayFinal = -3,
    PushArrayContainer = -4,
    SetArrayOwner = -5,
    HasStaticInitialized = -6,
    SetStaticInitialized = -7,
    SaveArrayReference = -8,
    RestoreArrayReference = -9,
    IsNullishValue = -10,
    PushReference = -11,
}

#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComparisonType {
    LesserThan = 1,
    LesserEqualThan = 2,
    EqualTo = 3,
    NotEqualTo = 4,
    GreaterEqualThan = 5,
    GreaterThan = 6,
}

impl ComparisonType {
    pub fn operator(self) -> &'static str {
        match self {
            ComparisonType::LesserThan => "<",
            ComparisonType::LesserEqualThan => "<=",
            ComparisonType::EqualTo => "==",
            ComparisonType::NotEqualTo => "!=",
            ComparisonType::GreaterEqualThan => ">=",
            ComparisonType::GreaterThan => ">",
        }
    }
}

/// Operand data type tags.
#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Double = 0,
    Float = 1,
    Int32 = 2,
    Int64 = 3,
    Boolean = 4,
    Variable = 5,
    String = 6,
    Int16 = 0x0F,
}

/// Builtin instance scopes.
///
/// Non-negative values in bytecode normally name a game object; only `0`
/// is representable here, as [`InstanceType::Undefined`].
#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
#[repr(i16)]
pub enum InstanceType {
    Undefined = 0,
    #[strum(serialize = "self")]
    Self_ = -1,
    Other = -2,
    All = -3,
    Noone = -4,
    Global = -5,
    Builtin = -6,
    Local = -7,
    StackTop = -9,
    Argument = -15,
    Static = -16,
}

/// Instance type of a variable definition.
///
/// Unlike [`InstanceType`] this is an open set: a variable may be owned by a
/// specific game object, in which case the raw value is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableInstanceType {
    Builtin(InstanceType),
    Raw(i16),
}

impl VariableInstanceType {
    pub fn from_raw(raw: i16) -> Self {
        match num_traits::FromPrimitive::from_i16(raw) {
            Some(ty) => VariableInstanceType::Builtin(ty),
            None => VariableInstanceType::Raw(raw),
        }
    }

    pub fn raw(self) -> i16 {
        match self {
            VariableInstanceType::Builtin(ty) => ty as i16,
            VariableInstanceType::Raw(raw) => raw,
        }
    }
}

/// How a variable operand addresses its instance.
#[derive(FromPrimitive, Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariableType {
    Array = 0x00,
    MultiPush = 0x10,
    StackTop = 0x80,
    MultiPushPop = 0x90,
    Normal = 0xA0,
    Instance = 0xE0,
}

/// Asset categories an asset reference or asset name lookup can target.
#[derive(Display, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Object,
    Sprite,
    Sound,
    Room,
    Background,
    Path,
    Script,
    Font,
    Timeline,
    Shader,
    Sequence,
    AnimCurve,
    ParticleSystem,
    /// A placed instance of a room, named `inst_<id>`.
    RoomInstance,
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn narrows_only_defined_tags() {
        assert_eq!(Opcode::from_u8(0xC0), Some(Opcode::Push));
        assert_eq!(Opcode::from_u8(0x01), None);
        assert_eq!(ExtendedOpcode::from_i16(-11), Some(ExtendedOpcode::PushReference));
        assert_eq!(ExtendedOpcode::from_i16(-12), None);
        assert_eq!(DataType::from_u8(0x0F), Some(DataType::Int16));
        assert_eq!(DataType::from_u8(7), None);
    }

    #[test]
    fn variable_instance_type_keeps_object_ids() {
        assert_eq!(
            VariableInstanceType::from_raw(-5),
            VariableInstanceType::Builtin(InstanceType::Global)
        );
        assert_eq!(VariableInstanceType::from_raw(42), VariableInstanceType::Raw(42));
        assert_eq!(VariableInstanceType::from_raw(42).raw(), 42);
        assert_eq!(VariableInstanceType::from_raw(-1).raw(), -1);
    }
}
