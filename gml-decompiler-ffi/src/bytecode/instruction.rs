use anyhow::Result;
use gml_decompiler::{
    AssetType, ComparisonType, DataType, ExtendedOpcode, GameContext, GmInstruction, InstanceType,
    Opcode, VariableType,
};

use super::{Function, Variable};
use crate::error::{narrow, FfiError, FfiResult};
use crate::primitives::RawStr;

const ASSET_INDEX_MASK: i32 = 0x00FF_FFFF;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Instruction<'a> {
    pub variable: Variable<'a>,
    pub function: Function<'a>,
    pub value_string: RawStr<'a>,
    pub value_double: f64,
    pub value_long: i64,
    pub value_int: i32,
    pub branch_offset: i32,
    pub argument_count: i32,
    /// Low 24 bits: asset index. High 8 bits: asset type tag.
    pub asset_reference: i32,
    pub value_short: i16,
    pub extended_kind: i16,
    pub instance_type: i16,
    pub opcode: u8,
    pub type1: u8,
    pub type2: u8,
    pub comparison_kind: u8,
    pub duplication_size: u8,
    pub duplication_size2: u8,
    pub variable_type: u8,
    pub pop_swap_size: u8,
    pub pop_with_context_exit: u8,
}

impl Instruction<'_> {
    /// All-zero instruction with no operands. Its opcode is not valid.
    pub const EMPTY: Self = Self {
        variable: Variable::NULL,
        function: Function::NULL,
        value_string: RawStr::EMPTY,
        value_double: 0.0,
        value_long: 0,
        value_int: 0,
        branch_offset: 0,
        argument_count: 0,
        asset_reference: 0,
        value_short: 0,
        extended_kind: 0,
        instance_type: 0,
        opcode: 0,
        type1: 0,
        type2: 0,
        comparison_kind: 0,
        duplication_size: 0,
        duplication_size2: 0,
        variable_type: 0,
        pop_swap_size: 0,
        pop_with_context_exit: 0,
    };

    pub fn decode_asset_type(raw: i32) -> FfiResult<AssetType> {
        let tag = (raw as u32) >> 24;
        let asset_type = match tag {
            0 => AssetType::Object,
            1 => AssetType::Sprite,
            2 => AssetType::Sound,
            3 => AssetType::Room,
            4 => AssetType::Path,
            5 => AssetType::Script,
            6 => AssetType::Font,
            7 => AssetType::Timeline,
            8 => AssetType::Shader,
            9 => AssetType::Sequence,
            10 => AssetType::AnimCurve,
            11 => AssetType::ParticleSystem,
            13 => AssetType::Background,
            14 => AssetType::RoomInstance,
            _ => return Err(FfiError::UnknownAssetType { tag, raw }),
        };
        Ok(asset_type)
    }
}

fn bool_from_byte(field: &'static str, raw: u8) -> FfiResult<bool> {
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FfiError::InvalidBool { field, raw }),
    }
}

impl<'a> GmInstruction for Instruction<'a> {
    type Variable = Variable<'a>;
    type Function = Function<'a>;

    fn kind(&self) -> Result<Opcode> {
        Ok(narrow("opcode", self.opcode)?)
    }

    fn ext_kind(&self) -> Result<ExtendedOpcode> {
        Ok(narrow("extended_kind", self.extended_kind)?)
    }

    fn comparison_kind(&self) -> Result<ComparisonType> {
        Ok(narrow("comparison_kind", self.comparison_kind)?)
    }

    fn type1(&self) -> Result<DataType> {
        Ok(narrow("type1", self.type1)?)
    }

    fn type2(&self) -> Result<DataType> {
        Ok(narrow("type2", self.type2)?)
    }

    fn inst_type(&self) -> Result<InstanceType> {
        Ok(narrow("instance_type", self.instance_type)?)
    }

    fn reference_var_type(&self) -> Result<VariableType> {
        Ok(narrow("variable_type", self.variable_type)?)
    }

    fn resolved_variable(&self) -> Option<&Variable<'a>> {
        self.variable.exists().then_some(&self.variable)
    }

    fn resolved_function(&self) -> Option<&Function<'a>> {
        self.function.exists().then_some(&self.function)
    }

    fn value_double(&self) -> f64 {
        self.value_double
    }

    fn value_short(&self) -> i16 {
        self.value_short
    }

    fn value_int(&self) -> i32 {
        self.value_int
    }

    fn value_long(&self) -> i64 {
        self.value_long
    }

    fn value_string(&self) -> Result<Option<&str>> {
        if !self.value_string.exists() {
            return Ok(None);
        }
        Ok(Some(self.value_string.content()?))
    }

    fn branch_offset(&self) -> i32 {
        self.branch_offset
    }

    fn pop_with_context_exit(&self) -> Result<bool> {
        Ok(bool_from_byte("pop_with_context_exit", self.pop_with_context_exit)?)
    }

    fn duplication_size(&self) -> u8 {
        self.duplication_size
    }

    fn duplication_size2(&self) -> u8 {
        self.duplication_size2
    }

    fn argument_count(&self) -> i32 {
        self.argument_count
    }

    fn pop_swap_size(&self) -> i32 {
        self.pop_swap_size.into()
    }

    fn asset_reference_id(&self) -> i32 {
        self.asset_reference & ASSET_INDEX_MASK
    }

    fn asset_reference_type(&self, _context: &dyn GameContext) -> Result<AssetType> {
        Ok(Self::decode_asset_type(self.asset_reference)?)
    }

    // Only references resolved by the host are returned; the context is not
    // consulted yet.
    fn try_find_function(&self, _context: Option<&dyn GameContext>) -> Option<&Function<'a>> {
        self.resolved_function()
    }

    fn try_find_variable(&self, _context: Option<&dyn GameContext>) -> Option<&Variable<'a>> {
        self.resolved_variable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_asset_reference() {
        let instr = Instruction {
            asset_reference: 0x0500_0010,
            ..Instruction::EMPTY
        };
        assert_eq!(instr.asset_reference_id(), 16);
        assert_eq!(
            Instruction::decode_asset_type(instr.asset_reference),
            Ok(AssetType::Script)
        );
        assert_eq!(Instruction::decode_asset_type(0x0D00_0001), Ok(AssetType::Background));
        assert_eq!(Instruction::decode_asset_type(0x0E01_86A0), Ok(AssetType::RoomInstance));
    }

    #[test]
    fn unused_asset_tags_fault() {
        assert_eq!(
            Instruction::decode_asset_type(0x0C00_0001),
            Err(FfiError::UnknownAssetType {
                tag: 12,
                raw: 0x0C00_0001
            })
        );
        assert!(Instruction::decode_asset_type(0x0F00_0000).is_err());
        assert!(Instruction::decode_asset_type(-1).is_err());
    }

    #[test]
    fn boolean_bytes() {
        let mut instr = Instruction::EMPTY;
        assert!(!instr.pop_with_context_exit().unwrap());
        instr.pop_with_context_exit = 1;
        assert!(instr.pop_with_context_exit().unwrap());
        instr.pop_with_context_exit = 2;
        let err = instr.pop_with_context_exit().unwrap_err();
        assert_eq!(
            err.downcast_ref::<FfiError>(),
            Some(&FfiError::InvalidBool {
                field: "pop_with_context_exit",
                raw: 2
            })
        );
    }

    #[test]
    fn every_checked_field_names_itself() {
        let instr = Instruction {
            opcode: 0x42,
            extended_kind: -12,
            comparison_kind: 7,
            type1: 7,
            type2: 8,
            instance_type: -8,
            variable_type: 0x20,
            ..Instruction::EMPTY
        };
        let faults = [
            ("opcode", instr.kind().unwrap_err()),
            ("extended_kind", instr.ext_kind().unwrap_err()),
            ("comparison_kind", instr.comparison_kind().unwrap_err()),
            ("type1", instr.type1().unwrap_err()),
            ("type2", instr.type2().unwrap_err()),
            ("instance_type", instr.inst_type().unwrap_err()),
            ("variable_type", instr.reference_var_type().unwrap_err()),
        ];
        for (field, err) in faults {
            match err.downcast_ref::<FfiError>() {
                Some(FfiError::InvalidTag { field: named, .. }) => assert_eq!(*named, field),
                other => panic!("unexpected fault for {field}: {other:?}"),
            }
        }
        assert!(instr.kind().unwrap_err().to_string().contains("66"));
    }

    #[test]
    fn valid_tags_decode() {
        let instr = Instruction {
            opcode: 0x45,
            type1: 5,
            type2: 2,
            instance_type: -1,
            variable_type: 0xA0,
            comparison_kind: 3,
            extended_kind: -11,
            ..Instruction::EMPTY
        };
        assert_eq!(instr.kind().unwrap(), Opcode::Pop);
        assert_eq!(instr.type1().unwrap(), DataType::Variable);
        assert_eq!(instr.type2().unwrap(), DataType::Int32);
        assert_eq!(instr.inst_type().unwrap(), InstanceType::Self_);
        assert_eq!(instr.reference_var_type().unwrap(), VariableType::Normal);
        assert_eq!(instr.comparison_kind().unwrap(), ComparisonType::EqualTo);
        assert_eq!(instr.ext_kind().unwrap(), ExtendedOpcode::PushReference);
    }

    #[test]
    fn references_exist_only_with_a_name() {
        let bare = Instruction::EMPTY;
        assert!(bare.try_find_variable(None).is_none());
        assert!(bare.try_find_function(None).is_none());
        assert_eq!(bare.value_string().unwrap(), None);

        let resolved = Instruction {
            variable: Variable::new("x", 1, -1),
            function: Function::new("instance_create_layer"),
            value_string: RawStr::new("hello"),
            ..Instruction::EMPTY
        };
        assert!(resolved.try_find_variable(None).is_some());
        assert!(resolved.try_find_function(None).is_some());
        assert_eq!(resolved.value_string().unwrap(), Some("hello"));
    }
}
