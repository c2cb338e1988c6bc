//! The read-only view of bytecode the decompiler works against.
//!
//! Implementors are free to back these traits with anything: owned data,
//! memory-mapped files, or borrowed foreign buffers. Every accessor that
//! decodes something may fail; the decompiler treats such failures like its
//! own and reports them to the caller.

use std::borrow::Cow;

use anyhow::Result;

use crate::types::{
    AssetType, ComparisonType, DataType, ExtendedOpcode, InstanceType, Opcode, VariableInstanceType,
    VariableType,
};

pub trait GmFunction {
    fn name(&self) -> Result<&str>;
}

pub trait GmVariable {
    fn name(&self) -> Result<&str>;

    fn variable_id(&self) -> i32;

    fn instance_type(&self) -> VariableInstanceType;
}

pub trait GmInstruction {
    type Variable: GmVariable;
    type Function: GmFunction;

    fn kind(&self) -> Result<Opcode>;
    fn ext_kind(&self) -> Result<ExtendedOpcode>;
    fn comparison_kind(&self) -> Result<ComparisonType>;
    fn type1(&self) -> Result<DataType>;
    fn type2(&self) -> Result<DataType>;
    fn inst_type(&self) -> Result<InstanceType>;
    fn reference_var_type(&self) -> Result<VariableType>;

    /// The variable operand, if one was resolved before decompilation.
    fn resolved_variable(&self) -> Option<&Self::Variable>;
    /// The function operand, if one was resolved before decompilation.
    fn resolved_function(&self) -> Option<&Self::Function>;

    fn value_double(&self) -> f64;
    fn value_short(&self) -> i16;
    fn value_int(&self) -> i32;
    fn value_long(&self) -> i64;
    fn value_string(&self) -> Result<Option<&str>>;

    /// Branch distance in bytes, relative to this instruction.
    fn branch_offset(&self) -> i32;
    fn pop_with_context_exit(&self) -> Result<bool>;
    fn duplication_size(&self) -> u8;
    fn duplication_size2(&self) -> u8;
    fn argument_count(&self) -> i32;
    fn pop_swap_size(&self) -> i32;

    fn asset_reference_id(&self) -> i32;
    fn asset_reference_type(&self, context: &dyn GameContext) -> Result<AssetType>;

    fn try_find_function(&self, context: Option<&dyn GameContext>) -> Option<&Self::Function>;
    fn try_find_variable(&self, context: Option<&dyn GameContext>) -> Option<&Self::Variable>;
}

pub trait GmCode: Sized {
    type Instruction: GmInstruction;

    fn name(&self) -> Result<&str>;

    /// Total bytecode length in bytes.
    fn length(&self) -> u32;
    fn start_offset(&self) -> u32;
    fn argument_count(&self) -> u16;
    fn local_count(&self) -> u16;

    fn instruction_count(&self) -> usize;
    fn instruction(&self, index: usize) -> Result<&Self::Instruction>;

    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Result<&Self>;

    fn parent(&self) -> Option<&Self>;
}

/// What the decompiler needs to know about the game a code entry belongs to.
///
/// The `using_*` flags describe runtime behaviour that changed between
/// GameMaker versions.
pub trait GameContext {
    fn using_gms2_or_later(&self) -> bool;
    fn using_gmlv2(&self) -> bool;
    fn using_string_real_optimizations(&self) -> bool;
    fn using_typed_booleans(&self) -> bool;
    fn using_nullish_operator(&self) -> bool;
    fn using_asset_references(&self) -> bool;
    fn using_room_instance_references(&self) -> bool;
    fn using_function_script_references(&self) -> bool;
    fn using_new_function_resolution(&self) -> bool;
    fn bytecode_14_or_lower(&self) -> bool;
    fn using_logical_short_circuit(&self) -> bool;
    fn using_long_compound_bitwise(&self) -> bool;
    fn using_extra_repeat_instruction(&self) -> Result<bool>;
    fn using_finally_before_throw(&self) -> bool;
    fn using_constructor_set_static(&self) -> bool;
    fn using_array_copy_on_write(&self) -> bool;
    fn using_new_array_owners(&self) -> bool;
    fn using_reentrant_static(&self) -> bool;
    fn using_new_function_variables(&self) -> bool;
    fn using_self_to_builtin(&self) -> bool;
    fn using_global_constant_function(&self) -> bool;
    fn using_object_function_foresight(&self) -> bool;
    fn using_better_try_break_continue(&self) -> bool;
    fn using_builtin_default_arguments(&self) -> bool;
    fn using_optimized_function_declarations(&self) -> bool;

    /// `(major, minor, release, build)` of the runtime, used to pick builtin lists.
    fn builtins_version(&self) -> (u32, u32, u32, u32);

    fn asset_name(&self, asset_type: AssetType, asset_index: i32) -> Result<Option<Cow<'_, str>>>;

    fn asset_id(&self, asset_name: &str) -> Result<Option<i32>>;
    fn room_instance_id(&self, room_instance_name: &str) -> Result<Option<i32>>;
    fn script_id(&self, script_name: &str) -> Result<Option<i32>>;
    fn script_id_by_function_name(&self, function_name: &str) -> Result<Option<i32>>;
}

/// Output style knobs.
pub trait DecompileSettings {
    fn indent_string(&self) -> &str;
    fn use_semicolon(&self) -> bool;
    fn use_css_colors(&self) -> bool;
    fn print_warnings(&self) -> bool;
    fn macro_declarations_at_top(&self) -> bool;
    fn empty_line_after_block_locals(&self) -> bool;
    fn empty_line_around_enums(&self) -> bool;
    fn empty_line_around_branch_statements(&self) -> bool;
    fn empty_line_before_switch_cases(&self) -> bool;
    fn empty_line_after_switch_cases(&self) -> bool;
    fn empty_line_around_function_declarations(&self) -> bool;
    fn empty_line_around_static_initialization(&self) -> bool;
    fn open_block_brace_on_same_line(&self) -> bool;
    fn remove_single_line_block_braces(&self) -> bool;
    fn cleanup_try(&self) -> bool;
    fn cleanup_else_to_continue(&self) -> bool;
    fn cleanup_default_argument_values(&self) -> bool;
    fn cleanup_builtin_array_variables(&self) -> bool;
    fn cleanup_local_var_declarations(&self) -> bool;
    fn create_enum_declarations(&self) -> bool;
    fn unknown_enum_name(&self) -> &str;
    fn unknown_enum_value_pattern(&self) -> &str;
    fn unknown_argument_name_pattern(&self) -> &str;
    fn allow_leftover_data_on_stack(&self) -> bool;

    /// Looks up a notable constant (`pi`, `1/3`, ...) by exact value.
    ///
    /// Returns the source text and whether it is made of several tokens
    /// (and so may need parentheses when used as an operand).
    fn try_get_predefined_double(&self, value: f64) -> Option<(&'static str, bool)>;
}
