//! Reference decompilation: a single linear pass over each code entry.
//!
//! The operand stack is simulated with [`Expr`] values; statements are
//! emitted whenever an instruction consumes the stack for a side effect.
//! Control flow is not structured: branches and `with` blocks are written as
//! marker comments so the output still shows where they were.

use std::fmt::Display;

use anyhow::{Context, Result};
use num_traits::FromPrimitive;

use crate::error::DecompileError;
use crate::expr::{format_double, quote_string, Expr};
use crate::interface::{
    DecompileSettings, GameContext, GmCode, GmFunction, GmInstruction, GmVariable,
};
use crate::types::{AssetType, DataType, ExtendedOpcode, InstanceType, Opcode, VariableType};

struct Writer<'s> {
    out: String,
    indent: &'s str,
    semicolon: bool,
}

impl<'s> Writer<'s> {
    fn new(settings: &'s dyn DecompileSettings) -> Self {
        Self {
            out: String::new(),
            indent: settings.indent_string(),
            semicolon: settings.use_semicolon(),
        }
    }

    fn line(&mut self, depth: usize, text: impl Display) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
        self.out.push_str(&text.to_string());
        self.out.push('\n');
    }

    fn statement(&mut self, depth: usize, text: impl Display) {
        if self.semicolon {
            self.line(depth, format_args!("{};", text));
        } else {
            self.line(depth, text);
        }
    }

    fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

fn pop(stack: &mut Vec<Expr>, index: usize, opcode: Opcode) -> Result<Expr, DecompileError> {
    stack.pop().ok_or(DecompileError::StackUnderflow { index, opcode })
}

/// Pops `count` call arguments; the top of the stack is the first argument.
fn pop_arguments(
    stack: &mut Vec<Expr>,
    count: i32,
    index: usize,
    opcode: Opcode,
) -> Result<Vec<Expr>, DecompileError> {
    let count = usize::try_from(count).map_err(|_| DecompileError::NegativeArgumentCount {
        index,
        opcode,
        count,
    })?;
    if count > stack.len() {
        return Err(DecompileError::StackUnderflow { index, opcode });
    }
    let mut args = stack.split_off(stack.len() - count);
    args.reverse();
    Ok(args)
}

fn binary_operator(opcode: Opcode, type1: DataType, type2: DataType) -> Option<&'static str> {
    let boolean = type1 == DataType::Boolean && type2 == DataType::Boolean;
    let op = match opcode {
        Opcode::Multiply => "*",
        Opcode::Divide => "/",
        Opcode::GMLDivRem => "div",
        Opcode::GMLModulo => "%",
        Opcode::Add => "+",
        Opcode::Subtract => "-",
        Opcode::And if boolean => "&&",
        Opcode::And => "&",
        Opcode::Or if boolean => "||",
        Opcode::Or => "|",
        Opcode::Xor if boolean => "^^",
        Opcode::Xor => "^",
        Opcode::ShiftLeft => "<<",
        Opcode::ShiftRight => ">>",
        _ => return None,
    };
    Some(op)
}

fn scoped_name(scope: InstanceType, name: &str) -> String {
    match scope {
        InstanceType::Global | InstanceType::Other | InstanceType::All | InstanceType::Noone => {
            format!("{}.{}", scope, name)
        }
        _ => name.to_string(),
    }
}

/// Deepest level of child code entries that will be followed.
pub const MAX_NESTING: usize = 256;

/// Decompiles one root code entry (and its children) against a game context.
pub struct DecompileContext<'a, C: GmCode> {
    game: &'a dyn GameContext,
    code: &'a C,
    settings: &'a dyn DecompileSettings,
}

impl<'a, C: GmCode> DecompileContext<'a, C> {
    pub fn new(
        game: &'a dyn GameContext,
        code: &'a C,
        settings: &'a dyn DecompileSettings,
    ) -> Self {
        Self { game, code, settings }
    }

    pub fn decompile_to_string(&self) -> Result<String> {
        log::debug!(
            "decompiling {} instruction(s), {} child entr(ies)",
            self.code.instruction_count(),
            self.code.child_count()
        );
        let mut writer = Writer::new(self.settings);
        self.write_code(&mut writer, self.code, 0)?;
        Ok(writer.finish())
    }

    fn write_code(&self, w: &mut Writer<'_>, code: &C, depth: usize) -> Result<()> {
        if depth > MAX_NESTING {
            return Err(DecompileError::NestingTooDeep { limit: MAX_NESTING }.into());
        }
        let name = code.name().context("reading code entry name")?;
        self.write_body(w, code, name, depth)
            .with_context(|| format!("decompiling {:?}", name))?;

        for i in 0..code.child_count() {
            let child = code
                .child(i)
                .with_context(|| format!("reading child #{} of {:?}", i, name))?;
            self.write_function(w, child, depth)?;
        }
        Ok(())
    }

    fn write_function(&self, w: &mut Writer<'_>, child: &C, depth: usize) -> Result<()> {
        let name = child.name().context("reading child code entry name")?;
        let around = self.settings.empty_line_around_function_declarations();

        if around {
            w.blank();
        }
        if self.settings.open_block_brace_on_same_line() {
            w.line(depth, format_args!("function {}() {{", name));
        } else {
            w.line(depth, format_args!("function {}()", name));
            w.line(depth, "{");
        }
        self.write_code(w, child, depth + 1)?;
        w.line(depth, "}");
        if around {
            w.blank();
        }
        Ok(())
    }

    fn write_body(&self, w: &mut Writer<'_>, code: &C, name: &str, depth: usize) -> Result<()> {
        let mut stack: Vec<Expr> = Vec::new();
        for index in 0..code.instruction_count() {
            let instr = code.instruction(index)?;
            self.step(w, depth, index, instr, &mut stack)
                .with_context(|| format!("at instruction #{}", index))?;
        }

        if !stack.is_empty() {
            if !self.settings.allow_leftover_data_on_stack() {
                return Err(DecompileError::LeftoverStackData {
                    count: stack.len(),
                    code: name.to_string(),
                }
                .into());
            }
            log::warn!("{} value(s) left on the stack in {:?}", stack.len(), name);
            if self.settings.print_warnings() {
                w.line(
                    depth,
                    format_args!("// Warning: {} value(s) left on the stack", stack.len()),
                );
            }
        }
        Ok(())
    }

    fn step(
        &self,
        w: &mut Writer<'_>,
        depth: usize,
        index: usize,
        instr: &C::Instruction,
        stack: &mut Vec<Expr>,
    ) -> Result<()> {
        let opcode = instr.kind()?;
        match opcode {
            Opcode::Convert => {
                instr.type1()?;
                instr.type2()?;
            }
            Opcode::Multiply
            | Opcode::Divide
            | Opcode::GMLDivRem
            | Opcode::GMLModulo
            | Opcode::Add
            | Opcode::Subtract
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::ShiftLeft
            | Opcode::ShiftRight => {
                let op = binary_operator(opcode, instr.type1()?, instr.type2()?)
                    .ok_or(DecompileError::Unsupported { index, opcode })?;
                let rhs = pop(stack, index, opcode)?;
                let lhs = pop(stack, index, opcode)?;
                stack.push(Expr::binary(op, lhs, rhs));
            }
            Opcode::Negate => {
                instr.type1()?;
                let operand = pop(stack, index, opcode)?;
                stack.push(Expr::unary("-", operand));
            }
            Opcode::Not => {
                let op = if instr.type1()? == DataType::Boolean { "!" } else { "~" };
                let operand = pop(stack, index, opcode)?;
                stack.push(Expr::unary(op, operand));
            }
            Opcode::Compare => {
                let op = instr.comparison_kind()?.operator();
                let rhs = pop(stack, index, opcode)?;
                let lhs = pop(stack, index, opcode)?;
                stack.push(Expr::binary(op, lhs, rhs));
            }
            Opcode::Pop => {
                if instr.type1()? != DataType::Variable {
                    return Err(DecompileError::Unsupported { index, opcode }.into());
                }
                let target = self.variable_target(index, opcode, instr, stack)?;
                let value = pop(stack, index, opcode)?;
                w.statement(depth, format_args!("{} = {}", target, value));
            }
            Opcode::PushImmediate => stack.push(Expr::Int(instr.value_short().into())),
            Opcode::Duplicate => {
                instr.type1()?;
                if instr.duplication_size2() != 0 {
                    return Err(DecompileError::Unsupported { index, opcode }.into());
                }
                let count = usize::from(instr.duplication_size()) + 1;
                if stack.len() < count {
                    return Err(DecompileError::StackUnderflow { index, opcode }.into());
                }
                let copied = stack[stack.len() - count..].to_vec();
                stack.extend(copied);
            }
            Opcode::Call => {
                let function = instr
                    .try_find_function(Some(self.game))
                    .ok_or(DecompileError::MissingOperand {
                        index,
                        opcode,
                        operand: "function",
                    })?;
                let callee = function.name()?.to_string();
                let args = pop_arguments(stack, instr.argument_count(), index, opcode)?;
                stack.push(Expr::Call { callee, args });
            }
            Opcode::CallVariable => {
                let function = pop(stack, index, opcode)?;
                let instance = pop(stack, index, opcode)?;
                let args = pop_arguments(stack, instr.argument_count(), index, opcode)?;
                let callee = match instance {
                    Expr::Int(-1) => function.to_string(),
                    other => format!("{}.{}", self.instance_name(&other)?, function),
                };
                stack.push(Expr::Call { callee, args });
            }
            Opcode::Return => {
                instr.type1()?;
                let value = pop(stack, index, opcode)?;
                w.statement(depth, format_args!("return {}", value));
            }
            Opcode::Exit => w.statement(depth, "exit"),
            Opcode::PopDelete => {
                let value = pop(stack, index, opcode)?;
                if value.is_call() {
                    w.statement(depth, value);
                }
            }
            Opcode::Branch => {
                self.write_branch(w, depth, format_args!("goto {:+}", instr.branch_offset()));
            }
            Opcode::BranchTrue => {
                let condition = pop(stack, index, opcode)?;
                self.write_branch(
                    w,
                    depth,
                    format_args!("if ({}) goto {:+}", condition, instr.branch_offset()),
                );
            }
            Opcode::BranchFalse => {
                let condition = Expr::unary("!", pop(stack, index, opcode)?);
                self.write_branch(
                    w,
                    depth,
                    format_args!("if ({}) goto {:+}", condition, instr.branch_offset()),
                );
            }
            Opcode::PushWithContext => {
                let target = self.instance_name(&pop(stack, index, opcode)?)?;
                w.line(
                    depth,
                    format_args!("// with ({}) until {:+}", target, instr.branch_offset()),
                );
            }
            Opcode::PopWithContext => {
                if instr.pop_with_context_exit()? {
                    w.line(depth, "// leave with");
                } else {
                    w.line(depth, format_args!("// end with, loop {:+}", instr.branch_offset()));
                }
            }
            Opcode::Push | Opcode::PushLocal | Opcode::PushGlobal | Opcode::PushBuiltin => {
                let value = self.push_value(index, opcode, instr, stack)?;
                stack.push(value);
            }
            Opcode::Extended => self.extended(index, instr, stack)?,
        }
        Ok(())
    }

    fn write_branch(&self, w: &mut Writer<'_>, depth: usize, text: impl Display) {
        let around = self.settings.empty_line_around_branch_statements();
        if around {
            w.blank();
        }
        w.line(depth, format_args!("// {}", text));
        if around {
            w.blank();
        }
    }

    fn push_value(
        &self,
        index: usize,
        opcode: Opcode,
        instr: &C::Instruction,
        stack: &mut Vec<Expr>,
    ) -> Result<Expr> {
        let expr = match instr.type1()? {
            DataType::Double | DataType::Float => self.double_literal(instr.value_double()),
            DataType::Int32 => match instr.resolved_function() {
                Some(function) => Expr::atom(function.name()?),
                None => Expr::Int(instr.value_int().into()),
            },
            DataType::Int64 => Expr::Int(instr.value_long()),
            DataType::Int16 => Expr::Int(instr.value_short().into()),
            DataType::Boolean => {
                let value = instr.value_short() != 0;
                if self.game.using_typed_booleans() {
                    Expr::atom(if value { "true" } else { "false" })
                } else {
                    Expr::Int(value.into())
                }
            }
            DataType::String => Expr::atom(quote_string(instr.value_string()?.unwrap_or_default())),
            DataType::Variable => Expr::atom(self.variable_target(index, opcode, instr, stack)?),
        };
        Ok(expr)
    }

    fn double_literal(&self, value: f64) -> Expr {
        match self.settings.try_get_predefined_double(value) {
            Some((text, true)) => Expr::Compound(text.to_string()),
            Some((text, false)) => Expr::atom(text),
            None => Expr::atom(format_double(value)),
        }
    }

    /// Resolves the variable operand of a push/pop, consuming whatever
    /// instance and array index operands its addressing mode puts on the stack.
    fn variable_target(
        &self,
        index: usize,
        opcode: Opcode,
        instr: &C::Instruction,
        stack: &mut Vec<Expr>,
    ) -> Result<String> {
        let variable = instr
            .try_find_variable(Some(self.game))
            .ok_or(DecompileError::MissingOperand {
                index,
                opcode,
                operand: "variable",
            })?;
        let name = variable.name()?;

        match instr.reference_var_type()? {
            VariableType::Normal => Ok(scoped_name(instr.inst_type()?, name)),
            VariableType::StackTop | VariableType::Instance => {
                let instance = pop(stack, index, opcode)?;
                self.qualified_name(&instance, name)
            }
            VariableType::Array => {
                let array_index = pop(stack, index, opcode)?;
                let instance = pop(stack, index, opcode)?;
                Ok(format!("{}[{}]", self.qualified_name(&instance, name)?, array_index))
            }
            VariableType::MultiPush | VariableType::MultiPushPop => {
                Err(DecompileError::Unsupported { index, opcode }.into())
            }
        }
    }

    fn qualified_name(&self, instance: &Expr, name: &str) -> Result<String> {
        if let Expr::Int(raw) = *instance {
            if raw < 0 {
                if let Some(scope) = i16::try_from(raw).ok().and_then(InstanceType::from_i16) {
                    return Ok(scoped_name(scope, name));
                }
            }
        }
        Ok(format!("{}.{}", self.instance_name(instance)?, name))
    }

    fn instance_name(&self, instance: &Expr) -> Result<String> {
        match *instance {
            Expr::Int(raw) if raw < 0 => Ok(i16::try_from(raw)
                .ok()
                .and_then(InstanceType::from_i16)
                .map_or_else(|| raw.to_string(), |scope| scope.to_string())),
            Expr::Int(raw) => {
                let name = match i32::try_from(raw) {
                    Ok(id) => self.game.asset_name(AssetType::Object, id)?,
                    Err(_) => None,
                };
                Ok(name.map_or_else(|| raw.to_string(), |name| name.into_owned()))
            }
            _ => Ok(instance.to_string()),
        }
    }

    fn extended(&self, index: usize, instr: &C::Instruction, stack: &mut Vec<Expr>) -> Result<()> {
        let opcode = Opcode::Extended;
        match instr.ext_kind()? {
            ExtendedOpcode::PushReference => {
                let asset_type = instr.asset_reference_type(self.game)?;
                let asset_index = instr.asset_reference_id();
                let expr = match self.game.asset_name(asset_type, asset_index)? {
                    Some(name) => Expr::atom(name.into_owned()),
                    None => {
                        log::debug!("no name for {} #{}", asset_type, asset_index);
                        Expr::Int(asset_index.into())
                    }
                };
                stack.push(expr);
            }
            ExtendedOpcode::IsNullishValue => {
                let top = stack
                    .last()
                    .cloned()
                    .ok_or(DecompileError::StackUnderflow { index, opcode })?;
                stack.push(Expr::Call {
                    callee: "is_nullish".to_string(),
                    args: vec![top],
                });
            }
            ExtendedOpcode::SetArrayOwner => {
                pop(stack, index, opcode)?;
            }
            ExtendedOpcode::HasStaticInitialized => stack.push(Expr::atom("static_initialized")),
            ExtendedOpcode::CheckArrayIndex
            | ExtendedOpcode::PushArrayFinal
            | ExtendedOpcode::PopArrayFinal
            | ExtendedOpcode::PushArrayContainer
            | ExtendedOpcode::SetStaticInitialized
            | ExtendedOpcode::SaveArrayReference
            | ExtendedOpcode::RestoreArrayReference => {}
        }
        Ok(())
    }
}
