use anyhow::{Context, Result};
use gml_decompiler::GmCode;

use super::Instruction;
use crate::primitives::{RawArray, RawStr};

/// A code entry with its instructions and nested child entries.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Code<'a> {
    pub name: RawStr<'a>,
    pub instructions: RawArray<'a, Instruction<'a>>,
    pub children: RawArray<'a, Code<'a>>,
    pub length: u32,
    pub start_offset: u32,
    pub argument_count: u16,
    pub local_count: u16,
}

impl<'a> Code<'a> {
    pub fn new(
        name: &'a str,
        instructions: &'a [Instruction<'a>],
        children: &'a [Code<'a>],
    ) -> Self {
        Self {
            name: RawStr::new(name),
            instructions: RawArray::from_slice(instructions),
            children: RawArray::from_slice(children),
            length: 0,
            start_offset: 0,
            argument_count: 0,
            local_count: 0,
        }
    }
}

impl<'a> GmCode for Code<'a> {
    type Instruction = Instruction<'a>;

    fn name(&self) -> Result<&str> {
        Ok(self.name.content()?)
    }

    fn length(&self) -> u32 {
        self.length
    }

    fn start_offset(&self) -> u32 {
        self.start_offset
    }

    fn argument_count(&self) -> u16 {
        self.argument_count
    }

    fn local_count(&self) -> u16 {
        self.local_count
    }

    fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    fn instruction(&self, index: usize) -> Result<&Instruction<'a>> {
        self.instructions
            .get(index)
            .with_context(|| format!("reading instruction #{}", index))
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Result<&Self> {
        self.children
            .get(index)
            .with_context(|| format!("reading child code entry #{}", index))
    }

    // Parent links are not part of the host layout.
    fn parent(&self) -> Option<&Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FfiError;

    #[test]
    fn children_and_instructions_by_index() {
        let body = [Instruction {
            opcode: 0x9D,
            ..Instruction::EMPTY
        }];
        let child = [Code::new("gml_Script_inner", &body, &[])];
        let root = Code {
            length: 8,
            argument_count: 2,
            ..Code::new("gml_Script_outer", &[], &child)
        };

        assert_eq!(root.name().unwrap(), "gml_Script_outer");
        assert_eq!(root.length(), 8);
        assert_eq!(root.argument_count(), 2);
        assert_eq!(root.instruction_count(), 0);
        assert_eq!(root.child_count(), 1);

        let inner = root.child(0).unwrap();
        assert_eq!(inner.name().unwrap(), "gml_Script_inner");
        assert_eq!(inner.instruction(0).unwrap().opcode, 0x9D);
        assert!(inner.parent().is_none());
    }

    #[test]
    fn out_of_range_child_is_a_fault() {
        let root = Code::new("gml_Script_outer", &[], &[]);
        let err = root.child(1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FfiError>(),
            Some(&FfiError::IndexOutOfRange { index: 1, len: 0 })
        );
        assert!(root.instruction(0).is_err());
    }
}
