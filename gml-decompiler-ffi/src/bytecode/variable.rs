use anyhow::Result;
use gml_decompiler::{GmVariable, VariableInstanceType};

use crate::primitives::RawStr;

/// A variable reference. An empty name means "no variable".
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Variable<'a> {
    pub name: RawStr<'a>,
    pub variable_id: i32,
    pub instance_type: i16,
}

impl<'a> Variable<'a> {
    pub const NULL: Self = Self {
        name: RawStr::EMPTY,
        variable_id: 0,
        instance_type: 0,
    };

    pub fn new(name: &'a str, variable_id: i32, instance_type: i16) -> Self {
        Self {
            name: RawStr::new(name),
            variable_id,
            instance_type,
        }
    }

    pub fn exists(&self) -> bool {
        self.name.exists()
    }
}

impl GmVariable for Variable<'_> {
    fn name(&self) -> Result<&str> {
        Ok(self.name.content()?)
    }

    fn variable_id(&self) -> i32 {
        self.variable_id
    }

    fn instance_type(&self) -> VariableInstanceType {
        VariableInstanceType::from_raw(self.instance_type)
    }
}
