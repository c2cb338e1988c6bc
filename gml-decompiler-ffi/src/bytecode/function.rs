use anyhow::Result;
use gml_decompiler::GmFunction;

use crate::primitives::RawStr;

/// A function reference. An empty name means "no function".
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Function<'a> {
    pub name: RawStr<'a>,
}

impl<'a> Function<'a> {
    pub const NULL: Self = Self { name: RawStr::EMPTY };

    pub fn new(name: &'a str) -> Self {
        Self { name: RawStr::new(name) }
    }

    pub fn exists(&self) -> bool {
        self.name.exists()
    }
}

impl GmFunction for Function<'_> {
    fn name(&self) -> Result<&str> {
        Ok(self.name.content()?)
    }
}
