//! The compiled-program façade.

use crate::{pretty, CompileError};
use silica_ir::{Ast, Module, SharedInterner};
use silica_pp::{Defines, Preprocessor};
use silica_typeck::TypeInfo;
use std::cell::OnceCell;

/// A successfully parsed and checked compilation unit.
///
/// Owns its AST and type tables; the SPIR-V output is computed lazily on
/// the first request and cached, so repeated consumers share one immutable
/// buffer.
#[derive(Debug)]
pub struct Program {
    interner: SharedInterner,
    ast: Ast,
    module: Module,
    info: TypeInfo,
    spirv: OnceCell<Vec<u32>>,
}

impl Program {
    /// Run the front half of the pipeline: lex, preprocess, parse, check.
    ///
    /// `defines` is only read; the same instance may serve concurrent
    /// compilations of independent units.
    pub fn parse(source: &str, defines: &Defines) -> Result<Program, CompileError> {
        let interner = SharedInterner::new();
        let tokens = silica_lexer::lex(source, &interner)?;
        let stream = Preprocessor::new(tokens, defines, interner.clone())?;
        let (ast, module) = silica_parse::Parser::new(stream).parse()?;
        let info = silica_typeck::check(&ast, &module, &interner)?;
        Ok(Program { interner, ast, module, info, spirv: OnceCell::new() })
    }

    /// The SPIR-V module as a word stream, starting with the magic number.
    pub fn to_spirv(&self) -> &[u32] {
        self.spirv
            .get_or_init(|| {
                silica_spirv::emit_module(&self.ast, &self.module, &self.info, &self.interner)
            })
            .as_slice()
    }

    /// The SPIR-V module as little-endian bytes, ready for a driver.
    pub fn spirv_bytes(&self) -> Vec<u8> {
        silica_spirv::words_to_bytes(self.to_spirv())
    }

    /// Pretty-print the parsed program (stable formatting, for golden
    /// comparisons).
    pub fn print(&self) -> String {
        pretty::print(&self.ast, &self.module, &self.interner)
    }
}
