//! SPIR-V binary module writer for the silica shading language.
//!
//! [`Writer`] owns the low-level invariants: monotonic result-id
//! allocation, deduplicated type/constant/pointer declarations, and the
//! mandatory section order with the 5-word header (magic, version,
//! generator, id-bound, schema). [`emit_module`] walks a checked AST and
//! assembles the whole module: global variables with their decorations,
//! structured control flow with single-terminator basic blocks, and the
//! fragment entry point.

mod function;
mod instruction;
mod module;
pub mod op;
mod writer;

#[cfg(test)]
mod tests;

pub use instruction::{string_words, Instruction};
pub use module::emit_module;
pub use writer::{Section, Writer};

/// View a serialized module as little-endian bytes.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}
