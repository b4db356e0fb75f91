//! Low-level SPIR-V module writer: id allocation, deduplicated type and
//! constant declarations, section accumulation, serialization.

use crate::instruction::Instruction;
use crate::op;
use rustc_hash::FxHashMap;
use silica_types::{ScalarKind, Type};

/// The mandatory module sections, in serialization order.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(usize)]
pub enum Section {
    Capability = 0,
    Extension = 1,
    ExtInstImport = 2,
    MemoryModel = 3,
    EntryPoint = 4,
    ExecutionMode = 5,
    Debug = 6,
    Annotation = 7,
    /// Types, constants and global variables.
    Declaration = 8,
    Function = 9,
}

const SECTION_COUNT: usize = 10;

/// Accumulates a module and serializes it as a little-endian word stream.
///
/// Result ids are allocated by [`Writer::next_id`] (monotonic, starting at
/// 1); the id-bound recorded in the header is one past the highest issued
/// id. Type, constant and pointer declarations are deduplicated, so
/// requesting the same type twice returns the same id without re-emitting.
pub struct Writer {
    next_id: u32,
    sections: [Vec<Instruction>; SECTION_COUNT],
    type_ids: FxHashMap<Type, u32>,
    const_ids: FxHashMap<(Type, u64), u32>,
    pointer_ids: FxHashMap<(u32, Type), u32>,
    function_type_ids: FxHashMap<(Type, Vec<Type>), u32>,
    uses_float64: bool,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            next_id: 1,
            sections: Default::default(),
            type_ids: FxHashMap::default(),
            const_ids: FxHashMap::default(),
            pointer_ids: FxHashMap::default(),
            function_type_ids: FxHashMap::default(),
            uses_float64: false,
        }
    }

    /// Allocate a fresh result id.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The header id-bound: one past the highest id issued.
    pub fn id_bound(&self) -> u32 {
        self.next_id
    }

    /// Whether a 64-bit float type was declared (needs `Float64`).
    pub fn uses_float64(&self) -> bool {
        self.uses_float64
    }

    pub fn add(&mut self, section: Section, instruction: Instruction) {
        self.sections[section as usize].push(instruction);
    }

    /// Instructions accumulated so far in `section`.
    pub fn section(&self, section: Section) -> &[Instruction] {
        &self.sections[section as usize]
    }

    /// Id of `ty`'s declaration, emitting it on first request.
    ///
    /// Component types are resolved first, so a composite's declaration
    /// always follows its component's in the Declaration section.
    pub fn type_id(&mut self, ty: Type) -> u32 {
        if let Some(&id) = self.type_ids.get(&ty) {
            return id;
        }

        let (op, tail): (u16, Vec<u32>) = match ty {
            Type::Scalar(ScalarKind::Void) => (op::OP_TYPE_VOID, vec![]),
            Type::Scalar(ScalarKind::Float) => (op::OP_TYPE_FLOAT, vec![32]),
            Type::Scalar(ScalarKind::Double) => {
                self.uses_float64 = true;
                (op::OP_TYPE_FLOAT, vec![64])
            }
            Type::Scalar(ScalarKind::Int) => (op::OP_TYPE_INT, vec![32, 1]),
            Type::Scalar(ScalarKind::Uint) => (op::OP_TYPE_INT, vec![32, 0]),
            Type::Scalar(ScalarKind::Bool) => (op::OP_TYPE_BOOL, vec![]),
            Type::Vector { scalar, len } => {
                let component = self.type_id(Type::scalar(scalar));
                (op::OP_TYPE_VECTOR, vec![component, u32::from(len)])
            }
            Type::Matrix { scalar, cols, rows } => {
                let column = self.type_id(Type::vector(scalar, rows));
                (op::OP_TYPE_MATRIX, vec![column, u32::from(cols)])
            }
        };

        let id = self.next_id();
        let mut operands = vec![id];
        operands.extend(tail);
        self.add(Section::Declaration, Instruction::new(op, operands));
        self.type_ids.insert(ty, id);
        id
    }

    /// Id of the scalar constant `(ty, bits)`, emitting it on first request.
    ///
    /// `bits` is the canonical encoding for the scalar kind: `f32` bits for
    /// float, `f64` bits for double, the 32-bit value for int/uint, 0/1 for
    /// bool.
    pub fn constant_id(&mut self, ty: Type, bits: u64) -> u32 {
        debug_assert!(ty.is_scalar(), "composite constants use constant_composite_id");
        if let Some(&id) = self.const_ids.get(&(ty, bits)) {
            return id;
        }

        let type_id = self.type_id(ty);
        let id = self.next_id();
        let instruction = match ty.scalar_kind() {
            ScalarKind::Bool => {
                let op = if bits != 0 { op::OP_CONSTANT_TRUE } else { op::OP_CONSTANT_FALSE };
                Instruction::new(op, [type_id, id])
            }
            ScalarKind::Double => {
                let low = (bits & 0xFFFF_FFFF) as u32;
                let high = (bits >> 32) as u32;
                Instruction::new(op::OP_CONSTANT, [type_id, id, low, high])
            }
            _ => Instruction::new(op::OP_CONSTANT, [type_id, id, bits as u32]),
        };
        self.add(Section::Declaration, instruction);
        self.const_ids.insert((ty, bits), id);
        id
    }

    /// Id of the pointer type `storage_class → ty`.
    pub fn pointer_id(&mut self, storage_class: u32, ty: Type) -> u32 {
        if let Some(&id) = self.pointer_ids.get(&(storage_class, ty)) {
            return id;
        }
        let pointee = self.type_id(ty);
        let id = self.next_id();
        self.add(
            Section::Declaration,
            Instruction::new(op::OP_TYPE_POINTER, [id, storage_class, pointee]),
        );
        self.pointer_ids.insert((storage_class, ty), id);
        id
    }

    /// Id of the function type `(params) -> ret`.
    pub fn function_type_id(&mut self, ret: Type, params: &[Type]) -> u32 {
        let key = (ret, params.to_vec());
        if let Some(&id) = self.function_type_ids.get(&key) {
            return id;
        }
        let ret_id = self.type_id(ret);
        let param_ids: Vec<u32> = params.iter().map(|&p| self.type_id(p)).collect();
        let id = self.next_id();
        let mut operands = vec![id, ret_id];
        operands.extend(param_ids);
        self.add(Section::Declaration, Instruction::new(op::OP_TYPE_FUNCTION, operands));
        self.function_type_ids.insert(key, id);
        id
    }

    /// Serialize the module: 5-word header, then every section in the
    /// mandatory order.
    pub fn serialize(&self) -> Vec<u32> {
        let body_words: u32 = self
            .sections
            .iter()
            .flat_map(|s| s.iter())
            .map(Instruction::word_count)
            .sum();
        let mut words = Vec::with_capacity(5 + body_words as usize);

        words.push(op::MAGIC);
        words.push(op::VERSION_1_0);
        words.push(op::GENERATOR);
        words.push(self.id_bound());
        words.push(0); // schema

        for section in &self.sections {
            for instruction in section {
                instruction.encode(&mut words);
            }
        }
        words
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_monotonic_from_one() {
        let mut writer = Writer::new();
        assert_eq!(writer.next_id(), 1);
        assert_eq!(writer.next_id(), 2);
        assert_eq!(writer.id_bound(), 3);
    }

    #[test]
    fn type_declarations_are_deduplicated() {
        let mut writer = Writer::new();
        let first = writer.type_id(Type::FLOAT);
        let second = writer.type_id(Type::FLOAT);
        assert_eq!(first, second);
        assert_eq!(writer.section(Section::Declaration).len(), 1);
    }

    #[test]
    fn every_builtin_type_is_stable_across_requests() {
        let mut writer = Writer::new();
        for &ty in &silica_types::BUILTINS {
            assert_eq!(writer.type_id(ty), writer.type_id(ty), "{}", ty.glsl_name());
        }
    }

    #[test]
    fn component_type_is_declared_before_composite() {
        let mut writer = Writer::new();
        let vec3 = writer.type_id(Type::vector(ScalarKind::Float, 3));
        let float = writer.type_id(Type::FLOAT);
        // The scalar was emitted first and has the smaller id.
        assert!(float < vec3);
        let section = writer.section(Section::Declaration);
        assert_eq!(section[0].op, op::OP_TYPE_FLOAT);
        assert_eq!(section[1].op, op::OP_TYPE_VECTOR);
        assert_eq!(section[1].operands[1], float);
    }

    #[test]
    fn matrix_declares_column_vector_first() {
        let mut writer = Writer::new();
        writer.type_id(Type::matrix(ScalarKind::Float, 3, 4));
        let section = writer.section(Section::Declaration);
        let ops: Vec<u16> = section.iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![op::OP_TYPE_FLOAT, op::OP_TYPE_VECTOR, op::OP_TYPE_MATRIX]);
        // 3 columns of vec4.
        assert_eq!(section[1].operands[2], 4);
        assert_eq!(section[2].operands[2], 3);
    }

    #[test]
    fn constants_are_deduplicated_per_type_and_value() {
        let mut writer = Writer::new();
        let one = writer.constant_id(Type::INT, 1);
        let one_again = writer.constant_id(Type::INT, 1);
        let two = writer.constant_id(Type::INT, 2);
        let one_uint = writer.constant_id(Type::UINT, 1);
        assert_eq!(one, one_again);
        assert_ne!(one, two);
        assert_ne!(one, one_uint);
    }

    #[test]
    fn double_constants_use_two_words() {
        let mut writer = Writer::new();
        writer.constant_id(Type::DOUBLE, 1.5f64.to_bits());
        let section = writer.section(Section::Declaration);
        let constant = section.last().expect("constant emitted");
        assert_eq!(constant.op, op::OP_CONSTANT);
        assert_eq!(constant.operands.len(), 4); // type, id, low, high
        let bits = u64::from(constant.operands[2]) | (u64::from(constant.operands[3]) << 32);
        assert_eq!(f64::from_bits(bits), 1.5);
    }

    #[test]
    fn double_marks_float64_capability_need() {
        let mut writer = Writer::new();
        assert!(!writer.uses_float64());
        writer.type_id(Type::DOUBLE);
        assert!(writer.uses_float64());
    }

    #[test]
    fn serialize_header_layout() {
        let mut writer = Writer::new();
        let void = writer.type_id(Type::VOID);
        let words = writer.serialize();
        assert_eq!(words[0], 0x0723_0203);
        assert_eq!(words[1], op::VERSION_1_0);
        assert_eq!(words[3], void + 1); // id-bound = highest id + 1
        assert_eq!(words[4], 0);
        // OpTypeVoid follows the header.
        assert_eq!(words[5], (2 << 16) | u32::from(op::OP_TYPE_VOID));
        assert_eq!(words[6], void);
    }

    #[test]
    fn sections_serialize_in_mandatory_order() {
        let mut writer = Writer::new();
        // Add out of order; serialization must still be capability-first.
        writer.type_id(Type::VOID);
        writer.add(
            Section::MemoryModel,
            Instruction::new(op::OP_MEMORY_MODEL, [op::ADDRESSING_LOGICAL, op::MEMORY_MODEL_GLSL450]),
        );
        writer.add(
            Section::Capability,
            Instruction::new(op::OP_CAPABILITY, [op::CAPABILITY_SHADER]),
        );
        let words = writer.serialize();
        let opcodes: Vec<u16> = decode_opcodes(&words[5..]);
        assert_eq!(
            opcodes,
            vec![op::OP_CAPABILITY, op::OP_MEMORY_MODEL, op::OP_TYPE_VOID]
        );
    }

    fn decode_opcodes(mut words: &[u32]) -> Vec<u16> {
        let mut ops = Vec::new();
        while let Some(&first) = words.first() {
            let count = (first >> 16) as usize;
            assert!(count >= 1, "zero-length instruction");
            ops.push((first & 0xFFFF) as u16);
            words = &words[count..];
        }
        ops
    }
}
