//! Program loading (spec section 6): raw binary buffers/files and ELF
//! `.text` sections, all reduced to the same `load_bytes` contract on
//! [`crate::memory::Memory`]. ELF parsing follows the teacher's
//! `elf_utils::read_text_instructions` (`elf_utils.rs`), generalised to
//! return bytes rather than pre-split `u32` words so the caller decides
//! how to split compressed vs. full-width instructions.

use elf::endian::AnyEndian;
use elf::ElfBytes;

use crate::error::LoadError;
use crate::memory::Memory;

/// Read a raw (non-ELF) binary image from `path`.
pub fn read_raw_file(path: &str) -> Result<Vec<u8>, LoadError> {
    Ok(std::fs::read(path)?)
}

/// Extract the `.text` section's bytes from an ELF file's contents.
pub fn read_elf_text(file_data: &[u8]) -> Result<Vec<u8>, LoadError> {
    let file = ElfBytes::<AnyEndian>::minimal_parse(file_data).map_err(|e| LoadError::Elf(e.to_string()))?;
    let text_shdr = file
        .section_header_by_name(".text")
        .map_err(|e| LoadError::Elf(e.to_string()))?
        .ok_or(LoadError::MissingText)?;
    let (data, compression) = file.section_data(&text_shdr).map_err(|e| LoadError::Elf(e.to_string()))?;
    if compression.is_some() {
        return Err(LoadError::Elf("compressed .text sections are not supported".to_string()));
    }
    Ok(data.to_vec())
}

/// Detect the ELF magic number (`\x7fELF`) to decide whether a buffer
/// should go through `read_elf_text` or be treated as a raw binary.
pub fn looks_like_elf(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == b"\x7fELF"
}

/// Copy `bytes` into `memory` at `load_address`, zero the four bytes
/// following the program's end as the termination sentinel, and return
/// the address to set the hart's PC to (spec section 3, "Lifecycle").
pub fn emulate_chunk(memory: &mut Memory, bytes: &[u8], load_address: u64) -> Result<u64, LoadError> {
    let offset = usize::try_from(load_address).map_err(|_| LoadError::Elf("load address overflows usize".to_string()))?;
    let end = offset
        .checked_add(bytes.len())
        .and_then(|e| e.checked_add(4))
        .ok_or_else(|| LoadError::TooLarge { size: bytes.len(), offset, memory_size: memory.len() })?;
    if end > memory.len() {
        return Err(LoadError::TooLarge {
            size: bytes.len(),
            offset,
            memory_size: memory.len(),
        });
    }
    memory.load_bytes(offset, bytes).map_err(|_| LoadError::TooLarge {
        size: bytes.len(),
        offset,
        memory_size: memory.len(),
    })?;
    memory
        .write_bytes(offset as u64 + bytes.len() as u64, &[0, 0, 0, 0])
        .map_err(|_| LoadError::TooLarge {
            size: bytes.len(),
            offset,
            memory_size: memory.len(),
        })?;
    Ok(load_address)
}

/// Load a program from `program_path` (ELF or raw binary, auto-detected)
/// into `memory` at `load_address`.
pub fn emulate_file(memory: &mut Memory, program_path: &str, load_address: u64) -> Result<u64, LoadError> {
    let bytes = read_raw_file(program_path)?;
    let text = if looks_like_elf(&bytes) {
        read_elf_text(&bytes)?
    } else {
        bytes
    };
    emulate_chunk(memory, &text, load_address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emulate_chunk_places_program_and_sentinel() {
        let mut memory = Memory::new(64);
        let program = [0x93, 0x02, 0x50, 0x00]; // addi t0, x0, 5
        let pc = emulate_chunk(&mut memory, &program, 0).unwrap();
        assert_eq!(pc, 0);
        assert_eq!(memory.read_bytes(0, 4).unwrap(), &program);
        assert_eq!(memory.fetch32(4).unwrap(), 0);
    }

    #[test]
    fn emulate_chunk_rejects_program_too_large_for_memory() {
        let mut memory = Memory::new(4);
        let program = [0u8; 8];
        assert!(emulate_chunk(&mut memory, &program, 0).is_err());
    }

    #[test]
    fn looks_like_elf_detects_magic() {
        assert!(looks_like_elf(b"\x7fELF\x02\x01\x01\x00"));
        assert!(!looks_like_elf(b"\x93\x02\x50\x00"));
    }
}
