// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The 208-slot directory: its on-disk layout, the in-memory mirror, and
//! name lookup.

use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{Error, Result};
use crate::layout::{
    BLOCK, COPY_PROTECT_CLEAR, COPY_PROTECT_SET, DIR_ENTRY_SIZE, FILETYPE_DATA, FILETYPE_GAME,
    MAX_FILENAME, TOTAL_DIR_ENTRIES,
};

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct DirEntryRaw {
    filetype: u8,
    copy_protected: u8,
    starting_block: U16,
    filename: [u8; MAX_FILENAME],
    timestamp: [u8; 8],
    size_in_blocks: U16,
    offset_in_blocks: U16,
    _reserved: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<DirEntryRaw>() == DIR_ENTRY_SIZE);

/// Whether a non-free directory entry names a VMU data file or a game file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Data,
    Game,
}

/// A parsed directory slot. `is_free` entries carry no other meaning in
/// their remaining fields.
#[derive(Debug, Clone, Copy)]
pub struct DirSlot {
    pub is_free: bool,
    pub filetype: FileType,
    pub copy_protected: bool,
    pub starting_block: u16,
    pub filename: [u8; MAX_FILENAME],
    pub timestamp: [u8; 8],
    pub size_in_blocks: u16,
    pub offset_in_blocks: u16,
}

impl Default for DirSlot {
    fn default() -> Self {
        DirSlot {
            is_free: true,
            filetype: FileType::Data,
            copy_protected: false,
            starting_block: 0,
            filename: [0; MAX_FILENAME],
            timestamp: [0; 8],
            size_in_blocks: 0,
            offset_in_blocks: 0,
        }
    }
}

/// Strip exactly one leading `/` and check the remaining length, returning
/// the name zero-padded to [`MAX_FILENAME`] bytes.
pub fn normalize_name(path: &str) -> Result<[u8; MAX_FILENAME]> {
    let stripped = path.strip_prefix('/').unwrap_or(path);
    let bytes = stripped.as_bytes();
    if bytes.len() > MAX_FILENAME {
        return Err(Error::NameTooLong);
    }
    let mut name = [0u8; MAX_FILENAME];
    name[..bytes.len()].copy_from_slice(bytes);
    Ok(name)
}

/// The in-memory mirror of the 208 directory slots, indexed exactly as they
/// sit on disk (slot `i` is the `i`-th one counting backward from the top of
/// the directory region).
#[derive(Debug, Clone)]
pub struct DirTable {
    pub slots: [DirSlot; TOTAL_DIR_ENTRIES],
}

/// Byte offset of directory slot `i` within the image, given the root
/// block's `directory_location` (the last, lowest-address directory block).
pub fn slot_offset(directory_location: usize, slot: usize) -> usize {
    (directory_location + 1) * BLOCK - DIR_ENTRY_SIZE * (slot + 1)
}

impl DirTable {
    /// Parse all 208 directory slots out of `img`.
    pub fn deserialize(img: &[u8], directory_location: usize) -> Self {
        let mut slots = [DirSlot::default(); TOTAL_DIR_ENTRIES];
        for (i, slot) in slots.iter_mut().enumerate() {
            let off = slot_offset(directory_location, i);
            let mut raw = DirEntryRaw::new_zeroed();
            raw.as_mut_bytes()
                .copy_from_slice(&img[off..off + DIR_ENTRY_SIZE]);

            let filetype = match raw.filetype {
                FILETYPE_DATA => FileType::Data,
                FILETYPE_GAME => FileType::Game,
                _ => continue, // slot stays free (the Default value)
            };
            let copy_protected = match raw.copy_protected {
                COPY_PROTECT_CLEAR => false,
                COPY_PROTECT_SET => true,
                _ => continue, // slot stays free
            };

            *slot = DirSlot {
                is_free: false,
                filetype,
                copy_protected,
                starting_block: raw.starting_block.get(),
                filename: raw.filename,
                timestamp: raw.timestamp,
                size_in_blocks: raw.size_in_blocks.get(),
                offset_in_blocks: raw.offset_in_blocks.get(),
            };
        }
        DirTable { slots }
    }

    /// Re-emit all 208 directory slots into `img`.
    pub fn serialize(&self, img: &mut [u8], directory_location: usize) {
        for (i, slot) in self.slots.iter().enumerate() {
            let off = slot_offset(directory_location, i);
            let raw = if slot.is_free {
                DirEntryRaw::new_zeroed()
            } else {
                let (filetype, copy_protected) = match slot.filetype {
                    FileType::Data => (FILETYPE_DATA, slot.copy_protected),
                    FileType::Game => (FILETYPE_GAME, slot.copy_protected),
                };
                DirEntryRaw {
                    filetype,
                    copy_protected: if copy_protected {
                        COPY_PROTECT_SET
                    } else {
                        COPY_PROTECT_CLEAR
                    },
                    starting_block: slot.starting_block.into(),
                    filename: slot.filename,
                    timestamp: slot.timestamp,
                    size_in_blocks: slot.size_in_blocks.into(),
                    offset_in_blocks: slot.offset_in_blocks.into(),
                    _reserved: [0; 4],
                }
            };
            img[off..off + DIR_ENTRY_SIZE].copy_from_slice(raw.as_bytes());
        }
    }

    /// Find the highest-indexed non-free slot with this filename.
    /// High-to-low scan matches the on-image backward directory layout.
    pub fn lookup(&self, name: &[u8; MAX_FILENAME]) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| !s.is_free && &s.filename == name)
            .map(|(i, _)| i)
    }

    /// Find the highest-indexed free slot.
    pub fn find_free_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.is_free)
            .map(|(i, _)| i)
    }

    /// Non-free slots in the same high-to-low order `lookup`/`readdir` use.
    pub fn iter_files(&self) -> impl Iterator<Item = (usize, &DirSlot)> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, s)| !s.is_free)
    }
}
