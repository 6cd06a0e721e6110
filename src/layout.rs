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

//! Fixed geometry of a VMU filesystem image.
//!
//! None of these are configurable: a VMU image is always exactly
//! [`IMAGE_SIZE`] bytes and the canonical block assignments below hold for
//! every well-formed image this crate parses.

/// Size of a single block, in bytes.
pub const BLOCK: usize = 512;

/// Total number of blocks in a VMU image.
pub const TOTAL_BLOCKS: usize = 256;

/// Size of a full image, in bytes.
pub const IMAGE_SIZE: usize = BLOCK * TOTAL_BLOCKS;

/// Block holding the root block.
pub const ROOT_BLOCK_INDEX: usize = 255;

/// Maximum filename length, in bytes.
pub const MAX_FILENAME: usize = 12;

/// Size of a single directory entry, in bytes.
pub const DIR_ENTRY_SIZE: usize = 32;

/// Number of blocks the directory region occupies.
pub const DIR_BLOCKS: usize = 13;

/// Directory entries packed into one block.
pub const DIR_ENTRIES_PER_BLOCK: usize = BLOCK / DIR_ENTRY_SIZE;

/// Total directory slots across the whole directory region.
pub const TOTAL_DIR_ENTRIES: usize = DIR_BLOCKS * DIR_ENTRIES_PER_BLOCK;

/// Number of blocks available to user data in the canonical layout.
pub const USER_BLOCK_COUNT: usize = 200;

/// FAT cell value meaning "last block of a chain".
pub const FAT_EOF: u16 = 0xFFFA;

/// FAT cell value meaning "unallocated".
pub const FAT_FREE: u16 = 0xFFFC;

/// Directory-entry file type byte for a regular data file.
pub const FILETYPE_DATA: u8 = 0x33;

/// Directory-entry file type byte for a game file.
pub const FILETYPE_GAME: u8 = 0xCC;

/// Copy-protection byte meaning "not copy protected".
pub const COPY_PROTECT_CLEAR: u8 = 0x00;

/// Copy-protection byte meaning "copy protected".
pub const COPY_PROTECT_SET: u8 = 0xFF;
