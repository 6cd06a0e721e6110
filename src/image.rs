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

//! The top-level filesystem handle: owns the image buffer and the
//! directory mirror, and is the entry point for every file operation.

use log::error;

use crate::codec::unpack_timestamp;
use crate::dirent::DirTable;
use crate::error::{Error, Result};
use crate::fat::Fat;
use crate::layout::{BLOCK, IMAGE_SIZE};
use crate::rootblock::RootBlock;

/// A parsed, mutable VMU filesystem image.
///
/// Every field the root block carries that the core doesn't otherwise act
/// on (FAT/directory geometry, VMS icon color, the volume timestamp) is
/// cached here at parse time and rewritten verbatim on [`VmuFs::sync`].
pub struct VmuFs {
    img: Vec<u8>,
    pub(crate) dir: DirTable,

    pub(crate) fat_location: u16,
    pub(crate) directory_location: u16,
    pub(crate) user_block_count: u16,

    fat_size: u16,
    directory_size: u16,
    icon_shape: u16,
    custom_vms_color: u8,
    vms_blue: u8,
    vms_red: u8,
    vms_green: u8,
    vms_alpha: u8,
    root_timestamp: [u8; 8],
}

/// The metadata the mount collaborator's `getattr` callback needs (§6.2).
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub size_bytes: u64,
    /// Unix timestamp; 0 if the on-image timestamp predates 1970 or was
    /// never set.
    pub created_unix: u64,
}

impl VmuFs {
    /// Parse `img` (which must be exactly [`IMAGE_SIZE`] bytes) into a
    /// filesystem handle.
    pub fn from_image(img: Vec<u8>) -> Result<Self> {
        if img.len() != IMAGE_SIZE {
            error!(
                "image is {} bytes, expected {IMAGE_SIZE}",
                img.len()
            );
            return Err(Error::BadImage);
        }

        let root = RootBlock::read_from_image(&img);
        let directory_location = root.directory_location.get();
        let dir = DirTable::deserialize(&img, directory_location as usize);

        Ok(VmuFs {
            img,
            dir,
            fat_location: root.fat_location.get(),
            directory_location,
            user_block_count: root.user_block_count.get(),
            fat_size: root.fat_size.get(),
            directory_size: root.directory_size.get(),
            icon_shape: root.icon_shape.get(),
            custom_vms_color: root.custom_vms_color,
            vms_blue: root.vms_blue,
            vms_red: root.vms_red,
            vms_green: root.vms_green,
            vms_alpha: root.vms_alpha,
            root_timestamp: root.timestamp,
        })
    }

    /// Write the directory table and root block back into the image buffer.
    /// The FAT and user-data regions are already current: every operation
    /// mutates them in place.
    pub fn sync(&mut self) {
        self.dir.serialize(&mut self.img, self.directory_location as usize);

        let mut root = RootBlock::read_from_image(&self.img);
        root.fat_location = self.fat_location.into();
        root.fat_size = self.fat_size.into();
        root.directory_location = self.directory_location.into();
        root.directory_size = self.directory_size.into();
        root.icon_shape = self.icon_shape.into();
        root.user_block_count = self.user_block_count.into();
        root.custom_vms_color = self.custom_vms_color;
        root.vms_blue = self.vms_blue;
        root.vms_red = self.vms_red;
        root.vms_green = self.vms_green;
        root.vms_alpha = self.vms_alpha;
        root.timestamp = self.root_timestamp;
        root.write_to_image(&mut self.img);
    }

    /// Flush the directory/root regions and hand back the raw image bytes,
    /// ready for the collaborator to persist.
    pub fn into_image(mut self) -> Vec<u8> {
        self.sync();
        self.img
    }

    pub fn image(&self) -> &[u8] {
        &self.img
    }

    pub(crate) fn img_mut(&mut self) -> &mut [u8] {
        &mut self.img
    }

    pub(crate) fn fat_base(&self) -> usize {
        self.fat_location as usize * BLOCK
    }

    pub(crate) fn fat_mut(&mut self) -> Fat<'_> {
        let base = self.fat_base();
        Fat::new(&mut self.img, base)
    }

    /// Read-only FAT cell lookup, for walking a chain without holding a
    /// mutable borrow.
    pub(crate) fn fat_next(&self, b: u16) -> u16 {
        crate::codec::read_u16_le(&self.img, self.fat_base() + 2 * b as usize)
    }

    /// Free every block of a chain starting at `start` (a no-op if `start`
    /// is already the empty-file sentinel). `Error::Invalid` if a visited
    /// block index is out of range, which also catches a corrupt
    /// `next` pointer landing outside `[0, user_block_count)`.
    pub(crate) fn free_chain(&mut self, start: u16) -> Result<()> {
        let mut block = start;
        while block != crate::layout::FAT_EOF {
            if block as usize >= self.user_block_count as usize {
                return Err(Error::Invalid);
            }
            let next = self.fat_next(block);
            self.fat_mut().mark_free(block);
            block = next;
        }
        Ok(())
    }

    /// `getattr`: size in bytes and the creation time (§6.2).
    pub fn stat(&self, path: &str) -> Result<Stat> {
        let name = crate::dirent::normalize_name(path)?;
        let slot = self.dir.lookup(&name).ok_or(Error::NotFound)?;
        let entry = &self.dir.slots[slot];
        Ok(Stat {
            size_bytes: entry.size_in_blocks as u64 * BLOCK as u64,
            created_unix: unpack_timestamp(&entry.timestamp),
        })
    }

    /// `readdir`: filenames of every non-free entry, in the same high-to-low
    /// order `lookup` uses (§10.6).
    pub fn readdir(&self) -> Vec<String> {
        self.dir
            .iter_files()
            .map(|(_, slot)| {
                let end = slot
                    .filename
                    .iter()
                    .position(|&b| b == 0)
                    .unwrap_or(slot.filename.len());
                String::from_utf8_lossy(&slot.filename[..end]).into_owned()
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::codec::write_u16_le;
    use crate::dirent::{normalize_name, DirSlot, FileType};
    use crate::layout::{
        DIR_BLOCKS, FAT_EOF, FAT_FREE, ROOT_BLOCK_INDEX, TOTAL_DIR_ENTRIES, USER_BLOCK_COUNT,
    };

    pub const FAT_LOCATION: u16 = 254;
    pub const DIRECTORY_LOCATION: u16 = 253; // last (lowest) of 13 directory blocks

    /// A fresh image: `USER_BLOCK_COUNT` free blocks, canonical geometry,
    /// no files.
    pub fn blank_image() -> Vec<u8> {
        let mut img = vec![0u8; IMAGE_SIZE];

        let fat_base = FAT_LOCATION as usize * BLOCK;
        for b in 0..USER_BLOCK_COUNT as u16 {
            write_u16_le(&mut img, fat_base + 2 * b as usize, FAT_FREE);
        }

        let root_off = ROOT_BLOCK_INDEX * BLOCK;
        write_u16_le(&mut img, root_off + 0x46, FAT_LOCATION);
        write_u16_le(&mut img, root_off + 0x48, 1);
        write_u16_le(&mut img, root_off + 0x4A, DIRECTORY_LOCATION);
        write_u16_le(&mut img, root_off + 0x4C, DIR_BLOCKS as u16);
        write_u16_le(&mut img, root_off + 0x50, USER_BLOCK_COUNT as u16);

        img
    }

    /// The canonical scenario from spec.md §8: a blank image with
    /// `EVO_DATA.001` (8 blocks), and two `SONICADV_INT` entries (10 blocks
    /// each), each file's blocks packed from the top of the user region
    /// down, with no gaps.
    pub fn canonical_image() -> VmuFs {
        let mut fs = VmuFs::from_image(blank_image()).unwrap();

        let files: [(&str, u16); 3] =
            [("EVO_DATA.001", 8), ("SONICADV_INT", 10), ("SONICADV_INT", 10)];

        let mut next_block = USER_BLOCK_COUNT as u16 - 1;
        for (name, blocks) in files {
            let slot = fs.dir.find_free_slot().unwrap();
            let start = next_block;
            {
                let mut fat = fs.fat_mut();
                for i in 0..blocks {
                    let b = start - i;
                    if i + 1 == blocks {
                        fat.mark_eof(b);
                    } else {
                        fat.set_next(b, start - i - 1);
                    }
                }
            }
            fs.dir.slots[slot] = DirSlot {
                is_free: false,
                filetype: FileType::Data,
                copy_protected: false,
                starting_block: start,
                filename: normalize_name(name).unwrap(),
                timestamp: [0; 8],
                size_in_blocks: blocks,
                offset_in_blocks: 0,
            };
            next_block -= blocks;
        }

        fs.sync();
        fs
    }

    #[test]
    fn canonical_image_has_three_files_and_46_allocated_blocks() {
        let fs = canonical_image();
        assert_eq!(fs.readdir().len(), 3);
        assert_eq!(allocated_block_count(&fs), 8 + 10 + 10);
    }

    pub fn allocated_block_count(fs: &VmuFs) -> usize {
        let fat_base = fs.fat_location as usize * BLOCK;
        (0..USER_BLOCK_COUNT as u16)
            .filter(|&b| {
                crate::codec::read_u16_le(fs.image(), fat_base + 2 * b as usize) != FAT_FREE
            })
            .count()
    }

    #[allow(dead_code)]
    pub fn total_dir_entries_is_208() {
        let _: [u8; TOTAL_DIR_ENTRIES] = [0; 208];
    }

    const _: () = assert!(FAT_EOF != FAT_FREE);
}
