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

use std::time::SystemTime;

use crate::codec::pack_timestamp;
use crate::dirent::{normalize_name, DirSlot, FileType};
use crate::error::{Error, Result};
use crate::image::VmuFs;
use crate::layout::{BLOCK, FAT_EOF, FAT_FREE};

impl VmuFs {
    /// Write `buf` at `offset`, creating the file first if it doesn't exist
    /// (only legal at `offset == 0`), extending its block chain as needed.
    /// Bytes always come from `buf`, never from the image itself.
    pub fn write(&mut self, path: &str, offset: u64, buf: &[u8]) -> Result<usize> {
        let name = normalize_name(path)?;

        let slot = match self.dir.lookup(&name) {
            Some(i) => i,
            None => {
                let i = self.dir.find_free_slot().ok_or(Error::NoSpace)?;
                if offset != 0 {
                    return Err(Error::AlreadyExists);
                }
                self.dir.slots[i] = DirSlot {
                    is_free: false,
                    filetype: FileType::Data,
                    copy_protected: false,
                    starting_block: FAT_EOF,
                    filename: name,
                    timestamp: pack_timestamp(SystemTime::now()),
                    size_in_blocks: 0,
                    offset_in_blocks: 0,
                };
                i
            }
        };

        if buf.is_empty() {
            self.sync();
            return Ok(0);
        }

        // Resolve/extend the chain until it covers every block `buf` touches.
        let end = offset + buf.len() as u64;
        let blocks_needed = ((end + BLOCK as u64 - 1) / BLOCK as u64) as u16;

        let mut cur = self.dir.slots[slot].starting_block;
        if cur == FAT_EOF || cur == FAT_FREE {
            let bound = self.user_block_count.saturating_sub(1);
            let start = self.fat_mut().find_free_below(bound).ok_or(Error::NoSpace)?;
            self.fat_mut().mark_eof(start);
            self.dir.slots[slot].starting_block = start;
            cur = start;
        } else if cur as usize >= self.user_block_count as usize {
            return Err(Error::Invalid);
        }

        let mut blocks = vec![cur];
        while (blocks.len() as u16) < blocks_needed {
            let next = self.fat_next(cur);
            if next == FAT_EOF {
                let bound = cur.saturating_sub(1);
                let new_block = self.fat_mut().find_free_below(bound).ok_or(Error::NoSpace)?;
                self.fat_mut().set_next(cur, new_block);
                self.fat_mut().mark_eof(new_block);
                blocks.push(new_block);
                cur = new_block;
            } else if next as usize >= self.user_block_count as usize {
                // Includes FAT_FREE: a mid-chain cell that isn't EOF and
                // isn't a valid next block is corruption, not room to extend.
                return Err(Error::Invalid);
            } else {
                blocks.push(next);
                cur = next;
            }
        }

        let skip = (offset / BLOCK as u64) as usize;
        let mut block_offset = (offset % BLOCK as u64) as usize;
        let mut remaining = buf;
        let mut written = 0usize;
        for &b in &blocks[skip..] {
            if remaining.is_empty() {
                break;
            }
            let block_start = b as usize * BLOCK;
            let avail = BLOCK - block_offset;
            let n = avail.min(remaining.len());
            self.img_mut()[block_start + block_offset..block_start + block_offset + n]
                .copy_from_slice(&remaining[..n]);
            remaining = &remaining[n..];
            written += n;
            block_offset = 0;
        }

        if blocks_needed > self.dir.slots[slot].size_in_blocks {
            self.dir.slots[slot].size_in_blocks = blocks_needed;
        }

        self.sync();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use crate::dirent::{normalize_name, DirSlot, FileType};
    use crate::image::test_support::{allocated_block_count, canonical_image};
    use crate::layout::{FAT_EOF, FAT_FREE};

    #[test]
    fn fresh_write_lands_at_the_highest_free_block() {
        let mut fs = canonical_image();
        let data = vec![0xAAu8; 18 * 512];
        let n = fs.write("SONIC2__S03", 0, &data).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(fs.readdir().len(), 4);
        assert_eq!(allocated_block_count(&fs), 8 + 10 + 10 + 18);
        assert_eq!(fs.stat("SONIC2__S03").unwrap().size_bytes, 18 * 512);
    }

    #[test]
    fn write_to_new_file_at_nonzero_offset_is_already_exists() {
        let mut fs = canonical_image();
        let data = vec![0u8; 4];
        assert_eq!(
            fs.write("NOPE", 4, &data),
            Err(crate::error::Error::AlreadyExists)
        );
    }

    #[test]
    fn equal_size_overwrite_keeps_allocation_stable() {
        let mut fs = canonical_image();
        let before = allocated_block_count(&fs);
        let data = vec![0x42u8; 8 * 512];
        fs.write("EVO_DATA.001", 0, &data).unwrap();
        assert_eq!(allocated_block_count(&fs), before);

        let mut buf = vec![0u8; 8 * 512];
        fs.read("EVO_DATA.001", 0, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn write_reads_from_caller_buffer_not_the_image() {
        // A regression check for the original driver's write-path bug,
        // which sourced bytes from the image rather than the caller.
        let mut fs = canonical_image();
        let data = vec![0x7Eu8; 512];
        fs.write("EVO_DATA.001", 0, &data).unwrap();
        let mut buf = vec![0u8; 512];
        fs.read("EVO_DATA.001", 0, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn out_of_space_write_fails_cleanly() {
        let mut fs = canonical_image();
        // Only `USER_BLOCK_COUNT - 28` blocks remain free; ask for more.
        let remaining_free = 200 - 28;
        let data = vec![0u8; (remaining_free + 1) * 512];
        assert_eq!(
            fs.write("TOO_BIG_FILE", 0, &data),
            Err(crate::error::Error::NoSpace)
        );
    }

    #[test]
    fn write_of_zero_bytes_to_new_file_creates_a_true_empty_file() {
        // A brand-new zero-byte write must not leave a stray allocated
        // block behind: size_in_blocks == 0 iff starting_block == FAT_EOF.
        let mut fs = canonical_image();
        let before = allocated_block_count(&fs);
        let n = fs.write("EMPTYFILE", 0, &[]).unwrap();
        assert_eq!(n, 0);
        assert_eq!(fs.stat("EMPTYFILE").unwrap().size_bytes, 0);
        assert_eq!(allocated_block_count(&fs), before);
    }

    #[test]
    fn no_space_in_directory_takes_priority_over_nonzero_offset_on_new_file() {
        // Per the matched/first_free/NoSpace ordering of spec.md §4.4: with
        // no free directory slot, the NoSpace rejection must win over the
        // offset-on-a-new-file AlreadyExists rejection.
        let mut fs = canonical_image();
        for i in 0..fs.dir.slots.len() {
            if fs.dir.slots[i].is_free {
                fs.dir.slots[i] = DirSlot {
                    is_free: false,
                    filetype: FileType::Data,
                    copy_protected: false,
                    starting_block: FAT_EOF,
                    filename: normalize_name(&format!("F{i:03}")).unwrap(),
                    timestamp: [0; 8],
                    size_in_blocks: 0,
                    offset_in_blocks: 0,
                };
            }
        }

        let data = vec![0u8; 4];
        assert_eq!(
            fs.write("NOPE", 4, &data),
            Err(crate::error::Error::NoSpace)
        );
    }

    #[test]
    fn write_extend_through_corrupted_mid_chain_cell_is_invalid() {
        // Block 195 sits mid-chain in EVO_DATA.001 (199..=192); poke its FAT
        // cell to FAT_FREE to simulate corruption instead of the real next
        // pointer. Extending the file must fail, not silently splice a new
        // block in over the break.
        let mut fs = canonical_image();
        fs.fat_mut().set_next(195, FAT_FREE);
        let data = vec![0u8; 18 * 512];
        assert_eq!(
            fs.write("EVO_DATA.001", 0, &data),
            Err(crate::error::Error::Invalid)
        );
    }
}
