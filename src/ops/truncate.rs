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

use crate::dirent::normalize_name;
use crate::error::{Error, Result};
use crate::image::VmuFs;
use crate::layout::{BLOCK, FAT_EOF, TOTAL_BLOCKS};

impl VmuFs {
    /// `truncate`: shrink or grow the file's block chain to cover
    /// `new_size_bytes`. A partial grow (allocation exhausted mid-chain)
    /// is not an error; it returns however many bytes the file actually
    /// ended up holding.
    pub fn truncate(&mut self, path: &str, new_size_bytes: u64) -> Result<u64> {
        let name = normalize_name(path)?;
        let slot = self.dir.lookup(&name).ok_or(Error::NotFound)?;

        let target_blocks = ((new_size_bytes + BLOCK as u64 - 1) / BLOCK as u64) as u16;
        if target_blocks as usize > TOTAL_BLOCKS {
            return Err(Error::NoSpace);
        }

        let old_size = self.dir.slots[slot].size_in_blocks;
        if target_blocks == old_size {
            self.sync();
            return Ok(target_blocks as u64 * BLOCK as u64);
        }

        if target_blocks < old_size {
            self.shrink(slot, target_blocks)?;
        } else {
            self.grow(slot, target_blocks);
        }

        self.sync();
        Ok(self.dir.slots[slot].size_in_blocks as u64 * BLOCK as u64)
    }

    fn shrink(&mut self, slot: usize, target_blocks: u16) -> Result<()> {
        let start = self.dir.slots[slot].starting_block;

        if target_blocks == 0 {
            self.free_chain(start)?;
            self.dir.slots[slot].starting_block = FAT_EOF;
            self.dir.slots[slot].size_in_blocks = 0;
            return Ok(());
        }

        let mut block = start;
        for _ in 0..target_blocks - 1 {
            if block as usize >= self.user_block_count as usize {
                return Err(Error::Invalid);
            }
            block = self.fat_next(block);
        }
        if block as usize >= self.user_block_count as usize {
            return Err(Error::Invalid);
        }

        let continuation = self.fat_next(block);
        self.fat_mut().mark_eof(block);
        self.free_chain(continuation)?;

        self.dir.slots[slot].size_in_blocks = target_blocks;
        Ok(())
    }

    /// Allocate one block at a time until the chain has `target_blocks`
    /// blocks or allocation is exhausted, whichever comes first.
    fn grow(&mut self, slot: usize, target_blocks: u16) {
        let mut start = self.dir.slots[slot].starting_block;

        let mut tail = if start == FAT_EOF {
            None
        } else {
            let mut block = start;
            loop {
                let next = self.fat_next(block);
                if next == FAT_EOF {
                    break Some(block);
                }
                block = next;
            }
        };

        let mut allocated = self.dir.slots[slot].size_in_blocks;
        while allocated < target_blocks {
            let bound = match tail {
                Some(t) => t.saturating_sub(1),
                None => self.user_block_count.saturating_sub(1),
            };
            let Some(new_block) = self.fat_mut().find_free_below(bound) else {
                break;
            };
            self.fat_mut().mark_eof(new_block);
            match tail {
                Some(t) => self.fat_mut().set_next(t, new_block),
                None => start = new_block,
            }
            tail = Some(new_block);
            allocated += 1;
        }

        self.dir.slots[slot].starting_block = start;
        self.dir.slots[slot].size_in_blocks = allocated;
    }
}

#[cfg(test)]
mod tests {
    use crate::image::test_support::{allocated_block_count, canonical_image};

    #[test]
    fn shrink_to_zero_frees_every_block() {
        let mut fs = canonical_image();
        let before = allocated_block_count(&fs);
        let size = fs.truncate("EVO_DATA.001", 0).unwrap();
        assert_eq!(size, 0);
        assert_eq!(allocated_block_count(&fs), before - 8);
        assert_eq!(fs.stat("EVO_DATA.001").unwrap().size_bytes, 0);
    }

    #[test]
    fn shrink_partial_keeps_the_head() {
        let mut fs = canonical_image();
        let size = fs.truncate("EVO_DATA.001", 3 * 512).unwrap();
        assert_eq!(size, 3 * 512);

        let mut buf = vec![0u8; 512];
        assert!(fs.read("EVO_DATA.001", 2 * 512, &mut buf).is_ok());
        assert!(fs.read("EVO_DATA.001", 3 * 512, &mut buf).is_err());
    }

    #[test]
    fn grow_extends_the_chain() {
        let mut fs = canonical_image();
        let size = fs.truncate("EVO_DATA.001", 10 * 512).unwrap();
        assert_eq!(size, 10 * 512);
        assert_eq!(fs.stat("EVO_DATA.001").unwrap().size_bytes, 10 * 512);
    }

    #[test]
    fn equal_size_truncate_is_a_no_op() {
        let mut fs = canonical_image();
        let before = allocated_block_count(&fs);
        let size = fs.truncate("EVO_DATA.001", 8 * 512).unwrap();
        assert_eq!(size, 8 * 512);
        assert_eq!(allocated_block_count(&fs), before);
    }

    #[test]
    fn truncate_missing_file_is_not_found() {
        let mut fs = canonical_image();
        assert_eq!(
            fs.truncate("NOPE", 0),
            Err(crate::error::Error::NotFound)
        );
    }
}
