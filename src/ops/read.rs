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
use crate::layout::BLOCK;

impl VmuFs {
    /// Read `buf.len()` bytes starting at `offset` into `buf`.
    pub fn read(&self, path: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let name = normalize_name(path)?;
        let slot = self.dir.lookup(&name).ok_or(Error::NotFound)?;
        let entry = &self.dir.slots[slot];

        let file_len = entry.size_in_blocks as u64 * BLOCK as u64;
        let size = buf.len() as u64;
        if offset + size > file_len {
            return Err(Error::Invalid);
        }
        if size == 0 {
            return Ok(0);
        }

        let mut block = entry.starting_block;
        for _ in 0..offset / BLOCK as u64 {
            if block as usize >= self.user_block_count as usize {
                return Err(Error::Invalid);
            }
            block = self.fat_next(block);
        }

        let mut written = 0usize;
        let mut block_offset = (offset % BLOCK as u64) as usize;
        let mut remaining = buf;
        while !remaining.is_empty() {
            if block as usize >= self.user_block_count as usize {
                return Err(Error::Invalid);
            }
            let block_start = block as usize * BLOCK;
            let avail = BLOCK - block_offset;
            let n = avail.min(remaining.len());
            remaining[..n]
                .copy_from_slice(&self.image()[block_start + block_offset..block_start + block_offset + n]);
            remaining = &mut remaining[n..];
            written += n;
            block_offset = 0;

            if !remaining.is_empty() {
                block = self.fat_next(block);
            }
        }

        Ok(written)
    }
}
