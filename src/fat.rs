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

//! The FAT: one 16-bit next-block pointer per block of the whole image.

use log::debug;

use crate::codec::{read_u16_le, write_u16_le};
use crate::layout::{FAT_EOF, FAT_FREE};

/// A view over the FAT region of an image, addressed by block number.
pub struct Fat<'a> {
    img: &'a mut [u8],
    fat_base: usize,
}

impl<'a> Fat<'a> {
    pub fn new(img: &'a mut [u8], fat_base: usize) -> Self {
        Fat { img, fat_base }
    }

    /// Read the FAT cell for block `b`.
    pub fn next(&self, b: u16) -> u16 {
        read_u16_le(self.img, self.fat_base + 2 * b as usize)
    }

    /// Write the FAT cell for block `b`.
    pub fn set_next(&mut self, b: u16, v: u16) {
        write_u16_le(self.img, self.fat_base + 2 * b as usize, v);
    }

    pub fn mark_eof(&mut self, b: u16) {
        self.set_next(b, FAT_EOF);
    }

    pub fn mark_free(&mut self, b: u16) {
        self.set_next(b, FAT_FREE);
    }

    /// Scan `start, start-1, ..., 0` for the first free block.
    ///
    /// This descending scan is load-bearing: it packs new allocations at the
    /// top of the user region, closest to the directory, so new files land
    /// on the highest free block.
    pub fn find_free_below(&self, start: u16) -> Option<u16> {
        for b in (0..=start).rev() {
            if self.next(b) == FAT_FREE {
                return Some(b);
            }
            if b == 0 {
                break;
            }
        }
        debug!("no free block at or below {start}");
        None
    }
}
