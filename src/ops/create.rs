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
use crate::layout::FAT_EOF;

impl VmuFs {
    /// `mknod`: register an empty file. No FAT blocks are allocated.
    pub fn create(&mut self, path: &str) -> Result<()> {
        let name = normalize_name(path)?;

        if self.dir.lookup(&name).is_some() {
            return Err(Error::AlreadyExists);
        }

        let slot = self.dir.find_free_slot().ok_or(Error::NoSpace)?;
        self.dir.slots[slot] = DirSlot {
            is_free: false,
            filetype: FileType::Data,
            copy_protected: false,
            starting_block: FAT_EOF,
            filename: name,
            timestamp: pack_timestamp(SystemTime::now()),
            size_in_blocks: 0,
            offset_in_blocks: 0,
        };

        self.sync();
        Ok(())
    }
}
