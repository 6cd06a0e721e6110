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

use crate::dirent::{normalize_name, DirSlot};
use crate::error::{Error, Result};
use crate::image::VmuFs;

impl VmuFs {
    /// `unlink`: free every block of the file's chain and its directory slot.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let name = normalize_name(path)?;
        let slot = self.dir.lookup(&name).ok_or(Error::NotFound)?;

        let start = self.dir.slots[slot].starting_block;
        self.free_chain(start)?;
        self.dir.slots[slot] = DirSlot::default();

        self.sync();
        Ok(())
    }
}
