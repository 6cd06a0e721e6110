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
use crate::layout::MAX_FILENAME;

impl VmuFs {
    /// `rename`: the on-disk filename field is overwritten in place, zero
    /// padded to [`MAX_FILENAME`] bytes; nothing else about the entry moves.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let from_s = from.strip_prefix('/').unwrap_or(from);
        let to_s = to.strip_prefix('/').unwrap_or(to);

        let to_name = normalize_name(to_s)?;

        if from_s == to_s {
            return Ok(());
        }

        if self.dir.lookup(&to_name).is_some() {
            return Err(Error::AlreadyExists);
        }

        // `from` only ever matters for lookup, not length-checking: a name
        // longer than MAX_FILENAME can't match any stored entry either way.
        let from_bytes = from_s.as_bytes();
        if from_bytes.len() > MAX_FILENAME {
            return Err(Error::NotFound);
        }
        let mut from_name = [0u8; MAX_FILENAME];
        from_name[..from_bytes.len()].copy_from_slice(from_bytes);

        let slot = self.dir.lookup(&from_name).ok_or(Error::NotFound)?;
        self.dir.slots[slot].filename = to_name;

        self.sync();
        Ok(())
    }
}
