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

//! The root block (block 255): the one sector of bookkeeping metadata every
//! VMU image carries alongside its FAT and directory region.

use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::layout::BLOCK;

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RootBlock {
    _reserved0: [u8; 0x10],

    /// Whether `vms_blue/red/green/alpha` override the default VMS icon
    /// color.
    pub custom_vms_color: u8,
    pub vms_blue: u8,
    pub vms_red: u8,
    pub vms_green: u8,
    pub vms_alpha: u8,

    _reserved1: [u8; 0x30 - 0x15],

    /// Raw BCD creation timestamp, see [`crate::codec`].
    pub timestamp: [u8; 8],

    _reserved2: [u8; 0x46 - 0x38],

    /// Block holding the FAT.
    pub fat_location: U16,
    /// Size of the FAT, in blocks.
    pub fat_size: U16,
    /// Block holding the *last* (lowest-address) directory block — the
    /// directory grows downward from here.
    pub directory_location: U16,
    /// Size of the directory region, in blocks.
    pub directory_size: U16,
    pub icon_shape: U16,
    /// Number of blocks available to user data.
    pub user_block_count: U16,

    _reserved3: [u8; BLOCK - 0x52],
}

const _: () = assert!(std::mem::size_of::<RootBlock>() == BLOCK);

impl RootBlock {
    /// Parse the root block out of `img`, which must be exactly
    /// [`crate::layout::IMAGE_SIZE`] bytes (checked by the caller).
    pub fn read_from_image(img: &[u8]) -> Self {
        let off = crate::layout::ROOT_BLOCK_INDEX * BLOCK;
        let mut rb = RootBlock::new_zeroed();
        rb.as_mut_bytes().copy_from_slice(&img[off..off + BLOCK]);
        rb
    }

    /// Write this root block back into `img`'s root-block slot.
    pub fn write_to_image(&self, img: &mut [u8]) {
        let off = crate::layout::ROOT_BLOCK_INDEX * BLOCK;
        img[off..off + BLOCK].copy_from_slice(self.as_bytes());
    }
}
