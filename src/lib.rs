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

//! A user-space driver for the flat, FAT-style filesystem Sega's Dreamcast
//! Visual Memory Unit stores on its 128 KiB memory card.
//!
//! [`VmuFs`] owns a 131 072-byte image buffer and a parsed mirror of its
//! directory table, and exposes the POSIX-shaped operations
//! ([`VmuFs::create`], [`VmuFs::read`], [`VmuFs::write`],
//! [`VmuFs::truncate`], [`VmuFs::remove`], [`VmuFs::rename`],
//! [`VmuFs::stat`], [`VmuFs::readdir`]) a mount layer dispatches into.
//!
//! Loading an image from, and persisting it back to, a host file or block
//! device is outside this crate's scope, as is a kernel/FUSE mount
//! dispatch loop; both are external collaborators that hand this crate a
//! `Vec<u8>` and take one back.

pub mod codec;
pub mod dirent;
pub mod error;
pub mod fat;
pub mod image;
pub mod layout;
mod ops;
pub mod rootblock;

pub use error::{Error, Result};
pub use image::{Stat, VmuFs};
