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

//! Errors produced by the VMU filesystem engine.

/// Every error the engine can return, one-to-one with a POSIX errno via
/// [`Error::errno`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("filename exceeds the maximum of {} bytes", crate::layout::MAX_FILENAME)]
    NameTooLong,
    #[error("a file with that name already exists")]
    AlreadyExists,
    #[error("no such file")]
    NotFound,
    #[error("no space left on device")]
    NoSpace,
    #[error("invalid block or chain state")]
    Invalid,
    #[error("image is not a well-formed VMU image")]
    BadImage,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The POSIX errno this error kind is surfaced to the host as (§6.3).
    pub fn errno(self) -> i32 {
        match self {
            Error::NameTooLong => libc::ENAMETOOLONG,
            Error::AlreadyExists => libc::EEXIST,
            Error::NotFound => libc::ENOENT,
            Error::NoSpace => libc::ENOSPC,
            Error::Invalid => libc::EINVAL,
            Error::BadImage => libc::EUCLEAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping_matches_spec_table() {
        assert_eq!(Error::NameTooLong.errno(), libc::ENAMETOOLONG);
        assert_eq!(Error::AlreadyExists.errno(), libc::EEXIST);
        assert_eq!(Error::NotFound.errno(), libc::ENOENT);
        assert_eq!(Error::NoSpace.errno(), libc::ENOSPC);
        assert_eq!(Error::Invalid.errno(), libc::EINVAL);
        assert_eq!(Error::BadImage.errno(), libc::EUCLEAN);
    }
}
