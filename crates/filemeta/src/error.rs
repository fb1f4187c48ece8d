// Copyright 2024 RustFS Team
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

use crate::VersionPurgeStatusType;

/// FileMeta error type and Result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A caller passed arguments that can never succeed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Erasure distribution is already set and cannot be changed")]
    DistributionImmutable,

    #[error("Illegal purge status transition from {from:?} to {to:?}")]
    IllegalPurgeTransition {
        from: VersionPurgeStatusType,
        to: VersionPurgeStatusType,
    },

    #[error("Object has reached the maximum of {max} versions")]
    MaxVersionsExceeded { max: usize },

    #[error("File not found")]
    FileNotFound,

    #[error("File version not found")]
    FileVersionNotFound,

    #[error("File corrupt")]
    FileCorrupt,

    #[error("Unexpected error")]
    Unexpected,

    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("rmp serde decode error: {0}")]
    RmpSerdeDecode(String),

    #[error("Invalid UTF-8: {0}")]
    FromUtf8(String),

    #[error("rmp decode value read error: {0}")]
    RmpDecodeValueRead(String),

    #[error("rmp encode value write error: {0}")]
    RmpEncodeValueWrite(String),

    #[error("rmp decode num value read error: {0}")]
    RmpDecodeNumValueRead(String),

    #[error("rmp decode marker read error: {0}")]
    RmpDecodeMarkerRead(String),

    #[error("time component range error: {0}")]
    TimeComponentRange(String),
}

impl Error {
    pub fn other<E>(error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        std::io::Error::other(error).into()
    }

    /// Contract violations are never retried by callers.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::DistributionImmutable | Error::IllegalPurgeTransition { .. }
        )
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::InvalidArgument(e1), Error::InvalidArgument(e2)) => e1 == e2,
            (Error::DistributionImmutable, Error::DistributionImmutable) => true,
            (
                Error::IllegalPurgeTransition { from: f1, to: t1 },
                Error::IllegalPurgeTransition { from: f2, to: t2 },
            ) => f1 == f2 && t1 == t2,
            (Error::MaxVersionsExceeded { max: m1 }, Error::MaxVersionsExceeded { max: m2 }) => m1 == m2,
            (Error::FileNotFound, Error::FileNotFound) => true,
            (Error::FileVersionNotFound, Error::FileVersionNotFound) => true,
            (Error::FileCorrupt, Error::FileCorrupt) => true,
            (Error::Unexpected, Error::Unexpected) => true,
            (Error::Io(e1), Error::Io(e2)) => e1.kind() == e2.kind() && e1.to_string() == e2.to_string(),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b) && a.to_string() == b.to_string(),
        }
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::InvalidArgument(s) => Error::InvalidArgument(s.clone()),
            Error::DistributionImmutable => Error::DistributionImmutable,
            Error::IllegalPurgeTransition { from, to } => Error::IllegalPurgeTransition {
                from: from.clone(),
                to: to.clone(),
            },
            Error::MaxVersionsExceeded { max } => Error::MaxVersionsExceeded { max: *max },
            Error::FileNotFound => Error::FileNotFound,
            Error::FileVersionNotFound => Error::FileVersionNotFound,
            Error::FileCorrupt => Error::FileCorrupt,
            Error::Unexpected => Error::Unexpected,
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
            Error::RmpSerdeDecode(s) => Error::RmpSerdeDecode(s.clone()),
            Error::FromUtf8(s) => Error::FromUtf8(s.clone()),
            Error::RmpDecodeValueRead(s) => Error::RmpDecodeValueRead(s.clone()),
            Error::RmpEncodeValueWrite(s) => Error::RmpEncodeValueWrite(s.clone()),
            Error::RmpDecodeNumValueRead(s) => Error::RmpDecodeNumValueRead(s.clone()),
            Error::RmpDecodeMarkerRead(s) => Error::RmpDecodeMarkerRead(s.clone()),
            Error::TimeComponentRange(s) => Error::TimeComponentRange(s.clone()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Unexpected,
            _ => Error::Io(e),
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Unexpected => std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "Unexpected EOF"),
            Error::Io(e) => e,
            _ => std::io::Error::other(e.to_string()),
        }
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::RmpSerdeDecode(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::FromUtf8(e.to_string())
    }
}

impl From<rmp::decode::ValueReadError> for Error {
    fn from(e: rmp::decode::ValueReadError) -> Self {
        Error::RmpDecodeValueRead(e.to_string())
    }
}

impl From<rmp::encode::ValueWriteError> for Error {
    fn from(e: rmp::encode::ValueWriteError) -> Self {
        Error::RmpEncodeValueWrite(e.to_string())
    }
}

impl From<rmp::decode::NumValueReadError> for Error {
    fn from(e: rmp::decode::NumValueReadError) -> Self {
        Error::RmpDecodeNumValueRead(e.to_string())
    }
}

impl From<rmp::decode::MarkerReadError> for Error {
    fn from(e: rmp::decode::MarkerReadError) -> Self {
        let serr = format!("{e:?}");
        Error::RmpDecodeMarkerRead(serr)
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(e: time::error::ComponentRange) -> Self {
        Error::TimeComponentRange(e.to_string())
    }
}
