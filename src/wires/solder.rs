// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::schedulers::Admission;
use std::fmt;

/// How an output wire hands values to one soldered input wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolderType {
    /// Wait for capacity downstream. The only solder type that applies backpressure.
    #[default]
    Put,
    /// Drop the value if the destination is full.
    Offer,
    /// Admit the value even if the destination is full.
    Inject,
}

impl SolderType {
    pub(crate) fn admission(self) -> Admission {
        match self {
            SolderType::Put => Admission::Put,
            SolderType::Offer => Admission::Offer,
            SolderType::Inject => Admission::Inject,
        }
    }
}

impl fmt::Display for SolderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolderType::Put => "put",
            SolderType::Offer => "offer",
            SolderType::Inject => "inject",
        };
        f.write_str(name)
    }
}
