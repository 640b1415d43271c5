// This file is part of Passforge.
//
// Copyright (c) 2026  The Passforge authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const PORTUGUESE_BASIC_DATA: &str = include_str!("../assets/portuguese_basic.txt");
const ENGLISH_BASIC_DATA: &str = include_str!("../assets/english_basic.txt");
const ANIMALS_DATA: &str = include_str!("../assets/animals.txt");

static PORTUGUESE_BASIC: OnceLock<Vec<&'static str>> = OnceLock::new();
static ENGLISH_BASIC: OnceLock<Vec<&'static str>> = OnceLock::new();
static ANIMALS: OnceLock<Vec<&'static str>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordlistId {
    #[default]
    PortugueseBasic,
    EnglishBasic,
    Animals,
    /// Words supplied by the caller.
    Custom,
}

impl WordlistId {
    pub const ALL: [Self; 4] = [
        Self::PortugueseBasic,
        Self::EnglishBasic,
        Self::Animals,
        Self::Custom,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::PortugueseBasic => "portuguese-basic",
            Self::EnglishBasic => "english-basic",
            Self::Animals => "animals",
            Self::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PortugueseBasic => "Portuguese (Basic)",
            Self::EnglishBasic => "English (Basic)",
            Self::Animals => "Animals (PT-BR)",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for WordlistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown word list \"{0}\" (expected one of: portuguese-basic, english-basic, animals, custom)")]
pub struct UnknownWordlist(pub String);

impl FromStr for WordlistId {
    type Err = UnknownWordlist;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|id| id.key() == wanted)
            .ok_or_else(|| UnknownWordlist(s.to_string()))
    }
}

fn load(cell: &'static OnceLock<Vec<&'static str>>, data: &'static str) -> &'static [&'static str] {
    cell.get_or_init(|| {
        data.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    })
}

/// Built-in list for `id`; `None` for [`WordlistId::Custom`].
pub fn get_wordlist(id: WordlistId) -> Option<&'static [&'static str]> {
    match id {
        WordlistId::PortugueseBasic => Some(load(&PORTUGUESE_BASIC, PORTUGUESE_BASIC_DATA)),
        WordlistId::EnglishBasic => Some(load(&ENGLISH_BASIC, ENGLISH_BASIC_DATA)),
        WordlistId::Animals => Some(load(&ANIMALS, ANIMALS_DATA)),
        WordlistId::Custom => None,
    }
}

/// Splits free text into words on any whitespace. Order and repeats are
/// preserved; nothing is escaped or decoded.
pub fn parse_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
