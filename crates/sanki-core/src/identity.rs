// Copyright 2025 Fernando Borretti
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

use std::collections::HashMap;

use crate::types::ids::OwnerId;

/// Maps a caller's opaque token to the owner it acts for. Returns `None` for
/// unknown, malformed or expired tokens; the reason is not exposed.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<OwnerId>;
}

/// A fixed table of tokens.
#[derive(Clone, Debug, Default)]
pub struct TokenTable {
    tokens: HashMap<String, OwnerId>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, owner: OwnerId) {
        self.tokens.insert(token.into(), owner);
    }

    pub fn with(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
        self.insert(token, owner);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, OwnerId)> for TokenTable {
    fn from_iter<T: IntoIterator<Item = (String, OwnerId)>>(iter: T) -> Self {
        TokenTable {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl IdentityResolver for TokenTable {
    fn resolve(&self, token: &str) -> Option<OwnerId> {
        // Empty tokens never match, even if configured.
        if token.is_empty() {
            return None;
        }
        self.tokens.get(token).copied()
    }
}
