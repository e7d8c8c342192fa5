//! Trait interpretation texts

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Mapping from trait name to descriptive text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterpretationMap {
    texts: AHashMap<String, String>,
}

impl InterpretationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, trait_name: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(trait_name.into(), text.into());
    }

    #[inline]
    pub fn get(&self, trait_name: &str) -> Option<&str> {
        self.texts.get(trait_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InterpretationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            texts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
