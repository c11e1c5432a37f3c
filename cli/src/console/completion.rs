//! Completion hooks attached to individual commands.
//!
//! The console only stores providers and hands them out; filtering and
//! merging candidates is the completer's job.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a completion provider is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompletionKey {
    /// Positional argument, zero-based.
    Argument(usize),
    /// Flag, by long name without dashes.
    Option(String),
}

/// Input handed to a dynamic provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Words typed so far, command path included.
    pub words: Vec<String>,
    /// The partial word under the cursor.
    pub prefix: String,
}

type DynamicCompletion = Arc<dyn Fn(&CompletionRequest) -> Vec<String> + Send + Sync>;

/// Source of completion candidates.
#[derive(Clone)]
pub enum CompletionProvider {
    Static(Vec<String>),
    Dynamic(DynamicCompletion),
}

impl CompletionProvider {
    pub fn fixed<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompletionProvider::Static(values.into_iter().map(Into::into).collect())
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Vec<String> + Send + Sync + 'static,
    {
        CompletionProvider::Dynamic(Arc::new(f))
    }

    /// Raw candidates, unfiltered.
    pub fn candidates(&self, request: &CompletionRequest) -> Vec<String> {
        match self {
            CompletionProvider::Static(values) => values.clone(),
            CompletionProvider::Dynamic(f) => f(request),
        }
    }
}

impl fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionProvider::Static(values) => f.debug_tuple("Static").field(values).finish(),
            CompletionProvider::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Providers of one command, keyed by argument position or flag name.
/// Not inherited by subcommands.
#[derive(Debug, Clone, Default)]
pub struct CompletionHooks {
    providers: HashMap<CompletionKey, CompletionProvider>,
}

impl CompletionHooks {
    /// Replaces any provider already registered under `key`.
    pub fn insert(&mut self, key: CompletionKey, provider: CompletionProvider) {
        self.providers.insert(key, provider);
    }

    pub fn get(&self, key: &CompletionKey) -> Option<&CompletionProvider> {
        self.providers.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompletionKey, &CompletionProvider)> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
