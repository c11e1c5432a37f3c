//! Per-context prompt: static settings from the configuration, optionally
//! overridden by renderer closures installed by the application.

use crate::core::config::PromptConfig;
use std::fmt;
use std::sync::Arc;

/// Produces prompt text each time the shell draws it.
pub type Renderer = Arc<dyn Fn() -> String + Send + Sync>;

/// Produces a hint for the word under the cursor.
pub type TooltipRenderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The set of renderers handed to the shell for one cycle.
#[derive(Clone)]
pub struct PromptRenderers {
    pub primary: Renderer,
    /// Drawn on the input line when the prompt is multiline.
    pub secondary: Renderer,
    pub right: Renderer,
    pub tooltip: Option<TooltipRenderer>,
}

impl fmt::Debug for PromptRenderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRenderers")
            .field("primary", &(self.primary)())
            .field("secondary", &(self.secondary)())
            .field("right", &(self.right)())
            .field("tooltip", &self.tooltip.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct Prompt {
    config: PromptConfig,
    primary: Option<Renderer>,
    secondary: Option<Renderer>,
    right: Option<Renderer>,
    tooltip: Option<TooltipRenderer>,
}

impl Prompt {
    pub fn new(config: PromptConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Replaces the static settings. Installed renderers are kept.
    pub(crate) fn load_from_config(&mut self, config: PromptConfig) {
        self.config = config;
    }

    pub fn set_primary<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.primary = Some(Arc::new(f));
        self
    }

    pub fn set_secondary<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.secondary = Some(Arc::new(f));
        self
    }

    pub fn set_right<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.right = Some(Arc::new(f));
        self
    }

    pub fn set_tooltip<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.tooltip = Some(Arc::new(f));
        self
    }

    /// Renderers for the shell, falling back to the configured text.
    pub fn renderers(&self) -> PromptRenderers {
        PromptRenderers {
            primary: self
                .primary
                .clone()
                .unwrap_or_else(|| fixed(&self.config.left)),
            secondary: self
                .secondary
                .clone()
                .unwrap_or_else(|| fixed(&self.config.multiline_prompt)),
            right: self
                .right
                .clone()
                .unwrap_or_else(|| fixed(&self.config.right)),
            tooltip: self.tooltip.clone(),
        }
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("config", &self.config)
            .field("custom_primary", &self.primary.is_some())
            .field("custom_right", &self.right.is_some())
            .finish_non_exhaustive()
    }
}

fn fixed(text: &str) -> Renderer {
    let text = text.to_string();
    Arc::new(move || text.clone())
}
