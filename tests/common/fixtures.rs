//! Test fixtures for integration tests.

#![allow(dead_code)]

use paper2sw::Config;
use tempfile::TempDir;

pub const FIXED_SEED: u64 = 42;

pub const LLAMA_PAPER: &str = "We study Llama 2. The network stacks 32 transformer layers with a \
                               hidden dimension of 4096. Each block uses 32 heads and an MLP \
                               expansion of 4.";

pub const PLAIN_TEXT: &str = "The quick brown fox jumps over the lazy dog.";

/// Assembles paper-like text from optional architecture facts.
#[derive(Default)]
pub struct PaperBuilder {
    family: Option<String>,
    layers: Option<u32>,
    hidden_size: Option<u32>,
    down_proj: bool,
    super_weight: bool,
    filler_sections: usize,
    tail: Option<String>,
}

impl PaperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = Some(family.to_string());
        self
    }

    pub fn layers(mut self, layers: u32) -> Self {
        self.layers = Some(layers);
        self
    }

    pub fn hidden_size(mut self, size: u32) -> Self {
        self.hidden_size = Some(size);
        self
    }

    pub fn with_down_proj(mut self) -> Self {
        self.down_proj = true;
        self
    }

    pub fn with_super_weight(mut self) -> Self {
        self.super_weight = true;
        self
    }

    /// Appends `count` architecture-free paragraphs.
    pub fn filler_sections(mut self, count: usize) -> Self {
        self.filler_sections = count;
        self
    }

    pub fn tail(mut self, tail: &str) -> Self {
        self.tail = Some(tail.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut parts = Vec::new();

        if let Some(family) = &self.family {
            parts.push(format!("We analyse {} checkpoints.", family));
        }
        if let Some(layers) = self.layers {
            parts.push(format!("The model has {} layers.", layers));
        }
        if let Some(size) = self.hidden_size {
            parts.push(format!("It uses a hidden size of {}.", size));
        }
        if self.down_proj {
            parts.push("Activations spike in the MLP down_proj.".to_string());
        }
        if self.super_weight {
            parts.push("Removing a single super weight destroys quality.".to_string());
        }
        for i in 0..self.filler_sections {
            parts.push(format!(
                "Section {} discusses the datasets, the training budget and related work at length.",
                i
            ));
        }
        if let Some(tail) = self.tail {
            parts.push(tail);
        }

        parts.join(" ")
    }
}

/// Config rooted in a fresh temporary cache directory.
pub fn config_in(dir: &TempDir) -> Config {
    Config {
        cache_dir: dir.path().join("cache"),
        ..Default::default()
    }
}

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
