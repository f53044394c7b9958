//! Mock inference backend for deterministic testing.
//!
//! Implements both inference traits with deterministic, text-seeded
//! embeddings and configurable canned responses, so pipeline tests run
//! without a live model.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trove_inference::mock::MockInferenceBackend;
//!
//! let backend = MockInferenceBackend::new()
//!     .with_dimension(8)
//!     .with_fixed_response(r#"{"item_category":"null"}"#);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use trove_core::{EmbeddingBackend, Error, GenerationBackend, Result, Vector};

/// Mock inference backend for testing.
#[derive(Clone)]
pub struct MockInferenceBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    fixed_responses: HashMap<String, String>,
    default_response: String,
    fail_embedding: bool,
    fail_generation: bool,
}

/// One logged backend invocation, for assertions.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 8,
            fixed_responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            fail_embedding: false,
            fail_generation: false,
        }
    }
}

impl MockInferenceBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the default response for generation requests.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Add a response mapping for a specific prompt substring.
    ///
    /// The first mapping whose key is contained in the prompt wins.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(needle.into(), output.into());
        self
    }

    /// Make all embedding calls fail, for error-path tests.
    pub fn with_failing_embedding(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_embedding = true;
        self
    }

    /// Make all generation calls fail, for error-path tests.
    pub fn with_failing_generation(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_generation = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    fn log(&self, operation: &str, input: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
        });
    }

    /// Deterministic embedding seeded from the input text.
    ///
    /// Equal texts always produce equal vectors; different texts almost
    /// always differ.
    pub fn embedding_for(&self, text: &str) -> Vector {
        let mut seed: u64 = 0xcbf2_9ce4_8422_2325;
        for b in text.as_bytes() {
            seed ^= u64::from(*b);
            seed = seed.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut state = seed | 1;
        let values: Vec<f32> = (0..self.config.dimension)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        Vector::from(values)
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockInferenceBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if self.config.fail_embedding {
            return Err(Error::Embedding("mock embedding failure".to_string()));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            self.log("embed_texts", text);
            vectors.push(self.embedding_for(text));
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl GenerationBackend for MockInferenceBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        if self.config.fail_generation {
            return Err(Error::Generation("mock generation failure".to_string()));
        }

        self.log("generate", prompt);
        for (needle, output) in &self.config.fixed_responses {
            if prompt.contains(needle.as_str()) {
                return Ok(output.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}
