//! Configurable in-memory adapter for registry and synchronizer tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender};

use super::traits::ProviderAdapter;
use super::types::{ProviderError, Sampling, SamplingState};

/// One-shot rendezvous: `set_model` signals `entered` and then blocks
/// until `release` fires, letting a test observe mid-update state.
struct ModelGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

pub(crate) struct MockAdapter {
    name: &'static str,
    models: Vec<String>,
    embedding_model: Option<String>,
    credentials_valid: bool,
    sampling: SamplingState,
    model_gate: Mutex<Option<ModelGate>>,
}

impl MockAdapter {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            models: vec![format!("{name}-small"), format!("{name}-large")],
            embedding_model: None,
            credentials_valid: true,
            sampling: SamplingState::new(&format!("{name}-small")),
            model_gate: Mutex::new(None),
        }
    }

    pub(crate) fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        if let Some(first) = self.models.first() {
            self.sampling.set_model(first.clone());
        }
        self
    }

    pub(crate) fn without_models(mut self) -> Self {
        self.models.clear();
        self
    }

    pub(crate) fn with_embedding_model(mut self, model: &str) -> Self {
        self.embedding_model = Some(model.to_string());
        self
    }

    pub(crate) fn failing_credentials(mut self) -> Self {
        self.credentials_valid = false;
        self
    }

    pub(crate) fn with_gated_set_model(self, entered: Sender<()>, release: Receiver<()>) -> Self {
        *self.model_gate.lock().unwrap() = Some(ModelGate { entered, release });
        self
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn sampling(&self) -> Sampling {
        self.sampling.snapshot()
    }

    fn embedding_model(&self) -> Option<String> {
        self.embedding_model.clone()
    }

    fn set_model(&self, model: String) {
        let gate = self.model_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.send(()).ok();
            gate.release.recv().ok();
        }
        self.sampling.set_model(model);
    }

    fn set_temperature(&self, temperature: f64) {
        self.sampling.set_temperature(temperature);
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("{}:{prompt}", self.name))
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>, ProviderError> {
        if self.embedding_model.is_none() {
            return Err(ProviderError::unsupported(self.name, "embeddings"));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }

    async fn list_models(&self) -> Vec<String> {
        self.models.clone()
    }

    async fn validate_credentials(&self) -> Result<(), ProviderError> {
        if self.credentials_valid {
            Ok(())
        } else {
            Err(ProviderError::credential(self.name, "key rejected"))
        }
    }
}
