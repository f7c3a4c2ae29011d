//! Provider clients.

pub mod ollama_service;
pub mod open_ai_service;

/// One non-streaming generation call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmRequest<'a> {
    pub prompt: &'a str,
    /// System instruction.
    pub system: Option<&'a str>,
    /// Base64 image, bare or as a `data:` URL.
    pub image: Option<&'a str>,
    /// Ask the provider to constrain output to a JSON object.
    pub json: bool,
}

impl<'a> LlmRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            ..Default::default()
        }
    }

    pub fn system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    pub fn image(mut self, image: Option<&'a str>) -> Self {
        self.image = image;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Splits a `data:<mime>;base64,<payload>` URL; bare payloads pass through.
pub(crate) fn split_data_url(image: &str) -> (Option<&str>, &str) {
    let image = image.trim();
    match image.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,")) {
        Some((mime, payload)) => (Some(mime), payload),
        None => (None, image),
    }
}
