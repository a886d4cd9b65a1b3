#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Proxy,
    OpenAI,
    Groq,
    HuggingFace,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Proxy => "proxy",
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
            Provider::HuggingFace => "huggingface",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "proxy" => Some(Provider::Proxy),
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            "huggingface" | "hf" => Some(Provider::HuggingFace),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![
            Provider::Proxy,
            Provider::OpenAI,
            Provider::Groq,
            Provider::HuggingFace,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Proxy => "Chat proxy",
            Provider::OpenAI => "OpenAI",
            Provider::Groq => "Groq",
            Provider::HuggingFace => "Hugging Face",
        }
    }

    /// Base URL used when the config does not name one
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Proxy => "http://localhost:3000",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::HuggingFace => "https://router.huggingface.co/v1",
        }
    }

    /// Model used when the config does not name one. The proxy picks its own.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Provider::Proxy => None,
            Provider::OpenAI => Some("gpt-3.5-turbo"),
            Provider::Groq => Some("llama-3.1-8b-instant"),
            Provider::HuggingFace => Some("meta-llama/Llama-3.1-8B-Instruct"),
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Proxy => None,
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::HuggingFace => Some("HF_TOKEN"),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
