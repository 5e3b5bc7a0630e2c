pub mod llm;
pub mod prompts;

pub use llm::{LlmConfig, ProviderKind};
pub use prompts::{load_prompts, PromptVariant};
