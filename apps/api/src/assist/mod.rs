// AI assists for the application form: resume autofill and text improvement.
// Every call is admitted by the usage ledger first and tracked exactly once after.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod autofill;
pub mod handlers;
pub mod improve;
pub mod prompts;
