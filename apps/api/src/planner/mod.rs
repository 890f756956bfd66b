// Study planner: records → canonical request → prompt → model → validated schedule.
// All model calls go through llm_client, never a provider directly.

pub mod defaults;
pub mod fetcher;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompt_builder;
pub mod prompts;
pub mod validator;

#[cfg(test)]
pub mod testing;
