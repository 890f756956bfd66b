//! In-memory stand-ins for the store and the model, shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::{GenerationConfig, LlmError, TextGenerator};
use crate::planner::fetcher::ScheduleStore;
use crate::planner::models::UserRecords;

/// Store holding records per user. Unknown users get empty records.
#[derive(Default)]
pub struct StubStore {
    users: HashMap<String, UserRecords>,
}

impl StubStore {
    pub fn with(records: UserRecords) -> Self {
        let mut users = HashMap::new();
        users.insert(records.user_id.clone(), records);
        Self { users }
    }
}

#[async_trait]
impl ScheduleStore for StubStore {
    async fn fetch_user_records(&self, user_id: &str) -> Result<UserRecords, AppError> {
        Ok(self.users.get(user_id).cloned().unwrap_or_else(|| UserRecords {
            user_id: user_id.to_string(),
            ..Default::default()
        }))
    }
}

/// Generator that records prompts and returns a canned reply or error.
pub struct StubGenerator {
    reply: Option<String>,
    failure: Mutex<Option<LlmError>>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            failure: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            reply: None,
            failure: Mutex::new(Some(error)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(text) = &self.reply {
            return Ok(text.clone());
        }
        Err(self
            .failure
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| LlmError::MissingText("stub exhausted".to_string())))
    }
}
