//! LLM-backed entity resolution: which candidate tables does a question mention?

use crate::dataset::TableSet;
use crate::llm::ChatClient;

/// Characters trimmed from both ends of every returned entity.
const ENTITY_DELIMITERS: &[char] = &['`', '"', '[', ']', '\''];

/// Asks a chat model to pick the tables a question refers to.
pub struct EntityResolver<'a> {
    client: &'a dyn ChatClient,
    model: String,
}

impl<'a> EntityResolver<'a> {
    pub fn new(client: &'a dyn ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Resolve the entities of `question` among `vocabulary`.
    ///
    /// Never fails: an API error is logged and yields an empty set, so one bad
    /// call only costs that record's prediction.
    pub async fn resolve(&self, question: &str, vocabulary: &TableSet) -> TableSet {
        let prompt = build_prompt(question, vocabulary);
        match self.client.complete(&self.model, &prompt).await {
            Ok(response) => parse_entity_list(&response),
            Err(e) => {
                log::warn!("Entity resolution failed for question {:?}: {}", question, e);
                TableSet::new()
            }
        }
    }
}

/// Fixed instruction template with one worked example.
pub fn build_prompt(question: &str, vocabulary: &TableSet) -> String {
    let allowed = vocabulary
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Return only a list of entities present in the query without explanations or additional text. \
         Example: if the query is 'What is the ratio of customers who pay in EUR against customers who pay in CZK?', \
         return ['customers']. \
         The entities you can return must be among these: {}. \
         Here's the query: {}",
        allowed, question
    )
}

/// Split a model answer on ", " and strip quotes/brackets from each item.
///
/// No validation against the vocabulary: the model's answer is taken as is.
pub fn parse_entity_list(response: &str) -> TableSet {
    response
        .split(", ")
        .map(|item| item.trim().trim_matches(ENTITY_DELIMITERS).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
