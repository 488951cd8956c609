use crate::error::QaError;
use crate::llm::LanguageModel;
use crate::models::{ChainOptions, RetrievedUnit};
use crate::traits::Retriever;
use std::sync::Arc;

const STUFF_PROMPT: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
{context}\n\nQuestion: {question}\nHelpful Answer:";

#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub result: String,
    pub source_units: Vec<RetrievedUnit>,
}

/// Retrieves units for a question, stuffs them into one prompt, and asks the
/// language model.
#[derive(Clone)]
pub struct RetrievalQaChain {
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
}

pub fn chain_for(
    option: ChainOptions,
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
) -> RetrievalQaChain {
    match option {
        ChainOptions::RetrievalQa | ChainOptions::Default => RetrievalQaChain::new(llm, retriever),
    }
}

impl RetrievalQaChain {
    pub fn new(llm: Arc<dyn LanguageModel>, retriever: Arc<dyn Retriever>) -> Self {
        Self { llm, retriever }
    }

    pub fn retriever(&self) -> Arc<dyn Retriever> {
        Arc::clone(&self.retriever)
    }

    pub fn set_retriever(&mut self, retriever: Arc<dyn Retriever>) {
        self.retriever = retriever;
    }

    pub async fn invoke(&self, question: &str) -> Result<ChainOutput, QaError> {
        let source_units = self.retriever.retrieve(question).await?;
        let prompt = build_prompt(&source_units, question);
        let result = self.llm.complete(&prompt).await?;

        Ok(ChainOutput {
            result,
            source_units,
        })
    }
}

pub fn build_prompt(units: &[RetrievedUnit], question: &str) -> String {
    let context = units
        .iter()
        .map(|hit| hit.unit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    STUFF_PROMPT
        .replace("{context}", &context)
        .replace("{question}", question)
}
