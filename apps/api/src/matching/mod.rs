// Matching Engine: tokenization, entity extraction, similarity, experience and education signals,
// scoring and ranking. Everything here is pure except the optional LLM scorer, whose calls go
// through llm_client.

pub mod education;
pub mod experience;
pub mod extractor;
pub mod prompts;
pub mod ranker;
pub mod scorer;
pub mod similarity;
pub mod tokenizer;
