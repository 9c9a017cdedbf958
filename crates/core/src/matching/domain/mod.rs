pub mod fuzzy_matcher;
pub mod keyword_index;
pub mod occurrence;
pub mod occurrence_resolver;
pub mod tokenizer;
