pub mod corpus_aggregator;
pub mod keyword_counts;
