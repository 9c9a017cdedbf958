pub mod corpus;
pub mod matching;
pub mod persistence;
pub mod pipeline;
pub mod shared;
