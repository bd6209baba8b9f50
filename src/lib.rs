pub mod assembler;
pub mod chunker;
pub mod convert;
pub mod input;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod rewriter;
pub mod section;
