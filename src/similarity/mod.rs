//! Token-overlap similarity between two plain texts.
//!
//! The score is deliberately asymmetric: the denominator is always the token
//! count of the first (candidate) text, and repeated tokens in the second text
//! count once per occurrence. `score(a, b)` and `score(b, a)` generally differ,
//! and a long peer that repeats candidate words saturates at 100.

pub mod scorer;


pub use scorer::{CandidateProfile, score, tokenize};
