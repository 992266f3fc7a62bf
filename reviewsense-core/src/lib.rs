pub mod balancer;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod model;
pub mod normalizer;
pub mod preprocessing;
pub mod report;
pub mod slang;
pub mod split;
pub mod stemmer;
pub mod stopwords;
pub mod training;
pub mod vectorizer;
