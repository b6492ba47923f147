//! Fetches the encoder, decoder and tokenizer of a speech model from a
//! Hugging Face style hub and stores them under canonical local names.

pub mod config;
pub mod hub;
pub mod fetch;
