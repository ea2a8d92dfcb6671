//! Application layer: the extraction entry points callers drive

pub mod extraction_service;

pub use extraction_service::ExtractionService;
