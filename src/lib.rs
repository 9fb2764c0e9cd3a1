// Library for tests to access modules

pub mod aggregation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report_worker;
