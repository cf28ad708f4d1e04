// Data generation
pub mod synthesizer;

// Analytics and Reporting
pub mod kpi;
pub mod supplier_scorer;

// Pipeline orchestration
pub mod analytics;
