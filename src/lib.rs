//! Cost-of-living comparison engine.
//!
//! Resolves free-text US location names to metro, county, or state codes,
//! extracts living wage records from retrieved documents, and translates
//! income between locations with several equivalence models.

pub mod document;
pub mod equivalence;
pub mod extract;
pub mod location;
pub mod model;
pub mod report;
