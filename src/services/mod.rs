//! Host services around the digitizer engine.
//!
//! ARCHITECTURE
//! ============
//! `repository` and `convert` define the collaborator seams as async traits;
//! `http` implements them over reqwest. `sync` reconciles an in-memory
//! `AreaStore` with the area collaborator and knows nothing about HTTP.

pub mod convert;
pub mod http;
pub mod repository;
pub mod sync;
