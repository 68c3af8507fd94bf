// Market data module entrypoint
pub mod adapters;    // upstream fetchers (CSE HTTP API)
pub mod normaliser;  // loose upstream values -> numbers / strings
pub mod cdn;         // report paths -> absolute CDN urls
pub mod cache;       // short-lived response cache
pub mod directory;   // ticker -> internal security id
pub mod types;       // normalised records handed to tools
pub mod depth;       // order book levels and derived metrics
pub mod gateway;     // fetch + normalise + fall back, per operation
