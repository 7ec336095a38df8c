//! Interface to the external verification engine: version gating, switch
//! construction, batch invocation, and report analysis.

pub mod klayout;
pub mod report;
