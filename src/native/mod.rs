/// Native module contains an engine source that fetches engine scripts
/// and hands them to a host-provided runtime for execution.
pub mod source;
