//! Option validation — runs before anything touches the engine.

use crate::types::request::RunRequest;


/// A contradictory pair of run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OptionConflict {
    #[error("gtld-registrar cannot be combined with gtld-registry")]
    RegistrarWithRegistry,
    #[error("gtld-registrar cannot be combined with thin")]
    RegistrarWithThin,
}


/// Reject registrar checks combined with registry or thin-profile checks.
/// Every other combination is accepted.
pub fn validate(request: &RunRequest) -> Result<(), OptionConflict> {
    if request.gtld_registrar && request.gtld_registry {
        return Err(OptionConflict::RegistrarWithRegistry);
    }
    if request.gtld_registrar && request.thin {
        return Err(OptionConflict::RegistrarWithThin);
    }
    Ok(())
}
