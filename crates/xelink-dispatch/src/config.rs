/// Controls dispatch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// When true, frames with an unregistered tag return
    /// `DispatchError::UnknownType` instead of being ignored.
    pub fail_on_unknown_type: bool,
}
