#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A rule configuration payload could not be accepted. The whole schema
    /// save is rejected; nothing is persisted.
    #[error("Invalid rule configuration: {0}")]
    Configuration(String),

    /// The rule store failed to read or write. Writes have been rolled back.
    #[error("Persistence failed: {0}")]
    Persistence(String),
}
