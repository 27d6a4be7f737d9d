//! Migration error codes
//!
//! Error codes follow the pattern: MIG-{CATEGORY}-{3-digit number}
//!
//! Categories (1-3 uppercase letters):
//! - CFG: Configuration errors (unresolvable intermediate model, bad pattern)
//! - PAR: Parse errors (unreadable or unparsable source)
//! - EXT: Extraction errors (malformed field or decorator shape)
//! - GEN: Generation errors (extension or descriptor synthesis)
//! - IO: Write errors (output emission)
//!
//! Each error code is stable and should not be reused.

/// Intermediate model specifier could not be resolved to a file
pub const MIG_CFG_001_UNRESOLVED_INTERMEDIATE: &str = "MIG-CFG-001";

/// Intermediate models extend each other in a cycle
pub const MIG_CFG_002_INTERMEDIATE_CYCLE: &str = "MIG-CFG-002";

/// Source file could not be read
pub const MIG_PAR_001_UNREADABLE: &str = "MIG-PAR-001";

/// Source file contains syntax errors
pub const MIG_PAR_002_SYNTAX_ERROR: &str = "MIG-PAR-002";

/// Source file has an unsupported extension
pub const MIG_PAR_003_UNSUPPORTED_LANGUAGE: &str = "MIG-PAR-003";

/// Field call has an unrecognized argument shape
pub const MIG_EXT_001_MALFORMED_FIELD: &str = "MIG-EXT-001";

/// Dependency edges for a file could not be extracted
pub const MIG_EXT_002_EDGE_EXTRACTION: &str = "MIG-EXT-002";

/// Extension synthesis failed for a file
pub const MIG_GEN_001_EXTENSION_FAILED: &str = "MIG-GEN-001";

/// Artifact could not be written
pub const MIG_IO_001_WRITE_FAILED: &str = "MIG-IO-001";

/// Error code documentation
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | MIG-CFG-001 | Unresolved intermediate model | Check the specifier against the model alias and directory |
/// | MIG-CFG-002 | Intermediate model cycle | Break the `extends` cycle between base models |
/// | MIG-PAR-001 | Unreadable source | Check file permissions |
/// | MIG-PAR-002 | Syntax error | Fix the source file; it is skipped until then |
/// | MIG-PAR-003 | Unsupported language | Only `.js` and `.ts` sources are migrated |
/// | MIG-EXT-001 | Malformed field | Field is preserved as behavior in the extension |
/// | MIG-EXT-002 | Edge extraction failed | File contributes no mixin edges |
/// | MIG-GEN-001 | Extension failed | No extension artifact produced for the file |
/// | MIG-IO-001 | Write failed | Check output directory permissions |
pub const ERROR_CODE_DOCUMENTATION: &str = "Error code documentation available in source";
