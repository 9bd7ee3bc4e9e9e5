//! Exit code constants for the archpro CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments, configuration, topic or phase |
//! | 10 | `GENERATION_TIMEOUT` | Request timeout or video poll budget exhausted |
//! | 70 | `GENERATION_FAILURE` | Surfaced generation failure (video) |
//! | 77 | `CREDENTIAL_REJECTED` | Credential rejected or stale |

/// Process exit code.
///
/// ```rust
/// use archpro_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::GENERATION_FAILURE, ExitCode::from_i32(70));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid CLI arguments, configuration, topic id or phase name
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Generation timed out (request timeout or poll budget)
    pub const GENERATION_TIMEOUT: ExitCode = ExitCode(10);

    /// Generation failed and the failure was surfaced
    pub const GENERATION_FAILURE: ExitCode = ExitCode(70);

    /// The provider rejected the credential or did not recognize it
    pub const CREDENTIAL_REJECTED: ExitCode = ExitCode(77);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Exit statuses are truncated to a byte by the OS anyway.
        std::process::ExitCode::from(u8::try_from(code.0).unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::GENERATION_TIMEOUT.as_i32(), 10);
        assert_eq!(ExitCode::GENERATION_FAILURE.as_i32(), 70);
        assert_eq!(ExitCode::CREDENTIAL_REJECTED.as_i32(), 77);
    }

    #[test]
    fn test_conversions() {
        let raw: i32 = ExitCode::CLI_ARGS.into();
        assert_eq!(raw, 2);
        assert_eq!(ExitCode::from(70), ExitCode::GENERATION_FAILURE);
    }
}
