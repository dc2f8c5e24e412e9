//! Process exit codes
//!
//! Scripts rely on these values, so they never change meaning.

/// Exit status of a docgate invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The command completed
    Success = 0,
    /// Anything not covered below
    GeneralError = 1,
    /// Bad arguments or an invalid local path
    UsageError = 2,
    /// The remote service failed or could not be reached
    NetworkError = 3,
    /// Configuration is missing or invalid, or credentials were rejected
    AuthError = 4,
    /// The library, item or share does not exist
    NotFound = 5,
}

impl ExitCode {
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            1 => Some(ExitCode::GeneralError),
            2 => Some(ExitCode::UsageError),
            3 => Some(ExitCode::NetworkError),
            4 => Some(ExitCode::AuthError),
            5 => Some(ExitCode::NotFound),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

/// Exit code for a gateway error
pub fn exit_code_from_error(error: &docgate_core::Error) -> ExitCode {
    ExitCode::from_i32(error.exit_code()).unwrap_or(ExitCode::GeneralError)
}
