//! Exit code constants for the changewise CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, malformed hook input)
//! - 2: Diff text could not be interpreted
//! - 3: Git or shell command failure
//! - 4: Not inside a git repository

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or malformed input.
pub const USER_ERROR: i32 = 1;

/// Unified diff text could not be interpreted.
pub const PARSE_FAILURE: i32 = 2;

/// Command failure: non-zero exit, oversized output, timeout, spawn failure.
pub const GIT_FAILURE: i32 = 3;

/// No repository root was found above the starting directory.
pub const NOT_A_REPOSITORY: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            PARSE_FAILURE,
            GIT_FAILURE,
            NOT_A_REPOSITORY,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
