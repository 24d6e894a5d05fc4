//! CLI argument definitions for the verifier.

use clap::Args;

/// Arguments controlling the post-load verification phase.
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Skip the verification phase entirely
    #[arg(long)]
    pub skip_verify: bool,

    /// Number of loaded events to read back and compare (0 disables the check)
    #[arg(long, default_value = "10")]
    pub spot_check: usize,
}

impl Default for VerifyArgs {
    fn default() -> Self {
        Self {
            skip_verify: false,
            spot_check: 10,
        }
    }
}
