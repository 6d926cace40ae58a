//! Verification scanner
//!
//! Recomputes tags newest-first and reports the latest record that still
//! verifies, with a three-way classification:
//!
//! | Verdict | Message |
//! |---|---|
//! | `Verified` | `Data verified!` |
//! | `RecoveredAfterCorruption` | `Corrupt data detected! Last verified data shown.` |
//! | `NoVerifiedRecord` | `Corrupt data detected! No verified data found.` |

mod report;
mod scanner;

pub use report::{
    VerificationReport, Verdict, MSG_NO_VERIFIED, MSG_RECOVERED, MSG_VERIFIED,
};
pub use scanner::Scanner;
