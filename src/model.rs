use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::error::CfError;
use crate::lang;
use crate::macros::regex;

/// Floor for the watch refresh delay; the judge rate-limits aggressive
/// pollers, so anything below this is clamped up.
pub const WATCH_DELAY_FLOOR: Duration = Duration::from_millis(2000);
/// Maximum number of submissions tracked by a single watch loop.
pub const WATCH_COUNT_MAX: u64 = 10;

/// Index of a problem within a contest (`A`, `B`, ..., `C1`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemIndex(String);

impl ProblemIndex {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProblemIndex {
    type Err = CfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        if regex!(r"^[A-Z][0-9]{0,2}$").is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(CfError::Validation(format!(
                "Invalid problem index '{}' (expected A, B, ..., C1, ...)",
                s
            )))
        }
    }
}

impl fmt::Display for ProblemIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated submission request.
///
/// Constructed once at pipeline entry and immutable afterwards. All local
/// input checks happen here, before any network I/O: the remember/logout
/// flags are mutually exclusive, the solution file must be an existing
/// regular file, and the language id must either be given explicitly or be
/// derivable from the file extension.
#[derive(Getters, CopyGetters, Debug, Clone)]
pub struct SubmitRequest {
    #[get_copy = "pub"]
    contest_id: u64,
    #[get = "pub"]
    problem_index: ProblemIndex,
    #[get = "pub"]
    code_file: PathBuf,
    #[get_copy = "pub"]
    lang_id: u64,
    #[get_copy = "pub"]
    remember: bool,
    #[get_copy = "pub"]
    logout: bool,
    #[get_copy = "pub"]
    watch: bool,
    #[get_copy = "pub"]
    watch_count: u64,
    #[get_copy = "pub"]
    watch_delay: Duration,
    #[get_copy = "pub"]
    is_gym: bool,
}

#[allow(clippy::too_many_arguments)]
impl SubmitRequest {
    pub fn new(
        contest_id: u64,
        problem_index: &str,
        code_file: PathBuf,
        lang: Option<u64>,
        remember: bool,
        logout: bool,
        watch: bool,
        watch_count: u64,
        watch_delay_ms: u64,
        is_gym: bool,
    ) -> Result<Self, CfError> {
        if remember && logout {
            return Err(CfError::Validation(
                "Please select either remember or logout, not both".to_owned(),
            ));
        }

        let problem_index = problem_index.parse()?;

        let meta = fs::metadata(&code_file).map_err(|err| {
            CfError::Validation(format!(
                "Could not access solution file '{}' : {}",
                code_file.display(),
                err
            ))
        })?;
        if !meta.is_file() {
            return Err(CfError::Validation(format!(
                "Not a file : '{}'",
                code_file.display()
            )));
        }

        let lang_id = match lang {
            Some(id) => {
                lang::find_by_id(id).ok_or_else(|| {
                    CfError::Validation(format!(
                        "Invalid language id '{}'. Type 'cf lang' to see the supported language list",
                        id
                    ))
                })?;
                id
            }
            None => {
                let ext = code_file
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_owned();
                lang::find_by_ext(&ext)
                    .ok_or_else(|| {
                        CfError::Validation(format!(
                            "Invalid language extension '.{}'. Type 'cf lang' to see the supported language list",
                            ext
                        ))
                    })?
                    .id
            }
        };

        Ok(Self {
            contest_id,
            problem_index,
            code_file,
            lang_id,
            remember,
            logout,
            watch,
            watch_count: watch_count.min(WATCH_COUNT_MAX).max(1),
            watch_delay: Duration::from_millis(watch_delay_ms).max(WATCH_DELAY_FLOOR),
            is_gym,
        })
    }

    /// Url segment selecting the contest namespace (`contest` or `gym`).
    pub fn arena(&self) -> &'static str {
        if self.is_gym {
            "gym"
        } else {
            "contest"
        }
    }
}

/// Judge outcome classification for a submitted solution.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Failed,
    Ok,
    Partial,
    CompilationError,
    RuntimeError,
    WrongAnswer,
    PresentationError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    IdlenessLimitExceeded,
    SecurityViolated,
    Crashed,
    InputPreparationCrashed,
    Challenged,
    Skipped,
    Testing,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl Verdict {
    /// Whether the verdict names a failing test case, so that the display
    /// can append `on test N`.
    pub fn names_failing_test(self) -> bool {
        matches!(
            self,
            Self::RuntimeError
                | Self::WrongAnswer
                | Self::PresentationError
                | Self::TimeLimitExceeded
                | Self::MemoryLimitExceeded
                | Self::IdlenessLimitExceeded
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Failed => "Failed",
            Self::Ok => "Accepted",
            Self::Partial => "Partial",
            Self::CompilationError => "Compilation error",
            Self::RuntimeError => "Runtime error",
            Self::WrongAnswer => "Wrong answer",
            Self::PresentationError => "Presentation error",
            Self::TimeLimitExceeded => "Time limit exceeded",
            Self::MemoryLimitExceeded => "Memory limit exceeded",
            Self::IdlenessLimitExceeded => "Idleness limit exceeded",
            Self::SecurityViolated => "Security Violated",
            Self::Crashed => "Crashed",
            Self::InputPreparationCrashed => "Input Preparation Crashed",
            Self::Challenged => "Challenged",
            Self::Skipped => "Skipped",
            Self::Testing => "Running on tests",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone)]
#[get = "pub"]
pub struct ProblemSummary {
    index: String,
    name: String,
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone, Default)]
#[get = "pub"]
pub struct Party {
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Serialize, Deserialize, Getters, Debug, Clone)]
#[get = "pub"]
pub struct Member {
    handle: String,
}

/// One submission as reported by the status endpoint. Read-only; owned by
/// the judge.
#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[get_copy = "pub"]
    id: u64,
    #[serde(default)]
    #[get_copy = "pub"]
    contest_id: Option<u64>,
    #[get = "pub"]
    problem: ProblemSummary,
    #[serde(default)]
    #[get_copy = "pub"]
    verdict: Option<Verdict>,
    #[serde(default)]
    #[get_copy = "pub"]
    passed_test_count: Option<u64>,
    #[serde(default)]
    #[get_copy = "pub"]
    time_consumed_millis: u64,
    #[serde(default)]
    #[get_copy = "pub"]
    memory_consumed_bytes: u64,
    #[get = "pub"]
    programming_language: String,
    #[serde(default)]
    #[get = "pub"]
    author: Party,
}

impl SubmissionRecord {
    /// A submission without a verdict is still in queue; `TESTING` means
    /// the judge is running it. Both keep a watch loop alive.
    pub fn is_pending(&self) -> bool {
        match self.verdict {
            None => true,
            Some(Verdict::Testing) => true,
            Some(_) => false,
        }
    }

    pub fn author_handle(&self) -> Option<&str> {
        self.author
            .members()
            .first()
            .map(|member| member.handle().as_str())
    }

    pub fn memory_kb(&self) -> u64 {
        self.memory_consumed_bytes / 1000
    }

    /// Human-readable verdict, appending the failing test number where the
    /// verdict names one.
    pub fn verdict_text(&self) -> String {
        match self.verdict {
            None => "In queue".to_owned(),
            Some(verdict) if verdict.names_failing_test() => format!(
                "{} on test {}",
                verdict,
                self.passed_test_count.unwrap_or(0) + 1
            ),
            Some(verdict) => verdict.to_string(),
        }
    }
}

/// Envelope of the judge's JSON API.
#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
}
