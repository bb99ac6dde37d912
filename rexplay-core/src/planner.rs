//! Match/replace planning over the wrapped engine
//!
//! The planner compiles the request's pattern, decides between
//! whole-match and iterative-scan evaluation, and assembles the result:
//! one [`MatchSpan`] per reported group occurrence, each paired with the
//! source fragment of the pattern that captured it, plus an optional
//! substitution. All subject-text access goes through a
//! [`GuardedText`] so a cancelled evaluation stops at its next read.

use fancy_regex::{Captures, Regex, RegexBuilder};
use log::warn;

use crate::cancel::{CancelToken, GuardedText};
use crate::error::{EvalError, Result, TIMEOUT_MESSAGE};
use crate::scanner::{self, GroupDescriptor};

/// Default ceiling on engine backtracking steps per match attempt.
///
/// High enough that the wall-clock deadline is the governing bound for
/// interactive use, but finite so an abandoned worker terminates on its
/// own eventually.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1 << 30;

/// One evaluation request. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalRequest {
    /// The subject text to match against
    pub text: String,
    /// The regex pattern source
    pub pattern: String,
    /// Optional substitution template using `$1`-style backreferences
    pub replacement: Option<String>,
}

impl EvalRequest {
    /// Create a request with no replacement
    pub fn new(text: impl Into<String>, pattern: impl Into<String>) -> Self {
        EvalRequest {
            text: text.into(),
            pattern: pattern.into(),
            replacement: None,
        }
    }

    /// Attach a substitution template
    pub fn with_replacement(mut self, template: impl Into<String>) -> Self {
        self.replacement = Some(template.into());
        self
    }
}

/// A matched range of the subject text, paired with the source fragment
/// of the pattern that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// The pattern fragment this span belongs to
    pub descriptor: GroupDescriptor,
    /// Start byte offset into the subject text (inclusive)
    pub start: usize,
    /// End byte offset into the subject text (exclusive)
    pub end: usize,
}

/// The outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvalResult {
    /// The subject text (cleared on timeout)
    pub text: String,
    /// Whether the pattern matched the entire text
    pub matched_whole: bool,
    /// Matched spans, in occurrence order
    pub spans: Vec<MatchSpan>,
    /// The substitution result, when a replacement was supplied
    pub replaced: Option<String>,
    /// The failure message, when the evaluation did not complete cleanly
    pub error: Option<String>,
}

impl EvalResult {
    /// A result that passes the text through with no match data and no
    /// error
    pub fn passthrough(text: impl Into<String>) -> Self {
        EvalResult {
            text: text.into(),
            ..EvalResult::default()
        }
    }

    /// A result carrying a failure message alongside the original text
    pub fn failed(text: impl Into<String>, message: impl Into<String>) -> Self {
        EvalResult {
            text: text.into(),
            error: Some(message.into()),
            ..EvalResult::default()
        }
    }

    /// The canonical timeout result: all match data reset, text cleared,
    /// error set
    pub fn timed_out() -> Self {
        EvalResult {
            text: String::new(),
            matched_whole: false,
            spans: Vec::new(),
            replaced: Some(String::new()),
            error: Some(EvalError::Timeout.to_string()),
        }
    }

    /// Whether this is the canonical timeout result
    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some(TIMEOUT_MESSAGE)
    }
}

/// Runs the match/replace algorithm for one evaluation
#[derive(Debug, Clone)]
pub struct MatchPlanner {
    backtrack_limit: usize,
}

impl Default for MatchPlanner {
    fn default() -> Self {
        MatchPlanner::new(DEFAULT_BACKTRACK_LIMIT)
    }
}

impl MatchPlanner {
    /// Create a planner whose engine calls are capped at
    /// `backtrack_limit` backtracking steps
    pub fn new(backtrack_limit: usize) -> Self {
        MatchPlanner { backtrack_limit }
    }

    /// Evaluate a request to completion or to the first cancellation
    /// checkpoint that fires.
    ///
    /// Never panics and never returns an unhandled fault: compile
    /// failures, engine runtime failures, and cancellation all surface
    /// through [`EvalResult::error`].
    pub fn evaluate(&self, request: &EvalRequest, token: &CancelToken) -> EvalResult {
        if request.text.is_empty() || request.pattern.is_empty() {
            return EvalResult::passthrough(&request.text);
        }
        match self.run(request, token) {
            Ok(result) => result,
            Err(err) => EvalResult::failed(&request.text, err.to_string()),
        }
    }

    fn compile(&self, pattern: &str) -> std::result::Result<Regex, fancy_regex::Error> {
        RegexBuilder::new(pattern)
            .backtrack_limit(self.backtrack_limit)
            .build()
    }

    fn run(&self, request: &EvalRequest, token: &CancelToken) -> Result<EvalResult> {
        token.checkpoint()?;
        let guarded = GuardedText::new(&request.text, token.clone());

        let regex = match self.compile(&request.pattern) {
            Ok(regex) => regex,
            Err(err) => {
                return Ok(EvalResult::failed(
                    &request.text,
                    EvalError::Compile(err).to_string(),
                ));
            }
        };

        let fragments = scanner::capture_fragments(&request.pattern);
        let engine_groups = regex.captures_len().saturating_sub(1);
        let mapped: Option<&[GroupDescriptor]> = if fragments.len() == engine_groups {
            Some(&fragments)
        } else {
            // Mis-pairing spans would silently attribute text to the
            // wrong pattern fragment, so source mapping is skipped
            // outright when the counts disagree.
            warn!(
                "scanner found {} capture fragments but engine assigned {} groups for {:?}; \
                 skipping source mapping",
                fragments.len(),
                engine_groups,
                request.pattern
            );
            None
        };

        // Whole-match mode first: anchor the pattern at both ends. The
        // wrapper is non-capturing, so group numbers are unchanged.
        if let Ok(anchored) = self.compile(&format!(r"\A(?:{})\z", request.pattern)) {
            token.checkpoint()?;
            if let Some(caps) = anchored
                .captures_from_pos(guarded.as_str()?, 0)
                .map_err(EvalError::Engine)?
            {
                return self.whole_match(request, &caps, mapped);
            }
        }

        self.iterative_scan(request, &guarded, &regex, mapped, token)
    }

    /// The pattern matched the entire text: emit one span per
    /// participating capture group and apply at most one substitution.
    fn whole_match(
        &self,
        request: &EvalRequest,
        caps: &Captures<'_>,
        mapped: Option<&[GroupDescriptor]>,
    ) -> Result<EvalResult> {
        let mut spans = Vec::new();
        if let Some(fragments) = mapped {
            for (i, descriptor) in fragments.iter().enumerate() {
                if let Some(m) = caps.get(i + 1) {
                    spans.push(MatchSpan {
                        descriptor: descriptor.clone(),
                        start: m.start(),
                        end: m.end(),
                    });
                }
            }
        }

        let replaced = match request.replacement.as_deref() {
            Some(template) if !template.is_empty() => {
                let mut out = String::new();
                caps.expand(template, &mut out);
                Some(out)
            }
            _ => None,
        };

        Ok(EvalResult {
            text: request.text.clone(),
            matched_whole: true,
            spans,
            replaced,
            error: None,
        })
    }

    /// The pattern did not cover the whole text: report every
    /// non-overlapping occurrence, each as one synthesized whole-match
    /// span plus its distinct subgroup spans, and substitute globally.
    fn iterative_scan(
        &self,
        request: &EvalRequest,
        guarded: &GuardedText<'_>,
        regex: &Regex,
        mapped: Option<&[GroupDescriptor]>,
        token: &CancelToken,
    ) -> Result<EvalResult> {
        let whole = GroupDescriptor::whole_pattern(&request.pattern);
        let template = request
            .replacement
            .as_deref()
            .filter(|t| !t.is_empty());

        let mut spans = Vec::new();
        let mut replaced = template.map(|_| String::new());
        let mut last_end = 0usize;
        let mut pos = 0usize;

        while pos <= guarded.len() {
            token.checkpoint()?;
            let caps = match regex
                .captures_from_pos(guarded.as_str()?, pos)
                .map_err(EvalError::Engine)?
            {
                Some(caps) => caps,
                None => break,
            };
            let Some(occurrence) = caps.get(0) else {
                break;
            };
            let (start, end) = (occurrence.start(), occurrence.end());

            spans.push(MatchSpan {
                descriptor: whole.clone(),
                start,
                end,
            });
            if let Some(fragments) = mapped {
                for (i, descriptor) in fragments.iter().enumerate() {
                    if let Some(m) = caps.get(i + 1) {
                        // A subgroup span identical to the occurrence
                        // span would just repeat the synthesized one.
                        if m.start() == start && m.end() == end {
                            continue;
                        }
                        spans.push(MatchSpan {
                            descriptor: descriptor.clone(),
                            start: m.start(),
                            end: m.end(),
                        });
                    }
                }
            }

            if let (Some(buf), Some(template)) = (replaced.as_mut(), template) {
                buf.push_str(guarded.slice(last_end, start)?);
                caps.expand(template, buf);
                last_end = end;
            }

            // An empty occurrence must not stall the scan.
            pos = if end > start {
                end
            } else {
                match guarded.slice(end, guarded.len())?.chars().next() {
                    Some(c) => end + c.len_utf8(),
                    None => break,
                }
            };
        }

        if let Some(buf) = replaced.as_mut() {
            buf.push_str(guarded.slice(last_end, guarded.len())?);
        }

        Ok(EvalResult {
            text: request.text.clone(),
            matched_whole: false,
            spans,
            replaced,
            error: None,
        })
    }
}
