//! Hot-reload plumbing: where change notifications come from and how hard
//! to retry a reload whose file is still being written.

use std::{thread, time::Duration};

use crate::error::AssetResult;

/// Delivers the paths of files that changed since the last poll.
pub trait ChangeSource {
    fn poll_changes(&mut self) -> Vec<String>;
}

/// Retry-with-backoff settings for reloads triggered by change notifications.
#[derive(Clone, Debug, PartialEq)]
pub struct ReloadPolicy {
    /// Total tries, including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    /// Growth factor applied to the delay after each failed attempt.
    pub multiplier: f32,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            multiplier: 2.0,
        }
    }
}

impl ReloadPolicy {
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    /// Returns the value and the number of attempts used.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> AssetResult<T>) -> AssetResult<(T, u32)> {
        let mut delay = self.initial_backoff;
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    log::warn!(
                        "Reloading {what} failed (attempt {attempt}/{}): {e}; retrying in {delay:?}",
                        self.max_attempts
                    );
                    thread::sleep(delay);
                    delay = delay.mul_f32(self.multiplier);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssetError, FormatError};

    fn io_error(path: &str) -> AssetError {
        AssetError::Io {
            path: path.into(),
            source: std::io::Error::other("sharing violation"),
        }
    }

    #[test]
    fn retries_transient_failures() {
        let mut calls = 0;
        let (value, attempts) = ReloadPolicy::immediate(4)
            .run("a.png", || {
                calls += 1;
                if calls < 3 { Err(io_error("a.png")) } else { Ok(calls) }
            })
            .expect("eventually succeeds");
        assert_eq!((value, attempts), (3, 3));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: AssetResult<((), u32)> = ReloadPolicy::immediate(2).run("a.png", || {
            calls += 1;
            Err(io_error("a.png"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn format_errors_are_not_retried() {
        let mut calls = 0;
        let result: AssetResult<((), u32)> = ReloadPolicy::immediate(5).run("a.obj", || {
            calls += 1;
            Err(AssetError::format("a.obj", FormatError::FaceCornerCount { line: 1 }))
        });
        assert!(matches!(result, Err(AssetError::Format { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let mut calls = 0;
        let _ = ReloadPolicy::immediate(0).run("x", || -> AssetResult<()> {
            calls += 1;
            Err(io_error("x"))
        });
        assert_eq!(calls, 1);
    }
}
