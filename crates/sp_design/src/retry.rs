//! Bounded retries.
//!
//! A search step either accepts a candidate, rejects it (and may be
//! tried again), or aborts with an error that no retry can fix.
//!

#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T, R> {
    Accepted(T),
    Rejected(R),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryError<R, E> {
    /// All attempts were rejected; holds the last rejection.
    Exhausted { attempts: usize, last: Option<R> },
    Aborted(E),
}

/// Run `attempt` with attempt numbers `1..=max_attempts` until one is
/// accepted. Returns the accepted value and its attempt number.
pub fn bounded_attempts<T, R, E>(
    max_attempts: usize,
    mut attempt: impl FnMut(usize) -> Result<Attempt<T, R>, E>,
) -> Result<(T, usize), RetryError<R, E>> {
    let mut last = None;
    for n in 1..=max_attempts {
        match attempt(n).map_err(RetryError::Aborted)? {
            Attempt::Accepted(value) => return Ok((value, n)),
            Attempt::Rejected(reason) => last = Some(reason),
        }
    }
    Err(RetryError::Exhausted { attempts: max_attempts, last })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_first_success() {
        let mut calls = Vec::new();
        let r: Result<_, RetryError<&str, ()>> = bounded_attempts(5, |n| {
            calls.push(n);
            Ok(if n == 3 { Attempt::Accepted(n * 10) } else { Attempt::Rejected("no") })
        });
        assert_eq!(r, Ok((30, 3)));
        assert_eq!(calls, vec![1, 2, 3]);
    }

    #[test]
    fn test_exhausted() {
        let r: Result<((), usize), _> = bounded_attempts(2, |n| {
            Ok::<_, ()>(Attempt::Rejected(n))
        });
        assert_eq!(r, Err(RetryError::Exhausted { attempts: 2, last: Some(2) }));

        let r: Result<((), usize), RetryError<(), ()>> = bounded_attempts(0, |_| unreachable!());
        assert_eq!(r, Err(RetryError::Exhausted { attempts: 0, last: None }));
    }

    #[test]
    fn test_aborted() {
        let mut calls = 0;
        let r: Result<((), usize), RetryError<(), &str>> = bounded_attempts(5, |_| {
            calls += 1;
            Err("broken")
        });
        assert_eq!(r, Err(RetryError::Aborted("broken")));
        assert_eq!(calls, 1);
    }
}
