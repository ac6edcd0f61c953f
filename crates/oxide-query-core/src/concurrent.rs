//! Fan-out helpers for independently issued asynchronous operations.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use futures::future::join_all;

/// Every failure from one batch of operations, in input order.
#[derive(Debug)]
pub struct AggregateError<E> {
    errors: Vec<E>,
    total: usize,
}

impl<E> AggregateError<E> {
    /// The individual failures.
    #[must_use]
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Consumes the aggregate, returning the individual failures.
    #[must_use]
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    /// Number of operations in the batch, successful or not.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} operations failed:\n{}",
            self.errors.len(),
            self.total,
            self.errors
                .iter()
                .map(|e| format!("  - {e}"))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

impl<E: StdError + 'static> StdError for AggregateError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.errors.first().map(|e| e as &(dyn StdError + 'static))
    }
}

/// Awaits every future, then returns all results or all failures.
///
/// No future is dropped early: a failure does not stop the others, so their
/// side effects always complete. On success the values keep input order.
///
/// # Errors
///
/// Returns an [`AggregateError`] holding every failure when at least one
/// future failed.
pub async fn all_as_list<I, F, T, E>(futures: I) -> Result<Vec<T>, AggregateError<E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let results = join_all(futures).await;
    let total = results.len();

    let mut values = Vec::with_capacity(total);
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(AggregateError { errors, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_as_list_keeps_order() {
        let futures = (1..=3).map(|n| async move { Ok::<_, String>(n * 10) });
        assert_eq!(all_as_list(futures).await.unwrap(), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_all_as_list_empty() {
        let futures: Vec<futures::future::Ready<Result<i32, String>>> = Vec::new();
        assert!(all_as_list(futures).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_as_list_collects_every_failure() {
        let futures = (1..=4).map(|n| async move {
            if n % 2 == 0 {
                Err(format!("failed {n}"))
            } else {
                Ok(n)
            }
        });
        let error = all_as_list(futures).await.unwrap_err();
        assert_eq!(error.total(), 4);
        assert_eq!(error.errors(), ["failed 2", "failed 4"]);
        assert_eq!(
            error.to_string(),
            "2 of 4 operations failed:\n  - failed 2\n  - failed 4"
        );
    }
}
