//! State of a long-running request.

/// One value for "not started / in flight / done / failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncOperation<T, E> {
    Idle,
    Loading,
    Success(T),
    Failure(E),
}

impl<T, E> Default for AsyncOperation<T, E> {
    fn default() -> Self {
        AsyncOperation::Idle
    }
}

impl<T, E> AsyncOperation<T, E> {
    /// Mark the operation as in flight, dropping any previous outcome.
    pub fn start(&mut self) {
        *self = AsyncOperation::Loading;
    }

    pub fn resolve(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => AsyncOperation::Success(value),
            Err(error) => AsyncOperation::Failure(error),
        };
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncOperation::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncOperation::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncOperation::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            AsyncOperation::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AsyncOperation<U, E> {
        match self {
            AsyncOperation::Idle => AsyncOperation::Idle,
            AsyncOperation::Loading => AsyncOperation::Loading,
            AsyncOperation::Success(value) => AsyncOperation::Success(f(value)),
            AsyncOperation::Failure(error) => AsyncOperation::Failure(error),
        }
    }

    /// Take the finished outcome, leaving the operation idle.
    pub fn take(&mut self) -> Option<Result<T, E>> {
        match std::mem::take(self) {
            AsyncOperation::Success(value) => Some(Ok(value)),
            AsyncOperation::Failure(error) => Some(Err(error)),
            other => {
                *self = other;
                None
            }
        }
    }
}

impl<T, E> From<Result<T, E>> for AsyncOperation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        let mut op = AsyncOperation::Idle;
        op.resolve(result);
        op
    }
}
