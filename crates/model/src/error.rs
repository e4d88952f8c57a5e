/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider is rate limited.
    RateLimited,
    /// The credentials were rejected by the provider.
    Auth,
    /// A network-level failure that may succeed when retried, including
    /// request timeouts and provider-side server errors.
    TransientNetwork,
    /// The provider returned a payload that could not be understood.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Returns whether a request failing with this kind may be retried.
    #[inline]
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::TransientNetwork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::TransientNetwork.is_retryable());
        assert!(!ErrorKind::Auth.is_retryable());
        assert!(!ErrorKind::InvalidResponse.is_retryable());
        assert!(!ErrorKind::Other.is_retryable());
    }
}
