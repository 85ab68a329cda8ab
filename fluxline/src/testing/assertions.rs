//! Test assertions for recorded elements.

use std::fmt::Debug;

use super::Recorder;

/// Asserts that the recorder saw exactly `expected`, in order.
pub fn assert_recorded<T>(recorder: &Recorder<T>, expected: &[T])
where
    T: Debug + PartialEq,
{
    recorder.with_values(|actual| {
        assert_eq!(
            actual, expected,
            "Expected recorded values {expected:?}, got {actual:?}"
        );
    });
}

/// Asserts that the recorder saw exactly `expected` elements.
pub fn assert_recorded_len<T>(recorder: &Recorder<T>, expected: usize) {
    let actual = recorder.len();
    assert_eq!(
        actual, expected,
        "Expected {expected} recorded values, got {actual}"
    );
}
