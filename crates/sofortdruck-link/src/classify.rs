// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Best-effort classification of raw transport errors into the four
// user-facing connection failure categories.
//
// The external printer package surfaces transport failures as free-text
// descriptions, not structured codes, so this is substring matching against
// that text. Known weakness: locale or format changes in the underlying
// error text silently fall through to the generic bucket (DNS failures
// already do). Kept as-is deliberately; callers should not grow new
// substring patterns without a captured error string to justify them.

use sofortdruck_core::error::SofortError;

/// Bucket a raw transport error description into a connection category.
pub fn classify_transport_error(detail: &str) -> SofortError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("connection refused") || lower.contains("refused") {
        return SofortError::PrinterNotFound;
    }
    if lower.contains("unreachable") {
        return SofortError::NetworkUnreachable;
    }
    if lower.contains("timed out") || lower.contains("timeout") {
        return SofortError::ConnectionTimedOut;
    }

    SofortError::ConnectionFailed(detail.to_string())
}

/// Refine an error from the collaborator: generic transport failures are
/// re-bucketed by their description, everything else passes through.
pub fn refine(err: SofortError) -> SofortError {
    match err {
        SofortError::ConnectionFailed(detail) => classify_transport_error(&detail),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_maps_to_printer_not_found() {
        assert!(matches!(
            classify_transport_error("Connection refused (os error 61)"),
            SofortError::PrinterNotFound
        ));
    }

    #[test]
    fn unreachable_maps_to_network_unreachable() {
        assert!(matches!(
            classify_transport_error("Network is unreachable (os error 51)"),
            SofortError::NetworkUnreachable
        ));
    }

    #[test]
    fn timeout_maps_to_timed_out() {
        assert!(matches!(
            classify_transport_error("operation timed out"),
            SofortError::ConnectionTimedOut
        ));
        assert!(matches!(
            classify_transport_error("handshake timeout"),
            SofortError::ConnectionTimedOut
        ));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(matches!(
            classify_transport_error("CONNECTION REFUSED"),
            SofortError::PrinterNotFound
        ));
    }

    #[test]
    fn unknown_text_falls_through_to_generic() {
        // DNS failures land here too — a known loss of information.
        let err = classify_transport_error("failed to lookup address information");
        match err {
            SofortError::ConnectionFailed(detail) => {
                assert!(detail.contains("lookup"));
            }
            other => panic!("expected generic bucket, got {other:?}"),
        }
    }

    #[test]
    fn refine_leaves_classified_errors_alone() {
        assert!(matches!(
            refine(SofortError::ConnectionTimedOut),
            SofortError::ConnectionTimedOut
        ));
        assert!(matches!(
            refine(SofortError::EncodingFailed("x".into())),
            SofortError::EncodingFailed(_)
        ));
    }

    #[test]
    fn refine_rebuckets_generic_transport_text() {
        assert!(matches!(
            refine(SofortError::ConnectionFailed("connection refused".into())),
            SofortError::PrinterNotFound
        ));
    }
}
