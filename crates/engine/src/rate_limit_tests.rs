use super::*;
use ao_core::FakeClock;
use chrono::TimeZone;

fn clock_at(secs: i64) -> (Arc<dyn Clock>, FakeClock) {
    let start = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
    let fake = FakeClock::new(start);
    (Arc::new(fake.clone()), fake)
}

#[test]
fn record_rate_limit_floors_reset_at_to_the_minimum() {
    let (clock, _fake) = clock_at(0);
    let tracker = RateLimitTracker::new(clock.clone());

    let now = clock.now();
    tracker.record_rate_limit("codex", now + ChronoDuration::seconds(5), "429");

    let entry = tracker.get_entry("codex").unwrap();
    assert!(entry.reset_at >= now + ChronoDuration::milliseconds(DEFAULT_MIN_RESET_FLOOR_MS));
    assert!(tracker.is_rate_limited("codex"));
}

#[test]
fn is_rate_limited_expires_and_evicts_after_reset_at() {
    let (clock, fake) = clock_at(0);
    let tracker = RateLimitTracker::new(clock.clone()).with_min_reset_floor_ms(1_000);

    let now = clock.now();
    tracker.record_rate_limit("codex", now + ChronoDuration::milliseconds(1_000), "429");
    assert!(tracker.is_rate_limited("codex"));

    fake.advance(ChronoDuration::milliseconds(1_001));
    assert!(!tracker.is_rate_limited("codex"));
    assert!(tracker.get_entry("codex").is_none());
}

#[test]
fn fallback_chain_resolves_to_first_unlimited_executable() {
    let (clock, _fake) = clock_at(0);
    let tracker = RateLimitTracker::new(clock.clone());
    tracker.set_fallback_chain("codex", vec!["claude".to_string(), "aider".to_string()]);

    let now = clock.now();
    tracker.record_rate_limit("codex", now, "429");
    tracker.record_rate_limit("claude", now, "429");

    assert_eq!(tracker.get_available_executable("codex"), "aider");
}

#[test]
fn fallback_chain_returns_preferred_when_nothing_is_available() {
    let (clock, _fake) = clock_at(0);
    let tracker = RateLimitTracker::new(clock.clone());
    tracker.set_fallback_chain("codex", vec!["claude".to_string()]);

    let now = clock.now();
    tracker.record_rate_limit("codex", now, "429");
    tracker.record_rate_limit("claude", now, "429");

    assert_eq!(tracker.get_available_executable("codex"), "codex");
}

#[test]
fn get_available_executable_passes_through_when_unlimited() {
    let (clock, _fake) = clock_at(0);
    let tracker = RateLimitTracker::new(clock);
    assert_eq!(tracker.get_available_executable("codex"), "codex");
}

#[test]
fn detect_from_output_matches_known_patterns_case_insensitively() {
    let now = Utc::now();
    for text in [
        "Rate limit exceeded",
        "RATE-LIMIT hit",
        "Too Many Requests",
        "HTTP 429",
        "quota exceeded for today",
        "request throttled",
    ] {
        let detection = detect_from_output(text, now);
        assert!(detection.detected, "expected detection for {text:?}");
    }
}

#[test]
fn detect_from_output_ignores_unrelated_text() {
    let detection = detect_from_output("build succeeded", Utc::now());
    assert!(!detection.detected);
    assert_eq!(detection, OutputDetection::none());
}

#[test]
fn detect_from_output_parses_relative_duration_within_one_second() {
    let now = Utc::now();
    let detection = detect_from_output("please try again in 5 minutes", now);
    assert!(detection.detected);
    let reset_at = detection.reset_at.unwrap();
    let expected = now + ChronoDuration::minutes(5);
    assert!((reset_at - expected).num_milliseconds().abs() < 1_000);
}

#[test]
fn detect_from_output_parses_absolute_reset_time() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let detection = detect_from_output("limit resets at 2023-11-15T10:30:00", now);
    assert!(detection.detected);
    assert_eq!(
        detection.reset_at,
        Some(Utc.with_ymd_and_hms(2023, 11, 15, 10, 30, 0).unwrap())
    );
}

#[test]
fn detect_rapid_exit_true_inside_window_false_outside() {
    let threshold = DEFAULT_RAPID_EXIT_THRESHOLD_MS as u64;
    assert!(detect_rapid_exit(0, 9_999, threshold));
    assert!(!detect_rapid_exit(0, 10_000, threshold));
}
