use super::*;
use chrono::Duration;

#[test]
fn fake_clock_advances_deterministically() {
    let start = Utc::now();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now(), start);
    clock.advance(Duration::seconds(30));
    assert_eq!(clock.now(), start + Duration::seconds(30));
}

#[test]
fn epoch_ms_is_non_negative() {
    let clock = FakeClock::new(Utc::now());
    assert!(clock.epoch_ms() > 0);
}
