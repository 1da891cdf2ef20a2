use std::time::Duration;

use tugbot::duration::parse_duration;
use tugbot::errors::TugbotError;

#[test]
fn single_units() {
    let cases = [
        ("1500ns", Duration::from_nanos(1500)),
        ("250us", Duration::from_micros(250)),
        ("250µs", Duration::from_micros(250)),
        ("250ms", Duration::from_millis(250)),
        ("10s", Duration::from_secs(10)),
        ("5m", Duration::from_secs(300)),
        ("2h", Duration::from_secs(7200)),
    ];
    for (input, expected) in cases {
        assert_eq!(parse_duration(input).ok(), Some(expected), "input {input:?}");
    }
}

#[test]
fn compound_and_fractional_values() {
    assert_eq!(parse_duration("1m30s").ok(), Some(Duration::from_secs(90)));
    assert_eq!(parse_duration("1h2m3s").ok(), Some(Duration::from_secs(3723)));
    assert_eq!(parse_duration("1.5h").ok(), Some(Duration::from_secs(5400)));
    assert_eq!(parse_duration(".5s").ok(), Some(Duration::from_millis(500)));
    assert_eq!(parse_duration(" +10s ").ok(), Some(Duration::from_secs(10)));
}

#[test]
fn rejects_invalid_input() {
    for input in ["", "   ", "10", "s", "10x", "-1s", "0s", "0h0m", "1..5s", "1m-3s"] {
        match parse_duration(input) {
            Err(TugbotError::InvalidDuration(msg)) => {
                assert!(msg.contains(input.trim()), "message {msg:?} should quote input");
            }
            other => panic!("Expected InvalidDuration for {input:?}, got: {other:?}"),
        }
    }
}
