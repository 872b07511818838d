//! Topic and payload formatting.
//!
//! Topic: `{prefix}/{sensor-hex}` with no doubled or leading separator.
//! Payload: fixed-point decimal text with six fractional digits.

use crate::config::{PAYLOAD_BUFFER_SIZE, TOPIC_BUFFER_SIZE};
use crate::error::Error;
use crate::sensor::SensorId;
use core::fmt::Write;

/// Path separator between topic levels.
pub const SEPARATOR: char = '/';

/// Formatted publish topic.
pub type Topic = heapless::String<TOPIC_BUFFER_SIZE>;

/// Formatted publish payload.
pub type Payload = heapless::String<PAYLOAD_BUFFER_SIZE>;

/// Build the publish topic for one sensor.
///
/// Trailing separators on the prefix are collapsed into one, and a leading
/// separator on the result is stripped, so an empty prefix yields the bare
/// sensor hex.
pub fn format_topic(prefix: &str, id: &SensorId) -> Result<Topic, Error> {
    let prefix = prefix
        .trim_end_matches(SEPARATOR)
        .trim_start_matches(SEPARATOR);

    let mut topic = Topic::new();
    if !prefix.is_empty() {
        topic.push_str(prefix).map_err(|_| Error::TopicTooLong)?;
        topic.push(SEPARATOR).map_err(|_| Error::TopicTooLong)?;
    }
    topic
        .push_str(id.as_hex())
        .map_err(|_| Error::TopicTooLong)?;
    Ok(topic)
}

/// Render a temperature as the publish payload (e.g. `"20.500000"`).
pub fn format_payload(celsius: f32) -> Result<Payload, Error> {
    let mut payload = Payload::new();
    write!(payload, "{:.6}", celsius).map_err(|_| Error::PayloadTooLong)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SensorId {
        SensorId::new([0x28, 0xAA, 0, 0, 0, 0, 0, 0x01])
    }

    #[test]
    fn test_topic_basic() {
        let topic = format_topic("home/pipes", &id()).unwrap();
        assert_eq!(topic.as_str(), "home/pipes/28AA000000000001");
    }

    #[test]
    fn test_topic_prefix_trailing_separator() {
        let topic = format_topic("home/pipes/", &id()).unwrap();
        assert_eq!(topic.as_str(), "home/pipes/28AA000000000001");
        assert!(!topic.contains("//"));
    }

    #[test]
    fn test_topic_leading_separator_stripped() {
        let topic = format_topic("", &id()).unwrap();
        assert_eq!(topic.as_str(), "28AA000000000001");

        let topic = format_topic("/", &id()).unwrap();
        assert_eq!(topic.as_str(), "28AA000000000001");

        let topic = format_topic("/home", &id()).unwrap();
        assert_eq!(topic.as_str(), "home/28AA000000000001");
    }

    #[test]
    fn test_topic_too_long() {
        let prefix = "abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz";
        assert_eq!(format_topic(prefix, &id()), Err(Error::TopicTooLong));
    }

    #[test]
    fn test_payload_fixed_point() {
        assert_eq!(format_payload(10.0).unwrap().as_str(), "10.000000");
        assert_eq!(format_payload(20.5).unwrap().as_str(), "20.500000");
        assert_eq!(format_payload(-5.25).unwrap().as_str(), "-5.250000");
    }

    #[test]
    fn test_payload_too_long() {
        assert_eq!(format_payload(1.0e12), Err(Error::PayloadTooLong));
    }
}
