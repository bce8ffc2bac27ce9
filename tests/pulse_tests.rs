//! Integration tests for the Morse pulse encoder

mod common;
use common::*;

use led_channel_engine::pulse::{MAX_PULSE_SYMBOLS, encode_with_timing};
use led_channel_engine::{
    EncodeError, PulseSequence, PulseSymbol, PulseTiming, encode, encode_with_unit,
};

fn on(millis: u64) -> PulseSymbol<TestDuration> {
    PulseSymbol::on(TestDuration(millis))
}

fn off(millis: u64) -> PulseSymbol<TestDuration> {
    PulseSymbol::off(TestDuration(millis))
}

fn encode_default(text: &str) -> Result<PulseSequence<TestDuration, MAX_PULSE_SYMBOLS>, EncodeError> {
    encode(text)
}

#[test]
fn sos_encodes_with_international_timing() {
    let sequence = encode_default("sos").unwrap();

    let mut expected = vec![off(450)];
    for _ in 0..3 {
        expected.extend([on(150), off(150)]);
    }
    expected.push(off(450));
    for _ in 0..3 {
        expected.extend([on(450), off(150)]);
    }
    expected.push(off(450));
    for _ in 0..3 {
        expected.extend([on(150), off(150)]);
    }
    expected.push(off(450));

    assert_eq!(sequence.symbols(), expected.as_slice());
    assert_eq!(sequence.len(), 22);
}

#[test]
fn space_inserts_word_gap() {
    let sequence = encode_default("e t").unwrap();

    assert_eq!(
        sequence.symbols(),
        &[
            off(450),
            on(150),
            off(150),
            off(450),
            off(1050),
            on(450),
            off(150),
            off(450),
        ]
    );
}

#[test]
fn empty_text_is_lead_in_only() {
    let sequence = encode_default("").unwrap();
    assert_eq!(sequence.symbols(), &[off(450)]);
}

#[test]
fn digit_is_rejected_with_its_position() {
    let result = encode_default("ab1");
    assert_eq!(
        result.unwrap_err(),
        EncodeError::UnsupportedCharacter {
            character: '1',
            position: 2
        }
    );
}

#[test]
fn uppercase_and_punctuation_are_rejected() {
    assert!(matches!(
        encode_default("Sos"),
        Err(EncodeError::UnsupportedCharacter { character: 'S', .. })
    ));
    assert!(matches!(
        encode_default("sos!"),
        Err(EncodeError::UnsupportedCharacter { character: '!', .. })
    ));
}

#[test]
fn non_ascii_character_is_rejected() {
    assert!(matches!(
        encode_default("né"),
        Err(EncodeError::UnsupportedCharacter {
            character: 'é',
            position: 1
        })
    ));
}

#[test]
fn longest_message_fits_capacity() {
    // Lead-in plus 7 symbols per "o": 1 + 28 * 7 = 197
    let text = "o".repeat(28);
    let sequence = encode_default(&text).unwrap();
    assert_eq!(sequence.len(), 197);
}

#[test]
fn message_over_capacity_is_rejected() {
    // 1 + 29 * 7 = 204
    let text = "o".repeat(29);
    assert_eq!(
        encode_default(&text).unwrap_err(),
        EncodeError::CapacityExceeded {
            capacity: MAX_PULSE_SYMBOLS
        }
    );
}

#[test]
fn small_capacity_rejects_sos() {
    let result = encode::<TestDuration, 10>("sos");
    assert_eq!(
        result.unwrap_err(),
        EncodeError::CapacityExceeded { capacity: 10 }
    );
}

#[test]
fn custom_unit_scales_every_element() {
    let sequence = encode_with_unit::<TestDuration, 16>("a", TestDuration(100)).unwrap();

    assert_eq!(
        sequence.symbols(),
        &[off(300), on(100), off(100), on(300), off(100), off(300)]
    );
}

#[test]
fn explicit_timing_is_used_verbatim() {
    let timing = PulseTiming {
        dot: TestDuration(10),
        dash: TestDuration(40),
        symbol_gap: TestDuration(5),
        letter_gap: TestDuration(20),
        word_gap: TestDuration(70),
    };
    let sequence = encode_with_timing::<TestDuration, 16>("t e", &timing).unwrap();

    assert_eq!(
        sequence.symbols(),
        &[
            off(20),
            on(40),
            off(5),
            off(20),
            off(70),
            on(10),
            off(5),
            off(20),
        ]
    );
}

#[test]
fn total_duration_sums_all_symbols() {
    let sequence = encode_default("sos").unwrap();
    // 450 lead-in + 1350 (s) + 2250 (o) + 1350 (s)
    assert_eq!(sequence.total_duration(), TestDuration(5400));
}

#[test]
fn error_messages_format_correctly_for_display() {
    let unsupported = EncodeError::UnsupportedCharacter {
        character: '7',
        position: 3,
    };
    assert_eq!(
        format!("{}", unsupported),
        "unsupported character '7' at position 3"
    );
    assert_eq!(
        format!("{}", EncodeError::CapacityExceeded { capacity: 200 }),
        "pulse pattern exceeds capacity of 200 symbols"
    );
}
