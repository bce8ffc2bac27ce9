//! Morse pulse encoding.
//!
//! [`encode`] turns a short lowercase ASCII text into a [`PulseSequence`]: an
//! ordered list of timed on/off [`PulseSymbol`]s using the international
//! timing ratios, all expressed as multiples of a base unit:
//!
//! | element              | output | length |
//! |----------------------|--------|--------|
//! | dot                  | on     | 1 unit |
//! | dash                 | on     | 3 units|
//! | gap inside a letter  | off    | 1 unit |
//! | gap between letters  | off    | 3 units|
//! | gap between words    | off    | 7 units|
//!
//! Encoding is pure and all-or-nothing: any unsupported character or a
//! sequence that does not fit its capacity rejects the whole text.

use crate::time::TimeDuration;
use heapless::Vec;

/// Symbol capacity used by the LED engine, enough for messages of roughly
/// a dozen letters.
pub const MAX_PULSE_SYMBOLS: usize = 200;

/// Default base unit (dot length) in milliseconds.
pub const DEFAULT_UNIT_MILLIS: u64 = 150;

/// One timed element of a pulse pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSymbol<D: TimeDuration> {
    /// Whether the output emits light during this symbol.
    pub emit: bool,

    /// How long the symbol lasts.
    pub duration: D,
}

impl<D: TimeDuration> PulseSymbol<D> {
    /// Creates an emitting symbol.
    #[inline]
    pub fn on(duration: D) -> Self {
        Self {
            emit: true,
            duration,
        }
    }

    /// Creates a silent symbol.
    #[inline]
    pub fn off(duration: D) -> Self {
        Self {
            emit: false,
            duration,
        }
    }
}

/// Pulse encoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The text contains a character with no Morse pattern.
    UnsupportedCharacter {
        /// The offending character.
        character: char,
        /// Its byte offset in the text.
        position: usize,
    },

    /// The encoded pattern does not fit the sequence capacity.
    CapacityExceeded {
        /// Capacity of the sequence.
        capacity: usize,
    },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::UnsupportedCharacter {
                character,
                position,
            } => {
                write!(
                    f,
                    "unsupported character {:?} at position {}",
                    character, position
                )
            }
            EncodeError::CapacityExceeded { capacity } => {
                write!(f, "pulse pattern exceeds capacity of {} symbols", capacity)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

/// Symbol lengths derived from a base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming<D: TimeDuration> {
    /// Dot length (1 unit).
    pub dot: D,
    /// Dash length (3 units).
    pub dash: D,
    /// Silence between the dots and dashes of a letter (1 unit).
    pub symbol_gap: D,
    /// Silence between letters (3 units).
    pub letter_gap: D,
    /// Silence between words (7 units).
    pub word_gap: D,
}

impl<D: TimeDuration> PulseTiming<D> {
    /// Derives all lengths from a base unit.
    pub fn from_unit(unit: D) -> Self {
        let unit_millis = unit.as_millis();
        Self {
            dot: unit,
            dash: D::from_millis(unit_millis.saturating_mul(3)),
            symbol_gap: unit,
            letter_gap: D::from_millis(unit_millis.saturating_mul(3)),
            word_gap: D::from_millis(unit_millis.saturating_mul(7)),
        }
    }
}

impl<D: TimeDuration> Default for PulseTiming<D> {
    fn default() -> Self {
        Self::from_unit(D::from_millis(DEFAULT_UNIT_MILLIS))
    }
}

/// A bounded, ordered pulse pattern ready for playback.
///
/// # Type Parameters
/// * `D` - The duration type
/// * `N` - Maximum number of symbols
#[derive(Debug, Clone)]
pub struct PulseSequence<D: TimeDuration, const N: usize> {
    symbols: Vec<PulseSymbol<D>, N>,
}

impl<D: TimeDuration, const N: usize> PulseSequence<D, N> {
    /// Creates an empty sequence.
    pub const fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Appends a symbol.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the sequence already holds `N` symbols.
    pub fn push(&mut self, symbol: PulseSymbol<D>) -> Result<(), EncodeError> {
        self.symbols
            .push(symbol)
            .map_err(|_| EncodeError::CapacityExceeded { capacity: N })
    }

    /// Returns the symbol at `index`.
    pub fn get(&self, index: usize) -> Option<&PulseSymbol<D>> {
        self.symbols.get(index)
    }

    /// Returns the number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the sequence holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns all symbols in playback order.
    pub fn symbols(&self) -> &[PulseSymbol<D>] {
        &self.symbols
    }

    /// Sums the duration of every symbol.
    pub fn total_duration(&self) -> D {
        let total: u64 = self
            .symbols
            .iter()
            .map(|symbol| symbol.duration.as_millis())
            .fold(0, u64::saturating_add);
        D::from_millis(total)
    }
}

impl<D: TimeDuration, const N: usize> Default for PulseSequence<D, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the dot/dash pattern for a lowercase letter.
pub fn symbol_for(c: char) -> Option<&'static str> {
    let pattern = match c {
        'a' => ".-",
        'b' => "-...",
        'c' => "-.-.",
        'd' => "-..",
        'e' => ".",
        'f' => "..-.",
        'g' => "--.",
        'h' => "....",
        'i' => "..",
        'j' => ".---",
        'k' => "-.-",
        'l' => ".-..",
        'm' => "--",
        'n' => "-.",
        'o' => "---",
        'p' => ".--.",
        'q' => "--.-",
        'r' => ".-.",
        's' => "...",
        't' => "-",
        'u' => "..-",
        'v' => "...-",
        'w' => ".--",
        'x' => "-..-",
        'y' => "-.--",
        'z' => "--..",
        _ => return None,
    };
    Some(pattern)
}

/// Encodes `text` with the default 150 ms unit.
///
/// # Errors
/// See [`encode_with_timing`].
pub fn encode<D: TimeDuration, const N: usize>(
    text: &str,
) -> Result<PulseSequence<D, N>, EncodeError> {
    encode_with_timing(text, &PulseTiming::default())
}

/// Encodes `text` with a custom base unit.
///
/// # Errors
/// See [`encode_with_timing`].
pub fn encode_with_unit<D: TimeDuration, const N: usize>(
    text: &str,
    unit: D,
) -> Result<PulseSequence<D, N>, EncodeError> {
    encode_with_timing(text, &PulseTiming::from_unit(unit))
}

/// Encodes `text` into a pulse sequence.
///
/// The pattern opens with one letter gap of silence. A space adds a word gap;
/// each letter adds its dots and dashes, each followed by a symbol gap, and
/// then a letter gap.
///
/// # Errors
/// * `UnsupportedCharacter` - `text` contains anything but `a`-`z` and space
/// * `CapacityExceeded` - the pattern needs more than `N` symbols
pub fn encode_with_timing<D: TimeDuration, const N: usize>(
    text: &str,
    timing: &PulseTiming<D>,
) -> Result<PulseSequence<D, N>, EncodeError> {
    let mut sequence = PulseSequence::new();
    sequence.push(PulseSymbol::off(timing.letter_gap))?;

    for (position, character) in text.char_indices() {
        if character == ' ' {
            sequence.push(PulseSymbol::off(timing.word_gap))?;
            continue;
        }

        let pattern = symbol_for(character).ok_or(EncodeError::UnsupportedCharacter {
            character,
            position,
        })?;

        for mark in pattern.bytes() {
            let length = if mark == b'.' { timing.dot } else { timing.dash };
            sequence.push(PulseSymbol::on(length))?;
            sequence.push(PulseSymbol::off(timing.symbol_gap))?;
        }
        sequence.push(PulseSymbol::off(timing.letter_gap))?;
    }

    Ok(sequence)
}
