//! # Delay Line (Power-of-Two Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! chosen time delay. Delay, chorus and flanger effects are all built
//! on top of one.
//!
//! ## How the Ring Works
//!
//! A "write head" records incoming audio into a `Vec<f32>` and a "read
//! head" plays it back from a position further behind. The distance
//! between the two heads is the delay time. Each time we process one
//! audio sample:
//!
//! 1. Read the delayed sample from `(write_pos - delay_in_samples)`.
//! 2. Write the new sample at `write_pos` and advance the write head.
//!
//! ## Why a Power-of-Two Capacity?
//!
//! Wrapping an index around the end of the buffer normally needs a
//! modulo (`%`), which is an integer division. If the capacity is a power
//! of two, `index % capacity` is the same as `index & (capacity - 1)`,
//! a single AND instruction. The flanger wraps its read position on every
//! sample of every channel, so we always round the buffer up:
//!
//! ```text
//! requested 96000 samples (2 s @ 48 kHz) → capacity 131072 (2^17)
//! mask = 131071 = 0b1_1111_1111_1111_1111
//! ```
//!
//! ## Linear Interpolation
//!
//! When the delay isn't a whole number of samples (e.g. 441.3 samples),
//! we blend the two stored samples that surround the read position:
//!
//! ```text
//! result = newer * (1 - frac) + older * frac
//! ```

/// A ring buffer that functions as an audio delay line.
///
/// The buffer is allocated once in [`DelayLine::new`] and never resized.
/// A sample-rate change means building a new line, never growing this one,
/// so no allocation can sneak into the audio thread.
pub struct DelayLine {
    /// The circular buffer storing audio samples, initially silence.
    buffer: Vec<f32>,

    /// Where the next incoming sample will be stored.
    /// Always `< buffer.len()`.
    write_pos: usize,

    /// `capacity - 1`. Because the capacity is a power of two, ANDing with
    /// the mask wraps any index (including ones that underflowed through
    /// `wrapping_sub`) back into the buffer.
    mask: usize,
}

impl DelayLine {
    /// Create a delay line able to hold at least `min_length` samples.
    ///
    /// The capacity is rounded up to the next power of two (and is never
    /// smaller than 2, so a delay of one sample always fits).
    pub fn new(min_length: usize) -> Self {
        let capacity = min_length.max(2).next_power_of_two();

        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
            mask: capacity - 1,
        }
    }

    /// Smallest power-of-two capacity able to hold `seconds` of audio at
    /// `sample_rate`.
    ///
    /// ```text
    /// capacity_for(2.0, 44100.0) = 131072  (ceil(88200) → 2^17)
    /// capacity_for(0.05, 48000.0) = 4096   (ceil(2400)  → 2^12)
    /// ```
    pub fn capacity_for(seconds: f32, sample_rate: f32) -> usize {
        let samples = (seconds.max(0.0) * sample_rate.max(0.0)).ceil() as usize;
        samples.max(2).next_power_of_two()
    }

    /// Number of sample slots in the ring.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Write a sample at the current write position and advance the write
    /// head by one, wrapping at the end of the buffer.
    ///
    /// Read the delayed sample for this time step *before* calling this:
    /// once written, the current input is only visible to future reads.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) & self.mask;
    }

    /// Read a delayed sample from the buffer using linear interpolation.
    ///
    /// # Arguments
    /// * `delay_samples` - How many samples back to read. Can be fractional.
    ///   Clamped to `[1, capacity - 1]`: a delay of 0 would read the slot
    ///   about to be overwritten, and anything at or past the capacity
    ///   would alias onto a newer sample.
    ///
    /// # Index math
    ///
    /// For `delay = d + frac` the read position lies between the slot `d`
    /// samples back (`index_b`, newer) and the one `d + 1` samples back
    /// (`index_a`, older), so `index_b == (index_a + 1) & mask` always
    /// holds, including across the end of the buffer.
    pub fn read(&self, delay_samples: f32) -> f32 {
        let max_delay = self.mask as f32;
        let delay_clamped = if delay_samples.is_finite() {
            delay_samples.clamp(1.0, max_delay)
        } else {
            1.0
        };

        let delay_int = delay_clamped as usize;
        let delay_frac = delay_clamped - delay_int as f32;

        let index_b = self.write_pos.wrapping_sub(delay_int) & self.mask;
        let index_a = index_b.wrapping_sub(1) & self.mask;

        let newer = self.buffer[index_b];
        let older = self.buffer[index_a];

        newer * (1.0 - delay_frac) + older * delay_frac
    }

    /// Clear the entire buffer to silence and reset the write position.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_power_of_two() {
        assert_eq!(DelayLine::new(100).capacity(), 128);
        assert_eq!(DelayLine::new(128).capacity(), 128);
        assert_eq!(DelayLine::new(0).capacity(), 2);

        assert_eq!(DelayLine::capacity_for(2.0, 44100.0), 131072);
        assert_eq!(DelayLine::capacity_for(2.0, 48000.0), 131072);
        assert_eq!(DelayLine::capacity_for(0.05, 48000.0), 4096);
        // Exactly a power of two must not be doubled.
        assert_eq!(DelayLine::capacity_for(1.0, 1024.0), 1024);
    }

    /// Verify basic write-then-read at an exact sample position.
    #[test]
    fn test_write_and_read_exact() {
        let mut dl = DelayLine::new(100);

        dl.write(0.75);

        // Reading 1 sample back should give us the 0.75 we just wrote.
        let result = dl.read(1.0);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Every delay in `[1, capacity - 1]` reads back the value written
    /// that many samples ago.
    #[test]
    fn test_round_trip_every_delay() {
        let mut dl = DelayLine::new(64);
        let capacity = dl.capacity();

        for delay in 1..capacity {
            dl.clear();
            dl.write(1.0);
            for _ in 1..delay {
                dl.write(0.0);
            }

            let result = dl.read(delay as f32);
            assert!(
                (result - 1.0).abs() < 1e-6,
                "Expected 1.0 at delay {delay}, got {result}"
            );
        }
    }

    /// Verify linear interpolation between two samples.
    #[test]
    fn test_interpolation() {
        let mut dl = DelayLine::new(100);

        // 0.0 is 2 samples back, 1.0 is 1 sample back.
        dl.write(0.0);
        dl.write(1.0);

        let result = dl.read(1.5);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");

        let result = dl.read(1.25);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Verify the buffer wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        let mut dl = DelayLine::new(4);

        // Write values 0 through 5 into a buffer of size 4.
        for i in 0..6 {
            dl.write(i as f32);
        }

        // write_pos = 6 & 3 = 2, contents [4.0, 5.0, 2.0, 3.0]
        assert!((dl.read(1.0) - 5.0).abs() < 1e-6);
        assert!((dl.read(2.0) - 4.0).abs() < 1e-6);
        assert!((dl.read(3.0) - 3.0).abs() < 1e-6);
    }

    /// Interpolating between slot 0 and the last slot must wrap the
    /// older index instead of reading out of bounds.
    #[test]
    fn test_interpolation_across_boundary() {
        let mut dl = DelayLine::new(4);

        // Fill all four slots so write_pos comes back to 0.
        for value in [10.0, 20.0, 30.0, 40.0] {
            dl.write(value);
        }
        dl.write(50.0); // overwrites slot 0, write_pos = 1

        // 1 sample back is slot 0 (50.0), 2 samples back is slot 3 (40.0).
        let result = dl.read(1.5);
        assert!((result - 45.0).abs() < 1e-4, "Expected 45.0, got {result}");
    }

    /// Delays outside `[1, capacity - 1]` are clamped, never panic.
    #[test]
    fn test_out_of_range_delays_are_clamped() {
        let mut dl = DelayLine::new(8);
        for i in 1..=8 {
            dl.write(i as f32);
        }

        let at_zero = dl.read(0.0);
        let at_one = dl.read(1.0);
        assert!((at_zero - at_one).abs() < 1e-6);

        let too_far = dl.read(1000.0);
        let farthest = dl.read(7.0);
        assert!((too_far - farthest).abs() < 1e-6);

        assert!((dl.read(f32::NAN) - at_one).abs() < 1e-6);
        assert!((dl.read(-3.0) - at_one).abs() < 1e-6);
    }

    /// Verify that clearing resets everything to silence.
    #[test]
    fn test_clear() {
        let mut dl = DelayLine::new(10);

        dl.write(0.5);
        dl.clear();

        let result = dl.read(1.0);
        assert!(
            result.abs() < 1e-6,
            "Expected 0.0 after clear, got {result}"
        );
    }

    /// A buffer initialized to silence should output silence at any delay.
    #[test]
    fn test_silence_in_silence_out() {
        let dl = DelayLine::new(100);

        for delay in [1.0, 10.0, 50.0, 99.0, 127.0] {
            let result = dl.read(delay);
            assert!(
                result.abs() < 1e-6,
                "Expected silence at delay {delay}, got {result}"
            );
        }
    }
}
