//! Color allocator: deterministic presence colors.
//!
//! DESIGN
//! ======
//! A process-wide counter indexes a fixed 12-color palette. Colors repeat
//! once more than 12 connections have been opened; there is no reuse
//! tracking and disconnects do not rewind the counter.

/// Presence palette, handed out in order.
pub const PALETTE: [&str; 12] = [
    "#FF5733", "#33FF57", "#3357FF", "#FF33A1", "#A133FF", "#FF8D33", "#33FF8D", "#8D33FF", "#FF3333", "#33FFFF",
    "#FFFF33", "#FF33FF",
];

#[derive(Debug, Default)]
pub struct ColorAllocator {
    counter: u64,
}

impl ColorAllocator {
    /// Return `PALETTE[counter mod 12]` and advance the counter.
    pub fn next_color(&mut self) -> &'static str {
        // Modulo keeps the index below PALETTE.len(), so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let index = (self.counter % PALETTE.len() as u64) as usize;
        self.counter = self.counter.wrapping_add(1);
        PALETTE[index]
    }

    /// Number of colors handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
#[path = "palette_test.rs"]
mod tests;
