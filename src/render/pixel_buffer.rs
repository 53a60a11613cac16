use crate::foundation::error::{SubrasterError, SubrasterResult};

/// Row-major RGBA8 region buffer.
///
/// Byte 3 of each pixel holds accumulated coverage; bytes 0..3 hold color already weighted by it.
/// Rows are `pitch` bytes apart, which may exceed `width * 4` when a row alignment is requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pitch: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer with a tight pitch.
    pub fn new(width: u32, height: u32) -> SubrasterResult<Self> {
        Self::with_row_alignment(width, height, 1)
    }

    /// Fully transparent buffer whose pitch is rounded up to a multiple of `row_alignment` bytes.
    pub fn with_row_alignment(width: u32, height: u32, row_alignment: usize) -> SubrasterResult<Self> {
        if row_alignment == 0 {
            return Err(SubrasterError::validation("row alignment must be >= 1"));
        }
        let pitch = (width as usize)
            .checked_mul(4)
            .and_then(|row| row.checked_next_multiple_of(row_alignment))
            .ok_or_else(|| SubrasterError::geometry("pixel buffer pitch overflow"))?;
        let len = pitch
            .checked_mul(height as usize)
            .ok_or_else(|| SubrasterError::geometry("pixel buffer size overflow"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            pitch,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of two rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Raw bytes including row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every byte to zero (transparent black).
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Visible bytes of row `y` (without padding).
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.pitch;
        self.data.get(start..start + self.width as usize * 4)
    }

    /// RGBA bytes at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x as usize * 4;
        Some([row[i], row[i + 1], row[i + 2], row[i + 3]])
    }

    /// Copy out the visible pixels with a tight `width * 4` pitch.
    pub fn to_tight_rgba(&self) -> SubrasterResult<Vec<u8>> {
        let row_len = self.width as usize * 4;
        let mut out = Vec::new();
        out.try_reserve_exact(row_len * self.height as usize)?;
        for row in self.data.chunks(self.pitch.max(1)).take(self.height as usize) {
            out.extend_from_slice(&row[..row_len]);
        }
        Ok(out)
    }

    /// Return `true` when no pixel has any coverage.
    pub fn is_transparent(&self) -> bool {
        (0..self.height).all(|y| {
            self.row(y)
                .is_some_and(|row| row.chunks_exact(4).all(|px| px[3] == 0))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixel_buffer.rs"]
mod tests;
