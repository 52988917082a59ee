//! Paint compositing
//!
//! The engine hands back rendered regions as top-down RGBA8 buffers with
//! straight alpha. Each region is blended over the canvas background, not
//! over what the previous frame left there. Regions never overlap, so the
//! order they arrive in does not matter.

use dpi::{PhysicalPosition, PhysicalSize};

use crate::engine::Engine;

/// One rendered region pulled from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintRegion {
    /// Top-down RGBA8, straight alpha, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Placement of the region's top-left corner on the canvas
    pub offset: PhysicalPosition<i32>,
}

impl PaintRegion {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, offset: PhysicalPosition<i32>) -> Self {
        Self {
            pixels,
            width,
            height,
            offset,
        }
    }

    /// A region filled with one colour
    pub fn solid(color: [u8; 4], width: u32, height: u32, offset: PhysicalPosition<i32>) -> Self {
        let pixels = color.repeat(width as usize * height as usize);
        Self::new(pixels, width, height, offset)
    }

    fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Host paint surface, RGBA8 top-down
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Colour a region's rectangle is reset to before it is blended
    background: [u8; 4],
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: background.repeat(width as usize * height as usize),
            background,
        }
    }

    pub fn background(&self) -> [u8; 4] {
        self.background
    }

    pub fn set_background(&mut self, background: [u8; 4]) {
        self.background = background;
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Reallocate for a new size. Contents are reset to `background`.
    pub fn resize(&mut self, width: u32, height: u32, background: [u8; 4]) {
        if self.width == width && self.height == height {
            self.set_background(background);
            return;
        }
        *self = Self::new(width, height, background);
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Blend a region over the background, clipped to the canvas bounds.
    ///
    /// The covered rectangle is reset first, so painting the same region
    /// twice gives the same pixels. Returns `false` for a malformed region,
    /// which is left out.
    pub fn blit(&mut self, region: &PaintRegion) -> bool {
        if !region.is_well_formed() {
            return false;
        }

        let x0 = i64::from(region.offset.x).max(0);
        let y0 = i64::from(region.offset.y).max(0);
        let x1 = (i64::from(region.offset.x) + i64::from(region.width)).min(i64::from(self.width));
        let y1 = (i64::from(region.offset.y) + i64::from(region.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return true;
        }

        let src_stride = region.width as usize * 4;
        let dst_stride = self.width as usize * 4;
        let src_x = (x0 - i64::from(region.offset.x)) as usize;
        let span = (x1 - x0) as usize * 4;
        let background = self.background;

        for y in y0..y1 {
            let src_y = (y - i64::from(region.offset.y)) as usize;
            let src_start = src_y * src_stride + src_x * 4;
            let dst_start = y as usize * dst_stride + x0 as usize * 4;
            let src = &region.pixels[src_start..src_start + span];
            let dst = &mut self.pixels[dst_start..dst_start + span];
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                d.copy_from_slice(&background);
                blend_over(d, s);
            }
        }
        true
    }
}

/// Straight-alpha source-over
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let sa = u32::from(src[3]);
    match sa {
        0 => {}
        255 => dst.copy_from_slice(src),
        _ => {
            let da = u32::from(dst[3]);
            // Scaled by 255 to stay in integers
            let dst_weight = da * (255 - sa);
            let out_a = sa * 255 + dst_weight;
            for c in 0..3 {
                let value = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * dst_weight;
                dst[c] = ((value + out_a / 2) / out_a) as u8;
            }
            dst[3] = ((out_a + 127) / 255) as u8;
        }
    }
}

/// Pull regions from the engine and blend them onto the canvas.
///
/// Without an engine the canvas is filled with `background`, which is what
/// the host shows for an empty region. Returns the number of regions drawn.
pub fn composite<E: Engine>(engine: Option<&mut E>, canvas: &mut Canvas, background: [u8; 4]) -> usize {
    let Some(engine) = engine else {
        canvas.fill(background);
        return 0;
    };

    canvas.set_background(background);
    let size = canvas.size();
    let mut drawn = 0;
    for region in engine.paint() {
        let inside = region.offset.x >= 0
            && region.offset.y >= 0
            && i64::from(region.offset.x) + i64::from(region.width) <= i64::from(size.width)
            && i64::from(region.offset.y) + i64::from(region.height) <= i64::from(size.height);
        if !inside {
            tracing::debug!(?region.offset, region.width, region.height, "Region clipped to canvas");
        }
        if canvas.blit(&region) {
            drawn += 1;
        } else {
            tracing::warn!(
                len = region.pixels.len(),
                region.width,
                region.height,
                "Skipping malformed paint region"
            );
        }
    }
    drawn
}
