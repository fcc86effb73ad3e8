//! Panel font loading and glyph atlas packing.
//!
//! No font ships with the viewer. The atlas is built from the configured font file or,
//! when none is configured, from the first common system font that exists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use thiserror::Error;

use crate::gpu::GpuContext;

/// Fonts tried in order when no font path is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font: {0}")]
    Parse(&'static str),
    #[error("no font configured and none of the common system fonts exist")]
    NotFound,
}

/// Picks the configured font, or the first system font present on disk.
pub fn find_font(configured: Option<&Path>) -> Result<PathBuf, FontError> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    SYSTEM_FONT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .ok_or(FontError::NotFound)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// `[u, v, width, height]` in normalized atlas coordinates.
    pub uv: [f32; 4],
    pub width: u32,
    pub height: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub advance: f32,
}

/// Result of packing glyph rectangles into rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub width: u32,
    pub height: u32,
    /// Top-left corner of each input rectangle.
    pub positions: Vec<(u32, u32)>,
}

const ATLAS_PADDING: u32 = 1;

/// Packs `(width, height)` rectangles left-to-right in rows, starting from a 512 × 512
/// atlas and doubling the smaller side until everything fits.
pub fn pack_glyphs(sizes: &[(u32, u32)]) -> AtlasLayout {
    let mut width = 512u32;
    let mut height = 512u32;

    loop {
        if let Some(positions) = try_pack(sizes, width, height) {
            return AtlasLayout {
                width,
                height,
                positions,
            };
        }
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], atlas_width: u32, atlas_height: u32) -> Option<Vec<(u32, u32)>> {
    let mut positions = Vec::with_capacity(sizes.len());
    let mut x = ATLAS_PADDING;
    let mut y = ATLAS_PADDING;
    let mut row_height = 0u32;

    for &(w, h) in sizes {
        if w + 2 * ATLAS_PADDING > atlas_width {
            return None;
        }
        if x + w + ATLAS_PADDING > atlas_width {
            x = ATLAS_PADDING;
            y += row_height + ATLAS_PADDING;
            row_height = 0;
        }
        if y + h + ATLAS_PADDING > atlas_height {
            return None;
        }
        positions.push((x, y));
        x += w + ATLAS_PADDING;
        row_height = row_height.max(h);
    }

    Some(positions)
}

/// Printable ASCII glyphs of one font at one size, uploaded as an `R8Unorm` texture.
pub struct FontAtlas {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    pub fn load(gpu: &GpuContext, path: &Path, size: f32) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(gpu, &data, size)
    }

    pub fn from_bytes(gpu: &GpuContext, font_data: &[u8], size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(font_data, FontSettings::default()).map_err(FontError::Parse)?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let c = c as char;
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let layout = pack_glyphs(&sizes);
        let (atlas_width, atlas_height) = (layout.width, layout.height);

        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::new();

        for ((c, metrics, bitmap), &(x, y)) in rasterized.iter().zip(&layout.positions) {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * atlas_width + x) as usize;
                atlas_data[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / atlas_width as f32,
                        y as f32 / atlas_height as f32,
                        glyph_w as f32 / atlas_width as f32,
                        glyph_h as f32 / atlas_height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let extent = wgpu::Extent3d {
            width: atlas_width,
            height: atlas_height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas_width),
                rows_per_image: Some(atlas_height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            view,
            sampler,
            glyphs,
            size,
            line_height,
        })
    }

    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Width of `text` in pixels. Missing glyphs advance by half the font size.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.get(&c).map_or(self.size * 0.5, |g| g.advance))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_into_the_base_atlas_when_possible() {
        let layout = pack_glyphs(&[(10, 12), (20, 8), (5, 5)]);
        assert_eq!((layout.width, layout.height), (512, 512));
        assert_eq!(layout.positions, vec![(1, 1), (12, 1), (33, 1)]);
    }

    #[test]
    fn wraps_to_a_new_row() {
        let layout = pack_glyphs(&[(300, 10), (300, 20)]);
        assert_eq!(layout.positions, vec![(1, 1), (1, 12)]);
    }

    #[test]
    fn grows_until_everything_fits() {
        let sizes = vec![(100, 100); 40];
        let layout = pack_glyphs(&sizes);
        assert!(layout.width * layout.height > 512 * 512);
        for (&(x, y), &(w, h)) in layout.positions.iter().zip(&sizes) {
            assert!(x + w < layout.width);
            assert!(y + h < layout.height);
        }
    }

    #[test]
    fn configured_font_wins() {
        let path = Path::new("/fonts/custom.ttf");
        assert_eq!(find_font(Some(path)).unwrap(), path);
    }
}
