//! Container reader and writer.

use serde::Serialize;

use super::bytes::ByteReader;
use super::codec::{decode_payload, encode_payload, xor_delta, Streams};
use super::{CodecVariant, FORMAT_VERSION, MAGIC};
use crate::cell::CellGrid;
use crate::color::Pixel;
use crate::error::{EngineError, Result};
use crate::exec::ExecutionContext;
use crate::palette::{Palette, MAX_COLORS};

/// An ordered sequence of grids sharing geometry and palette.
///
/// Frame order is playback order; nothing in the engine reorders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStream {
    frames: Vec<CellGrid>,
}

impl VideoStream {
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if `frames` is empty or the frames
    ///   disagree on width, height or palette.
    pub fn new(frames: Vec<CellGrid>) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(EngineError::invalid("a video needs at least one frame"));
        };
        for (i, frame) in frames.iter().enumerate().skip(1) {
            if frame.width() != first.width() || frame.height() != first.height() {
                return Err(EngineError::invalid(format!(
                    "frame {i} is {}x{} cells, frame 0 is {}x{}",
                    frame.width(),
                    frame.height(),
                    first.width(),
                    first.height()
                )));
            }
            if frame.palette() != first.palette() {
                return Err(EngineError::invalid(format!(
                    "frame {i} does not share the global palette"
                )));
            }
        }
        Ok(Self { frames })
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.frames[0].width()
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.frames[0].height()
    }

    pub fn palette(&self) -> &Palette {
        self.frames[0].palette()
    }

    pub fn frames(&self) -> &[CellGrid] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<CellGrid> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; a stream holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Serialize with the given variant.
    pub fn encode(&self, variant: CodecVariant, ctx: &ExecutionContext) -> Result<Vec<u8>> {
        VideoEncoder::new(variant).with_context(ctx.clone()).encode(self)
    }

    /// Parse and fully validate a container.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Truncated`] if the data ends before the header or a
    ///   frame is complete.
    /// - [`EngineError::Unsupported`] for a wrong magic, version or variant.
    /// - [`EngineError::InvalidInput`] for inconsistent sizes, corrupt
    ///   payloads, glyph codes outside the alphabet, color indices outside
    ///   the palette or trailing bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let header = VideoHeader::read(&mut reader)?;
        let cells = header.width * header.height;

        let mut frames = Vec::with_capacity(header.frame_count.min(1024));
        let mut previous: Option<Streams> = None;
        for i in 0..header.frame_count {
            let len = reader.u32()? as usize;
            let payload = reader.take(len)?;
            let (mut glyphs, mut colors) = decode_payload(header.variant, payload, cells)
                .map_err(|e| match e {
                    EngineError::InvalidInput(msg) => {
                        EngineError::invalid(format!("frame {i}: {msg}"))
                    }
                    other => other,
                })?;
            if header.variant.uses_delta() {
                if let Some((prev_glyphs, prev_colors)) = &previous {
                    glyphs = xor_delta(&glyphs, prev_glyphs);
                    colors = xor_delta(&colors, prev_colors);
                }
            }
            frames.push(CellGrid::from_streams(
                header.width,
                header.height,
                &glyphs,
                &colors,
                header.palette.clone(),
            )?);
            previous = Some((glyphs, colors));
        }

        if reader.remaining() != 0 {
            return Err(EngineError::invalid(format!(
                "{} trailing bytes after the last frame",
                reader.remaining()
            )));
        }
        tracing::debug!(
            variant = %header.variant,
            frames = frames.len(),
            bytes = data.len(),
            "Video decoded"
        );
        Ok(Self { frames })
    }
}

/// Fixed part of a container, before the frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoHeader {
    pub variant: CodecVariant,
    pub width: usize,
    pub height: usize,
    pub palette: Palette,
    pub frame_count: usize,
}

impl VideoHeader {
    /// Read only the header of a container.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::read(&mut ByteReader::new(data))
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let magic = reader.take(MAGIC.len())?;
        if magic != MAGIC {
            return Err(EngineError::unsupported(
                "container",
                String::from_utf8_lossy(magic).into_owned(),
            ));
        }
        let version = reader.u8()?;
        if version != FORMAT_VERSION {
            return Err(EngineError::unsupported("container version", version.to_string()));
        }
        let tag = reader.u8()?;
        let variant = CodecVariant::from_tag(tag)
            .ok_or_else(|| EngineError::unsupported("codec variant", tag.to_string()))?;

        let width = reader.u16()? as usize;
        let height = reader.u16()? as usize;
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!(
                "video dimensions must be positive, got {width}x{height}"
            )));
        }

        let palette_len = reader.u16()? as usize;
        if palette_len == 0 || palette_len > MAX_COLORS {
            return Err(EngineError::invalid(format!(
                "palette length {palette_len} outside 1..={MAX_COLORS}"
            )));
        }
        let colors = reader
            .take(palette_len * 3)?
            .chunks_exact(3)
            .map(|c| Pixel::new(c[0], c[1], c[2]))
            .collect();
        let palette = Palette::new(colors)?;

        let frame_count = reader.u32()? as usize;
        if frame_count == 0 {
            return Err(EngineError::invalid("video holds no frames"));
        }
        Ok(Self {
            variant,
            width,
            height,
            palette,
            frame_count,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let dim = |v: usize, what: &str| {
            u16::try_from(v).map_err(|_| {
                EngineError::invalid(format!("{what} of {v} cells exceeds the container limit"))
            })
        };
        let frame_count = u32::try_from(self.frame_count)
            .map_err(|_| EngineError::invalid("too many frames for the container"))?;

        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.push(self.variant.tag());
        out.extend_from_slice(&dim(self.width, "width")?.to_le_bytes());
        out.extend_from_slice(&dim(self.height, "height")?.to_le_bytes());
        out.extend_from_slice(&(self.palette.len() as u16).to_le_bytes());
        for color in self.palette.colors() {
            out.extend_from_slice(&color.to_array());
        }
        out.extend_from_slice(&frame_count.to_le_bytes());
        Ok(())
    }
}

/// Writes [`VideoStream`]s with one codec variant.
///
/// Frames are coded concurrently on the context's workers; the output lists
/// them in input order.
#[derive(Debug, Clone, Default)]
pub struct VideoEncoder {
    variant: CodecVariant,
    ctx: ExecutionContext,
}

impl VideoEncoder {
    /// Encoder running on the sequential context.
    pub fn new(variant: CodecVariant) -> Self {
        Self {
            variant,
            ctx: ExecutionContext::sequential(),
        }
    }

    pub fn with_context(mut self, ctx: ExecutionContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn variant(&self) -> CodecVariant {
        self.variant
    }

    pub fn encode(&self, stream: &VideoStream) -> Result<Vec<u8>> {
        let header = VideoHeader {
            variant: self.variant,
            width: stream.width(),
            height: stream.height(),
            palette: stream.palette().clone(),
            frame_count: stream.len(),
        };
        let mut out = Vec::new();
        header.write(&mut out)?;

        let frames = stream.frames();
        let streams: Vec<Streams> = self.ctx.map_range(frames.len(), |i| frames[i].streams());
        let payloads = self.ctx.map_range(frames.len(), |i| {
            let (glyphs, colors) = &streams[i];
            match i.checked_sub(1).filter(|_| self.variant.uses_delta()) {
                Some(p) => {
                    let (prev_glyphs, prev_colors) = &streams[p];
                    encode_payload(
                        self.variant,
                        &xor_delta(glyphs, prev_glyphs),
                        &xor_delta(colors, prev_colors),
                    )
                }
                None => encode_payload(self.variant, glyphs, colors),
            }
        });

        for payload in payloads {
            let payload = payload?;
            let len = u32::try_from(payload.len())
                .map_err(|_| EngineError::invalid("frame payload exceeds 4 GiB"))?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&payload);
        }
        tracing::debug!(
            variant = %self.variant,
            frames = frames.len(),
            bytes = out.len(),
            "Video encoded"
        );
        Ok(out)
    }

    /// Validate `frames` as a [`VideoStream`] and encode it.
    pub fn encode_frames(&self, frames: Vec<CellGrid>) -> Result<Vec<u8>> {
        self.encode(&VideoStream::new(frames)?)
    }
}
