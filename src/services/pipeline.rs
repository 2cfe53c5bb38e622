use blit_engine::{
    convert_lab_palette, encode_cells, make_lab_image, make_paint, make_raw, make_script,
    make_table, quantize, reduce, reduce_lab, AcceleratorStatus, CellGrid, DeviceSelector,
    ExecutionContext, Image, Palette, VideoEncoder, VideoStream,
};

use crate::error::AppError;
use crate::models::{AppConfig, OutputFormat};

/// Runs images through palette reduction → quantization → cell encoding and
/// serializes the result.
pub struct ConvertPipeline {
    config: AppConfig,
    ctx: ExecutionContext,
}

impl ConvertPipeline {
    /// Pipeline on the backend named by `config.device`, sequential when
    /// unset. An unknown selector or a failed backend falls back to
    /// sequential execution; the status says which happened.
    pub fn new(config: AppConfig) -> Result<(Self, Option<AcceleratorStatus>), AppError> {
        let (ctx, status) = match config.device.as_deref() {
            None => (ExecutionContext::sequential(), None),
            Some(name) => {
                let selector: DeviceSelector = name.parse()?;
                let (ctx, status) = ExecutionContext::init(selector);
                (ctx, Some(status))
            }
        };
        Ok((Self { config, ctx }, status))
    }

    pub fn with_context(config: AppConfig, ctx: ExecutionContext) -> Self {
        Self { config, ctx }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reduce `image` to the configured palette size, in Lab space when
    /// `lab` is set.
    pub fn palette_for(&self, image: &Image) -> Result<Palette, AppError> {
        let k = self.config.palette_size;
        let palette = if self.config.lab {
            let lab = make_lab_image(image);
            convert_lab_palette(&reduce_lab(&lab, k, self.config.reducer, &self.ctx)?)
        } else {
            reduce(image, k, self.config.reducer, &self.ctx)?
        };
        Ok(palette)
    }

    /// Quantize and encode `image` against `palette`.
    pub fn grid(&self, image: &Image, palette: &Palette) -> Result<CellGrid, AppError> {
        let indexed = quantize(image, palette, self.config.dither, &self.ctx);
        Ok(encode_cells(&indexed, palette, &self.ctx)?)
    }

    /// Reduce, quantize and encode one image.
    pub fn image_to_grid(&self, image: &Image) -> Result<CellGrid, AppError> {
        let palette = self.palette_for(image)?;
        let grid = self.grid(image, &palette)?;
        tracing::info!(
            width = grid.width(),
            height = grid.height(),
            colors = palette.len(),
            "Image converted"
        );
        Ok(grid)
    }

    /// Serialize a grid in `format`.
    pub fn export(&self, grid: &CellGrid, format: OutputFormat) -> Result<Vec<u8>, AppError> {
        let bytes = match format {
            OutputFormat::Table => make_table(grid, &self.config.table)?,
            OutputFormat::Paint => make_paint(grid)?.into_bytes(),
            OutputFormat::Script => make_script(grid)?.into_bytes(),
            OutputFormat::Raw => make_raw(grid)?,
            OutputFormat::Json => serde_json::to_vec_pretty(grid)?,
            OutputFormat::Video => self.encoder().encode_frames(vec![grid.clone()])?,
        };
        Ok(bytes)
    }

    /// Convert one image straight to output bytes.
    pub fn convert(&self, image: &Image, format: OutputFormat) -> Result<Vec<u8>, AppError> {
        let grid = self.image_to_grid(image)?;
        self.export(&grid, format)
    }

    /// Encode equally sized frames as a video with one palette reduced from
    /// all of them.
    pub fn video(&self, frames: &[Image]) -> Result<Vec<u8>, AppError> {
        let first = frames.first().ok_or(AppError::NoFrames)?;
        for (index, frame) in frames.iter().enumerate() {
            if frame.width() != first.width() || frame.height() != first.height() {
                return Err(AppError::FrameSize {
                    index,
                    width: frame.width(),
                    height: frame.height(),
                    expected_width: first.width(),
                    expected_height: first.height(),
                });
            }
        }

        let palette = self.palette_for(&Image::stack(frames)?)?;
        let grids = frames
            .iter()
            .map(|frame| self.grid(frame, &palette))
            .collect::<Result<Vec<_>, _>>()?;
        let stream = VideoStream::new(grids)?;
        let bytes = self.encoder().encode(&stream)?;
        tracing::info!(
            frames = stream.len(),
            codec = %self.config.codec,
            colors = palette.len(),
            bytes = bytes.len(),
            "Video encoded"
        );
        Ok(bytes)
    }

    fn encoder(&self) -> VideoEncoder {
        VideoEncoder::new(self.config.codec).with_context(self.ctx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blit_engine::{CodecVariant, Pixel, ReducerKind};

    fn checker(width: usize, height: usize) -> Image {
        let pixels = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                if (x / 2 + y / 3) % 2 == 0 {
                    Pixel::new(220, 40, 40)
                } else {
                    Pixel::new(20, 20, 90)
                }
            })
            .collect();
        Image::from_pixels(width, height, pixels).unwrap()
    }

    fn pipeline(config: AppConfig) -> ConvertPipeline {
        ConvertPipeline::with_context(config, ExecutionContext::sequential())
    }

    #[test]
    fn test_two_color_image_is_exact() {
        let p = pipeline(AppConfig::default());
        let image = checker(8, 6);
        let grid = p.image_to_grid(&image).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 2));
        assert_eq!(grid.palette().len(), 2);
        assert_eq!(grid.render().to_image(grid.palette()).unwrap(), image);
    }

    #[test]
    fn test_lab_reduction_returns_rgb_palette() {
        let config = AppConfig {
            lab: true,
            palette_size: 2,
            ..AppConfig::default()
        };
        let palette = pipeline(config).palette_for(&checker(4, 3)).unwrap();
        assert_eq!(palette.len(), 2);
        // Encoded Lab rounding moves colors by a few steps at most.
        for c in palette.colors() {
            let near = |t: Pixel| {
                (c.r as i32 - t.r as i32).abs() <= 4
                    && (c.g as i32 - t.g as i32).abs() <= 4
                    && (c.b as i32 - t.b as i32).abs() <= 4
            };
            assert!(near(Pixel::new(220, 40, 40)) || near(Pixel::new(20, 20, 90)), "{c:?}");
        }
    }

    #[test]
    fn test_lab_kmeans_clusters_encoded_channels() {
        use blit_engine::kmeans_lab;

        let config = AppConfig {
            lab: true,
            palette_size: 2,
            reducer: ReducerKind::KMeans,
            ..AppConfig::default()
        };
        let ramp = (0..12u8)
            .map(|i| Pixel::new(20 * i, 255 - 20 * i, 100))
            .collect();
        let image = Image::from_pixels(4, 3, ramp).unwrap();
        let palette = pipeline(config).palette_for(&image).unwrap();

        let encoded = kmeans_lab(&make_lab_image(&image), 2, &ExecutionContext::sequential()).unwrap();
        assert_eq!(palette, convert_lab_palette(&encoded));
    }

    #[test]
    fn test_every_format_exports() {
        let p = pipeline(AppConfig::default());
        let image = checker(6, 6);
        for format in [
            OutputFormat::Table,
            OutputFormat::Paint,
            OutputFormat::Script,
            OutputFormat::Raw,
            OutputFormat::Json,
            OutputFormat::Video,
        ] {
            let bytes = p.convert(&image, format).unwrap();
            assert!(!bytes.is_empty(), "{format}");
        }
        let json: serde_json::Value =
            serde_json::from_slice(&p.convert(&image, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 2);
    }

    #[test]
    fn test_video_shares_one_palette() {
        let config = AppConfig {
            codec: CodecVariant::Ans,
            reducer: ReducerKind::Octree,
            ..AppConfig::default()
        };
        let p = pipeline(config);
        let frames = vec![checker(6, 6), Image::new(6, 6).unwrap(), checker(6, 6)];
        let bytes = p.video(&frames).unwrap();
        let stream = VideoStream::decode(&bytes).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.palette().len(), 3);
        assert_eq!(stream.frames()[0], stream.frames()[2]);
    }

    #[test]
    fn test_video_rejects_mixed_sizes() {
        let p = pipeline(AppConfig::default());
        assert!(matches!(p.video(&[]), Err(AppError::NoFrames)));
        let err = p.video(&[checker(6, 6), checker(4, 6)]).unwrap_err();
        assert!(matches!(err, AppError::FrameSize { index: 1, .. }));
    }

    #[test]
    fn test_unknown_device_name_is_error() {
        let config = AppConfig {
            device: Some("gpu0".to_string()),
            ..AppConfig::default()
        };
        assert!(matches!(ConvertPipeline::new(config), Err(AppError::Engine(_))));

        let config = AppConfig {
            device: Some("42".to_string()),
            ..AppConfig::default()
        };
        let (_, status) = ConvertPipeline::new(config).unwrap();
        assert!(!status.unwrap().is_active());
    }
}
