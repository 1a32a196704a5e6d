//! Photo compression ladder.
//!
//! The ladder is a fixed sequence of (quality, max-width) attempts. Each
//! attempt re-encodes the photo as JPEG, the result is measured, and the
//! first output under the size ceiling wins. The source file is never
//! mutated; only a derived copy is produced.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use internsight_core::{CompressionStep, ReportError};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;

/// Photo bytes ready to be attached to the multipart upload.
#[derive(Debug, Clone)]
pub struct PreparedPhoto {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    /// Whether a ladder step produced this output. `false` means the
    /// original bytes are used, either because the file was already under
    /// the ceiling or because no step fit.
    pub compressed: bool,
}

/// MIME type inferred from a file extension, `image/jpeg` when inference
/// fails.
pub fn content_type_for_extension(ext: Option<&str>) -> &'static str {
    match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Run one ladder step: cap the width (never upscaling, aspect preserved)
/// and re-encode as JPEG at the step's quality.
fn encode_step(img: &DynamicImage, step: &CompressionStep) -> Result<Vec<u8>, image::ImageError> {
    let resized = if img.width() > step.max_width {
        let height = ((img.height() as u64 * step.max_width as u64) / img.width() as u64).max(1);
        img.resize(step.max_width, height as u32, FilterType::Triangle)
    } else {
        img.clone()
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let quality = (step.quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// Try the ladder steps in order and return the first output strictly under
/// `ceiling_bytes`, together with the step that produced it. `None` when no
/// step fits. Steps that fail to encode are logged and skipped.
pub fn compress_to_ceiling(
    img: &DynamicImage,
    ladder: &[CompressionStep],
    ceiling_bytes: u64,
) -> Option<(Vec<u8>, CompressionStep)> {
    for step in ladder {
        match encode_step(img, step) {
            Ok(data) => {
                tracing::debug!(
                    quality = step.quality,
                    max_width = step.max_width,
                    size_bytes = data.len(),
                    "Compression attempt"
                );
                if (data.len() as u64) < ceiling_bytes {
                    return Some((data, *step));
                }
            }
            Err(e) => {
                tracing::warn!(
                    quality = step.quality,
                    max_width = step.max_width,
                    error = %e,
                    "Compression attempt failed"
                );
            }
        }
    }
    None
}

/// Read a picked photo and reduce it below the ceiling if needed.
///
/// Files already under the ceiling pass through untouched. Oversized files
/// go through the ladder; if no step fits, or the file cannot be decoded,
/// the original bytes are uploaded anyway. Only an unreadable source file
/// is a hard failure.
pub async fn prepare_photo(
    path: &Path,
    ladder: &[CompressionStep],
    ceiling_bytes: u64,
) -> Result<PreparedPhoto, ReportError> {
    let data = fs::read(path)
        .await
        .map_err(|e| ReportError::Asset(format!("Failed to read photo {}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo.jpg")
        .to_string();
    let content_type =
        content_type_for_extension(path.extension().and_then(|e| e.to_str())).to_string();

    if (data.len() as u64) < ceiling_bytes {
        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            "Photo already under ceiling"
        );
        return Ok(PreparedPhoto {
            data,
            file_name,
            content_type,
            compressed: false,
        });
    }

    let img = match image::load_from_memory(&data) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Photo decode failed, uploading original");
            return Ok(PreparedPhoto {
                data,
                file_name,
                content_type,
                compressed: false,
            });
        }
    };

    match compress_to_ceiling(&img, ladder, ceiling_bytes) {
        Some((compressed, step)) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("photo");
            tracing::info!(
                path = %path.display(),
                quality = step.quality,
                max_width = step.max_width,
                original_bytes = data.len(),
                compressed_bytes = compressed.len(),
                "Photo compressed"
            );
            Ok(PreparedPhoto {
                data: compressed,
                file_name: format!("{}_compressed.jpg", stem),
                content_type: "image/jpeg".to_string(),
                compressed: true,
            })
        }
        None => {
            tracing::warn!(
                path = %path.display(),
                size_bytes = data.len(),
                "No ladder step fit under the ceiling, uploading original"
            );
            Ok(PreparedPhoto {
                data,
                file_name,
                content_type,
                compressed: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn step(quality: f32, max_width: u32) -> CompressionStep {
        CompressionStep { quality, max_width }
    }

    /// Noisy gradient so JPEG output size tracks resolution.
    fn test_image(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let r = ((x * 7 + y * 13) % 256) as u8;
                let g = ((x * 3) ^ (y * 5)) as u8;
                let b = ((x + y * 11) % 256) as u8;
                img.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for_extension(Some("jpg")), "image/jpeg");
        assert_eq!(content_type_for_extension(Some("JPEG")), "image/jpeg");
        assert_eq!(content_type_for_extension(Some("png")), "image/png");
        assert_eq!(content_type_for_extension(Some("webp")), "image/webp");
        assert_eq!(content_type_for_extension(Some("bin")), "image/jpeg");
        assert_eq!(content_type_for_extension(None), "image/jpeg");
    }

    #[test]
    fn test_encode_step_caps_width_preserving_aspect() {
        let img = test_image(400, 200);
        let out = encode_step(&img, &step(0.8, 100)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 50);
    }

    #[test]
    fn test_encode_step_never_upscales() {
        let img = test_image(200, 100);
        let out = encode_step(&img, &step(0.8, 1000)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 100);
    }

    #[test]
    fn test_ladder_accepts_first_fitting_step() {
        let img = test_image(300, 300);
        let ladder = vec![step(0.8, 2500), step(0.6, 2000), step(0.4, 1500)];
        let (_, chosen) = compress_to_ceiling(&img, &ladder, u64::MAX).unwrap();
        assert_eq!(chosen, ladder[0]);
    }

    #[test]
    fn test_ladder_skips_steps_over_the_ceiling() {
        let img = test_image(400, 400);
        let ladder = vec![step(0.9, 400), step(0.9, 300), step(0.9, 60)];

        let sizes: Vec<u64> = ladder
            .iter()
            .map(|s| encode_step(&img, s).unwrap().len() as u64)
            .collect();
        // The narrow step must genuinely be the only one under this ceiling.
        assert!(sizes[2] < sizes[1] && sizes[1] <= sizes[0]);
        let ceiling = sizes[1];

        let (data, chosen) = compress_to_ceiling(&img, &ladder, ceiling).unwrap();
        assert_eq!(chosen, ladder[2]);
        assert!((data.len() as u64) < ceiling);
    }

    #[test]
    fn test_ladder_exhausted_returns_none() {
        let img = test_image(100, 100);
        let ladder = vec![step(0.8, 2500), step(0.6, 2000), step(0.4, 1500)];
        assert!(compress_to_ceiling(&img, &ladder, 1).is_none());
    }

    #[tokio::test]
    async fn test_prepare_photo_under_ceiling_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visit.png");
        let img = test_image(50, 50);
        img.save(&path).unwrap();

        let original = tokio::fs::read(&path).await.unwrap();
        let ladder = vec![step(0.8, 2500)];
        let prepared = prepare_photo(&path, &ladder, u64::MAX).await.unwrap();

        assert!(!prepared.compressed);
        assert_eq!(prepared.data, original);
        assert_eq!(prepared.file_name, "visit.png");
        assert_eq!(prepared.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_prepare_photo_compresses_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visit.png");
        test_image(400, 400).save(&path).unwrap();

        let ladder = vec![step(0.4, 60)];
        // Ceiling of 1 byte forces the ladder; the sole step caps the width.
        let size = tokio::fs::metadata(&path).await.unwrap().len();
        let prepared = prepare_photo(&path, &ladder, size).await.unwrap();

        assert!(prepared.compressed);
        assert_eq!(prepared.file_name, "visit_compressed.jpg");
        assert_eq!(prepared.content_type, "image/jpeg");
        let decoded = image::load_from_memory(&prepared.data).unwrap();
        assert_eq!(decoded.width(), 60);
    }

    #[tokio::test]
    async fn test_prepare_photo_falls_back_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visit.jpg");
        test_image(200, 200).save(&path).unwrap();

        let original = tokio::fs::read(&path).await.unwrap();
        let ladder = vec![step(0.8, 2500), step(0.4, 1500)];
        let prepared = prepare_photo(&path, &ladder, 1).await.unwrap();

        assert!(!prepared.compressed);
        assert_eq!(prepared.data, original);
        assert_eq!(prepared.file_name, "visit.jpg");
    }

    #[tokio::test]
    async fn test_prepare_photo_missing_file_is_asset_error() {
        let result = prepare_photo(Path::new("/nonexistent/visit.jpg"), &[], 1024).await;
        assert!(matches!(result, Err(ReportError::Asset(_))));
    }
}
