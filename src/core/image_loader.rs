//! Background image decoder.
//!
//! Uploads are decoded off the UI thread; the update loop drains finished
//! results with `poll()` and never blocks. Results for images the user removed
//! in the meantime are dropped. Failed decodes are reported once and not
//! retried.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender, unbounded};
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use log::{debug, trace, warn};
use uuid::Uuid;

use crate::entities::ImageSource;

/// Longest edge kept after decode; larger uploads are downscaled.
pub const MAX_TEXTURE_EDGE: u32 = 4096;

struct LoadRequest {
    uuid: Uuid,
    source: ImageSource,
}

/// Outcome of one decode.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub uuid: Uuid,
    pub result: Result<Arc<RgbaImage>, String>,
}

/// Decode `source` into RGBA8, downscaling past [`MAX_TEXTURE_EDGE`].
pub fn decode(source: &ImageSource) -> Result<RgbaImage> {
    let img: DynamicImage = match source {
        ImageSource::Path(path) => {
            image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?
        }
        ImageSource::Bytes(bytes) => {
            image::load_from_memory(bytes).context("Failed to decode in-memory image")?
        }
    };
    if img.width() == 0 || img.height() == 0 {
        bail!("Image {} has zero size", source.describe());
    }
    let img = if img.width().max(img.height()) > MAX_TEXTURE_EDGE {
        debug!(
            "Downscaling {} from {}x{} to fit {}",
            source.describe(),
            img.width(),
            img.height(),
            MAX_TEXTURE_EDGE
        );
        img.resize(MAX_TEXTURE_EDGE, MAX_TEXTURE_EDGE, FilterType::Triangle)
    } else {
        img
    };
    Ok(img.into_rgba8())
}

/// Single decoder thread fed through a channel.
pub struct ImageLoader {
    tx: Option<Sender<LoadRequest>>,
    rx: Receiver<LoadResult>,
    handle: Option<thread::JoinHandle<()>>,
    in_flight: HashSet<Uuid>,
}

impl ImageLoader {
    pub fn new() -> Result<Self> {
        let (req_tx, req_rx) = unbounded::<LoadRequest>();
        let (res_tx, res_rx) = unbounded::<LoadResult>();

        let handle = thread::Builder::new()
            .name("drape-decoder".to_string())
            .spawn(move || {
                trace!("Decoder thread started");
                // Ends when the loader drops its sender.
                for req in req_rx.iter() {
                    let result = decode(&req.source).map(Arc::new).map_err(|e| format!("{:#}", e));
                    if res_tx.send(LoadResult { uuid: req.uuid, result }).is_err() {
                        break;
                    }
                }
                trace!("Decoder thread stopped");
            })
            .context("Failed to spawn decoder thread")?;

        Ok(Self {
            tx: Some(req_tx),
            rx: res_rx,
            handle: Some(handle),
            in_flight: HashSet::new(),
        })
    }

    /// Queue a decode for image `uuid`.
    pub fn request(&mut self, uuid: Uuid, source: ImageSource) {
        debug!("Decode requested for {} from {}", uuid, source.describe());
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(LoadRequest { uuid, source }).is_err() {
            warn!("Decoder thread is gone; image {} will not load", uuid);
            return;
        }
        self.in_flight.insert(uuid);
    }

    /// Discard the result of a pending decode (image removed).
    pub fn forget(&mut self, uuid: Uuid) {
        if self.in_flight.remove(&uuid) {
            trace!("Decode result for {} will be discarded", uuid);
        }
    }

    /// Discard every pending result (full reload).
    pub fn forget_all(&mut self) {
        self.in_flight.clear();
    }

    /// Finished decodes, without blocking.
    pub fn poll(&mut self) -> Vec<LoadResult> {
        let results: Vec<LoadResult> = self.rx.try_iter().collect();
        self.accept(results)
    }

    /// Block up to `timeout` for every in-flight decode (CLI, tests).
    pub fn wait(&mut self, timeout: Duration) -> Vec<LoadResult> {
        let deadline = std::time::Instant::now() + timeout;
        let mut out = Vec::new();
        while !self.in_flight.is_empty() {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(res) => out.extend(self.accept(vec![res])),
                Err(_) => break,
            }
        }
        out
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    fn accept(&mut self, results: Vec<LoadResult>) -> Vec<LoadResult> {
        results
            .into_iter()
            .filter(|r| self.in_flight.remove(&r.uuid))
            .collect()
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        // closing the channel ends the decoder loop
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Decoder thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn png_bytes(w: u32, h: u32) -> Arc<[u8]> {
        let img = RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner().into()
    }

    #[test]
    fn test_decode_png_bytes() {
        let img = decode(&ImageSource::Bytes(png_bytes(4, 3))).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(&ImageSource::Bytes(Arc::from(&b"not an image"[..]))).is_err());
        assert!(decode(&ImageSource::Path(PathBuf::from("/nonexistent/drape.png"))).is_err());
    }

    #[test]
    fn test_loader_reports_success_and_failure() {
        let mut loader = ImageLoader::new().unwrap();
        let ok = Uuid::new_v4();
        let bad = Uuid::new_v4();
        loader.request(ok, ImageSource::Bytes(png_bytes(2, 2)));
        loader.request(bad, ImageSource::Bytes(Arc::from(&b"xx"[..])));
        let results = loader.wait(Duration::from_secs(10));
        assert_eq!(results.len(), 2);
        for r in results {
            if r.uuid == ok {
                assert_eq!(r.result.unwrap().dimensions(), (2, 2));
            } else {
                assert_eq!(r.uuid, bad);
                assert!(r.result.is_err());
            }
        }
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_forgotten_result_dropped() {
        let mut loader = ImageLoader::new().unwrap();
        let id = Uuid::new_v4();
        loader.request(id, ImageSource::Bytes(png_bytes(2, 2)));
        loader.forget(id);
        assert!(loader.wait(Duration::from_millis(200)).is_empty());
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_empty());
    }
}
