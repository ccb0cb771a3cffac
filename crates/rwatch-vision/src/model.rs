//! Model-based pothole detection using a YOLOv8-style ONNX model.

use std::path::Path;

use image::RgbImage;
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use rwatch_models::{BoundingBox, Detection};

use crate::detector::{Detector, DetectorConfig};
use crate::error::{DetectionError, DetectionResult};

/// Number of classes in the model head.
const NUM_CLASSES: usize = 80;
/// Number of detection candidates per inference.
const NUM_BOXES: usize = 8400;
/// Per-candidate features: 4 box coords + class scores.
const NUM_FEATURES: usize = 4 + NUM_CLASSES;

/// Pothole detector backed by ONNX Runtime inference.
///
/// Stateless across calls. Every box that survives thresholding and NMS
/// becomes a candidate Detection with the model's reported confidence; the
/// demo-grade model is class-agnostic about what counts as a pothole, so
/// the best class score is taken as the confidence.
#[derive(Debug)]
pub struct ModelDetector {
    session: Session,
    config: DetectorConfig,
}

impl ModelDetector {
    /// Load the model named in the config.
    ///
    /// Returns an error if the model file doesn't exist or cannot be loaded.
    pub fn new(config: DetectorConfig) -> DetectionResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(DetectionError::model_not_found(&config.model_path));
        }

        let session = Session::builder()
            .map_err(|e| DetectionError::inference_failed(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectionError::inference_failed(format!("optimization level: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| DetectionError::inference_failed(format!("model load: {e}")))?;

        info!(
            model_path = %config.model_path,
            input_size = config.input_size,
            "Model detector initialized"
        );

        Ok(Self { session, config })
    }

    /// Preprocess a frame for inference.
    ///
    /// Resize to the model input size, normalize to [0, 1], NCHW layout.
    fn preprocess(&self, frame: &RgbImage) -> DetectionResult<Value> {
        let size = self.config.input_size;
        let resized = image::imageops::resize(frame, size, size, image::imageops::FilterType::Triangle);

        let (w, h) = (size as usize, size as usize);
        let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);

        // HWC -> CHW with normalization to [0, 1]
        for c in 0..3 {
            for y in 0..h {
                for x in 0..w {
                    let pixel = resized.get_pixel(x as u32, y as u32);
                    chw_data.push(pixel[c] as f32 / 255.0);
                }
            }
        }

        let shape = vec![1usize, 3, h, w];
        Tensor::from_array((shape, chw_data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| DetectionError::inference_failed(format!("input tensor: {e}")))
    }

    /// Run inference and collect the raw output tensor.
    fn run_inference(&mut self, input: Value) -> DetectionResult<Vec<f32>> {
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| DetectionError::inference_failed(format!("inference: {e}")))?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| DetectionError::inference_failed("missing output0 tensor"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectionError::inference_failed(format!("output tensor: {e}")))?;

        Ok(tensor.1.iter().copied().collect())
    }

    /// Parse the raw `[1, 84, 8400]` output into pixel-space detections.
    fn postprocess(
        &self,
        outputs: &[f32],
        frame_width: u32,
        frame_height: u32,
    ) -> DetectionResult<Vec<Detection>> {
        if outputs.len() != NUM_FEATURES * NUM_BOXES {
            return Err(DetectionError::inference_failed(format!(
                "unexpected output size: expected {}, got {}",
                NUM_FEATURES * NUM_BOXES,
                outputs.len()
            )));
        }

        // Output is [84, 8400]; transpose to iterate per candidate.
        let output_array = Array::from_shape_vec((NUM_FEATURES, NUM_BOXES), outputs.to_vec())
            .map_err(|e| DetectionError::inference_failed(format!("output reshape: {e}")))?;
        let transposed = output_array.t();

        let input_size = self.config.input_size as f32;
        let scale_w = frame_width as f32 / input_size;
        let scale_h = frame_height as f32 / input_size;

        let mut candidates: Vec<Detection> = Vec::new();

        for i in 0..NUM_BOXES {
            // Box in center format, model coordinates
            let cx = transposed[[i, 0]];
            let cy = transposed[[i, 1]];
            let w = transposed[[i, 2]];
            let h = transposed[[i, 3]];

            let mut best_score = 0.0f32;
            for c in 0..NUM_CLASSES {
                let score = transposed[[i, 4 + c]];
                if score > best_score {
                    best_score = score;
                }
            }

            if best_score < self.config.confidence_threshold {
                continue;
            }

            // Center format -> corner format, scaled back to frame pixels
            let x = ((cx - w / 2.0) * scale_w) as f64;
            let y = ((cy - h / 2.0) * scale_h) as f64;
            let width = (w * scale_w) as f64;
            let height = (h * scale_h) as f64;

            let bbox = BoundingBox::new(x, y, width, height);
            if bbox.to_pixel_rect(frame_width, frame_height).is_none() {
                continue;
            }

            candidates.push(Detection::new(bbox, best_score as f64));
        }

        Ok(non_maximum_suppression(
            candidates,
            self.config.nms_threshold as f64,
        ))
    }
}

/// Suppress overlapping candidates, keeping the highest-confidence box.
fn non_maximum_suppression(mut detections: Vec<Detection>, nms_threshold: f64) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i]);

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) > nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

impl Detector for ModelDetector {
    fn detect(&mut self, frame: &RgbImage) -> DetectionResult<Vec<Detection>> {
        let input = self.preprocess(frame)?;
        let outputs = self.run_inference(input)?;
        let detections = self.postprocess(&outputs, frame.width(), frame.height())?;

        debug!(count = detections.len(), "Model detection completed");
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
