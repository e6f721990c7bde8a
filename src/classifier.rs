//! Classifier gateway — image preprocessing, model backend, and the
//! lazy-once model loader.
//!
//! The model itself is an opaque pretrained artifact. This module owns the
//! path from uploaded bytes to a `DiseaseLabel`: decode, normalize into the
//! expected tensor shape, run the backend, take the argmax. The real backend
//! is an ONNX Runtime session behind the `onnx-model` feature; a
//! deterministic mock is available unconditionally for tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use ndarray::Array4;
use thiserror::Error;

use crate::disease::{DiseaseLabel, LABEL_COUNT};

/// Model input edge length in pixels.
pub const INPUT_SIZE: u32 = 224;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The upload could not be decoded as an image. Client error.
    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("model initialization failed: {0}")]
    ModelInit(String),

    #[error("inference failed: {0}")]
    Inference(String),

    /// The backend returned a score vector that does not match the label set.
    #[error("malformed model output: {0}")]
    BadOutput(String),
}

impl ClassifierError {
    /// Whether this error is the caller's fault (bad upload) rather than a
    /// missing or broken model.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifierError::Decode(_))
    }
}

/// Decode an uploaded image and normalize it into the model's input tensor:
/// RGB, 224×224, intensities scaled to [0, 1], leading batch dimension of 1.
pub fn preprocess(image_bytes: &[u8]) -> Result<Array4<f32>, ClassifierError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| ClassifierError::Decode(e.to_string()))?
        .to_rgb8();

    let resized = image::imageops::resize(
        &img,
        INPUT_SIZE,
        INPUT_SIZE,
        image::imageops::FilterType::Triangle,
    );

    let mut input = Array4::<f32>::zeros((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (c, &v) in pixel.0.iter().enumerate() {
            input[[0, y as usize, x as usize, c]] = v as f32 / 255.0;
        }
    }

    Ok(input)
}

/// Index of the highest score; ties resolve to the first maximum.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Backend seam: anything that can score a preprocessed image tensor.
pub trait ClassifierModel: Send + Sync {
    /// Run inference, returning one score per class in label order.
    fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

// ═══════════════════════════════════════════════════════════
// ONNX backend — behind `onnx-model` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-model")]
mod onnx {
    use super::{Array4, ClassifierError, ClassifierModel, Path};
    use ort::session::Session;
    use std::sync::Mutex;

    /// Real classifier backend using ONNX Runtime.
    ///
    /// Uses interior mutability (Mutex) because `ort::Session::run` requires
    /// `&mut self` but `ClassifierModel` exposes `&self` for shared usage.
    pub struct OnnxModel {
        session: Mutex<Session>,
    }

    impl OnnxModel {
        /// Load the ONNX model from a file path.
        ///
        /// The session is pinned to a single intra-op thread; inference is
        /// already per-request and the model must not fan out across cores.
        pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
            if !model_path.exists() {
                return Err(ClassifierError::ModelNotFound(model_path.to_path_buf()));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
                .with_intra_threads(1)
                .map_err(|e: ort::Error| ClassifierError::ModelInit(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e: ort::Error| {
                    ClassifierError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            tracing::info!("classifier model loaded from {}", model_path.display());

            Ok(Self {
                session: Mutex::new(session),
            })
        }
    }

    impl ClassifierModel for OnnxModel {
        fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            use ort::value::TensorRef;

            let tensor = TensorRef::from_array_view(input)
                .map_err(|e| ClassifierError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| ClassifierError::Inference("session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![tensor])
                .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

            let (_, scores) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ClassifierError::BadOutput(format!("output extraction: {e}")))?;

            Ok(scores.to_vec())
        }
    }
}

#[cfg(feature = "onnx-model")]
pub use onnx::OnnxModel;

/// Mock backend for testing — returns a fixed score vector.
pub struct MockModel {
    scores: Vec<f32>,
}

impl MockModel {
    /// A mock whose argmax lands on `winner`.
    pub fn predicting(winner: DiseaseLabel) -> Self {
        let index = DiseaseLabel::ALL
            .iter()
            .position(|l| *l == winner)
            .unwrap_or(0);
        let mut scores = vec![0.01f32; LABEL_COUNT];
        scores[index] = 0.9;
        Self { scores }
    }

    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self { scores }
    }
}

impl ClassifierModel for MockModel {
    fn run(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        Ok(self.scores.clone())
    }
}

// ═══════════════════════════════════════════════════════════
// Lazy-once loading
// ═══════════════════════════════════════════════════════════

type ModelLoader =
    Box<dyn Fn(&Path) -> Result<Arc<dyn ClassifierModel>, ClassifierError> + Send + Sync>;

/// Process-wide classifier with lazy, at-most-once model loading.
///
/// The first `predict` loads the model; the `OnceLock` is written under a
/// mutex with a second check inside the critical section, so overlapping
/// first requests never load the model twice. After initialization the
/// model is read-only shared state.
pub struct Classifier {
    model_path: PathBuf,
    model: OnceLock<Arc<dyn ClassifierModel>>,
    init_lock: Mutex<()>,
    loader: ModelLoader,
}

impl Classifier {
    /// Classifier backed by the default loader for this build.
    ///
    /// With the `onnx-model` feature the loader opens an ONNX session at
    /// `model_path`; without it, the first prediction reports the model as
    /// unavailable (a server-side error, never a client error).
    pub fn new(model_path: PathBuf) -> Self {
        Self::with_loader(model_path, Box::new(default_loader))
    }

    /// Classifier with an injected loader. Test seam.
    pub fn with_loader(model_path: PathBuf, loader: ModelLoader) -> Self {
        Self {
            model_path,
            model: OnceLock::new(),
            init_lock: Mutex::new(()),
            loader,
        }
    }

    /// Whether the model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model(&self) -> Result<Arc<dyn ClassifierModel>, ClassifierError> {
        if let Some(model) = self.model.get() {
            return Ok(model.clone());
        }

        let _guard = self
            .init_lock
            .lock()
            .map_err(|_| ClassifierError::ModelInit("init lock poisoned".to_string()))?;

        // Second check: another request may have finished loading while we
        // waited on the lock.
        if let Some(model) = self.model.get() {
            return Ok(model.clone());
        }

        let model = (self.loader)(&self.model_path)?;
        let _ = self.model.set(model.clone());
        Ok(model)
    }

    /// Classify an uploaded image, returning one label from the closed set.
    pub fn predict(&self, image_bytes: &[u8]) -> Result<DiseaseLabel, ClassifierError> {
        let input = preprocess(image_bytes)?;
        let model = self.model()?;
        let scores = model.run(&input)?;

        if scores.len() != LABEL_COUNT {
            return Err(ClassifierError::BadOutput(format!(
                "expected {LABEL_COUNT} class scores, got {}",
                scores.len()
            )));
        }

        let index = argmax(&scores)
            .ok_or_else(|| ClassifierError::BadOutput("empty score vector".to_string()))?;

        DiseaseLabel::from_index(index).ok_or_else(|| {
            ClassifierError::BadOutput(format!("argmax index {index} outside label set"))
        })
    }
}

#[cfg(feature = "onnx-model")]
fn default_loader(path: &Path) -> Result<Arc<dyn ClassifierModel>, ClassifierError> {
    Ok(Arc::new(OnnxModel::load(path)?))
}

#[cfg(not(feature = "onnx-model"))]
fn default_loader(path: &Path) -> Result<Arc<dyn ClassifierModel>, ClassifierError> {
    Err(ClassifierError::ModelInit(format!(
        "built without the `onnx-model` feature; cannot load {}",
        path.display()
    )))
}
