pub const DETECTOR_ASSET_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const DETECTOR_ASSET_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

pub const EMOTION_MODEL_NAME: &str = "emotion_yolo11n_cls.onnx";
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/moodcam/moodcam/releases/download/v0.1.0/emotion_yolo11n_cls.onnx";

pub const LABELS_NAME: &str = "classes.json";
pub const LABELS_URL: &str =
    "https://github.com/moodcam/moodcam/releases/download/v0.1.0/classes.json";

pub const OVERLAY_FONT_NAME: &str = "DejaVuSans.ttf";
pub const OVERLAY_FONT_URL: &str =
    "https://github.com/moodcam/moodcam/releases/download/v0.1.0/DejaVuSans.ttf";

/// Spatial size S of the classifier input tensor (S x S).
pub const DEFAULT_TENSOR_SIZE: u32 = 64;

/// Multi-scale search step of the face detector.
pub const DEFAULT_SCALE_FACTOR: f32 = 1.1;

/// Evidence required to keep a detection.
pub const DEFAULT_MIN_NEIGHBORS: u32 = 3;

/// Smallest face the detector searches for, in pixels.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
