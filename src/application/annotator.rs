use image::RgbImage;
use std::sync::Arc;

use crate::application::ports::OverlayPort;
use crate::domain::detection::{Detection, RawDetection};

/// Turns raw detector output into detection records and draws them.
#[derive(Clone)]
pub struct Annotator {
    overlay: Arc<dyn OverlayPort>,
}

impl Annotator {
    pub fn new(overlay: Arc<dyn OverlayPort>) -> Self {
        Self { overlay }
    }

    /// Records keep the detector's order; the image is modified in place.
    pub fn annotate(&self, image: &mut RgbImage, raw: &[RawDetection]) -> Vec<Detection> {
        let detections: Vec<Detection> = raw.iter().map(Detection::from_raw).collect();
        self.overlay.draw(image, &detections);
        detections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOverlay {
        seen: Mutex<Vec<String>>,
    }

    impl OverlayPort for RecordingOverlay {
        fn draw(&self, image: &mut RgbImage, detections: &[Detection]) {
            let mut seen = self.seen.lock().unwrap();
            for det in detections {
                seen.push(det.class.to_string());
            }
            image.put_pixel(0, 0, image::Rgb([1, 2, 3]));
        }
    }

    fn raw(label: &str, score: f32) -> RawDetection {
        RawDetection { x1: 1.0, y1: 1.0, x2: 5.0, y2: 5.0, score, class_id: 0, label: label.into() }
    }

    #[test]
    fn records_follow_detector_order_and_image_is_drawn() {
        let overlay = Arc::new(RecordingOverlay::default());
        let annotator = Annotator::new(overlay.clone());
        let mut img = RgbImage::new(8, 8);

        let dets = annotator.annotate(&mut img, &[raw("cloud", 0.3), raw("ship", 0.9)]);

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class.name(), "cloud");
        assert_eq!(dets[1].confidence, 90.0);
        assert_eq!(*overlay.seen.lock().unwrap(), vec!["cloud", "ship"]);
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3]);
    }
}
