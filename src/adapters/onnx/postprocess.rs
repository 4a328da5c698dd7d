use crate::domain::detection::RawDetection;

pub fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = ix * iy;
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;
    if union <= 0.0 { 0.0 } else { inter / union }
}

/// Class-aware NMS. Output is sorted by descending score and capped at `max_det`.
pub fn nms(mut dets: Vec<RawDetection>, iou_th: f32, max_det: usize) -> Vec<RawDetection> {
    dets.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    let mut kept: Vec<RawDetection> = Vec::new();

    'outer: for d in dets {
        if kept.len() >= max_det {
            break;
        }
        for k in &kept {
            if k.class_id == d.class_id && iou(&d, k) > iou_th {
                continue 'outer;
            }
        }
        kept.push(d);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_id: usize, score: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> RawDetection {
        RawDetection { x1, y1, x2, y2, score, class_id, label: String::new() }
    }

    #[test]
    fn iou_of_identical_and_disjoint_boxes() {
        let a = det(0, 0.5, 0.0, 0.0, 10.0, 10.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        let b = det(0, 0.5, 20.0, 20.0, 30.0, 30.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn suppresses_overlapping_same_class_only() {
        let dets = vec![
            det(0, 0.6, 0.0, 0.0, 10.0, 10.0),
            det(0, 0.9, 1.0, 1.0, 11.0, 11.0),
            det(1, 0.8, 0.0, 0.0, 10.0, 10.0),
        ];
        let kept = nms(dets, 0.45, 10);
        let scores: Vec<f32> = kept.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.9, 0.8]);
    }

    #[test]
    fn caps_at_max_detections() {
        let dets = (0..5).map(|i| det(0, 0.5, i as f32 * 100.0, 0.0, i as f32 * 100.0 + 10.0, 10.0)).collect();
        assert_eq!(nms(dets, 0.45, 3).len(), 3);
    }
}
