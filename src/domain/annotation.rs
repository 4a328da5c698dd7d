use super::detection::{BoundingBox, Detection};

/// Horizontal offset of the label block from the box's left edge.
pub const TEXT_PADDING: i32 = 10;
pub const LINE_SPACING: i32 = 35;
/// Minimum room the label needs above the box before it is moved below it.
pub const LABEL_HEADROOM: i32 = 100;
const LABEL_GAP: i32 = 10;

/// Where and what to draw for one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBlock {
    pub x: i32,
    pub y: i32,
    pub lines: [String; 4],
}

impl LabelBlock {
    /// Baseline of each stacked line.
    pub fn line_origins(&self) -> impl Iterator<Item = (i32, i32, &str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (self.x, self.y + i as i32 * LINE_SPACING, line.as_str()))
    }
}

/// Label anchor: just above the box when there is headroom, otherwise just below.
pub fn label_anchor(bbox: &BoundingBox) -> (i32, i32) {
    let y = if bbox.y1 - LABEL_HEADROOM > LABEL_GAP {
        bbox.y1 - LABEL_GAP
    } else {
        bbox.y2 + LABEL_GAP
    };
    (bbox.x1 + TEXT_PADDING, y)
}

pub fn label_block(det: &Detection) -> LabelBlock {
    let (x, y) = label_anchor(&det.bounding_box);
    LabelBlock { x, y, lines: det.label_lines() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: i32, y1: i32, x2: i32, y2: i32) -> BoundingBox {
        BoundingBox { x1, y1, x2, y2 }
    }

    #[test]
    fn label_goes_above_box_with_headroom() {
        assert_eq!(label_anchor(&bbox(50, 300, 90, 400)), (60, 290));
    }

    #[test]
    fn label_drops_below_box_near_top_edge() {
        assert_eq!(label_anchor(&bbox(50, 40, 90, 120)), (60, 130));
        // exactly 110 is not enough headroom
        assert_eq!(label_anchor(&bbox(0, 110, 10, 150)), (10, 160));
        assert_eq!(label_anchor(&bbox(0, 111, 10, 150)), (10, 101));
    }

    #[test]
    fn lines_stack_at_fixed_spacing() {
        let block = LabelBlock {
            x: 5,
            y: 100,
            lines: ["a".into(), "b".into(), "c".into(), "d".into()],
        };
        let ys: Vec<i32> = block.line_origins().map(|(_, y, _)| y).collect();
        assert_eq!(ys, vec![100, 135, 170, 205]);
    }
}
