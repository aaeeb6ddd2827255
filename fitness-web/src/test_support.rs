//! Synthetic landmark frames for unit tests
//!
//! Side-view builders put the left side nearer the camera (z 0.0 vs 0.1)
//! and face the subject toward +x.

use crate::pose::{Landmark, LandmarkFrame, Limb, PoseLandmark, Side, LANDMARK_COUNT};

const NEAR_Z: f32 = 0.0;
const FAR_Z: f32 = 0.1;

/// Fluent builder over the 33 landmark slots
pub struct FrameBuilder {
    points: [Option<Landmark>; LANDMARK_COUNT],
}

impl FrameBuilder {
    pub fn empty() -> Self {
        Self {
            points: [None; LANDMARK_COUNT],
        }
    }

    /// Every landmark present at the frame centre
    pub fn filled() -> Self {
        Self {
            points: [Some(Landmark::new(0.5, 0.5, 0.0)); LANDMARK_COUNT],
        }
    }

    pub fn set(mut self, joint: PoseLandmark, landmark: Landmark) -> Self {
        self.points[joint.index()] = Some(landmark);
        self
    }

    pub fn at(self, joint: PoseLandmark, x: f32, y: f32) -> Self {
        self.set(joint, Landmark::new(x, y, NEAR_Z))
    }

    /// Same position for the left (near) and right (far) joint of a limb
    pub fn both(self, limb: Limb, x: f32, y: f32) -> Self {
        self.side(Side::Left, limb, x, y).side(Side::Right, limb, x, y)
    }

    pub fn side(self, side: Side, limb: Limb, x: f32, y: f32) -> Self {
        let z = match side {
            Side::Left => NEAR_Z,
            Side::Right => FAR_Z,
        };
        self.set(PoseLandmark::of(side, limb), Landmark::new(x, y, z))
    }

    pub fn clear(mut self, joint: PoseLandmark) -> Self {
        self.points[joint.index()] = None;
        self
    }

    pub fn shift(mut self, joint: PoseLandmark, dx: f32, dy: f32) -> Self {
        if let Some(landmark) = self.points[joint.index()].as_mut() {
            landmark.x += dx;
            landmark.y += dy;
        }
        self
    }

    pub fn build(self) -> LandmarkFrame {
        LandmarkFrame::new(self.points)
    }
}

impl From<LandmarkFrame> for FrameBuilder {
    fn from(frame: LandmarkFrame) -> Self {
        let mut builder = FrameBuilder::empty();
        for joint in PoseLandmark::ALL {
            builder.points[joint.index()] = frame.get(joint).copied();
        }
        builder
    }
}

/// Side-view push-up with the given elbow angle. `hip_drop` sags the hips
/// below the shoulder→ankle line, dragging the knees along so the legs
/// stay straight.
pub fn pushup_frame(elbow_deg: f32, hip_drop: f32) -> LandmarkFrame {
    let theta = elbow_deg.to_radians();
    let (elbow_x, elbow_y) = (0.3, 0.6);
    let wrist = (elbow_x + 0.1 * theta.sin(), elbow_y - 0.1 * theta.cos());

    FrameBuilder::filled()
        .at(PoseLandmark::Nose, 0.2, 0.45)
        .both(Limb::Shoulder, 0.3, 0.5)
        .both(Limb::Elbow, elbow_x, elbow_y)
        .both(Limb::Wrist, wrist.0, wrist.1)
        .both(Limb::Hip, 0.55, 0.5 + hip_drop)
        .both(Limb::Knee, 0.7, 0.5 + hip_drop / 2.0)
        .both(Limb::Ankle, 0.85, 0.5)
        .both(Limb::FootIndex, 0.88, 0.52)
        .build()
}

/// Side-view squat with the given knee angle; hips reach knee height at 90°
pub fn squat_frame(knee_deg: f32) -> LandmarkFrame {
    let theta = knee_deg.to_radians();
    let (knee_x, knee_y) = (0.5, 0.65);
    let hip = (knee_x - 0.2 * theta.sin(), knee_y + 0.2 * theta.cos());
    let lean = 0.1 * (180.0 - knee_deg) / 90.0;
    let shoulder = (hip.0 + lean, hip.1 - 0.25);

    FrameBuilder::filled()
        .at(PoseLandmark::Nose, shoulder.0 + 0.05, shoulder.1 - 0.08)
        .both(Limb::Shoulder, shoulder.0, shoulder.1)
        .both(Limb::Elbow, shoulder.0 + 0.05, shoulder.1 + 0.1)
        .both(Limb::Wrist, shoulder.0 + 0.12, shoulder.1 + 0.1)
        .both(Limb::Hip, hip.0, hip.1)
        .both(Limb::Knee, knee_x, knee_y)
        .both(Limb::Ankle, 0.5, 0.85)
        .both(Limb::FootIndex, 0.56, 0.87)
        .build()
}

/// Front-view squat. `gap` is knee.y - hip.y, `knee_spread` the horizontal
/// distance between the knees, `ankle_offset` how far each ankle sits
/// inside its knee.
pub fn front_squat_frame(gap: f32, knee_spread: f32, ankle_offset: f32) -> LandmarkFrame {
    let knee_y = 0.7;
    let hip_y = knee_y - gap;
    let shoulder_y = hip_y - 0.25;
    let left_knee = 0.5 - knee_spread / 2.0;
    let right_knee = 0.5 + knee_spread / 2.0;

    FrameBuilder::filled()
        .at(PoseLandmark::Nose, 0.5, shoulder_y - 0.1)
        .side(Side::Left, Limb::Shoulder, 0.4, shoulder_y)
        .side(Side::Right, Limb::Shoulder, 0.6, shoulder_y)
        .side(Side::Left, Limb::Hip, 0.425, hip_y)
        .side(Side::Right, Limb::Hip, 0.575, hip_y)
        .side(Side::Left, Limb::Knee, left_knee, knee_y)
        .side(Side::Right, Limb::Knee, right_knee, knee_y)
        .side(Side::Left, Limb::Ankle, left_knee + ankle_offset, 0.9)
        .side(Side::Right, Limb::Ankle, right_knee - ankle_offset, 0.9)
        .build()
}

/// Side-view lunge facing +x with `front` leading. Bent frames put both
/// knees at right angles; upright frames keep both legs nearly straight.
pub fn lunge_frame(front: Side, bent: bool) -> LandmarkFrame {
    let back = front.other();
    let builder = FrameBuilder::filled()
        .at(PoseLandmark::Nose, 0.56, 0.12)
        .both(Limb::Shoulder, 0.5, 0.2)
        .both(Limb::Hip, 0.5, 0.45);

    if bent {
        builder
            .side(front, Limb::Knee, 0.67, 0.45)
            .side(front, Limb::Ankle, 0.67, 0.62)
            .side(front, Limb::FootIndex, 0.72, 0.63)
            .side(back, Limb::Knee, 0.5, 0.62)
            .side(back, Limb::Ankle, 0.33, 0.62)
            .side(back, Limb::FootIndex, 0.30, 0.64)
            .build()
    } else {
        builder
            .side(front, Limb::Knee, 0.52, 0.65)
            .side(front, Limb::Ankle, 0.53, 0.85)
            .side(front, Limb::FootIndex, 0.58, 0.86)
            .side(back, Limb::Knee, 0.48, 0.65)
            .side(back, Limb::Ankle, 0.47, 0.85)
            .side(back, Limb::FootIndex, 0.52, 0.86)
            .build()
    }
}

/// Side-view forearm plank; `knee_drop` bends the knees toward the floor
pub fn plank_frame(knee_drop: f32) -> LandmarkFrame {
    FrameBuilder::filled()
        .at(PoseLandmark::Nose, 0.2, 0.48)
        .both(Limb::Shoulder, 0.3, 0.5)
        .both(Limb::Elbow, 0.3, 0.65)
        .both(Limb::Wrist, 0.45, 0.65)
        .both(Limb::Hip, 0.55, 0.52)
        .both(Limb::Knee, 0.7, 0.54 + knee_drop)
        .both(Limb::Ankle, 0.85, 0.56)
        .both(Limb::FootIndex, 0.88, 0.58)
        .build()
}

/// Side-view sit-up with knees bent, lying down or sitting up
pub fn situp_frame(up: bool) -> LandmarkFrame {
    let (shoulder, nose) = if up {
        ((0.55, 0.45), (0.6, 0.38))
    } else {
        ((0.2, 0.7), (0.12, 0.68))
    };

    FrameBuilder::filled()
        .at(PoseLandmark::Nose, nose.0, nose.1)
        .both(Limb::Shoulder, shoulder.0, shoulder.1)
        .both(Limb::Hip, 0.5, 0.7)
        .both(Limb::Knee, 0.6, 0.55)
        .both(Limb::Ankle, 0.7, 0.7)
        .build()
}
