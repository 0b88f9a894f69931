/// Face bounding box drawn over a matched photo
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Size};

use crate::app::Message;
use crate::state::data::FaceLocation;
use crate::state::face_search::SimilarityTier;

#[derive(Debug, Clone)]
pub struct FaceOverlay {
    /// Pixel size of the photo underneath
    pub image_size: (u32, u32),
    pub face: FaceLocation,
    pub tier: SimilarityTier,
}

impl canvas::Program<Message> for FaceOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if let Some(rect) = fit_face(bounds.size(), self.image_size, self.face) {
            let path = Path::rectangle(Point::new(rect.x, rect.y), rect.size());
            frame.stroke(
                &path,
                Stroke::default()
                    .with_color(tier_color(self.tier))
                    .with_width(3.0),
            );
        }

        vec![frame.into_geometry()]
    }
}

pub fn tier_color(tier: SimilarityTier) -> Color {
    match tier {
        SimilarityTier::Success => Color::from_rgb(0.30, 0.75, 0.40),
        SimilarityTier::Warn => Color::from_rgb(0.95, 0.65, 0.15),
        SimilarityTier::Default => Color::from_rgb(0.65, 0.65, 0.65),
    }
}

/// Map a face box from image pixels into a canvas that shows the image
/// scaled down to fit (letterboxed, centered)
pub fn fit_face(canvas: Size, image_size: (u32, u32), face: FaceLocation) -> Option<Rectangle> {
    let (img_w, img_h) = (image_size.0 as f32, image_size.1 as f32);
    if img_w <= 0.0 || img_h <= 0.0 || face.width <= 0 || face.height <= 0 {
        return None;
    }

    // never upscale past 100%, matching the viewer's ScaleDown fit
    let scale = (canvas.width / img_w).min(canvas.height / img_h).min(1.0);
    let offset_x = (canvas.width - img_w * scale) / 2.0;
    let offset_y = (canvas.height - img_h * scale) / 2.0;

    Some(Rectangle {
        x: offset_x + face.x as f32 * scale,
        y: offset_y + face.y as f32 * scale,
        width: face.width as f32 * scale,
        height: face.height as f32 * scale,
    })
}
