//! Annotation of output frames

use crate::detection::VisualizationConfig;
use crate::table::TableBoundary;
use opencv::{
    core::{Mat, Point, Scalar, Vector},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};
use snooker_core::{BallMap, ColourId};

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

pub struct BallRenderer {
    config: VisualizationConfig,
}

impl BallRenderer {
    pub fn new(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Label and outline every ball, or only those of `only`.
    pub fn draw_balls(
        &self,
        frame: &mut Mat,
        balls: &BallMap,
        only: Option<ColourId>,
    ) -> opencv::Result<()> {
        let selected = balls
            .iter()
            .filter(|(colour, _)| only.is_none_or(|c| c == **colour))
            .flat_map(|(_, balls)| balls);

        for ball in selected {
            let x = ball.blob.x as i32;
            let y = ball.blob.y as i32;

            if self.config.draw_labels {
                imgproc::put_text(
                    frame,
                    ball.colour.name(),
                    Point::new(x + 10, y),
                    FONT_HERSHEY_SIMPLEX,
                    0.6,
                    green(),
                    2,
                    LINE_8,
                    false,
                )?;
            }

            if self.config.draw_circles {
                imgproc::circle(
                    frame,
                    Point::new(x, y),
                    ball.blob.radius as i32,
                    green(),
                    1,
                    LINE_8,
                    0,
                )?;
            }
        }
        Ok(())
    }

    pub fn draw_table_boundary(
        &self,
        frame: &mut Mat,
        boundary: &TableBoundary,
    ) -> opencv::Result<()> {
        if !self.config.draw_table_boundary {
            return Ok(());
        }
        let mut contours = Vector::<Vector<Point>>::new();
        contours.push(boundary.contour.clone());
        draw_outline(frame, &contours, Scalar::all(255.0), 3)
    }

    /// Outline a highlighted colour's contours.
    pub fn draw_colour_contours(
        &self,
        frame: &mut Mat,
        contours: &Vector<Vector<Point>>,
    ) -> opencv::Result<()> {
        draw_outline(frame, contours, green(), 2)
    }
}

fn draw_outline(
    frame: &mut Mat,
    contours: &Vector<Vector<Point>>,
    colour: Scalar,
    thickness: i32,
) -> opencv::Result<()> {
    imgproc::draw_contours(
        frame,
        contours,
        -1,
        colour,
        thickness,
        LINE_8,
        &opencv::core::no_array(),
        i32::MAX,
        Point::new(0, 0),
    )
}
