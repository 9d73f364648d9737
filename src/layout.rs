use rand::Rng;

/// Draws per label before giving up on the distance check
pub const MAX_PLACEMENT_ATTEMPTS: usize = 200;

/// The virtual box buttons are scattered in. Units are arbitrary; renderers
/// scale them through the percentage accessors on [`Position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutArea {
    pub width: f64,
    pub height: f64,
    /// Size of one item; positions are the item's top-left corner
    pub item_size: f64,
    pub padding: f64,
    /// Extra room above the items (the shuffle countdown bar lives there)
    pub top_inset: f64,
    pub min_distance: f64,
}

impl Default for LayoutArea {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 480.0,
            item_size: 72.0,
            padding: 20.0,
            top_inset: 5.0,
            min_distance: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

impl LayoutArea {
    /// Items must sit fully inside the box, so the far edges lose one item size
    pub fn bounds(&self) -> Bounds {
        let min_x = self.padding;
        let min_y = self.padding + self.top_inset;
        Bounds {
            min_x,
            max_x: (self.width - self.item_size - self.padding).max(min_x),
            min_y,
            max_y: (self.height - self.item_size - self.padding).max(min_y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub label: u8,
    pub x: f64,
    pub y: f64,
    /// Placed by the clamp fallback, no separation guarantee
    pub fallback: bool,
}

impl Position {
    pub fn x_percent(&self, area: &LayoutArea) -> f64 {
        self.x / area.width * 100.0
    }

    pub fn y_percent(&self, area: &LayoutArea) -> f64 {
        self.y / area.height * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RandomLayoutGenerator {
    area: LayoutArea,
}

impl RandomLayoutGenerator {
    pub fn new(area: LayoutArea) -> Self {
        Self { area }
    }

    pub fn area(&self) -> &LayoutArea {
        &self.area
    }

    pub fn generate<R: Rng + ?Sized>(&self, labels: &[u8], rng: &mut R) -> Vec<Position> {
        let bounds = self.area.bounds();
        let mut placed: Vec<Position> = Vec::with_capacity(labels.len());

        for &label in labels {
            let accepted = (0..MAX_PLACEMENT_ATTEMPTS)
                .map(|_| draw(&bounds, rng))
                .find(|&(x, y)| !self.too_close(&placed, x, y));

            let position = match accepted {
                Some((x, y)) => Position {
                    label,
                    x,
                    y,
                    fallback: false,
                },
                None => {
                    let (x, y) = draw(&bounds, rng);
                    tracing::debug!(label, "layout fell back to an unchecked position");
                    Position {
                        label,
                        x: x.clamp(bounds.min_x, bounds.max_x),
                        y: y.clamp(bounds.min_y, bounds.max_y),
                        fallback: true,
                    }
                }
            };
            placed.push(position);
        }

        placed
    }

    /// Chebyshev-style check: too close only when both axes are within range
    fn too_close(&self, placed: &[Position], x: f64, y: f64) -> bool {
        let min = self.area.min_distance;
        placed
            .iter()
            .any(|p| (p.x - x).abs() < min && (p.y - y).abs() < min)
    }
}

fn draw<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> (f64, f64) {
    let x = bounds.min_x + rng.gen::<f64>() * (bounds.max_x - bounds.min_x);
    let y = bounds.min_y + rng.gen::<f64>() * (bounds.max_y - bounds.min_y);
    (x, y)
}
