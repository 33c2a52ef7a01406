//! Renderer independent geometry. Paths are plain point lists in screen coordinates (y grows
//! downwards) that any drawing backend can stroke.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis aligned rectangle, `(x, y)` is the top left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Shrinks every side by the given amounts
    pub fn trimmed(&self, top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            width: (self.width - left - right).max(0.0),
            height: (self.height - top - bottom).max(0.0),
        }
    }

    /// Cuts a strip of `amount` off the top, returning the strip and keeping the rest
    pub fn remove_from_top(&mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, self.height);
        let strip = Self::new(self.x, self.y, self.width, amount);
        self.y += amount;
        self.height -= amount;
        strip
    }

    pub fn remove_from_bottom(&mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, self.height);
        self.height -= amount;
        Self::new(self.x, self.bottom(), self.width, amount)
    }

    pub fn remove_from_left(&mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, self.width);
        let strip = Self::new(self.x, self.y, amount, self.height);
        self.x += amount;
        self.width -= amount;
        strip
    }

    pub fn remove_from_right(&mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, self.width);
        self.width -= amount;
        Self::new(self.right(), self.y, amount, self.height)
    }

    /// Square of side `size` centred in this rectangle, shrunk to fit
    pub fn centered_square(&self, size: f32) -> Self {
        let size = size.min(self.width).min(self.height).max(0.0);
        let center = self.center();
        Self::new(center.x - size * 0.5, center.y - size * 0.5, size, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    /// Starts a new sub-path
    MoveTo(Point),
    LineTo(Point),
}

impl PathElement {
    pub fn point(&self) -> Point {
        match self {
            Self::MoveTo(point) | Self::LineTo(point) => *point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn move_to(&mut self, point: Point) {
        self.elements.push(PathElement::MoveTo(point));
    }

    /// Adds a segment to `point`. Starts a sub-path instead when the path is empty.
    pub fn line_to(&mut self, point: Point) {
        if self.elements.is_empty() {
            self.move_to(point);
        } else {
            self.elements.push(PathElement::LineTo(point));
        }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.elements.iter().map(PathElement::point)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
