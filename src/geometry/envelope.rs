/// Axis aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Envelope {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_point(x: f64, y: f64) -> Self {
        Envelope::new(x, y, x, y)
    }

    pub fn expand_to(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Grows `self` to also cover `other`.
    pub fn merge(&mut self, other: &Envelope) {
        self.expand_to(other.min_x, other.min_y);
        self.expand_to(other.max_x, other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = Envelope::new(0.0, 0.0, 1.0, 1.0);
        a.merge(&Envelope::new(-1.0, 0.5, 0.5, 4.0));
        assert_eq!(a, Envelope::new(-1.0, 0.0, 1.0, 4.0));
        assert_eq!(a.width(), 2.0);
        assert_eq!(a.height(), 4.0);
    }

    #[test]
    fn test_intersects() {
        let a = Envelope::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&Envelope::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!a.intersects(&Envelope::new(1.5, 0.0, 2.0, 1.0)));
    }
}
