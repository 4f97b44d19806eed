use nalgebra as na;

pub type Vector2d = na::Vector2<f64>;

pub type Matrixd = na::DMatrix<f64>;

/// Label of one tracked visitor. Assigned monotonically, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
