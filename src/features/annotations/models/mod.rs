mod annotation;
mod shape;

pub use annotation::Annotation;
pub use shape::{AnnotationShape, Point};
