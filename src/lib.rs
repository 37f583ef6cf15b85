//! Path and geometry kernel for 2D vector graphics.
//!
//! This crate implements the geometry that sits underneath a shape-drawing library:
//!
//! * [`path_builder::PathStream`], a compact stream of path commands that can be replayed
//!   into any [`path_builder::PathSink`], like a raster canvas or an SVG serializer.
//!
//! * A parser for SVG path data in [`path_parser`], and a writer in [`path_writer`].
//!
//! * Bezier and elliptical arc math in [`bezier`]: evaluation, root finding, extrema,
//!   subdivision, and arc conversions.
//!
//! * Affine transforms in [`transform`].
//!
//! * Bounding boxes in [`bbox`] and point containment in [`contain`].
//!
//! * Shapes described by their parameters, which build their own paths, in [`shapes`].
//!
//! * Morphing between arbitrary paths in [`morph`].
//!
//! # Example
//!
//! ```
//! use vgkernel::{FillRule, PathStream, Shape, ShapeDescriptor};
//!
//! let (path, result) = PathStream::from_path_data("M 10 10 L 90 10 L 50 80 Z");
//! assert!(result.is_ok());
//!
//! let shape = Shape::new(ShapeDescriptor::Path(path)).with_fill_rule(FillRule::NonZero);
//! assert!(shape.contains(50.0, 30.0));
//! assert!(!shape.contains(10.0, 70.0));
//!
//! let rect = shape.bounding_rect();
//! assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (10.0, 10.0, 90.0, 80.0));
//! ```
//!
//! # Logging
//!
//! Set the `VGKERNEL_LOG` environment variable to get messages about degraded output,
//! like path data with errors or segments dropped because of non-finite coordinates.

#![allow(rustdoc::private_intra_doc_links)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
// Some lints no longer exist
#![warn(renamed_and_removed_lints)]
// Standalone lints
#![warn(trivial_casts, trivial_numeric_casts)]

// The log module goes first, so its macro is available to all the others.
#[macro_use]
pub mod log;

pub mod angle;
pub mod bbox;
pub mod bezier;
pub mod contain;
pub mod error;
pub mod float_eq;
pub mod morph;
pub mod path_builder;
pub mod path_parser;
pub mod path_writer;
pub mod rect;
pub mod shapes;
pub mod transform;
pub mod util;

pub use crate::bbox::BoundingBox;
pub use crate::contain::FillRule;
pub use crate::error::{InvalidTransform, MorphError, ParseError, StreamError};
pub use crate::morph::{Morph, MorphOptions, MorphPlan, MorphState};
pub use crate::path_builder::{PathCommand, PathSink, PathStream};
pub use crate::path_writer::{to_path_data, SvgPathWriter, WriterOptions};
pub use crate::rect::Rect;
pub use crate::shapes::{Shape, ShapeDescriptor, Stroke};
pub use crate::transform::{Transform, Transformable, ValidTransform};
