//! # Normalization and Fixed-Point Quantization
//!
//! The two terminal, order-dependent transforms applied to every feature
//! column right before serialization:
//!
//! ```text
//! Raw(x) ── normalize ──▶ Normalized(v ∈ [-1,1] or [0,1]) ── quantize ──▶ Quantized(Code)
//! ```
//!
//! Both are destructive and one-way. The stage tag on `FeatureValue` makes a
//! second application an error instead of silent corruption.

pub mod normalize;
pub mod fixed_point;

pub use normalize::{denormalize, normalize, normalize_database};
pub use fixed_point::{dequantize, quantize, quantize_database, quantize_level};
