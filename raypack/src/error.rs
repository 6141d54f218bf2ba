//! Error types for the asset pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::TextureHandle;

/// Any error that can abort loading a model or a scene.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Failure while reading a mesh or a material library.
///
/// Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: `{token}` is not a valid number")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: `{directive}` expects {expected} component(s)")]
    MissingComponents {
        line: usize,
        directive: &'static str,
        expected: usize,
    },

    #[error("line {line}: face corner has no vertex index")]
    MissingVertexIndex { line: usize },

    #[error("line {line}: `{index}` is not a valid index")]
    InvalidIndex { line: usize, index: String },

    #[error("line {line}: {kind} index {index} is out of bounds (count: {len})")]
    IndexOutOfBounds {
        line: usize,
        kind: &'static str,
        index: i64,
        len: usize,
    },

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Failure while converting parsed geometry into a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("face references vertex {index}, but there are only {len}")]
    VertexOutOfBounds { index: u32, len: usize },

    #[error("face references texcoord {index}, but there are only {len}")]
    TexcoordOutOfBounds { index: u32, len: usize },

    #[error(transparent)]
    Bvh(#[from] BvhError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BvhError {
    #[error("cannot build a BVH over zero primitives")]
    NoPrimitives,

    #[error("cannot build a BVH over {0} primitives (too many)")]
    TooManyPrimitives(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("model #{index} is missing")]
    MissingModel { index: usize },

    #[error("merged scene has too many {what} to be addressed with 32 bits")]
    Overflow { what: &'static str },

    #[error("model #{index} doesn't exist (count: {len})")]
    UnknownModel { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("cannot load texture `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0:?} is not loaded")]
    UnknownHandle(TextureHandle),

    #[error("texture {0:?} was not created as bindless")]
    NotBindless(TextureHandle),
}
