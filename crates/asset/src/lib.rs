//! Asset loading: OBJ meshes flattened for direct upload, procedural solids,
//! bounded source files and textures.

pub mod error;
pub mod mesh;
pub mod obj;
pub mod solids;
pub mod source;
pub mod texture;

pub use error::{AttributeKind, Location, ObjError};
pub use mesh::{Material, MeshData};
pub use source::{MAX_SOURCE_LEN, SourceError, read_source};
