//! Semantic roles of AGX parameters.

use std::fmt;

/// Geometry role of a parameter, resolved from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Vertex positions.
    Position,
    /// Vertex normals.
    Normal,
    /// Generic per-vertex attribute 0.
    Attribute0,
    /// Texture coordinates.
    TexCoord,
    /// Triangle indices.
    Index,
    /// Sample time (informational).
    Time,
    /// Anything else.
    Custom,
}

const POSITION_NAMES: &[&str] = &["vertex.position", "position", "vertex.positions", "positions"];
const NORMAL_NAMES: &[&str] = &["vertex.normal", "normal", "vertex.normals", "normals"];
const ATTRIBUTE0_NAMES: &[&str] = &["vertex.attribute0", "attribute0"];
const TEXCOORD_NAMES: &[&str] = &["uv", "vertex.uv", "texcoord"];
const INDEX_NAMES: &[&str] = &["primitive.index", "index", "primitive.indices", "indices"];
const TIME_NAMES: &[&str] = &["time"];

impl Role {
    /// Resolve a parameter name against the synonym table.
    ///
    /// Exact, case-sensitive matching; unmatched names are [`Role::Custom`].
    pub fn resolve(name: &str) -> Self {
        let table: [(&[&str], Role); 6] = [
            (POSITION_NAMES, Self::Position),
            (NORMAL_NAMES, Self::Normal),
            (ATTRIBUTE0_NAMES, Self::Attribute0),
            (TEXCOORD_NAMES, Self::TexCoord),
            (INDEX_NAMES, Self::Index),
            (TIME_NAMES, Self::Time),
        ];
        table
            .iter()
            .find(|(names, _)| names.contains(&name))
            .map_or(Self::Custom, |&(_, role)| role)
    }

    /// Names that resolve to this role (empty for `Custom`).
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Position => POSITION_NAMES,
            Self::Normal => NORMAL_NAMES,
            Self::Attribute0 => ATTRIBUTE0_NAMES,
            Self::TexCoord => TEXCOORD_NAMES,
            Self::Index => INDEX_NAMES,
            Self::Time => TIME_NAMES,
            Self::Custom => &[],
        }
    }

    /// Short lowercase name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Attribute0 => "attribute0",
            Self::TexCoord => "texcoord",
            Self::Index => "index",
            Self::Time => "time",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
