use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while expanding shader include directives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderError {
    #[error("unknown shader include `{0}`")]
    UnknownInclude(String),
    #[error("shader include depth exceeded while expanding `{0}`")]
    IncludeDepthExceeded(String),
}

const MAX_INCLUDE_DEPTH: usize = 8;

/// Registry of named WGSL snippets spliced into shader sources at build time.
///
/// Resolution is a pure text substitution: a line of the form
/// `//#include <name>` is replaced by the registered snippet, recursively.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    snippets: HashMap<String, String>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library preloaded with the built-in snippets.
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.register("noise/lattice3", LATTICE_NOISE_WGSL);
        library
    }

    pub fn register(&mut self, name: &str, source: &str) {
        self.snippets.insert(name.to_string(), source.to_string());
    }

    /// Expands every include directive in `source` and returns the resolved
    /// text. The input is not modified; unknown names are errors.
    pub fn resolve(&self, source: &str) -> Result<String, ShaderError> {
        self.resolve_at_depth(source, 0)
    }

    fn resolve_at_depth(&self, source: &str, depth: usize) -> Result<String, ShaderError> {
        let mut resolved = String::with_capacity(source.len());
        for line in source.lines() {
            match parse_include(line) {
                Some(name) => {
                    if depth >= MAX_INCLUDE_DEPTH {
                        return Err(ShaderError::IncludeDepthExceeded(name.to_string()));
                    }
                    let snippet = self
                        .snippets
                        .get(name)
                        .ok_or_else(|| ShaderError::UnknownInclude(name.to_string()))?;
                    resolved.push_str(&self.resolve_at_depth(snippet, depth + 1)?);
                }
                None => resolved.push_str(line),
            }
            resolved.push('\n');
        }
        Ok(resolved)
    }
}

fn parse_include(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("//#include <")?;
    rest.strip_suffix('>').filter(|name| !name.is_empty())
}

/// WGSL mirror of `crate::noise`: same hash, same trilinear smoothing.
pub const LATTICE_NOISE_WGSL: &str = r#"
fn lattice_hash31(x: i32, y: i32, z: i32) -> f32 {
    var h = 0x9e3779b9u
        ^ (bitcast<u32>(x) * 0x8da6b343u)
        ^ (bitcast<u32>(y) * 0xd8163841u)
        ^ (bitcast<u32>(z) * 0xcb1ab31fu);
    h = h ^ (h >> 13u);
    h = h * 0x7feb352du;
    h = h ^ (h >> 15u);
    return (f32(h) / 4294967295.0) * 2.0 - 1.0;
}

fn lattice_noise3(p: vec3<f32>) -> f32 {
    let base = floor(p);
    let f = p - base;
    let i = vec3<i32>(base);
    let u = f * f * (3.0 - 2.0 * f);

    let c000 = lattice_hash31(i.x, i.y, i.z);
    let c100 = lattice_hash31(i.x + 1, i.y, i.z);
    let c010 = lattice_hash31(i.x, i.y + 1, i.z);
    let c110 = lattice_hash31(i.x + 1, i.y + 1, i.z);
    let c001 = lattice_hash31(i.x, i.y, i.z + 1);
    let c101 = lattice_hash31(i.x + 1, i.y, i.z + 1);
    let c011 = lattice_hash31(i.x, i.y + 1, i.z + 1);
    let c111 = lattice_hash31(i.x + 1, i.y + 1, i.z + 1);

    let bottom = mix(mix(c000, c100, u.x), mix(c010, c110, u.x), u.y);
    let top = mix(mix(c001, c101, u.x), mix(c011, c111, u.x), u.y);
    return mix(bottom, top, u.z);
}
"#;
