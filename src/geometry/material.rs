// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Material cache seam and the default in-process library

use crate::schema::{ColorSpec, MaterialDefinition};
use ahash::AHashMap;
use serde::Serialize;

pub const DEFAULT_COLOR: u32 = 0xffffff;
pub const DEFAULT_ROUGHNESS: f64 = 0.5;
pub const DEFAULT_METALNESS: f64 = 0.0;

/// Opaque handle to a cached material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Resolved material parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    pub kind: String,
    pub color: u32,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
    pub transparent: bool,
}

impl Material {
    pub fn from_definition(name: &str, def: &MaterialDefinition) -> Self {
        let color = match &def.color {
            Some(spec) => parse_color(spec).unwrap_or_else(|| {
                log::warn!("material '{}' has an invalid color {:?}, using white", name, spec);
                DEFAULT_COLOR
            }),
            None => DEFAULT_COLOR,
        };

        Self {
            name: name.to_string(),
            kind: def.kind.clone().unwrap_or_else(|| "standard".into()),
            color,
            roughness: def.roughness.unwrap_or(DEFAULT_ROUGHNESS),
            metalness: def.metalness.unwrap_or(DEFAULT_METALNESS),
            opacity: def.opacity.map(|o| o.clamp(0.0, 1.0)).unwrap_or(1.0),
            transparent: def.opacity.is_some(),
        }
    }

    /// Color as linear 0..1 components
    pub fn rgb(&self) -> [f64; 3] {
        let c = self.color;
        [(c >> 16) & 0xff, (c >> 8) & 0xff, c & 0xff].map(|b| b as f64 / 255.0)
    }

    pub fn hex(&self) -> String {
        format!("#{:06x}", self.color)
    }
}

/// Parse `#rrggbb`, `rrggbb`, `#rgb` or a packed number into `0xRRGGBB`
pub fn parse_color(spec: &ColorSpec) -> Option<u32> {
    match spec {
        ColorSpec::Packed(n) => Some(n & 0xffffff),
        ColorSpec::Text(text) => {
            let hex = text.trim();
            let hex = hex
                .strip_prefix('#')
                .or_else(|| hex.strip_prefix("0x"))
                .unwrap_or(hex);
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok(),
                3 => {
                    let short = u32::from_str_radix(hex, 16).ok()?;
                    let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                    Some((r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11))
                }
                _ => None,
            }
        }
    }
}

/// Shared materials keyed by name
pub trait MaterialCache {
    /// Return the cached material for `name`, creating it from `definition`
    /// on first use. Every call counts as one use of the handle.
    fn get_or_create(&mut self, name: &str, definition: &MaterialDefinition) -> MaterialHandle;

    /// Return one use of `handle`
    fn release(&mut self, handle: MaterialHandle);
}

struct Entry {
    material: Material,
    uses: usize,
}

/// Default material cache. Entries are created lazily and never evicted.
#[derive(Default)]
pub struct MaterialLibrary {
    by_name: AHashMap<String, MaterialHandle>,
    entries: AHashMap<MaterialHandle, Entry>,
    next_id: u64,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.entries.get(&handle).map(|e| &e.material)
    }

    pub fn handle(&self, name: &str) -> Option<MaterialHandle> {
        self.by_name.get(name).copied()
    }

    /// Outstanding uses of `handle`
    pub fn uses(&self, handle: MaterialHandle) -> usize {
        self.entries.get(&handle).map_or(0, |e| e.uses)
    }

    pub fn total_uses(&self) -> usize {
        self.entries.values().map(|e| e.uses).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MaterialCache for MaterialLibrary {
    fn get_or_create(&mut self, name: &str, definition: &MaterialDefinition) -> MaterialHandle {
        let handle = match self.by_name.get(name) {
            Some(handle) => *handle,
            None => {
                let handle = MaterialHandle(self.next_id);
                self.next_id += 1;
                self.by_name.insert(name.to_string(), handle);
                self.entries.insert(
                    handle,
                    Entry {
                        material: Material::from_definition(name, definition),
                        uses: 0,
                    },
                );
                log::debug!("created material '{}'", name);
                handle
            }
        };

        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.uses += 1;
        }
        handle
    }

    fn release(&mut self, handle: MaterialHandle) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.uses = entry.uses.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ColorSpec {
        ColorSpec::Text(s.into())
    }

    #[test]
    fn test_color_forms() {
        assert_eq!(parse_color(&text("#8b4513")), Some(0x8b4513));
        assert_eq!(parse_color(&text("8B4513")), Some(0x8b4513));
        assert_eq!(parse_color(&text("#f80")), Some(0xff8800));
        assert_eq!(parse_color(&ColorSpec::Packed(0x123456)), Some(0x123456));
        assert_eq!(parse_color(&text("brown")), None);
        assert_eq!(parse_color(&text("#12345")), None);
    }

    #[test]
    fn test_opacity_implies_transparency() {
        let def = MaterialDefinition {
            opacity: Some(0.3),
            ..Default::default()
        };
        let m = Material::from_definition("glass", &def);
        assert!(m.transparent);
        assert_eq!(m.roughness, DEFAULT_ROUGHNESS);
        assert_eq!(m.hex(), "#ffffff");

        let solid = Material::from_definition("solid", &MaterialDefinition::default());
        assert!(!solid.transparent);
        assert_eq!(solid.opacity, 1.0);
    }

    #[test]
    fn test_cached_by_name_with_use_counts() {
        let mut lib = MaterialLibrary::new();
        let wood = MaterialDefinition {
            color: Some(text("#8b4513")),
            ..Default::default()
        };
        let a = lib.get_or_create("wood", &wood);
        let b = lib.get_or_create("wood", &MaterialDefinition::default());
        assert_eq!(a, b);
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.uses(a), 2);
        // first definition wins
        assert_eq!(lib.get(a).unwrap().color, 0x8b4513);

        lib.release(a);
        lib.release(a);
        lib.release(a);
        assert_eq!(lib.uses(a), 0);
        assert_eq!(lib.handle("wood"), Some(a));
    }
}
